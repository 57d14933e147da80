//! Card / product catalogue shared by every store.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::db::item_repo::{self, ItemChanges, NovoItem};
use crate::error::{ApiError, ApiResult};
use crate::http::auth::LojaAtual;
use crate::http::Page;

#[derive(Deserialize)]
pub struct ItemCriar {
    pub nome: String,
    pub descricao: Option<String>,
    pub colecao: Option<String>,
    pub imagem: Option<String>,
}

#[derive(Deserialize)]
pub struct ItemAtualizar {
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub colecao: Option<String>,
    pub imagem: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::not_found("Item não encontrado.")
}

/// POST /api/lojas/itens
#[post("/lojas/itens")]
pub async fn create(
    loja: LojaAtual,
    body: web::Json<ItemCriar>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    if body.nome.trim().is_empty() {
        return Err(ApiError::bad_request("Nome do item é obrigatório"));
    }
    let item = item_repo::insert(
        &db,
        &NovoItem {
            nome: body.nome.trim(),
            descricao: body.descricao.as_deref(),
            colecao: body.colecao.as_deref(),
            imagem: body.imagem.as_deref(),
        },
    )
    .await?;
    log::info!("loja {} created item {}", loja.id(), item.id);
    Ok(HttpResponse::Ok().json(item))
}

/// GET /api/lojas/itens?skip=&limit=
#[get("/lojas/itens")]
pub async fn list(page: web::Query<Page>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let (skip, limit) = page.bounds();
    let items = item_repo::list(&db, skip, limit).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// GET /api/lojas/itens/{item_id}
#[get("/lojas/itens/{item_id}")]
pub async fn get(path: web::Path<i32>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let item = item_repo::get(&db, path.into_inner())
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(item))
}

/// PUT /api/lojas/itens/{item_id}
#[put("/lojas/itens/{item_id}")]
pub async fn update(
    _loja: LojaAtual,
    path: web::Path<i32>,
    body: web::Json<ItemAtualizar>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let changes = ItemChanges {
        nome: body.nome.as_deref().map(str::trim).filter(|n| !n.is_empty()),
        descricao: body.descricao.as_deref(),
        colecao: body.colecao.as_deref(),
        imagem: body.imagem.as_deref(),
    };
    let item = item_repo::update(&db, path.into_inner(), &changes)
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(item))
}

/// DELETE /api/lojas/itens/{item_id}
#[delete("/lojas/itens/{item_id}")]
pub async fn remove(
    loja: LojaAtual,
    path: web::Path<i32>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let item = item_repo::delete(&db, path.into_inner())
        .await?
        .ok_or_else(not_found)?;
    log::info!("loja {} deleted item {}", loja.id(), item.id);
    Ok(HttpResponse::Ok().json(item))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(list)
        .service(get)
        .service(update)
        .service(remove);
}
