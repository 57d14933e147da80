//! Stock of the calling store. Rows of other stores are never visible.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::db::{estoque_repo, item_repo};
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::http::auth::LojaAtual;
use crate::http::Page;

#[derive(Deserialize)]
pub struct EstoqueCriar {
    pub item_id: i32,
    #[serde(default)]
    pub quantidade: i32,
    #[serde(default)]
    pub preco: f64,
}

#[derive(Deserialize)]
pub struct EstoqueAtualizar {
    pub quantidade: Option<i32>,
    pub preco: Option<f64>,
}

fn not_found() -> ApiError {
    ApiError::not_found("Estoque não encontrado.")
}

fn validate(quantidade: Option<i32>, preco: Option<f64>) -> ApiResult<()> {
    if quantidade.is_some_and(|q| q < 0) {
        return Err(ApiError::bad_request("Quantidade não pode ser negativa"));
    }
    if preco.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(ApiError::bad_request("Preço inválido"));
    }
    Ok(())
}

/// POST /api/lojas/estoque
#[post("/lojas/estoque")]
pub async fn create(
    loja: LojaAtual,
    body: web::Json<EstoqueCriar>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    validate(Some(body.quantidade), Some(body.preco))?;
    if item_repo::get(&db, body.item_id).await?.is_none() {
        return Err(ApiError::not_found("Item não encontrado."));
    }

    let estoque = estoque_repo::insert(&db, body.item_id, loja.id(), body.quantidade, body.preco)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::bad_request("O item já existe no estoque desta loja.")
            } else {
                ApiError::from(e)
            }
        })?;
    Ok(HttpResponse::Ok().json(estoque))
}

/// GET /api/lojas/estoque?skip=&limit=
#[get("/lojas/estoque")]
pub async fn list(
    loja: LojaAtual,
    page: web::Query<Page>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let (skip, limit) = page.bounds();
    let rows = estoque_repo::list(&db, loja.id(), skip, limit).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// GET /api/lojas/estoque/{item_id}
#[get("/lojas/estoque/{item_id}")]
pub async fn get(
    loja: LojaAtual,
    path: web::Path<i32>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let row = estoque_repo::get(&db, path.into_inner(), loja.id())
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(row))
}

/// PUT /api/lojas/estoque/{item_id}
#[put("/lojas/estoque/{item_id}")]
pub async fn update(
    loja: LojaAtual,
    path: web::Path<i32>,
    body: web::Json<EstoqueAtualizar>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    validate(body.quantidade, body.preco)?;
    let row = estoque_repo::update(&db, path.into_inner(), loja.id(), body.quantidade, body.preco)
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(row))
}

/// DELETE /api/lojas/estoque/{item_id}
#[delete("/lojas/estoque/{item_id}")]
pub async fn remove(
    loja: LojaAtual,
    path: web::Path<i32>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let row = estoque_repo::delete(&db, path.into_inner(), loja.id())
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(row))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(list)
        .service(get)
        .service(update)
        .service(remove);
}
