//! Store registration, public listing, profile updates and image uploads.

use std::path::Path;

use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::config::Settings;
use crate::db::loja_repo::{self, LojaChanges, NovaLoja};
use crate::db::models::{LojaPublico, TipoUsuario};
use crate::db::usuario_repo;
use crate::error::{ApiError, ApiResult};
use crate::http::accounts;
use crate::http::auth::LojaAtual;
use crate::security::TokenKeys;
use crate::uploads::{self, Slot};

#[derive(Deserialize)]
pub struct LojaCriar {
    pub email: String,
    pub senha: String,
    pub nome: String,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub site: Option<String>,
}

#[derive(Deserialize)]
pub struct LojaAtualizar {
    pub email: Option<String>,
    pub senha: Option<String>,
    pub nome: Option<String>,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub site: Option<String>,
}

async fn fetch(db: &PgPool, id: i32) -> ApiResult<LojaPublico> {
    loja_repo::get(db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Loja não encontrada"))
}

/// POST /api/lojas
#[post("/lojas")]
pub async fn create(
    req: HttpRequest,
    body: web::Json<LojaCriar>,
    db: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    settings: web::Data<Settings>,
) -> ApiResult<HttpResponse> {
    if body.nome.trim().is_empty() {
        return Err(ApiError::bad_request("Nome da loja é obrigatório"));
    }

    let mut tx = db.begin().await?;
    let (usuario_id, email) =
        accounts::register_usuario(&mut tx, &body.email, &body.senha, TipoUsuario::Loja).await?;
    let loja_id = loja_repo::insert(
        &mut *tx,
        usuario_id,
        &NovaLoja {
            nome: body.nome.trim(),
            endereco: body.endereco.as_deref(),
            telefone: body.telefone.as_deref(),
            site: body.site.as_deref(),
        },
    )
    .await?;
    let loja = loja_repo::get(&mut *tx, loja_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Loja não encontrada"))?;
    let confirmation = accounts::confirmation_for(&req, &settings, &keys, &email)?;
    tx.commit().await?;

    log::info!("registered loja {loja_id} for {email}");
    accounts::dispatch_confirmation(&settings, &confirmation).await;
    Ok(HttpResponse::Ok().json(loja))
}

/// GET /api/lojas
#[get("/lojas")]
pub async fn list(db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let lojas = loja_repo::list_with_torneios(&db).await?;
    Ok(HttpResponse::Ok().json(lojas))
}

/// GET /api/lojas/usuario/{usuario_id}
#[get("/lojas/usuario/{usuario_id}")]
pub async fn by_usuario(path: web::Path<i32>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let loja = loja_repo::get_by_usuario(&db, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Loja não encontrada"))?;
    Ok(HttpResponse::Ok().json(loja))
}

/// GET /api/lojas/{loja_id}
#[get("/lojas/{loja_id}")]
pub async fn get(path: web::Path<i32>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let loja = fetch(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(loja))
}

/// PUT /api/lojas
#[put("/lojas")]
pub async fn update(
    auth: LojaAtual,
    body: web::Json<LojaAtualizar>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let current = fetch(db.get_ref(), auth.id()).await?;

    let mut tx = db.begin().await?;
    accounts::update_account(
        &mut tx,
        current.usuario_id,
        &current.email,
        body.email.as_deref(),
        body.senha.as_deref(),
    )
    .await?;
    loja_repo::update(
        &mut *tx,
        current.id,
        &LojaChanges {
            nome: body.nome.as_deref().map(str::trim).filter(|n| !n.is_empty()),
            endereco: body.endereco.as_deref(),
            telefone: body.telefone.as_deref(),
            site: body.site.as_deref(),
        },
    )
    .await?;
    tx.commit().await?;

    let loja = fetch(db.get_ref(), current.id).await?;
    Ok(HttpResponse::Ok().json(loja))
}

/// DELETE /api/lojas/{loja_id}
#[delete("/lojas/{loja_id}")]
pub async fn remove(
    auth: LojaAtual,
    path: web::Path<i32>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let loja = fetch(db.get_ref(), path.into_inner()).await?;
    if loja.id != auth.id() {
        return Err(ApiError::Forbidden);
    }
    usuario_repo::delete(&db, loja.usuario_id).await?;
    log::info!("deleted loja {} (usuario {})", loja.id, loja.usuario_id);
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

async fn upload(
    auth: &LojaAtual,
    payload: Multipart,
    db: &PgPool,
    settings: &Settings,
    slot: Slot,
) -> ApiResult<LojaPublico> {
    let loja = fetch(db, auth.id()).await?;
    if let Some(file) = uploads::read_file_field(payload).await? {
        let name = uploads::store(Path::new(&settings.upload_dir), loja.usuario_id, slot, &file).await?;
        match slot {
            Slot::Foto => usuario_repo::set_foto(db, loja.usuario_id, &name).await?,
            Slot::Banner => loja_repo::set_banner(db, loja.id, &name).await?,
        }
        return fetch(db, loja.id).await;
    }
    Ok(loja)
}

/// POST /api/lojas/upload_foto
#[post("/lojas/upload_foto")]
pub async fn upload_foto(
    auth: LojaAtual,
    payload: Multipart,
    db: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> ApiResult<HttpResponse> {
    let loja = upload(&auth, payload, &db, &settings, Slot::Foto).await?;
    Ok(HttpResponse::Ok().json(loja))
}

/// POST /api/lojas/upload_banner
#[post("/lojas/upload_banner")]
pub async fn upload_banner(
    auth: LojaAtual,
    payload: Multipart,
    db: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> ApiResult<HttpResponse> {
    let loja = upload(&auth, payload, &db, &settings, Slot::Banner).await?;
    Ok(HttpResponse::Ok().json(loja))
}

/// `/lojas/{loja_id}` must come after the literal `/lojas/...` routes,
/// including the item and stock modules mounted before this one.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(list)
        .service(update)
        .service(upload_foto)
        .service(upload_banner)
        .service(by_usuario)
        .service(get)
        .service(remove);
}
