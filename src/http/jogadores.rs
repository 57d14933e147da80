//! Player registration, lookup, profile updates and photo upload.

use std::path::Path;

use actix_multipart::Multipart;
use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::config::Settings;
use crate::db::jogador_repo::{self, JogadorChanges, NovoJogador};
use crate::db::models::{JogadorPublico, TipoUsuario};
use crate::db::{tipo_jogador_repo, usuario_repo};
use crate::error::{ApiError, ApiResult};
use crate::http::accounts;
use crate::http::auth::JogadorAtual;
use crate::http::Page;
use crate::security::TokenKeys;
use crate::uploads::{self, Slot};

#[derive(Deserialize)]
pub struct JogadorCriar {
    pub email: String,
    pub senha: String,
    pub nome: String,
    pub telefone: Option<String>,
    pub tipo_jogador_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct JogadorAtualizar {
    pub email: Option<String>,
    pub senha: Option<String>,
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub tipo_jogador_id: Option<i32>,
}

async fn fetch(db: &PgPool, id: i32) -> ApiResult<JogadorPublico> {
    jogador_repo::get(db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Jogador não encontrado"))
}

async fn check_tipo(db: &PgPool, tipo_jogador_id: Option<i32>) -> ApiResult<()> {
    if let Some(id) = tipo_jogador_id {
        if tipo_jogador_repo::get(db, id).await?.is_none() {
            return Err(ApiError::not_found("Tipo de jogador não encontrado"));
        }
    }
    Ok(())
}

/// POST /api/jogadores
#[post("/jogadores")]
pub async fn create(
    req: HttpRequest,
    body: web::Json<JogadorCriar>,
    db: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    settings: web::Data<Settings>,
) -> ApiResult<HttpResponse> {
    if body.nome.trim().is_empty() {
        return Err(ApiError::bad_request("Nome do jogador é obrigatório"));
    }
    check_tipo(&db, body.tipo_jogador_id).await?;

    let mut tx = db.begin().await?;
    let (usuario_id, email) =
        accounts::register_usuario(&mut tx, &body.email, &body.senha, TipoUsuario::Jogador).await?;
    let jogador_id = jogador_repo::insert(
        &mut *tx,
        usuario_id,
        &NovoJogador {
            nome: body.nome.trim(),
            telefone: body.telefone.as_deref(),
            tipo_jogador_id: body.tipo_jogador_id,
        },
    )
    .await?;
    let jogador = jogador_repo::get(&mut *tx, jogador_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Jogador não encontrado"))?;
    let confirmation = accounts::confirmation_for(&req, &settings, &keys, &email)?;
    tx.commit().await?;

    log::info!("registered jogador {jogador_id} for {email}");
    accounts::dispatch_confirmation(&settings, &confirmation).await;
    Ok(HttpResponse::Ok().json(jogador))
}

/// GET /api/jogadores?skip=&limit=
#[get("/jogadores")]
pub async fn list(page: web::Query<Page>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let (skip, limit) = page.bounds();
    let jogadores = jogador_repo::list(&db, skip, limit).await?;
    Ok(HttpResponse::Ok().json(jogadores))
}

/// GET /api/jogadores/usuario/{usuario_id}
#[get("/jogadores/usuario/{usuario_id}")]
pub async fn by_usuario(path: web::Path<i32>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let jogador = jogador_repo::get_by_usuario(&db, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Jogador não encontrado"))?;
    Ok(HttpResponse::Ok().json(jogador))
}

/// GET /api/jogadores/{jogador_id}
#[get("/jogadores/{jogador_id}")]
pub async fn get(path: web::Path<i32>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let jogador = fetch(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(jogador))
}

/// PUT /api/jogadores
#[put("/jogadores")]
pub async fn update(
    auth: JogadorAtual,
    body: web::Json<JogadorAtualizar>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let current = fetch(db.get_ref(), auth.id()).await?;
    check_tipo(&db, body.tipo_jogador_id).await?;

    let mut tx = db.begin().await?;
    accounts::update_account(
        &mut tx,
        current.usuario_id,
        &current.email,
        body.email.as_deref(),
        body.senha.as_deref(),
    )
    .await?;
    jogador_repo::update(
        &mut *tx,
        current.id,
        &JogadorChanges {
            nome: body.nome.as_deref().map(str::trim).filter(|n| !n.is_empty()),
            telefone: body.telefone.as_deref(),
            tipo_jogador_id: body.tipo_jogador_id,
        },
    )
    .await?;
    tx.commit().await?;

    let jogador = fetch(db.get_ref(), current.id).await?;
    Ok(HttpResponse::Ok().json(jogador))
}

/// POST /api/jogadores/upload_foto
#[post("/jogadores/upload_foto")]
pub async fn upload_foto(
    auth: JogadorAtual,
    payload: Multipart,
    db: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> ApiResult<HttpResponse> {
    let jogador = fetch(db.get_ref(), auth.id()).await?;
    let Some(file) = uploads::read_file_field(payload).await? else {
        return Ok(HttpResponse::Ok().json(jogador));
    };

    let name = uploads::store(
        Path::new(&settings.upload_dir),
        jogador.usuario_id,
        Slot::Foto,
        &file,
    )
    .await?;
    usuario_repo::set_foto(&db, jogador.usuario_id, &name).await?;

    let jogador = fetch(db.get_ref(), jogador.id).await?;
    Ok(HttpResponse::Ok().json(jogador))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(list)
        .service(update)
        .service(upload_foto)
        .service(by_usuario)
        .service(get);
}
