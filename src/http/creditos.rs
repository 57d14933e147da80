//! Credit ledger endpoints. Every mutation is scoped to the calling store.

use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::db::{credito_repo, jogador_repo};
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::http::auth::{JogadorAtual, LojaAtual};

#[derive(Deserialize)]
pub struct CreditoCreate {
    pub jogador_id: i32,
    pub quantidade: f64,
}

#[derive(Deserialize)]
pub struct CreditoUpdate {
    pub quantidade: f64,
}

#[derive(Deserialize)]
pub struct CreditoAdd {
    pub novos_creditos: f64,
}

fn finite(value: f64) -> ApiResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ApiError::bad_request("Quantidade inválida"))
    }
}

async fn require_jogador(db: &PgPool, jogador_id: i32) -> ApiResult<()> {
    if !jogador_repo::exists(db, jogador_id).await? {
        return Err(ApiError::not_found("Jogador não encontrado"));
    }
    Ok(())
}

/// POST /api/creditos
#[post("/creditos")]
pub async fn create(
    loja: LojaAtual,
    body: web::Json<CreditoCreate>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let quantidade = finite(body.quantidade)?;
    require_jogador(&db, body.jogador_id).await?;

    let credito = credito_repo::create(&db, body.jogador_id, loja.id(), quantidade)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::bad_request("Crédito já existe para este jogador")
            } else {
                ApiError::from(e)
            }
        })?;
    Ok(HttpResponse::Ok().json(credito))
}

/// GET /api/creditos
#[get("/creditos")]
pub async fn list_by_loja(loja: LojaAtual, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let creditos = credito_repo::list_by_loja(&db, loja.id()).await?;
    Ok(HttpResponse::Ok().json(creditos))
}

/// GET /api/creditos/jogador
#[get("/creditos/jogador")]
pub async fn list_by_jogador(
    jogador: JogadorAtual,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let creditos = credito_repo::list_by_jogador(&db, jogador.id()).await?;
    Ok(HttpResponse::Ok().json(creditos))
}

/// GET /api/creditos/{jogador_id}
#[get("/creditos/{jogador_id}")]
pub async fn get(
    loja: LojaAtual,
    path: web::Path<i32>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let credito = credito_repo::get(&db, path.into_inner(), loja.id())
        .await?
        .ok_or_else(|| ApiError::not_found("Crédito não encontrado"))?;
    Ok(HttpResponse::Ok().json(credito))
}

/// PATCH /api/creditos/{jogador_id}/adicionar-credito
#[patch("/creditos/{jogador_id}/adicionar-credito")]
pub async fn add(
    loja: LojaAtual,
    path: web::Path<i32>,
    body: web::Json<CreditoAdd>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let jogador_id = path.into_inner();
    let delta = finite(body.novos_creditos)?;
    require_jogador(&db, jogador_id).await?;

    let credito = credito_repo::increment(&db, jogador_id, loja.id(), delta).await?;
    log::debug!(
        "loja {} credited {delta} to jogador {jogador_id} (now {})",
        loja.id(),
        credito.quantidade
    );
    Ok(HttpResponse::Ok().json(credito))
}

/// PUT /api/creditos/{jogador_id}
#[put("/creditos/{jogador_id}")]
pub async fn update(
    loja: LojaAtual,
    path: web::Path<i32>,
    body: web::Json<CreditoUpdate>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let quantidade = finite(body.quantidade)?;
    let credito = credito_repo::set(&db, path.into_inner(), loja.id(), quantidade)
        .await?
        .ok_or_else(|| ApiError::not_found("Crédito não encontrado"))?;
    Ok(HttpResponse::Ok().json(credito))
}

/// DELETE /api/creditos/{jogador_id}
#[delete("/creditos/{jogador_id}")]
pub async fn remove(
    loja: LojaAtual,
    path: web::Path<i32>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    if !credito_repo::delete(&db, path.into_inner(), loja.id()).await? {
        return Err(ApiError::not_found("Crédito não encontrado"));
    }
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(list_by_loja)
        .service(list_by_jogador)
        .service(get)
        .service(add)
        .service(update)
        .service(remove);
}
