use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::db::tipo_jogador_repo;
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::http::auth::LojaAtual;

#[derive(Deserialize)]
pub struct TipoJogadorCriar {
    pub nome: String,
}

#[get("/tipoJogador")]
pub async fn list(db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(tipo_jogador_repo::list(&db).await?))
}

#[get("/tipoJogador/{id}")]
pub async fn get(path: web::Path<i32>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let tipo = tipo_jogador_repo::get(&db, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Tipo de jogador não encontrado"))?;
    Ok(HttpResponse::Ok().json(tipo))
}

#[post("/tipoJogador")]
pub async fn create(
    _loja: LojaAtual,
    body: web::Json<TipoJogadorCriar>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let nome = body.nome.trim();
    if nome.is_empty() {
        return Err(ApiError::bad_request("Nome é obrigatório"));
    }
    let tipo = tipo_jogador_repo::insert(&db, nome).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request("Tipo de jogador já existe")
        } else {
            ApiError::from(e)
        }
    })?;
    Ok(HttpResponse::Ok().json(tipo))
}

#[delete("/tipoJogador/{id}")]
pub async fn remove(
    _loja: LojaAtual,
    path: web::Path<i32>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    if !tipo_jogador_repo::delete(&db, path.into_inner()).await? {
        return Err(ApiError::not_found("Tipo de jogador não encontrado"));
    }
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list).service(get).service(create).service(remove);
}
