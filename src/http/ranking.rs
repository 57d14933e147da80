// src/http/ranking.rs

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::db::torneio_repo;
use crate::error::ApiResult;

#[derive(Deserialize)]
pub struct RankingParams {
    /// Restrict to tournaments hosted by this store.
    pub loja_id: Option<i32>,
    /// Maximum number of entries to return.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[get("/ranking")]
pub async fn ranking(
    db: web::Data<PgPool>,
    web::Query(params): web::Query<RankingParams>,
) -> ApiResult<HttpResponse> {
    let rows = torneio_repo::ranking(&db, params.loja_id, params.limit.clamp(1, 500)).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Mounts the ranking route under the API prefix
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(ranking);
}
