//! Tournaments hosted by stores, player enrollment and scoring.

use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::db::models::{StatusTorneio, Torneio};
use crate::db::torneio_repo::{self, Enrollment, NovoTorneio, TorneioChanges, Update};
use crate::error::{ApiError, ApiResult};
use crate::http::auth::{JogadorAtual, LojaAtual};

#[derive(Deserialize)]
pub struct TorneioCriar {
    pub nome: String,
    pub descricao: Option<String>,
    pub jogo: Option<String>,
    pub data_inicio: DateTime<Utc>,
    pub vagas: Option<i32>,
    #[serde(default)]
    pub taxa_inscricao: f64,
}

#[derive(Deserialize)]
pub struct TorneioAtualizar {
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub jogo: Option<String>,
    pub data_inicio: Option<DateTime<Utc>>,
    pub vagas: Option<i32>,
    pub taxa_inscricao: Option<f64>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub loja_id: Option<i32>,
    pub status: Option<StatusTorneio>,
}

#[derive(Deserialize)]
pub struct StatusReq {
    pub status: StatusTorneio,
}

#[derive(Deserialize)]
pub struct PontuacaoReq {
    pub pontuacao: i32,
}

fn validate(vagas: Option<i32>, taxa: Option<f64>) -> ApiResult<()> {
    if vagas.is_some_and(|v| v <= 0) {
        return Err(ApiError::bad_request("Número de vagas deve ser positivo"));
    }
    if taxa.is_some_and(|t| !t.is_finite() || t < 0.0) {
        return Err(ApiError::bad_request("Taxa de inscrição inválida"));
    }
    Ok(())
}

/// Loads the tournament and checks that the caller hosts it.
async fn owned(db: &PgPool, loja: &LojaAtual, id: i32) -> ApiResult<Torneio> {
    let torneio = torneio_repo::get(db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Torneio não encontrado"))?;
    if torneio.loja_id != loja.id() {
        return Err(ApiError::Forbidden);
    }
    Ok(torneio)
}

/// POST /api/torneios
#[post("/torneios")]
pub async fn create(
    loja: LojaAtual,
    body: web::Json<TorneioCriar>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    if body.nome.trim().is_empty() {
        return Err(ApiError::bad_request("Nome do torneio é obrigatório"));
    }
    validate(body.vagas, Some(body.taxa_inscricao))?;

    let torneio = torneio_repo::insert(
        &db,
        loja.id(),
        &NovoTorneio {
            nome: body.nome.trim(),
            descricao: body.descricao.as_deref(),
            jogo: body.jogo.as_deref(),
            data_inicio: body.data_inicio,
            vagas: body.vagas,
            taxa_inscricao: body.taxa_inscricao,
        },
    )
    .await?;
    log::info!("loja {} created torneio {}", loja.id(), torneio.id);
    Ok(HttpResponse::Ok().json(torneio))
}

/// GET /api/torneios?loja_id=&status=
#[get("/torneios")]
pub async fn list(params: web::Query<ListParams>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let rows = torneio_repo::list(&db, params.loja_id, params.status).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// GET /api/torneios/{id}
#[get("/torneios/{id}")]
pub async fn get(path: web::Path<i32>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let torneio = torneio_repo::get(&db, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Torneio não encontrado"))?;
    Ok(HttpResponse::Ok().json(torneio))
}

/// PUT /api/torneios/{id}
#[put("/torneios/{id}")]
pub async fn update(
    loja: LojaAtual,
    path: web::Path<i32>,
    body: web::Json<TorneioAtualizar>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let torneio = owned(&db, &loja, path.into_inner()).await?;
    validate(body.vagas, body.taxa_inscricao)?;

    let changes = TorneioChanges {
        nome: body.nome.as_deref().map(str::trim).filter(|n| !n.is_empty()),
        descricao: body.descricao.as_deref(),
        jogo: body.jogo.as_deref(),
        data_inicio: body.data_inicio,
        vagas: body.vagas,
        taxa_inscricao: body.taxa_inscricao,
    };
    match torneio_repo::update(&db, torneio.id, &changes).await? {
        Update::Updated(torneio) => Ok(HttpResponse::Ok().json(torneio)),
        Update::NotFound => Err(ApiError::not_found("Torneio não encontrado")),
        Update::BelowEnrolled(inscritos) => Err(ApiError::bad_request(format!(
            "Torneio já tem {inscritos} jogadores inscritos"
        ))),
    }
}

/// PATCH /api/torneios/{id}/status
#[patch("/torneios/{id}/status")]
pub async fn set_status(
    loja: LojaAtual,
    path: web::Path<i32>,
    body: web::Json<StatusReq>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let torneio = owned(&db, &loja, path.into_inner()).await?;
    let torneio = torneio_repo::set_status(&db, torneio.id, body.status)
        .await?
        .ok_or_else(|| ApiError::not_found("Torneio não encontrado"))?;
    log::info!("torneio {} is now {:?}", torneio.id, torneio.status);
    Ok(HttpResponse::Ok().json(torneio))
}

/// DELETE /api/torneios/{id}
#[delete("/torneios/{id}")]
pub async fn remove(
    loja: LojaAtual,
    path: web::Path<i32>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let torneio = owned(&db, &loja, path.into_inner()).await?;
    torneio_repo::delete(&db, torneio.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

/// POST /api/torneios/{id}/inscricao
#[post("/torneios/{id}/inscricao")]
pub async fn enroll(
    jogador: JogadorAtual,
    path: web::Path<i32>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let torneio_id = path.into_inner();
    match torneio_repo::enroll(&db, torneio_id, jogador.id()).await? {
        Enrollment::Enrolled => Ok(HttpResponse::Ok().json(json!({
            "torneio_id": torneio_id,
            "jogador_id": jogador.id(),
        }))),
        Enrollment::NotFound => Err(ApiError::not_found("Torneio não encontrado")),
        Enrollment::Closed => Err(ApiError::bad_request("Inscrições encerradas")),
        Enrollment::AlreadyEnrolled => Err(ApiError::bad_request("Jogador já inscrito")),
        Enrollment::Full => Err(ApiError::bad_request("Torneio sem vagas")),
    }
}

/// GET /api/torneios/{id}/jogadores
#[get("/torneios/{id}/jogadores")]
pub async fn participants(path: web::Path<i32>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let torneio_id = path.into_inner();
    if torneio_repo::get(&db, torneio_id).await?.is_none() {
        return Err(ApiError::not_found("Torneio não encontrado"));
    }
    let rows = torneio_repo::participants(&db, torneio_id).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// PUT /api/torneios/{id}/jogadores/{jogador_id}
#[put("/torneios/{id}/jogadores/{jogador_id}")]
pub async fn set_score(
    loja: LojaAtual,
    path: web::Path<(i32, i32)>,
    body: web::Json<PontuacaoReq>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let (torneio_id, jogador_id) = path.into_inner();
    owned(&db, &loja, torneio_id).await?;
    if !torneio_repo::set_score(&db, torneio_id, jogador_id, body.pontuacao).await? {
        return Err(ApiError::not_found("Jogador não inscrito neste torneio"));
    }
    Ok(HttpResponse::Ok().json(json!({
        "torneio_id": torneio_id,
        "jogador_id": jogador_id,
        "pontuacao": body.pontuacao,
    })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(list)
        .service(get)
        .service(update)
        .service(set_status)
        .service(remove)
        .service(enroll)
        .service(participants)
        .service(set_score);
}
