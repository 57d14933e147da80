use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::models::{Inscricao, RankingEntry, StatusTorneio, Torneio};

const TORNEIO_COLUMNS: &str =
    "id, loja_id, nome, descricao, jogo, data_inicio, vagas, taxa_inscricao, status";

pub struct NovoTorneio<'a> {
    pub nome: &'a str,
    pub descricao: Option<&'a str>,
    pub jogo: Option<&'a str>,
    pub data_inicio: DateTime<Utc>,
    pub vagas: Option<i32>,
    pub taxa_inscricao: f64,
}

#[derive(Default)]
pub struct TorneioChanges<'a> {
    pub nome: Option<&'a str>,
    pub descricao: Option<&'a str>,
    pub jogo: Option<&'a str>,
    pub data_inicio: Option<DateTime<Utc>>,
    pub vagas: Option<i32>,
    pub taxa_inscricao: Option<f64>,
}

/// Result of a player trying to join a tournament.
#[derive(Debug, PartialEq, Eq)]
pub enum Enrollment {
    Enrolled,
    NotFound,
    Closed,
    AlreadyEnrolled,
    Full,
}

/// Result of an owner editing a tournament.
#[derive(Debug)]
pub enum Update {
    Updated(Torneio),
    NotFound,
    /// The new `vagas` is below the number of players already enrolled.
    BelowEnrolled(i64),
}

pub async fn insert(db: &PgPool, loja_id: i32, t: &NovoTorneio<'_>) -> Result<Torneio> {
    sqlx::query_as::<_, Torneio>(&format!(
        r#"INSERT INTO torneios (loja_id, nome, descricao, jogo, data_inicio, vagas, taxa_inscricao)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING {TORNEIO_COLUMNS}"#
    ))
    .bind(loja_id)
    .bind(t.nome)
    .bind(t.descricao)
    .bind(t.jogo)
    .bind(t.data_inicio)
    .bind(t.vagas)
    .bind(t.taxa_inscricao)
    .fetch_one(db)
    .await
    .context("inserting torneio")
}

pub async fn get(db: &PgPool, id: i32) -> Result<Option<Torneio>> {
    sqlx::query_as::<_, Torneio>(&format!("SELECT {TORNEIO_COLUMNS} FROM torneios WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching torneio")
}

/// Optional filters are ignored when `None`.
pub async fn list(
    db: &PgPool,
    loja_id: Option<i32>,
    status: Option<StatusTorneio>,
) -> Result<Vec<Torneio>> {
    sqlx::query_as::<_, Torneio>(&format!(
        r#"SELECT {TORNEIO_COLUMNS}
             FROM torneios
            WHERE ($1::INTEGER IS NULL OR loja_id = $1)
              AND ($2::status_torneio IS NULL OR status = $2)
            ORDER BY data_inicio DESC, id"#
    ))
    .bind(loja_id)
    .bind(status)
    .fetch_all(db)
    .await
    .context("listing torneios")
}

/// Applies a partial update. The row is locked while a new `vagas` is checked
/// against current enrollments, mirroring `enroll`.
pub async fn update(db: &PgPool, id: i32, changes: &TorneioChanges<'_>) -> Result<Update> {
    let mut tx = db.begin().await?;

    let locked = sqlx::query_scalar::<_, i32>("SELECT id FROM torneios WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("locking torneio")?;
    if locked.is_none() {
        return Ok(Update::NotFound);
    }

    if let Some(vagas) = changes.vagas {
        let inscritos = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM torneio_jogadores WHERE torneio_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("counting inscricoes")?;
        if inscritos > i64::from(vagas) {
            return Ok(Update::BelowEnrolled(inscritos));
        }
    }

    let torneio = sqlx::query_as::<_, Torneio>(&format!(
        r#"UPDATE torneios
              SET nome           = COALESCE($2, nome),
                  descricao      = COALESCE($3, descricao),
                  jogo           = COALESCE($4, jogo),
                  data_inicio    = COALESCE($5, data_inicio),
                  vagas          = COALESCE($6, vagas),
                  taxa_inscricao = COALESCE($7, taxa_inscricao)
            WHERE id = $1
        RETURNING {TORNEIO_COLUMNS}"#
    ))
    .bind(id)
    .bind(changes.nome)
    .bind(changes.descricao)
    .bind(changes.jogo)
    .bind(changes.data_inicio)
    .bind(changes.vagas)
    .bind(changes.taxa_inscricao)
    .fetch_one(&mut *tx)
    .await
    .context("updating torneio")?;

    tx.commit().await?;
    Ok(Update::Updated(torneio))
}

pub async fn set_status(db: &PgPool, id: i32, status: StatusTorneio) -> Result<Option<Torneio>> {
    sqlx::query_as::<_, Torneio>(&format!(
        "UPDATE torneios SET status = $2 WHERE id = $1 RETURNING {TORNEIO_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(db)
    .await
    .context("updating torneio status")
}

pub async fn delete(db: &PgPool, id: i32) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM torneios WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting torneio")?
        .rows_affected();
    Ok(rows > 0)
}

/// Enrolls a player. The tournament row is locked so capacity checks and the
/// insert are not raced by concurrent enrollments.
pub async fn enroll(db: &PgPool, torneio_id: i32, jogador_id: i32) -> Result<Enrollment> {
    let mut tx = db.begin().await?;

    let torneio = sqlx::query_as::<_, (StatusTorneio, Option<i32>)>(
        "SELECT status, vagas FROM torneios WHERE id = $1 FOR UPDATE",
    )
    .bind(torneio_id)
    .fetch_optional(&mut *tx)
    .await
    .context("locking torneio")?;

    let Some((status, vagas)) = torneio else {
        return Ok(Enrollment::NotFound);
    };
    if status != StatusTorneio::Aberto {
        return Ok(Enrollment::Closed);
    }

    let (inscritos, ja_inscrito) = sqlx::query_as::<_, (i64, bool)>(
        r#"SELECT COUNT(*), COALESCE(BOOL_OR(jogador_id = $2), FALSE)
             FROM torneio_jogadores
            WHERE torneio_id = $1"#,
    )
    .bind(torneio_id)
    .bind(jogador_id)
    .fetch_one(&mut *tx)
    .await
    .context("counting inscricoes")?;

    if ja_inscrito {
        return Ok(Enrollment::AlreadyEnrolled);
    }
    if vagas.is_some_and(|v| inscritos >= i64::from(v)) {
        return Ok(Enrollment::Full);
    }

    sqlx::query("INSERT INTO torneio_jogadores (torneio_id, jogador_id) VALUES ($1, $2)")
        .bind(torneio_id)
        .bind(jogador_id)
        .execute(&mut *tx)
        .await
        .context("inserting inscricao")?;

    tx.commit().await?;
    Ok(Enrollment::Enrolled)
}

pub async fn participants(db: &PgPool, torneio_id: i32) -> Result<Vec<Inscricao>> {
    sqlx::query_as::<_, Inscricao>(
        r#"SELECT tj.torneio_id, tj.jogador_id, j.nome AS jogador_nome,
                  tj.pontuacao, tj.data_inscricao
             FROM torneio_jogadores tj
             JOIN jogadores j ON j.id = tj.jogador_id
            WHERE tj.torneio_id = $1
            ORDER BY tj.pontuacao DESC, tj.data_inscricao"#,
    )
    .bind(torneio_id)
    .fetch_all(db)
    .await
    .context("listing inscricoes")
}

/// Returns false if the player is not enrolled in the tournament.
pub async fn set_score(db: &PgPool, torneio_id: i32, jogador_id: i32, pontuacao: i32) -> Result<bool> {
    let rows = sqlx::query(
        "UPDATE torneio_jogadores SET pontuacao = $3 WHERE torneio_id = $1 AND jogador_id = $2",
    )
    .bind(torneio_id)
    .bind(jogador_id)
    .bind(pontuacao)
    .execute(db)
    .await
    .context("updating pontuacao")?
    .rows_affected();
    Ok(rows > 0)
}

/// Total points over finished tournaments, optionally of one store.
pub async fn ranking(db: &PgPool, loja_id: Option<i32>, limit: i64) -> Result<Vec<RankingEntry>> {
    sqlx::query_as::<_, RankingEntry>(
        r#"SELECT j.id AS jogador_id, j.nome,
                  SUM(tj.pontuacao)::BIGINT AS pontuacao,
                  COUNT(*)                  AS torneios
             FROM torneio_jogadores tj
             JOIN torneios  t ON t.id = tj.torneio_id
             JOIN jogadores j ON j.id = tj.jogador_id
            WHERE t.status = 'FINALIZADO'
              AND ($1::INTEGER IS NULL OR t.loja_id = $1)
            GROUP BY j.id, j.nome
            ORDER BY pontuacao DESC, torneios DESC, j.id
            LIMIT $2"#,
    )
    .bind(loja_id)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("computing ranking")
}
