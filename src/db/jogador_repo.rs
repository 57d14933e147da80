use anyhow::{Context, Result};
use sqlx::{PgExecutor, PgPool};

use crate::db::models::JogadorPublico;

const JOGADOR_PUBLICO: &str = r#"
    SELECT j.id, j.nome, j.telefone, j.tipo_jogador_id,
           j.usuario_id, u.email, u.foto
      FROM jogadores j
      JOIN usuarios u ON u.id = j.usuario_id
"#;

pub struct NovoJogador<'a> {
    pub nome: &'a str,
    pub telefone: Option<&'a str>,
    pub tipo_jogador_id: Option<i32>,
}

/// Only the `Some` fields are written.
#[derive(Default)]
pub struct JogadorChanges<'a> {
    pub nome: Option<&'a str>,
    pub telefone: Option<&'a str>,
    pub tipo_jogador_id: Option<i32>,
}

pub async fn insert<'e>(
    db: impl PgExecutor<'e>,
    usuario_id: i32,
    jogador: &NovoJogador<'_>,
) -> Result<i32> {
    sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO jogadores (nome, telefone, tipo_jogador_id, usuario_id)
           VALUES ($1, $2, $3, $4)
           RETURNING id"#,
    )
    .bind(jogador.nome)
    .bind(jogador.telefone)
    .bind(jogador.tipo_jogador_id)
    .bind(usuario_id)
    .fetch_one(db)
    .await
    .context("inserting jogador")
}

pub async fn exists(db: &PgPool, id: i32) -> Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM jogadores WHERE id = $1)")
        .bind(id)
        .fetch_one(db)
        .await
        .context("checking jogador existence")
}

pub async fn get<'e>(db: impl PgExecutor<'e>, id: i32) -> Result<Option<JogadorPublico>> {
    sqlx::query_as::<_, JogadorPublico>(&format!("{JOGADOR_PUBLICO} WHERE j.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching jogador")
}

pub async fn get_by_usuario(db: &PgPool, usuario_id: i32) -> Result<Option<JogadorPublico>> {
    sqlx::query_as::<_, JogadorPublico>(&format!("{JOGADOR_PUBLICO} WHERE j.usuario_id = $1"))
        .bind(usuario_id)
        .fetch_optional(db)
        .await
        .context("fetching jogador by usuario")
}

pub async fn list(db: &PgPool, skip: i64, limit: i64) -> Result<Vec<JogadorPublico>> {
    sqlx::query_as::<_, JogadorPublico>(&format!(
        "{JOGADOR_PUBLICO} ORDER BY j.id OFFSET $1 LIMIT $2"
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("listing jogadores")
}

pub async fn update<'e>(
    db: impl PgExecutor<'e>,
    id: i32,
    changes: &JogadorChanges<'_>,
) -> Result<()> {
    sqlx::query(
        r#"UPDATE jogadores
              SET nome            = COALESCE($2, nome),
                  telefone        = COALESCE($3, telefone),
                  tipo_jogador_id = COALESCE($4, tipo_jogador_id)
            WHERE id = $1"#,
    )
    .bind(id)
    .bind(changes.nome)
    .bind(changes.telefone)
    .bind(changes.tipo_jogador_id)
    .execute(db)
    .await
    .context("updating jogador")?;
    Ok(())
}
