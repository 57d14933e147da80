use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::db::models::TipoJogador;

pub async fn list(db: &PgPool) -> Result<Vec<TipoJogador>> {
    sqlx::query_as::<_, TipoJogador>("SELECT id, nome FROM tipos_jogador ORDER BY id")
        .fetch_all(db)
        .await
        .context("listing tipos de jogador")
}

pub async fn get(db: &PgPool, id: i32) -> Result<Option<TipoJogador>> {
    sqlx::query_as::<_, TipoJogador>("SELECT id, nome FROM tipos_jogador WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching tipo de jogador")
}

pub async fn insert(db: &PgPool, nome: &str) -> Result<TipoJogador> {
    sqlx::query_as::<_, TipoJogador>("INSERT INTO tipos_jogador (nome) VALUES ($1) RETURNING id, nome")
        .bind(nome)
        .fetch_one(db)
        .await
        .context("inserting tipo de jogador")
}

pub async fn delete(db: &PgPool, id: i32) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM tipos_jogador WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting tipo de jogador")?
        .rows_affected();
    Ok(rows > 0)
}
