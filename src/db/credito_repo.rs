//! Per-(player, store) credit ledger.
//!
//! One row per `(jogador_id, loja_id)`, enforced by the primary key. Balances
//! are plain floats and may go negative; increments happen in a single
//! upsert statement so concurrent grants for the same pair add up.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::db::models::{Credito, CreditoComLoja};

/// Inserts a new balance row. Fails with a unique violation if the pair exists.
pub async fn create(db: &PgPool, jogador_id: i32, loja_id: i32, quantidade: f64) -> Result<Credito> {
    sqlx::query_as::<_, Credito>(
        r#"INSERT INTO creditos (jogador_id, loja_id, quantidade)
           VALUES ($1, $2, $3)
           RETURNING jogador_id, loja_id, quantidade"#,
    )
    .bind(jogador_id)
    .bind(loja_id)
    .bind(quantidade)
    .fetch_one(db)
    .await
    .context("inserting credito")
}

pub async fn get(db: &PgPool, jogador_id: i32, loja_id: i32) -> Result<Option<Credito>> {
    sqlx::query_as::<_, Credito>(
        "SELECT jogador_id, loja_id, quantidade FROM creditos WHERE jogador_id = $1 AND loja_id = $2",
    )
    .bind(jogador_id)
    .bind(loja_id)
    .fetch_optional(db)
    .await
    .context("fetching credito")
}

pub async fn list_by_loja(db: &PgPool, loja_id: i32) -> Result<Vec<Credito>> {
    sqlx::query_as::<_, Credito>(
        r#"SELECT jogador_id, loja_id, quantidade
             FROM creditos
            WHERE loja_id = $1
            ORDER BY jogador_id"#,
    )
    .bind(loja_id)
    .fetch_all(db)
    .await
    .context("listing creditos by loja")
}

/// A player's balances across stores, with each store's name and address.
pub async fn list_by_jogador(db: &PgPool, jogador_id: i32) -> Result<Vec<CreditoComLoja>> {
    sqlx::query_as::<_, CreditoComLoja>(
        r#"SELECT c.jogador_id, c.loja_id, c.quantidade,
                  l.nome     AS loja_nome,
                  l.endereco AS loja_endereco
             FROM creditos c
             JOIN lojas l ON l.id = c.loja_id
            WHERE c.jogador_id = $1
            ORDER BY l.nome"#,
    )
    .bind(jogador_id)
    .fetch_all(db)
    .await
    .context("listing creditos by jogador")
}

/// Adds `delta` to the balance, starting from zero if the pair has no row yet.
pub async fn increment(db: &PgPool, jogador_id: i32, loja_id: i32, delta: f64) -> Result<Credito> {
    sqlx::query_as::<_, Credito>(
        r#"INSERT INTO creditos (jogador_id, loja_id, quantidade)
           VALUES ($1, $2, $3)
           ON CONFLICT (jogador_id, loja_id)
           DO UPDATE SET quantidade = creditos.quantidade + EXCLUDED.quantidade
           RETURNING jogador_id, loja_id, quantidade"#,
    )
    .bind(jogador_id)
    .bind(loja_id)
    .bind(delta)
    .fetch_one(db)
    .await
    .context("incrementing credito")
}

/// Overwrites an existing balance. `None` if the pair has no row.
pub async fn set(db: &PgPool, jogador_id: i32, loja_id: i32, quantidade: f64) -> Result<Option<Credito>> {
    sqlx::query_as::<_, Credito>(
        r#"UPDATE creditos
              SET quantidade = $3
            WHERE jogador_id = $1 AND loja_id = $2
        RETURNING jogador_id, loja_id, quantidade"#,
    )
    .bind(jogador_id)
    .bind(loja_id)
    .bind(quantidade)
    .fetch_optional(db)
    .await
    .context("setting credito")
}

/// Returns false if the pair had no row.
pub async fn delete(db: &PgPool, jogador_id: i32, loja_id: i32) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM creditos WHERE jogador_id = $1 AND loja_id = $2")
        .bind(jogador_id)
        .bind(loja_id)
        .execute(db)
        .await
        .context("deleting credito")?
        .rows_affected();
    Ok(rows > 0)
}
