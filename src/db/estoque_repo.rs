//! Per-store stock rows, keyed by `(item_id, loja_id)`.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::db::models::Estoque;

/// Inserts a stock row; a duplicate `(item, loja)` pair is a unique violation.
pub async fn insert(db: &PgPool, item_id: i32, loja_id: i32, quantidade: i32, preco: f64) -> Result<Estoque> {
    sqlx::query_as::<_, Estoque>(
        r#"INSERT INTO estoques (item_id, loja_id, quantidade, preco)
           VALUES ($1, $2, $3, $4)
           RETURNING item_id, loja_id, quantidade, preco"#,
    )
    .bind(item_id)
    .bind(loja_id)
    .bind(quantidade)
    .bind(preco)
    .fetch_one(db)
    .await
    .context("inserting estoque")
}

pub async fn list(db: &PgPool, loja_id: i32, skip: i64, limit: i64) -> Result<Vec<Estoque>> {
    sqlx::query_as::<_, Estoque>(
        r#"SELECT item_id, loja_id, quantidade, preco
             FROM estoques
            WHERE loja_id = $1
            ORDER BY item_id
           OFFSET $2 LIMIT $3"#,
    )
    .bind(loja_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("listing estoque")
}

pub async fn get(db: &PgPool, item_id: i32, loja_id: i32) -> Result<Option<Estoque>> {
    sqlx::query_as::<_, Estoque>(
        "SELECT item_id, loja_id, quantidade, preco FROM estoques WHERE item_id = $1 AND loja_id = $2",
    )
    .bind(item_id)
    .bind(loja_id)
    .fetch_optional(db)
    .await
    .context("fetching estoque")
}

pub async fn update(
    db: &PgPool,
    item_id: i32,
    loja_id: i32,
    quantidade: Option<i32>,
    preco: Option<f64>,
) -> Result<Option<Estoque>> {
    sqlx::query_as::<_, Estoque>(
        r#"UPDATE estoques
              SET quantidade = COALESCE($3, quantidade),
                  preco      = COALESCE($4, preco)
            WHERE item_id = $1 AND loja_id = $2
        RETURNING item_id, loja_id, quantidade, preco"#,
    )
    .bind(item_id)
    .bind(loja_id)
    .bind(quantidade)
    .bind(preco)
    .fetch_optional(db)
    .await
    .context("updating estoque")
}

pub async fn delete(db: &PgPool, item_id: i32, loja_id: i32) -> Result<Option<Estoque>> {
    sqlx::query_as::<_, Estoque>(
        r#"DELETE FROM estoques
            WHERE item_id = $1 AND loja_id = $2
        RETURNING item_id, loja_id, quantidade, preco"#,
    )
    .bind(item_id)
    .bind(loja_id)
    .fetch_optional(db)
    .await
    .context("deleting estoque")
}
