use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::db::models::Item;

pub struct NovoItem<'a> {
    pub nome: &'a str,
    pub descricao: Option<&'a str>,
    pub colecao: Option<&'a str>,
    pub imagem: Option<&'a str>,
}

#[derive(Default)]
pub struct ItemChanges<'a> {
    pub nome: Option<&'a str>,
    pub descricao: Option<&'a str>,
    pub colecao: Option<&'a str>,
    pub imagem: Option<&'a str>,
}

pub async fn insert(db: &PgPool, item: &NovoItem<'_>) -> Result<Item> {
    sqlx::query_as::<_, Item>(
        r#"INSERT INTO itens (nome, descricao, colecao, imagem)
           VALUES ($1, $2, $3, $4)
           RETURNING id, nome, descricao, colecao, imagem"#,
    )
    .bind(item.nome)
    .bind(item.descricao)
    .bind(item.colecao)
    .bind(item.imagem)
    .fetch_one(db)
    .await
    .context("inserting item")
}

pub async fn list(db: &PgPool, skip: i64, limit: i64) -> Result<Vec<Item>> {
    sqlx::query_as::<_, Item>(
        "SELECT id, nome, descricao, colecao, imagem FROM itens ORDER BY id OFFSET $1 LIMIT $2",
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("listing itens")
}

pub async fn get(db: &PgPool, id: i32) -> Result<Option<Item>> {
    sqlx::query_as::<_, Item>("SELECT id, nome, descricao, colecao, imagem FROM itens WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching item")
}

pub async fn update(db: &PgPool, id: i32, changes: &ItemChanges<'_>) -> Result<Option<Item>> {
    sqlx::query_as::<_, Item>(
        r#"UPDATE itens
              SET nome      = COALESCE($2, nome),
                  descricao = COALESCE($3, descricao),
                  colecao   = COALESCE($4, colecao),
                  imagem    = COALESCE($5, imagem)
            WHERE id = $1
        RETURNING id, nome, descricao, colecao, imagem"#,
    )
    .bind(id)
    .bind(changes.nome)
    .bind(changes.descricao)
    .bind(changes.colecao)
    .bind(changes.imagem)
    .fetch_optional(db)
    .await
    .context("updating item")
}

pub async fn delete(db: &PgPool, id: i32) -> Result<Option<Item>> {
    sqlx::query_as::<_, Item>(
        "DELETE FROM itens WHERE id = $1 RETURNING id, nome, descricao, colecao, imagem",
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("deleting item")
}
