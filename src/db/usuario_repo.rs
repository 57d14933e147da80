use anyhow::{Context, Result};
use sqlx::{PgExecutor, PgPool};

use crate::db::models::{TipoUsuario, Usuario};

const USUARIO_COLUMNS: &str = "id, email, senha_hash, tipo, is_active, foto, data_cadastro";

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<Usuario>> {
    sqlx::query_as::<_, Usuario>(&format!(
        "SELECT {USUARIO_COLUMNS} FROM usuarios WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await
    .context("fetching usuario by email")
}

pub async fn email_exists<'e>(db: impl PgExecutor<'e>, email: &str) -> Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM usuarios WHERE email = $1)")
        .bind(email)
        .fetch_one(db)
        .await
        .context("checking email availability")
}

/// Inserts an inactive account and returns its id.
pub async fn insert<'e>(
    db: impl PgExecutor<'e>,
    email: &str,
    senha_hash: &str,
    tipo: TipoUsuario,
) -> Result<i32> {
    sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO usuarios (email, senha_hash, tipo)
           VALUES ($1, $2, $3)
           RETURNING id"#,
    )
    .bind(email)
    .bind(senha_hash)
    .bind(tipo)
    .fetch_one(db)
    .await
    .context("inserting usuario")
}

/// Marks the account with `email` as confirmed. Returns false if no such account.
pub async fn activate(db: &PgPool, email: &str) -> Result<bool> {
    let rows = sqlx::query("UPDATE usuarios SET is_active = TRUE WHERE email = $1")
        .bind(email)
        .execute(db)
        .await
        .context("activating usuario")?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn update_email<'e>(db: impl PgExecutor<'e>, id: i32, email: &str) -> Result<()> {
    sqlx::query("UPDATE usuarios SET email = $2 WHERE id = $1")
        .bind(id)
        .bind(email)
        .execute(db)
        .await
        .context("updating usuario email")?;
    Ok(())
}

pub async fn update_password<'e>(db: impl PgExecutor<'e>, id: i32, senha_hash: &str) -> Result<()> {
    sqlx::query("UPDATE usuarios SET senha_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(senha_hash)
        .execute(db)
        .await
        .context("updating usuario password")?;
    Ok(())
}

pub async fn set_foto(db: &PgPool, id: i32, foto: &str) -> Result<()> {
    sqlx::query("UPDATE usuarios SET foto = $2 WHERE id = $1")
        .bind(id)
        .bind(foto)
        .execute(db)
        .await
        .context("updating usuario foto")?;
    Ok(())
}

/// Deletes the account; its store or player profile cascades with it.
pub async fn delete(db: &PgPool, id: i32) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM usuarios WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting usuario")?
        .rows_affected();
    Ok(rows > 0)
}
