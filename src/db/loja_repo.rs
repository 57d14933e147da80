use anyhow::{Context, Result};
use sqlx::{PgExecutor, PgPool};

use crate::db::models::{LojaPublico, LojaPublicoTorneios};

const LOJA_PUBLICO: &str = r#"
    SELECT l.id, l.nome, l.endereco, l.telefone, l.site, l.banner,
           l.usuario_id, u.email, u.foto
      FROM lojas l
      JOIN usuarios u ON u.id = l.usuario_id
"#;

pub struct NovaLoja<'a> {
    pub nome: &'a str,
    pub endereco: Option<&'a str>,
    pub telefone: Option<&'a str>,
    pub site: Option<&'a str>,
}

/// Only the `Some` fields are written.
#[derive(Default)]
pub struct LojaChanges<'a> {
    pub nome: Option<&'a str>,
    pub endereco: Option<&'a str>,
    pub telefone: Option<&'a str>,
    pub site: Option<&'a str>,
}

pub async fn insert<'e>(db: impl PgExecutor<'e>, usuario_id: i32, loja: &NovaLoja<'_>) -> Result<i32> {
    sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO lojas (nome, endereco, telefone, site, usuario_id)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id"#,
    )
    .bind(loja.nome)
    .bind(loja.endereco)
    .bind(loja.telefone)
    .bind(loja.site)
    .bind(usuario_id)
    .fetch_one(db)
    .await
    .context("inserting loja")
}

pub async fn get<'e>(db: impl PgExecutor<'e>, id: i32) -> Result<Option<LojaPublico>> {
    sqlx::query_as::<_, LojaPublico>(&format!("{LOJA_PUBLICO} WHERE l.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching loja")
}

pub async fn get_by_usuario(db: &PgPool, usuario_id: i32) -> Result<Option<LojaPublico>> {
    sqlx::query_as::<_, LojaPublico>(&format!("{LOJA_PUBLICO} WHERE l.usuario_id = $1"))
        .bind(usuario_id)
        .fetch_optional(db)
        .await
        .context("fetching loja by usuario")
}

/// Every store with the number of tournaments it has finished.
pub async fn list_with_torneios(db: &PgPool) -> Result<Vec<LojaPublicoTorneios>> {
    sqlx::query_as::<_, LojaPublicoTorneios>(
        r#"
        SELECT l.id, l.nome, l.endereco, l.telefone, l.site, l.banner,
               l.usuario_id, u.email, u.foto,
               COUNT(t.id) FILTER (WHERE t.status = 'FINALIZADO') AS n_torneios
          FROM lojas l
          JOIN usuarios u ON u.id = l.usuario_id
          LEFT JOIN torneios t ON t.loja_id = l.id
         GROUP BY l.id, u.id
         ORDER BY l.id
        "#,
    )
    .fetch_all(db)
    .await
    .context("listing lojas")
}

pub async fn update<'e>(db: impl PgExecutor<'e>, id: i32, changes: &LojaChanges<'_>) -> Result<()> {
    sqlx::query(
        r#"UPDATE lojas
              SET nome     = COALESCE($2, nome),
                  endereco = COALESCE($3, endereco),
                  telefone = COALESCE($4, telefone),
                  site     = COALESCE($5, site)
            WHERE id = $1"#,
    )
    .bind(id)
    .bind(changes.nome)
    .bind(changes.endereco)
    .bind(changes.telefone)
    .bind(changes.site)
    .execute(db)
    .await
    .context("updating loja")?;
    Ok(())
}

pub async fn set_banner(db: &PgPool, id: i32, banner: &str) -> Result<()> {
    sqlx::query("UPDATE lojas SET banner = $2 WHERE id = $1")
        .bind(id)
        .bind(banner)
        .execute(db)
        .await
        .context("updating loja banner")?;
    Ok(())
}
