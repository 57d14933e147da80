//! Postgres access: row models and one repository module per table.

pub mod credito_repo;
pub mod estoque_repo;
pub mod item_repo;
pub mod jogador_repo;
pub mod loja_repo;
pub mod models;
pub mod tipo_jogador_repo;
pub mod torneio_repo;
pub mod usuario_repo;
