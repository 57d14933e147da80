use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account kind; also the role carried in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tipo_usuario", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TipoUsuario {
    Loja,
    Jogador,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "status_torneio", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusTorneio {
    Aberto,
    EmAndamento,
    Finalizado,
}

#[derive(Debug, Clone, FromRow)]
pub struct Usuario {
    pub id: i32,
    pub email: String,
    pub senha_hash: String,
    pub tipo: TipoUsuario,
    pub is_active: bool,
    pub foto: Option<String>,
    pub data_cadastro: DateTime<Utc>,
}

/// Store joined with the public fields of its owning account.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LojaPublico {
    pub id: i32,
    pub nome: String,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub site: Option<String>,
    pub banner: Option<String>,
    pub usuario_id: i32,
    pub email: String,
    pub foto: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LojaPublicoTorneios {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub loja: LojaPublico,
    /// Finished tournaments hosted by the store.
    pub n_torneios: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JogadorPublico {
    pub id: i32,
    pub nome: String,
    pub telefone: Option<String>,
    pub tipo_jogador_id: Option<i32>,
    pub usuario_id: i32,
    pub email: String,
    pub foto: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TipoJogador {
    pub id: i32,
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Credito {
    pub jogador_id: i32,
    pub loja_id: i32,
    pub quantidade: f64,
}

/// A player's balance at one store, as seen by the player.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CreditoComLoja {
    pub jogador_id: i32,
    pub loja_id: i32,
    pub quantidade: f64,
    pub loja_nome: String,
    pub loja_endereco: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Item {
    pub id: i32,
    pub nome: String,
    pub descricao: Option<String>,
    pub colecao: Option<String>,
    pub imagem: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Estoque {
    pub item_id: i32,
    pub loja_id: i32,
    pub quantidade: i32,
    pub preco: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Torneio {
    pub id: i32,
    pub loja_id: i32,
    pub nome: String,
    pub descricao: Option<String>,
    pub jogo: Option<String>,
    pub data_inicio: DateTime<Utc>,
    pub vagas: Option<i32>,
    pub taxa_inscricao: f64,
    pub status: StatusTorneio,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Inscricao {
    pub torneio_id: i32,
    pub jogador_id: i32,
    pub jogador_nome: String,
    pub pontuacao: i32,
    pub data_inscricao: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RankingEntry {
    pub jogador_id: i32,
    pub nome: String,
    pub pontuacao: i64,
    pub torneios: i64,
}
