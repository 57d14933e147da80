//! REST surface: one module per resource, each exposing `init_routes`.

use serde::Deserialize;

pub mod accounts;
pub mod auth;
pub mod creditos;
pub mod estoque;
pub mod health;
pub mod items;
pub mod jogadores;
pub mod lojas;
pub mod ranking;
pub mod routes;
pub mod tipo_jogador;
pub mod torneios;

const MAX_PAGE: i64 = 1000;

/// `?skip=&limit=` pagination, defaulting to the first 100 rows.
#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Page {
    /// Clamped `(offset, limit)` safe to bind into a query.
    pub fn bounds(&self) -> (i64, i64) {
        (self.skip.max(0), self.limit.clamp(0, MAX_PAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        let p: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(p.bounds(), (0, 100));

        let p = Page { skip: -3, limit: 5_000 };
        assert_eq!(p.bounds(), (0, MAX_PAGE));
    }
}
