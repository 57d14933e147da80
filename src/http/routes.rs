use crate::http;
use actix_web::web;

/// Mount every HTTP sub-module under `prefix` (e.g. `/api`).
///
/// Item and stock routes are registered before the store routes so that
/// `/lojas/itens` and `/lojas/estoque` are not captured by `/lojas/{loja_id}`.
pub fn init_routes(cfg: &mut web::ServiceConfig, prefix: &str) {
    cfg.service(
        web::scope(prefix)
            .configure(http::auth::init_routes)
            .configure(http::items::init_routes)
            .configure(http::estoque::init_routes)
            .configure(http::lojas::init_routes)
            .configure(http::jogadores::init_routes)
            .configure(http::creditos::init_routes)
            .configure(http::torneios::init_routes)
            .configure(http::ranking::init_routes)
            .configure(http::tipo_jogador::init_routes)
            .configure(http::health::init_routes),
    );
}
