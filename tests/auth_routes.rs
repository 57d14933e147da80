//! Route-level auth behaviour. None of these requests reach Postgres: the
//! pool is lazy and every request is rejected before a query is issued.

use actix_web::{http::header, http::StatusCode, test, web, App};
use sqlx::postgres::PgPoolOptions;
use topdecked_server::config::{MailSettings, SecuritySettings, Settings};
use topdecked_server::db::models::TipoUsuario;
use topdecked_server::http;
use topdecked_server::security::{TokenData, TokenKeys};

fn settings() -> Settings {
    Settings {
        database_url: "postgres://localhost/topdecked_unused".into(),
        db_max_connections: 1,
        server_addr: "127.0.0.1:0".into(),
        api_prefix: "/api".into(),
        allowed_origins: vec![],
        security: SecuritySettings {
            secret_key: "test-secret".into(),
            algorithm: "HS256".into(),
            token_expiration: 30,
        },
        mail: MailSettings::default(),
        frontend_url: "localhost".into(),
        frontend_port: Some("5173".into()),
        upload_dir: std::env::temp_dir().to_string_lossy().into_owned(),
    }
}

fn bearer(keys: &TokenKeys, tipo: TipoUsuario) -> String {
    let token = keys
        .issue_access_token(&TokenData {
            id: 11,
            usuario_id: 5,
            email: "conta@example.com".into(),
            tipo,
        })
        .unwrap();
    format!("Bearer {}", token.access_token)
}

macro_rules! app {
    ($settings:expr, $keys:expr) => {{
        let pool = PgPoolOptions::new()
            .connect_lazy(&$settings.database_url)
            .unwrap();
        let prefix = $settings.api_prefix.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new($keys.clone()))
                .app_data(web::Data::new($settings.clone()))
                .configure(move |cfg| http::routes::init_routes(cfg, &prefix)),
        )
        .await
    }};
}

#[actix_web::test]
async fn missing_token_is_unauthorized_with_challenge() {
    let s = settings();
    let keys = TokenKeys::from_settings(&s.security).unwrap();
    let app = app!(s, keys);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/login/profile").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[actix_web::test]
async fn profile_echoes_token_identity() {
    let s = settings();
    let keys = TokenKeys::from_settings(&s.security).unwrap();
    let app = app!(s, keys);

    let req = test::TestRequest::get()
        .uri("/api/login/profile")
        .insert_header((header::AUTHORIZATION, bearer(&keys, TipoUsuario::Loja)))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], 11);
    assert_eq!(body["usuario_id"], 5);
    assert_eq!(body["tipo"], "loja");
    assert_eq!(body["email"], "conta@example.com");
}

#[actix_web::test]
async fn tampered_or_foreign_tokens_are_unauthorized() {
    let s = settings();
    let keys = TokenKeys::from_settings(&s.security).unwrap();
    let app = app!(s, keys);

    let other = TokenKeys::from_settings(&SecuritySettings {
        secret_key: "someone-else".into(),
        algorithm: "HS256".into(),
        token_expiration: 30,
    })
    .unwrap();

    for auth in [
        bearer(&other, TipoUsuario::Loja),
        format!("{}x", bearer(&keys, TipoUsuario::Loja)),
        "Token abc".to_string(),
    ] {
        let req = test::TestRequest::get()
            .uri("/api/login/profile")
            .insert_header((header::AUTHORIZATION, auth.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{auth}");
    }
}

#[actix_web::test]
async fn player_token_is_forbidden_on_store_routes() {
    let s = settings();
    let keys = TokenKeys::from_settings(&s.security).unwrap();
    let app = app!(s, keys);
    let jogador = bearer(&keys, TipoUsuario::Jogador);

    let req = test::TestRequest::get()
        .uri("/api/creditos")
        .insert_header((header::AUTHORIZATION, jogador.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri("/api/creditos/3")
        .insert_header((header::AUTHORIZATION, jogador))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn store_token_is_forbidden_on_player_routes() {
    let s = settings();
    let keys = TokenKeys::from_settings(&s.security).unwrap();
    let app = app!(s, keys);

    let req = test::TestRequest::get()
        .uri("/api/creditos/jogador")
        .insert_header((header::AUTHORIZATION, bearer(&keys, TipoUsuario::Loja)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn stock_routes_are_not_shadowed_by_store_lookup() {
    let s = settings();
    let keys = TokenKeys::from_settings(&s.security).unwrap();
    let app = app!(s, keys);

    // `/lojas/{loja_id}` would answer 404 for a non-numeric id; the stock
    // route demands a token instead.
    let req = test::TestRequest::get().uri("/api/lojas/estoque").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn invalid_confirmation_token_is_bad_request() {
    let s = settings();
    let keys = TokenKeys::from_settings(&s.security).unwrap();
    let app = app!(s, keys);

    let req = test::TestRequest::get()
        .uri("/api/login/confirmar-email?token=not-a-jwt")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // An access token is signed with the same key but is not a confirmation token.
    let access = bearer(&keys, TipoUsuario::Jogador);
    let token = access.trim_start_matches("Bearer ");
    let req = test::TestRequest::get()
        .uri(&format!("/api/login/confirmar-email?token={token}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
