// tests/account_routes.rs
//
// Registration, login and credit endpoints end to end against the Postgres in
// DATABASE_URL (loaded from .env); skipped when no database is configured.

use actix_web::{http::header, http::StatusCode, test, web, App};
use dotenvy::dotenv;
use serde_json::{json, Value};
use sqlx::PgPool;
use topdecked_server::config::{MailSettings, SecuritySettings, Settings};
use topdecked_server::db::usuario_repo;
use topdecked_server::mail;
use topdecked_server::security::TokenKeys;
use topdecked_server::{http, MIGRATOR};

async fn setup() -> Option<(PgPool, Settings, TokenKeys)> {
    dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping");
        return None;
    };
    let pool = PgPool::connect(&database_url).await.expect("DB connection failed");
    MIGRATOR.run(&pool).await.expect("migrations");

    let settings = Settings {
        database_url,
        db_max_connections: 2,
        server_addr: "127.0.0.1:0".into(),
        api_prefix: "/api".into(),
        allowed_origins: vec![],
        security: SecuritySettings {
            secret_key: "account-routes-secret".into(),
            algorithm: "HS256".into(),
            token_expiration: 30,
        },
        mail: MailSettings::default(),
        frontend_url: "localhost".into(),
        frontend_port: Some("5173".into()),
        upload_dir: std::env::temp_dir().to_string_lossy().into_owned(),
    };
    let keys = TokenKeys::from_settings(&settings.security).unwrap();
    Some((pool, settings, keys))
}

macro_rules! app {
    ($pool:expr, $settings:expr, $keys:expr) => {{
        let prefix = $settings.api_prefix.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new($keys.clone()))
                .app_data(web::Data::new($settings.clone()))
                .configure(move |cfg| http::routes::init_routes(cfg, &prefix)),
        )
        .await
    }};
}

fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@routes.test", rand::random::<u64>())
}

fn login_req(email: &str, senha: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/login/token")
        .set_form([("username", email), ("password", senha)])
}

fn confirm_req(keys: &TokenKeys, email: &str) -> test::TestRequest {
    let token = mail::create_confirmation_token(keys, email).unwrap();
    test::TestRequest::get().uri(&format!("/api/login/confirmar-email?token={token}"))
}

#[actix_web::test]
async fn login_requires_confirmed_account_and_correct_password() {
    let Some((db, s, keys)) = setup().await else { return };
    let app = app!(db, s, keys);
    let email = unique_email("loja");

    let req = test::TestRequest::post()
        .uri("/api/lojas")
        .set_json(json!({"email": email, "senha": "s3nh4", "nome": "Covil do Dragão"}))
        .to_request();
    let loja: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(loja["email"], email.as_str());
    let usuario_id = loja["usuario_id"].as_i64().unwrap() as i32;

    // Not confirmed yet.
    let resp = test::call_service(&app, login_req(&email, "s3nh4").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, confirm_req(&keys, &email).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "http://localhost:5173"
    );

    let resp = test::call_service(&app, login_req(&email, "errada").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

    let token: Value =
        test::call_and_read_body_json(&app, login_req(&email, "s3nh4").to_request()).await;
    assert_eq!(token["token_type"], "bearer");
    let bearer = format!("Bearer {}", token["access_token"].as_str().unwrap());

    let req = test::TestRequest::get()
        .uri("/api/login/profile")
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["id"], loja["id"]);
    assert_eq!(profile["tipo"], "loja");

    usuario_repo::delete(&db, usuario_id).await.unwrap();
}

#[actix_web::test]
async fn duplicate_email_registration_is_bad_request() {
    let Some((db, s, keys)) = setup().await else { return };
    let app = app!(db, s, keys);
    let email = unique_email("jogador");
    let body = json!({"email": email, "senha": "s3nh4", "nome": "Ana"});

    let req = test::TestRequest::post().uri("/api/jogadores").set_json(&body).to_request();
    let jogador: Value = test::call_and_read_body_json(&app, req).await;

    // Same email for the other role is taken too, case-insensitively.
    let req = test::TestRequest::post()
        .uri("/api/lojas")
        .set_json(json!({"email": email.to_uppercase(), "senha": "x", "nome": "Outra"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post().uri("/api/jogadores").set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = test::read_body_json(resp).await;
    assert_eq!(err["detail"], "Email já cadastrado");

    let usuario_id = jogador["usuario_id"].as_i64().unwrap() as i32;
    usuario_repo::delete(&db, usuario_id).await.unwrap();
}

#[actix_web::test]
async fn unusable_confirmation_link_rolls_registration_back() {
    let Some((db, s, keys)) = setup().await else { return };
    let app = app!(db, s, keys);
    let email = unique_email("loja");
    let body = json!({"email": email, "senha": "s3nh4", "nome": "Loja Host"});

    let req = test::TestRequest::post()
        .uri("/api/lojas")
        .insert_header((header::HOST, "bad_host:99999"))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(usuario_repo::find_by_email(&db, &email).await.unwrap().is_none());

    // The email is still free for a well-formed retry.
    let req = test::TestRequest::post().uri("/api/lojas").set_json(&body).to_request();
    let loja: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(loja["email"], email.as_str());

    usuario_repo::delete(&db, loja["usuario_id"].as_i64().unwrap() as i32)
        .await
        .unwrap();
}

#[actix_web::test]
async fn credit_endpoints_map_ledger_outcomes_to_statuses() {
    let Some((db, s, keys)) = setup().await else { return };
    let app = app!(db, s, keys);

    let loja_email = unique_email("loja");
    let req = test::TestRequest::post()
        .uri("/api/lojas")
        .set_json(json!({"email": loja_email, "senha": "s3nh4", "nome": "Arena"}))
        .to_request();
    let loja: Value = test::call_and_read_body_json(&app, req).await;
    test::call_service(&app, confirm_req(&keys, &loja_email).to_request()).await;
    let token: Value =
        test::call_and_read_body_json(&app, login_req(&loja_email, "s3nh4").to_request()).await;
    let bearer = format!("Bearer {}", token["access_token"].as_str().unwrap());

    let req = test::TestRequest::post()
        .uri("/api/jogadores")
        .set_json(json!({"email": unique_email("jogador"), "senha": "s3nh4", "nome": "Bruno"}))
        .to_request();
    let jogador: Value = test::call_and_read_body_json(&app, req).await;
    let jogador_id = jogador["id"].as_i64().unwrap();

    let create = || {
        test::TestRequest::post()
            .uri("/api/creditos")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({"jogador_id": jogador_id, "quantidade": 15.0}))
            .to_request()
    };
    let credito: Value = test::call_and_read_body_json(&app, create()).await;
    assert_eq!(credito["quantidade"], 15.0);
    assert_eq!(credito["loja_id"], loja["id"]);

    let resp = test::call_service(&app, create()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = test::read_body_json(resp).await;
    assert_eq!(err["detail"], "Crédito já existe para este jogador");

    let req = test::TestRequest::get()
        .uri(&format!("/api/creditos/{jogador_id}"))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let credito: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(credito["quantidade"], 15.0);

    let req = test::TestRequest::put()
        .uri("/api/creditos/-1")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({"quantidade": 3.0}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    for expected in [StatusCode::NO_CONTENT, StatusCode::NOT_FOUND] {
        let req = test::TestRequest::delete()
            .uri(&format!("/api/creditos/{jogador_id}"))
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), expected);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/creditos/{jogador_id}"))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    for usuario_id in [&loja["usuario_id"], &jogador["usuario_id"]] {
        usuario_repo::delete(&db, usuario_id.as_i64().unwrap() as i32)
            .await
            .unwrap();
    }
}
