use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use topdecked_server::{config::Settings, http, metrics, security::TokenKeys, MIGRATOR};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Configuration
    let settings = Settings::from_env()?;
    let keys = TokenKeys::from_settings(&settings.security)?;
    let prometheus = metrics::middleware(&settings.api_prefix)?;

    // Postgres pool
    let db_pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect(&settings.database_url)
        .await
        .context("failed to create Postgres pool")?;

    MIGRATOR.run(&db_pool).await.context("running migrations")?;

    std::fs::create_dir_all(&settings.upload_dir)
        .with_context(|| format!("creating upload dir {}", settings.upload_dir))?;

    log::info!(
        "listening on {} (api prefix {:?}, {} CORS origins)",
        settings.server_addr,
        settings.api_prefix,
        settings.allowed_origins.len()
    );

    let server_addr = settings.server_addr.clone();
    let settings = web::Data::new(settings);
    let keys = web::Data::new(keys);
    let db_pool = web::Data::new(db_pool);

    HttpServer::new(move || {
        let cors = settings
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();
        let prefix = settings.api_prefix.clone();

        App::new()
            .wrap(middleware::NormalizePath::trim())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(prometheus.clone())
            .app_data(db_pool.clone())
            .app_data(keys.clone())
            .app_data(settings.clone())
            .service(Files::new("/uploads", &settings.upload_dir))
            .configure(move |cfg| http::routes::init_routes(cfg, &prefix))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
