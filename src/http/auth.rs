//! Login (JWT), token profile and email confirmation.

use actix_web::{get, http::header, post, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::config::Settings;
use crate::db::models::{TipoUsuario, Usuario};
use crate::db::{jogador_repo, loja_repo, usuario_repo};
use crate::error::{ApiError, ApiResult};
use crate::mail;
use crate::security::{password, TokenData, TokenKeys};

//////////////////////////////////////////////////
// Data structs
//////////////////////////////////////////////////

/// OAuth2 password-grant form.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ConfirmQuery {
    pub token: String,
}

//////////////////////////////////////////////////
// ─────────────  Identity extractors  ─────────────
//////////////////////////////////////////////////

pub mod extractor {
    use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
    use anyhow::anyhow;
    use futures_util::future::{ready, Ready};

    use crate::db::models::TipoUsuario;
    use crate::error::ApiError;
    use crate::security::{TokenData, TokenKeys};

    /// Any authenticated account.
    #[derive(Debug, Clone)]
    pub struct Authenticated(pub TokenData);

    /// Authenticated store; other roles get 403.
    #[derive(Debug, Clone)]
    pub struct LojaAtual(pub TokenData);

    /// Authenticated player; other roles get 403.
    #[derive(Debug, Clone)]
    pub struct JogadorAtual(pub TokenData);

    impl LojaAtual {
        /// `lojas.id` of the caller.
        pub fn id(&self) -> i32 {
            self.0.id
        }
    }

    impl JogadorAtual {
        /// `jogadores.id` of the caller.
        pub fn id(&self) -> i32 {
            self.0.id
        }
    }

    fn resolve(req: &HttpRequest) -> Result<TokenData, ApiError> {
        let keys = req
            .app_data::<web::Data<TokenKeys>>()
            .ok_or_else(|| ApiError::Internal(anyhow!("TokenKeys missing from app data")))?;

        // Expect:  Authorization: Bearer <JWT>
        let hdr = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Token de acesso ausente"))?;

        let token = hdr
            .strip_prefix("Bearer ")
            .or_else(|| hdr.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::unauthorized("Cabeçalho Authorization malformado"))?;

        keys.decode_access_token(token.trim())
            .map_err(|_| ApiError::unauthorized("Token inválido ou expirado"))
    }

    fn with_role(req: &HttpRequest, tipo: TipoUsuario) -> Result<TokenData, ApiError> {
        let data = resolve(req)?;
        if data.tipo != tipo {
            return Err(ApiError::Forbidden);
        }
        Ok(data)
    }

    impl FromRequest for Authenticated {
        type Error = ApiError;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            ready(resolve(req).map(Authenticated))
        }
    }

    impl FromRequest for LojaAtual {
        type Error = ApiError;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            ready(with_role(req, TipoUsuario::Loja).map(LojaAtual))
        }
    }

    impl FromRequest for JogadorAtual {
        type Error = ApiError;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            ready(with_role(req, TipoUsuario::Jogador).map(JogadorAtual))
        }
    }
}
pub use extractor::{Authenticated, JogadorAtual, LojaAtual};

/// Resolves the store / player profile owned by an account.
async fn token_data_for(db: &PgPool, usuario: &Usuario) -> ApiResult<TokenData> {
    let id = match usuario.tipo {
        TipoUsuario::Loja => loja_repo::get_by_usuario(db, usuario.id).await?.map(|l| l.id),
        TipoUsuario::Jogador => jogador_repo::get_by_usuario(db, usuario.id).await?.map(|j| j.id),
    }
    .ok_or_else(|| ApiError::unauthorized("Perfil do usuário não encontrado"))?;

    Ok(TokenData {
        id,
        usuario_id: usuario.id,
        email: usuario.email.clone(),
        tipo: usuario.tipo,
    })
}

//////////////////////////////////////////////////
// POST /api/login/token
//////////////////////////////////////////////////
#[post("/login/token")]
pub async fn login(
    form: web::Form<LoginForm>,
    db: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
) -> ApiResult<HttpResponse> {
    let email = form.username.trim().to_lowercase();
    let usuario = usuario_repo::find_by_email(&db, &email)
        .await?
        .filter(|u| password::verify(&form.password, &u.senha_hash))
        .ok_or_else(|| ApiError::unauthorized("Email ou senha incorretos"))?;

    if !usuario.is_active {
        return Err(ApiError::unauthorized("Email ainda não confirmado"));
    }

    let data = token_data_for(&db, &usuario).await?;
    let token = keys.issue_access_token(&data)?;
    log::info!("login {} ({:?} {})", data.email, data.tipo, data.id);
    Ok(HttpResponse::Ok().json(token))
}

//////////////////////////////////////////////////
// GET /api/login/profile
//////////////////////////////////////////////////
#[get("/login/profile")]
pub async fn profile(auth: Authenticated) -> HttpResponse {
    HttpResponse::Ok().json(auth.0)
}

//////////////////////////////////////////////////
// GET /api/login/confirmar-email
//////////////////////////////////////////////////
#[get("/login/confirmar-email")]
pub async fn confirm_email(
    query: web::Query<ConfirmQuery>,
    db: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    settings: web::Data<Settings>,
) -> ApiResult<HttpResponse> {
    let email = mail::decode_confirmation_token(&keys, &query.token)
        .map_err(|_| ApiError::bad_request("Token inválido ou expirado"))?;

    if !usuario_repo::activate(&db, &email).await? {
        return Err(ApiError::not_found("Usuário não encontrado"));
    }
    log::info!("email confirmed for {email}");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, settings.frontend_location()))
        .finish())
}

//////////////////////////////////////////////////
// Mount
//////////////////////////////////////////////////
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login).service(profile).service(confirm_email);
}
