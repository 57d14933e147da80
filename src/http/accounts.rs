//! Account plumbing shared by store and player registration / profile updates.

use actix_web::HttpRequest;
use anyhow::anyhow;
use sqlx::PgConnection;

use crate::config::Settings;
use crate::db::models::TipoUsuario;
use crate::db::usuario_repo;
use crate::error::{ApiError, ApiResult};
use crate::mail;
use crate::security::{password, TokenKeys};

fn hash_password(senha: &str) -> ApiResult<String> {
    if senha.is_empty() {
        return Err(ApiError::bad_request("Senha não pode ser vazia"));
    }
    password::hash(senha).map_err(|e| ApiError::Internal(anyhow!("hashing password: {e}")))
}

fn normalize_email(email: &str) -> ApiResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ApiError::bad_request("Email inválido")),
    }
}

/// Creates an inactive account inside `tx`; 400 if the email is taken.
/// Returns the new user id and the normalized email.
pub async fn register_usuario(
    tx: &mut PgConnection,
    email: &str,
    senha: &str,
    tipo: TipoUsuario,
) -> ApiResult<(i32, String)> {
    let email = normalize_email(email)?;
    if usuario_repo::email_exists(&mut *tx, &email).await? {
        return Err(ApiError::bad_request("Email já cadastrado"));
    }
    let senha_hash = hash_password(senha)?;
    let id = usuario_repo::insert(&mut *tx, &email, &senha_hash, tipo).await?;
    Ok((id, email))
}

/// Applies optional email / password changes to an existing account.
pub async fn update_account(
    tx: &mut PgConnection,
    usuario_id: i32,
    current_email: &str,
    email: Option<&str>,
    senha: Option<&str>,
) -> ApiResult<()> {
    if let Some(email) = email {
        let email = normalize_email(email)?;
        if email != current_email {
            if usuario_repo::email_exists(&mut *tx, &email).await? {
                return Err(ApiError::bad_request("Email já cadastrado"));
            }
            usuario_repo::update_email(&mut *tx, usuario_id, &email).await?;
        }
    }
    if let Some(senha) = senha {
        let senha_hash = hash_password(senha)?;
        usuario_repo::update_password(&mut *tx, usuario_id, &senha_hash).await?;
    }
    Ok(())
}

/// Builds the confirmation message for `email`. Call it before committing the
/// new account so that a failure here rolls the registration back.
pub fn confirmation_for(
    req: &HttpRequest,
    settings: &Settings,
    keys: &TokenKeys,
    email: &str,
) -> ApiResult<mail::Message> {
    let token = mail::create_confirmation_token(keys, email)?;
    let base_url = {
        let info = req.connection_info();
        format!("{}://{}/", info.scheme(), info.host())
    };
    let link = mail::confirmation_link(&base_url, &settings.api_prefix, &token).map_err(|e| {
        ApiError::bad_request(format!("Link de confirmação inválido: {e:#}"))
    })?;
    Ok(mail::confirmation_message(email, &link))
}

/// Delivers a confirmation message for an already committed account.
/// Delivery failures are logged; the registration stands.
pub async fn dispatch_confirmation(settings: &Settings, msg: &mail::Message) {
    if let Err(e) = mail::send(&settings.mail, msg).await {
        log::warn!("confirmation mail to {} failed: {e:#}", msg.to);
    }
}
