//! HTTP-facing error type shared by every handler.

use actix_web::{http::header, http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Autenticação negada")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if is_unique_violation(&err) {
            return ApiError::bad_request("Registro já existe");
        }
        ApiError::Internal(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::from(anyhow::Error::new(err))
    }
}

/// True when any cause in the chain is a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<sqlx::Error>(),
            Some(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
        )
    })
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut resp = HttpResponse::build(self.status_code());
        let detail = match self {
            ApiError::Internal(err) => {
                log::error!("request failed: {err:#}");
                "Erro interno do servidor".to_string()
            }
            ApiError::Unauthorized(_) | ApiError::Forbidden => {
                resp.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
                self.to_string()
            }
            _ => self.to_string(),
        };
        resp.json(json!({ "detail": detail }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn status_codes_follow_variant() {
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_failures_carry_bearer_challenge() {
        let resp = ApiError::unauthorized("token inválido").error_response();
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        let resp = ApiError::Forbidden.error_response();
        assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[actix_rt::test]
    async fn body_is_detail_json_and_hides_internal_errors() {
        let resp = ApiError::not_found("Crédito não encontrado").error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["detail"], "Crédito não encontrado");

        let resp = ApiError::from(anyhow::anyhow!("password=hunter2")).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("hunter2"));
    }

    #[test]
    fn plain_errors_are_not_unique_violations() {
        let err = anyhow::Error::new(sqlx::Error::RowNotFound).context("fetching row");
        assert!(!is_unique_violation(&err));
    }
}
