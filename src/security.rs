//! Password hashing (argon2) and access-token issuance / validation (JWT).

use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecuritySettings;
use crate::db::models::TipoUsuario;

pub mod password {
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
    use rand::Rng;

    fn salt() -> SaltString {
        let mut bytes = [0u8; 16];
        rand::rng().fill(&mut bytes);
        SaltString::encode_b64(&bytes).expect("16 bytes is a valid salt length")
    }

    pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
        Argon2::default()
            .hash_password(password.as_bytes(), &salt())
            .map(|h| h.to_string())
    }

    /// Constant-time check of `password` against a stored PHC string.
    /// Malformed hashes never verify.
    pub fn verify(password: &str, hashword: &str) -> bool {
        PasswordHash::new(hashword)
            .map(|hash| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &hash)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

/// Payload of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account email.
    pub sub: String,
    /// `usuarios.id`
    pub uid: i32,
    /// Profile id: `lojas.id` or `jogadores.id` depending on `tipo`.
    pub id: i32,
    pub tipo: TipoUsuario,
    pub exp: i64,
}

/// Caller identity exposed to handlers and by `GET /login/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenData {
    pub id: i32,
    pub usuario_id: i32,
    pub email: String,
    pub tipo: TipoUsuario,
}

impl From<Claims> for TokenData {
    fn from(c: Claims) -> Self {
        TokenData {
            id: c.id,
            usuario_id: c.uid,
            email: c.sub,
            tipo: c.tipo,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// Signing material shared by access and confirmation tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenKeys {
    pub fn from_settings(s: &SecuritySettings) -> Result<Self> {
        let algorithm = Algorithm::from_str(&s.algorithm)
            .with_context(|| format!("unsupported SECURITY_ALGORITHM {}", s.algorithm))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(anyhow!("SECURITY_ALGORITHM must be an HMAC algorithm"));
        }
        Ok(TokenKeys {
            encoding: EncodingKey::from_secret(s.secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(s.secret_key.as_bytes()),
            algorithm,
            ttl: Duration::minutes(s.token_expiration),
        })
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding).context("encoding JWT")
    }

    /// Verifies signature and `exp` (no leeway).
    pub fn verify<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        let data = decode::<T>(token, &self.decoding, &validation).context("decoding JWT")?;
        Ok(data.claims)
    }

    pub fn issue_access_token(&self, identity: &TokenData) -> Result<Token> {
        let claims = Claims {
            sub: identity.email.clone(),
            uid: identity.usuario_id,
            id: identity.id,
            tipo: identity.tipo,
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        Ok(Token {
            access_token: self.sign(&claims)?,
            token_type: "bearer".into(),
        })
    }

    pub fn decode_access_token(&self, token: &str) -> Result<TokenData> {
        self.verify::<Claims>(token).map(TokenData::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &str, minutes: i64) -> TokenKeys {
        TokenKeys::from_settings(&SecuritySettings {
            secret_key: secret.into(),
            algorithm: "HS256".into(),
            token_expiration: minutes,
        })
        .unwrap()
    }

    fn loja() -> TokenData {
        TokenData {
            id: 7,
            usuario_id: 3,
            email: "loja@example.com".into(),
            tipo: TipoUsuario::Loja,
        }
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let h = password::hash("s3nh4-forte").unwrap();
        assert!(h.starts_with("$argon2"));
        assert!(password::verify("s3nh4-forte", &h));
        assert!(!password::verify("outra", &h));
        assert!(!password::verify("s3nh4-forte", "not-a-phc-string"));
    }

    #[test]
    fn access_token_round_trips_identity() {
        let k = keys("secret", 30);
        let token = k.issue_access_token(&loja()).unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(k.decode_access_token(&token.access_token).unwrap(), loja());
    }

    #[test]
    fn expired_token_is_rejected() {
        let k = keys("secret", -5);
        let token = k.issue_access_token(&loja()).unwrap();
        assert!(k.decode_access_token(&token.access_token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = keys("other", 30).issue_access_token(&loja()).unwrap();
        assert!(keys("secret", 30)
            .decode_access_token(&token.access_token)
            .is_err());
    }

    #[test]
    fn non_hmac_algorithm_is_refused() {
        let res = TokenKeys::from_settings(&SecuritySettings {
            secret_key: "secret".into(),
            algorithm: "RS256".into(),
            token_expiration: 30,
        });
        assert!(res.is_err());
    }
}
