//! Email confirmation: signed 24 h tokens and message dispatch.

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::MailSettings;
use crate::security::TokenKeys;

const CONFIRMATION_SCOPE: &str = "email-confirmation";
const CONFIRMATION_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct ConfirmationClaims {
    sub: String,
    exp: i64,
    scope: String,
}

pub fn create_confirmation_token(keys: &TokenKeys, email: &str) -> Result<String> {
    keys.sign(&ConfirmationClaims {
        sub: email.to_owned(),
        exp: (Utc::now() + Duration::hours(CONFIRMATION_TTL_HOURS)).timestamp(),
        scope: CONFIRMATION_SCOPE.into(),
    })
}

/// Returns the email embedded in a valid, unexpired confirmation token.
/// Access tokens are refused because they lack the confirmation scope.
pub fn decode_confirmation_token(keys: &TokenKeys, token: &str) -> Result<String> {
    let claims: ConfirmationClaims = keys.verify(token)?;
    if claims.scope != CONFIRMATION_SCOPE {
        return Err(anyhow!("token scope is not {CONFIRMATION_SCOPE}"));
    }
    Ok(claims.sub)
}

/// `{base}{api_prefix}/login/confirmar-email?token=…`
pub fn confirmation_link(base_url: &str, api_prefix: &str, token: &str) -> Result<Url> {
    let base = Url::parse(base_url).with_context(|| format!("bad base url {base_url}"))?;
    let mut link = base
        .join(&format!("{api_prefix}/login/confirmar-email"))
        .context("building confirmation link")?;
    link.query_pairs_mut().append_pair("token", token);
    Ok(link)
}

pub struct Message {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub fn confirmation_message(to: &str, link: &Url) -> Message {
    Message {
        to: to.to_owned(),
        subject: "Confirme seu email".into(),
        body: format!(
            "Olá!\n\n\
             Obrigado por se cadastrar na TopDecked.\n\
             Para ativar sua conta, confirme seu e-mail clicando no link abaixo:\n\n\
             {link}\n\n\
             Se você não criou uma conta, ignore esta mensagem.\n\n\
             Atenciosamente,\n\
             Equipe TopDecked"
        ),
    }
}

fn build_email(settings: &MailSettings, msg: &Message) -> Result<lettre::Message> {
    let from: Mailbox = settings
        .from
        .parse()
        .with_context(|| format!("bad MAIL_FROM {}", settings.from))?;
    let to: Mailbox = msg
        .to
        .parse()
        .with_context(|| format!("bad recipient {}", msg.to))?;
    lettre::Message::builder()
        .from(from)
        .to(to)
        .subject(msg.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(msg.body.clone())
        .context("building email")
}

/// Sends `msg` over SMTP (STARTTLS) with the configured credentials.
/// Without credentials the message goes to the application log instead.
pub async fn send(settings: &MailSettings, msg: &Message) -> Result<()> {
    if !settings.smtp_enabled() {
        log::info!(
            "mail from={} to={} subject={:?}\n{}",
            settings.from,
            msg.to,
            msg.subject,
            msg.body
        );
        return Ok(());
    }

    let email = build_email(settings, msg)?;
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
        .with_context(|| format!("smtp relay {}", settings.server))?
        .port(settings.port)
        .credentials(Credentials::new(
            settings.username.clone(),
            settings.password.clone(),
        ))
        .build();
    mailer
        .send(email)
        .await
        .with_context(|| format!("sending mail to {}", msg.to))?;
    log::info!("mail sent to {} via {}", msg.to, settings.server);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecuritySettings;
    use crate::db::models::TipoUsuario;
    use crate::security::TokenData;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::from_settings(&SecuritySettings {
            secret_key: secret.into(),
            algorithm: "HS256".into(),
            token_expiration: 30,
        })
        .unwrap()
    }

    #[test]
    fn valid_token_yields_embedded_email() {
        let k = keys("secret");
        let token = create_confirmation_token(&k, "ana@example.com").unwrap();
        assert_eq!(decode_confirmation_token(&k, &token).unwrap(), "ana@example.com");
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let k = keys("secret");
        let token = create_confirmation_token(&k, "ana@example.com").unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(decode_confirmation_token(&k, &tampered).is_err());
        assert!(decode_confirmation_token(&keys("other"), &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let k = keys("secret");
        let token = k
            .sign(&ConfirmationClaims {
                sub: "ana@example.com".into(),
                exp: (Utc::now() - Duration::hours(1)).timestamp(),
                scope: CONFIRMATION_SCOPE.into(),
            })
            .unwrap();
        assert!(decode_confirmation_token(&k, &token).is_err());
    }

    #[test]
    fn access_token_is_not_a_confirmation_token() {
        let k = keys("secret");
        let access = k
            .issue_access_token(&TokenData {
                id: 1,
                usuario_id: 1,
                email: "ana@example.com".into(),
                tipo: TipoUsuario::Jogador,
            })
            .unwrap();
        assert!(decode_confirmation_token(&k, &access.access_token).is_err());
    }

    #[test]
    fn link_carries_escaped_token() {
        let link = confirmation_link("http://localhost:8000/", "/api", "a.b+c").unwrap();
        assert_eq!(
            link.as_str(),
            "http://localhost:8000/api/login/confirmar-email?token=a.b%2Bc"
        );
        let msg = confirmation_message("ana@example.com", &link);
        assert!(msg.body.contains(link.as_str()));
    }

    fn smtp_settings() -> MailSettings {
        MailSettings {
            username: "topdecked".into(),
            password: "senha".into(),
            from: "TopDecked <no-reply@topdecked.com>".into(),
            server: "smtp.example.com".into(),
            port: 587,
        }
    }

    #[test]
    fn email_carries_sender_recipient_and_body() {
        let link = confirmation_link("http://localhost:8000/", "/api", "tok").unwrap();
        let msg = confirmation_message("ana@example.com", &link);
        let email = build_email(&smtp_settings(), &msg).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("To: ana@example.com"));
        assert!(raw.contains("no-reply@topdecked.com"));
        assert!(raw.contains("Subject: Confirme seu email"));
    }

    #[test]
    fn bad_recipient_is_an_error() {
        let link = confirmation_link("http://localhost:8000/", "/api", "tok").unwrap();
        let msg = confirmation_message("not an address", &link);
        assert!(build_email(&smtp_settings(), &msg).is_err());
    }

    #[tokio::test]
    async fn without_credentials_mail_goes_to_the_log() {
        let link = confirmation_link("http://localhost:8000/", "/api", "tok").unwrap();
        let msg = confirmation_message("ana@example.com", &link);
        let settings = MailSettings::default();
        assert!(!settings.smtp_enabled());
        send(&settings, &msg).await.unwrap();
    }
}
