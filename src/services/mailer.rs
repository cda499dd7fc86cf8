use serde::Serialize;

use crate::config;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Mailer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Mailer service error: {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

/// Email-sending collaborator, reached over HTTP. When no endpoint is
/// configured (local development) sends are skipped and the verification
/// link is logged instead.
pub struct Mailer {
    client: reqwest::Client,
    endpoint: Option<String>,
    from: String,
    frontend_url: String,
}

impl Mailer {
    pub fn new() -> Self {
        let upstream = &config::config().upstream;
        Self {
            client: reqwest::Client::new(),
            endpoint: upstream.mailer_url.clone(),
            from: upstream.mail_from.clone(),
            frontend_url: config::config().platform.frontend_url.clone(),
        }
    }

    pub async fn send_verification_email(
        &self,
        email: &str,
        token: &str,
        name: Option<&str>,
    ) -> Result<(), MailerError> {
        let verification_url = format!("{}/verify-email/{}", self.frontend_url, token);

        let endpoint = match &self.endpoint {
            Some(endpoint) => endpoint,
            None => {
                tracing::info!(
                    "Mailer disabled; verification link for {}: {}",
                    email,
                    verification_url
                );
                return Ok(());
            }
        };

        let response = self
            .client
            .post(endpoint)
            .json(&SendMailRequest {
                from: &self.from,
                to: [email],
                subject: "Verifica tu email - Clonchat",
                html: verification_body(name, &verification_url),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailerError::Status(response.status()));
        }

        tracing::info!("Verification email sent to {}", email);
        Ok(())
    }
}

fn verification_body(name: Option<&str>, verification_url: &str) -> String {
    let greeting = match name {
        Some(name) => format!("¡Bienvenido, {}!", name),
        None => "¡Bienvenido!".to_string(),
    };
    format!(
        "<html><body>\
         <h1>{}</h1>\
         <p>Gracias por registrarte en Clonchat. Para completar tu registro, \
         verifica tu dirección de email:</p>\
         <p><a href=\"{}\">Verificar mi email</a></p>\
         <p>Este enlace expirará en 24 horas.</p>\
         <p>Si no creaste una cuenta en Clonchat, puedes ignorar este email.</p>\
         </body></html>",
        greeting, verification_url
    )
}

/// Fire-and-forget send used during registration: account creation must not
/// depend on email deliverability, so failures are logged and swallowed.
pub fn spawn_verification_email(email: String, token: String, name: Option<String>) {
    tokio::spawn(async move {
        let mailer = Mailer::new();
        if let Err(e) = mailer
            .send_verification_email(&email, &token, name.as_deref())
            .await
        {
            tracing::warn!("Failed to send verification email to {}: {}", email, e);
        }
    });
}
