use async_trait::async_trait;
use compulsive_core::{config::SmtpServerConfig, NotificationRequest};
use lettre::{
    message::{header::ContentType, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tera::{Context, Tera};
use tracing::debug;

use crate::error::NotifyError;

/// Delivers change alerts. Failures are returned to the caller, never retried here.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message addressed to every recipient in `request`.
    async fn send(&self, request: &NotificationRequest) -> Result<(), NotifyError>;
}

/// [`Notifier`] that opens one SMTP session per alert.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    server: String,
}

impl SmtpNotifier {
    /// Build the transport from config. Nothing is connected until the first send.
    ///
    /// `tls = true` selects implicit TLS (SMTPS); otherwise the session is plaintext.
    pub fn new(config: &SmtpServerConfig) -> Result<Self, NotifyError> {
        let builder = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.hostname)
                .map_err(|e| NotifyError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.hostname)
        };

        let mut builder = builder.port(config.port);
        if let Some(ref auth) = config.auth {
            builder = builder.credentials(Credentials::new(
                auth.username.clone(),
                auth.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            server: format!("{}:{}", config.hostname, config.port),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, request: &NotificationRequest) -> Result<(), NotifyError> {
        let message = build_message(request)?;
        debug!(server = %self.server, recipients = request.recipients.len(), "sending email");

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(())
    }
}

const HTML_TEMPLATE: &str = r#"<html>
<head>
   <meta http-equiv="Content-Type" content="text/html; charset=utf-8" />
   <title>{{ subject }}</title>
</head>
<body>
   <p>{{ body }}</p>
</body>
</html>
"#;

/// Assemble the email for `request`: all recipients in a single message.
pub fn build_message(request: &NotificationRequest) -> Result<Message, NotifyError> {
    let from = request
        .sender
        .mailbox()
        .map_err(|e| NotifyError::Address(format!("sender `{}`: {e}", request.sender)))?;

    let mut builder = Message::builder()
        .from(from)
        .subject(request.subject.clone());

    for recipient in &request.recipients {
        let to = recipient
            .mailbox()
            .map_err(|e| NotifyError::Address(format!("recipient `{}`: {e}", recipient.address)))?;
        builder = builder.to(to);
    }

    let message = if request.html {
        builder.multipart(MultiPart::alternative_plain_html(
            request.body.clone(),
            render_html(&request.subject, &request.body)?,
        ))
    } else {
        builder
            .header(ContentType::TEXT_PLAIN)
            .body(request.body.clone())
    };

    message.map_err(|e| NotifyError::Build(e.to_string()))
}

/// Minimal HTML page: subject as the title, body as a single paragraph. Both are escaped.
fn render_html(subject: &str, body: &str) -> Result<String, NotifyError> {
    let mut ctx = Context::new();
    ctx.insert("subject", subject);
    ctx.insert("body", body);
    Tera::one_off(HTML_TEMPLATE, &ctx, true).map_err(|e| NotifyError::Build(e.to_string()))
}
