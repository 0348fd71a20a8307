//! Email delivery of the article table as an HTML report.
//!
//! The report goes out over an authenticated SMTP session upgraded with
//! STARTTLS. A failed send is logged and never retried.

use crate::config::SmtpSettings;
use crate::models::Article;
use crate::outputs::html::render_table;
use chrono::Local;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::error::Error;
use tracing::{error, info, instrument};

/// Addresses and login for one report delivery.
#[derive(Clone)]
pub struct MailSettings {
    pub smtp: SmtpSettings,
    pub from: String,
    pub to: String,
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("smtp", &self.smtp)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Wrap the rendered table in a minimal HTML document.
pub fn render_report(articles: &[Article]) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n{}\n</body>\n</html>\n",
        render_table(articles)
    )
}

/// Build the report message: subject with today's date, HTML body.
pub fn build_message(settings: &MailSettings, articles: &[Article]) -> Result<Message, Box<dyn Error>> {
    let subject = format!("{} ({})", settings.smtp.subject, Local::now().date_naive());
    let message = Message::builder()
        .from(settings.from.parse()?)
        .to(settings.to.parse()?)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(render_report(articles))?;
    Ok(message)
}

async fn deliver(settings: &MailSettings, message: Message) -> Result<(), Box<dyn Error>> {
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp.host)?
        .port(settings.smtp.port)
        .credentials(Credentials::new(settings.login.clone(), settings.password.clone()))
        .build();
    mailer.send(message).await?;
    Ok(())
}

/// Email `articles` as an HTML table.
///
/// Returns whether the message was accepted by the relay; every failure is
/// logged here and swallowed.
#[instrument(level = "info", skip_all, fields(host = %settings.smtp.host, port = settings.smtp.port, to = %settings.to))]
pub async fn send_report(settings: &MailSettings, articles: &[Article]) -> bool {
    let message = match build_message(settings, articles) {
        Ok(message) => message,
        Err(e) => {
            error!(error = %e, "Error building email");
            return false;
        }
    };

    match deliver(settings, message).await {
        Ok(()) => {
            info!(count = articles.len(), "Email sent successfully");
            true
        }
        Err(e) => {
            error!(error = %e, "Error sending email");
            false
        }
    }
}
