use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

pub mod authtoken;

use crate::{
    conf::settings,
    prelude::{Error, Result},
};

pub trait SendEmail {
    fn send(&self, email: &str) -> Result<()>;
}

/// Fire-and-forget delivery: addresses are validated up front, then the
/// request that triggered the email never waits on SMTP, failures are logged.
pub fn send_email(email: &str, subject: &str, body: &str, is_html: bool) -> Result<()> {
    let (name, _) = email.split_once('@').unwrap_or(("unknown", ""));
    let from: Mailbox = format!("{} <{}>", &settings.service_name, &settings.from_email)
        .parse()
        .map_err(|e| Error::Email(format!("bad from address: {e}")))?;
    let to: Mailbox = format!("{} <{}>", name, email)
        .parse()
        .map_err(|e| Error::Email(format!("bad to address: {e}")))?;
    let subject = subject.to_string();
    let body = body.to_string();
    tracing::debug!("sending email to {}", email);
    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || {
            let content_type = if is_html {
                ContentType::TEXT_HTML
            } else {
                ContentType::TEXT_PLAIN
            };

            let message = Message::builder()
                .from(from)
                .to(to)
                .subject(subject)
                .header(content_type)
                .body(body)
                .map_err(|e| format!("could not build message: {e}"))?;

            let creds = Credentials::new(settings.smtp_user.clone(), settings.smtp_pass.clone());
            let mailer = SmtpTransport::relay(&settings.smtp_server)
                .map_err(|e| format!("bad smtp relay: {e}"))?
                .credentials(creds)
                .build();

            mailer.send(&message).map_err(|e| format!("send failed: {e}"))
        })
        .await;

        match result {
            Ok(Ok(_)) => tracing::info!("email sent successfully"),
            Ok(Err(e)) => tracing::error!("could not send email: {e}"),
            Err(e) => tracing::error!("email task failed to execute: {e:?}"),
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_an_unparseable_recipient_address() {
        let err = send_email("not an address", "hello", "body", false).unwrap_err();
        assert!(matches!(err, Error::Email(_)));
    }
}
