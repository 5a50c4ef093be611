//! Mail transport capability and its implementations.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{SmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::Message;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::bases::{MailTransportKind, NotificationSettings};

/// A single outbound email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// What a connection did with an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to a mail server or relay.
    Sent,
    /// Written to a local spool; something else still has to deliver it.
    Spooled(PathBuf),
}

/// Opens connections; each connection is used for one dispatch and closed.
pub trait MailTransport: Send + Sync {
    fn connect(&self) -> Result<Box<dyn MailConnection + '_>>;
}

pub trait MailConnection {
    fn send(&mut self, mail: &OutgoingMail) -> Result<Delivery>;
    fn close(&mut self) -> Result<()>;
}

/// Closes the wrapped connection when dropped unless already closed.
pub struct ScopedConnection<'a> {
    inner: Box<dyn MailConnection + 'a>,
    closed: bool,
}

impl<'a> ScopedConnection<'a> {
    pub fn open(transport: &'a dyn MailTransport) -> Result<Self> {
        Ok(Self {
            inner: transport.connect()?,
            closed: false,
        })
    }

    pub fn send(&mut self, mail: &OutgoingMail) -> Result<Delivery> {
        self.inner.send(mail)
    }

    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.inner.close()
    }
}

impl Drop for ScopedConnection<'_> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.inner.close() {
                debug!(error = %e, "Mail connection close failed during drop");
            }
        }
    }
}

/// Spools messages as `.eml` files for an external relay to deliver.
#[derive(Debug, Clone)]
pub struct OutboxTransport {
    dir: PathBuf,
}

impl OutboxTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

struct OutboxConnection<'a> {
    dir: &'a PathBuf,
}

impl MailTransport for OutboxTransport {
    fn connect(&self) -> Result<Box<dyn MailConnection + '_>> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create outbox {}", self.dir.display()))?;
        Ok(Box::new(OutboxConnection { dir: &self.dir }))
    }
}

impl MailConnection for OutboxConnection<'_> {
    fn send(&mut self, mail: &OutgoingMail) -> Result<Delivery> {
        let now = Utc::now();
        let path = self.dir.join(format!(
            "{}_{}.eml",
            now.format("%Y%m%d%H%M%S%6f"),
            Uuid::new_v4()
        ));
        let message = format!(
            "Date: {}\r\nFrom: {}\r\nTo: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
            now.to_rfc2822(),
            mail.from,
            mail.to,
            mail.subject,
            mail.body
        );
        fs::write(&path, message)
            .with_context(|| format!("Failed to spool mail {}", path.display()))?;
        debug!(path = %path.display(), "Mail spooled");
        Ok(Delivery::Spooled(path))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Delivers through an HTTP mail relay authenticated with a bearer token.
pub struct HttpRelayTransport {
    url: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl HttpRelayTransport {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            bail!("mail relay token is empty");
        }
        Ok(Self {
            url: url.into(),
            token,
            client: reqwest::blocking::Client::new(),
        })
    }
}

struct RelayConnection<'a> {
    transport: &'a HttpRelayTransport,
    open: bool,
}

impl MailTransport for HttpRelayTransport {
    fn connect(&self) -> Result<Box<dyn MailConnection + '_>> {
        Ok(Box::new(RelayConnection {
            transport: self,
            open: true,
        }))
    }
}

impl MailConnection for RelayConnection<'_> {
    fn send(&mut self, mail: &OutgoingMail) -> Result<Delivery> {
        if !self.open {
            bail!("mail relay connection already closed");
        }
        let response = self
            .transport
            .client
            .post(&self.transport.url)
            .bearer_auth(&self.transport.token)
            .json(mail)
            .send()
            .context("Mail relay request failed")?;
        let status = response.status();
        if !status.is_success() {
            bail!("Mail relay rejected message with status {status}");
        }
        Ok(Delivery::Sent)
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }
}

const SMTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Authenticated SMTP submission: STARTTLS, then AUTH PLAIN/LOGIN.
///
/// Each connection is one SMTP session; closing it sends QUIT.
pub struct SmtpRelayTransport {
    host: String,
    port: u16,
    hello_name: String,
    credentials: Credentials,
}

impl SmtpRelayTransport {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let host = host.into();
        let password = password.into();
        if host.trim().is_empty() {
            bail!("SMTP host is empty");
        }
        if password.trim().is_empty() {
            bail!("SMTP password is empty");
        }
        Ok(Self {
            host,
            port,
            hello_name: "localhost".to_string(),
            credentials: Credentials::new(username.into(), password),
        })
    }
}

struct SmtpSession {
    conn: SmtpConnection,
    open: bool,
}

impl MailTransport for SmtpRelayTransport {
    fn connect(&self) -> Result<Box<dyn MailConnection + '_>> {
        let hello = ClientId::Domain(self.hello_name.clone());
        let tls = TlsParameters::new(self.host.clone())
            .with_context(|| format!("Invalid TLS parameters for {}", self.host))?;
        let mut conn = SmtpConnection::connect(
            (self.host.as_str(), self.port),
            Some(SMTP_TIMEOUT),
            &hello,
            None,
            None,
        )
        .with_context(|| format!("Failed to connect to SMTP server {}:{}", self.host, self.port))?;
        if !conn.can_starttls() {
            let _ = conn.quit();
            bail!("SMTP server {} does not offer STARTTLS", self.host);
        }
        conn.starttls(&tls, &hello)
            .context("STARTTLS negotiation failed")?;
        conn.auth(&[Mechanism::Plain, Mechanism::Login], &self.credentials)
            .context("SMTP authentication failed")?;
        debug!(host = %self.host, port = self.port, "SMTP session opened");
        Ok(Box::new(SmtpSession { conn, open: true }))
    }
}

impl MailConnection for SmtpSession {
    fn send(&mut self, mail: &OutgoingMail) -> Result<Delivery> {
        if !self.open {
            bail!("SMTP session already closed");
        }
        let message = build_message(mail)?;
        self.conn
            .send(message.envelope(), &message.formatted())
            .context("SMTP server rejected message")?;
        Ok(Delivery::Sent)
    }

    fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.conn.quit().context("SMTP QUIT failed")?;
        }
        Ok(())
    }
}

fn build_message(mail: &OutgoingMail) -> Result<Message> {
    let from: Mailbox = mail
        .from
        .parse()
        .with_context(|| format!("Invalid sender address {:?}", mail.from))?;
    let to: Mailbox = mail
        .to
        .parse()
        .with_context(|| format!("Invalid recipient address {:?}", mail.to))?;
    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())
        .context("Failed to build email message")
}

/// Builds the transport selected in config. Secrets (relay token, SMTP
/// password) are read from the environment variables named in settings.
pub fn transport_from_settings(
    settings: &NotificationSettings,
    outbox_dir: PathBuf,
) -> Result<Box<dyn MailTransport>> {
    match settings.transport {
        MailTransportKind::Outbox => Ok(Box::new(OutboxTransport::new(outbox_dir))),
        MailTransportKind::HttpRelay => {
            let url = settings
                .relay_url
                .as_deref()
                .context("notifications.relay_url is required for the http_relay transport")?;
            let token = std::env::var(&settings.token_env)
                .with_context(|| format!("{} is not set", settings.token_env))?;
            Ok(Box::new(HttpRelayTransport::new(url, token)?))
        }
        MailTransportKind::Smtp => {
            let host = settings
                .smtp_host
                .as_deref()
                .context("notifications.smtp_host is required for the smtp transport")?;
            let password = std::env::var(&settings.smtp_password_env)
                .with_context(|| format!("{} is not set", settings.smtp_password_env))?;
            let username = settings
                .smtp_username
                .clone()
                .unwrap_or_else(|| settings.sender.clone());
            Ok(Box::new(SmtpRelayTransport::new(
                host,
                settings.smtp_port,
                username,
                password,
            )?))
        }
    }
}
