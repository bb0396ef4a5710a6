//! Email transport — IMAP fetch of unread alerts, SMTP delivery of the
//! composed digest via lettre.

use std::io::Write as IoWrite;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use mail_parser::MessageParser;
use tracing::{debug, info, warn};

use crate::channels::{AlertMessage, AlertSource};
use crate::error::ChannelError;

// ── Configuration ───────────────────────────────────────────────────

/// Mail endpoint configuration, built from environment variables.
///
/// Credentials stay out of the YAML config file on purpose.
#[derive(Debug, Clone)]
pub struct EmailChannelConfig {
    pub imap_host: String,
    pub imap_port: u16,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl EmailChannelConfig {
    /// Build config from environment variables.
    /// Returns `None` if `SCHOLAR_IMAP_HOST` is not set.
    pub fn from_env() -> Option<Self> {
        let imap_host = std::env::var("SCHOLAR_IMAP_HOST").ok()?;

        let imap_port: u16 = std::env::var("SCHOLAR_IMAP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(993);

        let smtp_host = std::env::var("SCHOLAR_SMTP_HOST")
            .unwrap_or_else(|_| imap_host.replace("imap", "smtp"));

        let smtp_port: u16 = std::env::var("SCHOLAR_SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("SCHOLAR_USERNAME").unwrap_or_default();
        let password = std::env::var("SCHOLAR_PASSWORD").unwrap_or_default();
        let from_address =
            std::env::var("SCHOLAR_FROM_ADDRESS").unwrap_or_else(|_| username.clone());

        Some(Self {
            imap_host,
            imap_port,
            smtp_host,
            smtp_port,
            username,
            password,
            from_address,
        })
    }
}

// ── IMAP source ─────────────────────────────────────────────────────

/// Fetches unread alert messages over IMAP, filtered to the configured
/// alert sender address.
pub struct ImapAlertSource {
    config: EmailChannelConfig,
    alert_sender: String,
}

impl ImapAlertSource {
    pub fn new(config: EmailChannelConfig, alert_sender: &str) -> Self {
        Self {
            config,
            alert_sender: alert_sender.to_string(),
        }
    }
}

#[async_trait]
impl AlertSource for ImapAlertSource {
    fn name(&self) -> &str {
        "imap"
    }

    async fn fetch_unread(&self) -> Result<Vec<AlertMessage>, ChannelError> {
        let config = self.config.clone();
        let sender = self.alert_sender.clone();
        tokio::task::spawn_blocking(move || fetch_unread_imap(&config, &sender))
            .await
            .map_err(|e| ChannelError::FetchFailed(format!("fetch task panicked: {e}")))?
    }

    async fn mark_read(&self, messages: &[AlertMessage]) -> Result<(), ChannelError> {
        if messages.is_empty() {
            return Ok(());
        }
        let config = self.config.clone();
        let ids: Vec<String> = messages.iter().map(|m| m.id.clone()).collect();
        tokio::task::spawn_blocking(move || mark_read_imap(&config, &ids))
            .await
            .map_err(|e| ChannelError::FlagUpdateFailed(format!("flag task panicked: {e}")))?
    }
}

// ── SMTP sender ─────────────────────────────────────────────────────

/// Sends the composed digest as one multipart/alternative message
/// (plain text + HTML) over SMTP.
pub struct SmtpDigestSender {
    config: EmailChannelConfig,
}

impl SmtpDigestSender {
    pub fn new(config: EmailChannelConfig) -> Self {
        Self { config }
    }

    pub fn send_digest(
        &self,
        to: &str,
        subject: &str,
        text: String,
        html: String,
    ) -> Result<(), ChannelError> {
        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let transport = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| ChannelError::SendFailed(format!("SMTP relay error: {e}")))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        let email = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| ChannelError::SendFailed(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| ChannelError::SendFailed(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| ChannelError::SendFailed(format!("Failed to build email: {e}")))?;

        transport
            .send(&email)
            .map_err(|e| ChannelError::SendFailed(format!("SMTP send failed: {e}")))?;

        info!("Digest sent to {to}");
        Ok(())
    }
}

// ── Blocking IMAP plumbing ──────────────────────────────────────────

type TlsStream = rustls::StreamOwned<rustls::ClientConnection, TcpStream>;

/// A logged-in IMAP session over TLS with INBOX selected.
///
/// Minimal tagged-command client, just enough for SEARCH/FETCH/STORE;
/// blocking on purpose — callers run it under `spawn_blocking`.
struct ImapSession {
    tls: TlsStream,
    tag_counter: u32,
}

impl ImapSession {
    fn connect(config: &EmailChannelConfig) -> Result<Self, ChannelError> {
        let tcp = TcpStream::connect((&*config.imap_host, config.imap_port)).map_err(|e| {
            ChannelError::ConnectFailed {
                host: config.imap_host.clone(),
                reason: e.to_string(),
            }
        })?;
        tcp.set_read_timeout(Some(Duration::from_secs(30)))
            .map_err(|e| ChannelError::ConnectFailed {
                host: config.imap_host.clone(),
                reason: e.to_string(),
            })?;

        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let tls_config = Arc::new(
            rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth(),
        );
        let server_name: rustls_pki_types::ServerName<'_> =
            rustls_pki_types::ServerName::try_from(config.imap_host.clone()).map_err(|e| {
                ChannelError::ConnectFailed {
                    host: config.imap_host.clone(),
                    reason: e.to_string(),
                }
            })?;
        let conn = rustls::ClientConnection::new(tls_config, server_name).map_err(|e| {
            ChannelError::ConnectFailed {
                host: config.imap_host.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut session = Self {
            tls: rustls::StreamOwned::new(conn, tcp),
            tag_counter: 0,
        };

        // Server greeting
        session
            .read_line()
            .map_err(|e| ChannelError::ConnectFailed {
                host: config.imap_host.clone(),
                reason: e,
            })?;

        let login = session
            .command(&format!(
                "LOGIN \"{}\" \"{}\"",
                config.username, config.password
            ))
            .map_err(|reason| ChannelError::ConnectFailed {
                host: config.imap_host.clone(),
                reason,
            })?;
        if !login.last().is_some_and(|l| l.contains("OK")) {
            return Err(ChannelError::AuthFailed {
                user: config.username.clone(),
            });
        }

        session
            .command("SELECT \"INBOX\"")
            .map_err(|reason| ChannelError::ConnectFailed {
                host: config.imap_host.clone(),
                reason,
            })?;
        Ok(session)
    }

    fn read_line(&mut self) -> Result<String, String> {
        let mut buf = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            match std::io::Read::read(&mut self.tls, &mut byte) {
                Ok(0) => return Err("IMAP connection closed".to_string()),
                Ok(_) => {
                    buf.push(byte[0]);
                    if buf.ends_with(b"\r\n") {
                        return Ok(String::from_utf8_lossy(&buf).to_string());
                    }
                }
                Err(e) => return Err(e.to_string()),
            }
        }
    }

    /// Send one tagged command and read lines until the tagged response.
    fn command(&mut self, cmd: &str) -> Result<Vec<String>, String> {
        self.tag_counter += 1;
        let tag = format!("A{}", self.tag_counter);
        let full = format!("{tag} {cmd}\r\n");
        IoWrite::write_all(&mut self.tls, full.as_bytes())
            .and_then(|()| IoWrite::flush(&mut self.tls))
            .map_err(|e| e.to_string())?;

        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line.starts_with(&tag);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    fn logout(mut self) {
        let _ = self.command("LOGOUT");
    }
}

/// Fetch every unseen message from the alert sender.
fn fetch_unread_imap(
    config: &EmailChannelConfig,
    alert_sender: &str,
) -> Result<Vec<AlertMessage>, ChannelError> {
    let mut session = ImapSession::connect(config)?;

    let search = session
        .command(&format!("SEARCH UNSEEN FROM \"{alert_sender}\""))
        .map_err(ChannelError::FetchFailed)?;
    let mut ids: Vec<String> = Vec::new();
    for line in &search {
        if line.starts_with("* SEARCH") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() > 2 {
                ids.extend(parts[2..].iter().map(|s| s.to_string()));
            }
        }
    }
    debug!(count = ids.len(), "Unseen alert messages");

    let mut messages = Vec::new();
    for id in &ids {
        let fetch = session
            .command(&format!("FETCH {id} RFC822"))
            .map_err(ChannelError::FetchFailed)?;

        // Drop the untagged FETCH prelude and the tagged completion line.
        let raw: String = fetch
            .iter()
            .skip(1)
            .take(fetch.len().saturating_sub(2))
            .cloned()
            .collect();

        let Some(parsed) = MessageParser::default().parse(raw.as_bytes()) else {
            warn!(id = %id, "Unparseable message, skipping");
            continue;
        };

        let Some(html) = parsed.body_html(0).map(|h| h.to_string()) else {
            warn!(id = %id, "Message has no HTML body, skipping");
            continue;
        };

        let subject = parsed.subject().map(|s| s.to_string());
        messages.push(AlertMessage {
            id: id.clone(),
            subject,
            html,
            received_at: message_timestamp(&parsed),
        });
    }

    session.logout();
    Ok(messages)
}

/// Set `\Seen` on the given message ids.
fn mark_read_imap(config: &EmailChannelConfig, ids: &[String]) -> Result<(), ChannelError> {
    let mut session = ImapSession::connect(config)?;
    for id in ids {
        session
            .command(&format!("STORE {id} +FLAGS (\\Seen)"))
            .map_err(ChannelError::FlagUpdateFailed)?;
    }
    session.logout();
    info!(count = ids.len(), "Marked alert messages read");
    Ok(())
}

/// Received time from the Date header, falling back to now.
fn message_timestamp(parsed: &mail_parser::Message) -> DateTime<Utc> {
    parsed
        .date()
        .and_then(|d| {
            chrono::NaiveDate::from_ymd_opt(i32::from(d.year), u32::from(d.month), u32::from(d.day))
                .and_then(|date| {
                    date.and_hms_opt(
                        u32::from(d.hour),
                        u32::from(d.minute),
                        u32::from(d.second),
                    )
                })
                .map(|naive| naive.and_utc())
        })
        .unwrap_or_else(Utc::now)
}
