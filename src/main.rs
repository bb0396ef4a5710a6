use anyhow::Context;
use tracing::info;

use scholar_digest::channels::{AlertSource, EmailChannelConfig, ImapAlertSource, SmtpDigestSender};
use scholar_digest::config::DigestConfig;
use scholar_digest::digest::{DigestProcessor, SourceDocument};
use scholar_digest::document::Document;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_path = std::env::var("SCHOLAR_DIGEST_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| DigestConfig::default_path());
    let config = DigestConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    eprintln!("📚 Scholar Digest v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Config: {}", config_path.display());
    eprintln!("   Alert sender: {}", config.alert_sender);
    eprintln!(
        "   Entry template: one <{}> + {} sibling nodes\n",
        config.entry_anchor, config.entry_length
    );

    let email_config = EmailChannelConfig::from_env().unwrap_or_else(|| {
        eprintln!("Error: SCHOLAR_IMAP_HOST not set");
        eprintln!("  export SCHOLAR_IMAP_HOST=imap.gmail.com");
        eprintln!("  export SCHOLAR_USERNAME=you@gmail.com");
        eprintln!("  export SCHOLAR_PASSWORD=app-password");
        std::process::exit(1);
    });

    let source = ImapAlertSource::new(email_config.clone(), &config.alert_sender);
    let messages = source.fetch_unread().await?;

    if messages.is_empty() {
        info!("There are no scholar alerts to process");
        return Ok(());
    }
    info!(count = messages.len(), "Fetched unread alerts");

    let documents: Vec<SourceDocument> = messages
        .iter()
        .map(|m| SourceDocument::new(m.subject.clone(), Document::parse(&m.html)))
        .collect();

    let processor = DigestProcessor::new(&config);
    let outcome = processor.process(documents)?;

    if config.send_email {
        if outcome.stats.num_unique == 0 {
            info!("No papers in this batch, not sending an empty digest");
        } else {
            info!("Sending digest email");
            let recipient = if config.email.is_empty() {
                email_config.from_address.clone()
            } else {
                config.email.clone()
            };
            let sender = SmtpDigestSender::new(email_config);
            sender.send_digest(
                &recipient,
                &config.email_subject,
                outcome.digest.text,
                outcome.digest.html,
            )?;
        }
    }

    if config.mark_read {
        info!("Marking alert messages as read");
        source.mark_read(&messages).await?;
    }

    Ok(())
}
