use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;

use mail_digest::config::load_config;
use mail_digest::credentials::{prompt_credentials, read_api_key};
use mail_digest::digest::{DigestSettings, build_digest};
use mail_digest::error::DigestError;
use mail_digest::llm::client::CompletionClient;
use mail_digest::mail::fetcher::{FetchOptions, fetch_unread};
use mail_digest::mail::session;

#[derive(Parser)]
#[command(name = "mail_digest", version)]
#[command(about = "Summarize your latest unread mail into a morning brief", long_about = None)]
struct Cli {
    /// IMAP server address (host, host:port or imaps://host:port)
    email_server_uri: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => exit_reported(DigestError::Usage.into()),
    };

    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e:#}"))?;
    let api_key = read_api_key(&cfg.api_key_file).unwrap_or_else(|e| exit_reported(e));

    let creds = prompt_credentials()?;
    let mut mail = match session::connect(&cli.email_server_uri, cfg.imap_port, &creds) {
        Ok(s) => s,
        Err(e) => exit_reported(e.into()),
    };
    println!("Successfully connected to the email server.");

    let client = CompletionClient::new(api_key, &cfg)?;
    let messages = fetch_unread(&mut mail, &FetchOptions::from(&cfg))?;

    let mut stdout = std::io::stdout().lock();
    let digest = build_digest(&client, &messages, DigestSettings::from(&cfg), &mut stdout)?;
    drop(stdout);

    println!("Sample email summary:");
    println!("{}", digest.brief);

    if let Err(e) = mail.logout() {
        log::warn!("IMAP logout failed: {e}");
    }
    Ok(())
}

/// Exits 1, with the curated message for failures users can fix and the full
/// error chain for anything else.
fn exit_reported(err: anyhow::Error) -> ! {
    match err.downcast_ref::<DigestError>() {
        Some(e) if e.is_reportable() => {
            eprintln!("{e}");
            std::process::exit(1)
        }
        _ => {
            eprintln!("Error: {err:?}");
            std::process::exit(1)
        }
    }
}
