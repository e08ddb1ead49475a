use anyhow::{Context, Result};

use crate::config::Config;
use crate::domain::email::FetchedMessage;
use crate::mail::decoders::{decode_sender, extract_body, truncate_tokens};
use crate::mail::mailbox::Mailbox;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub mailbox: String,
    pub max_messages: usize,
    pub max_body_tokens: usize,
}

impl From<&Config> for FetchOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            mailbox: cfg.mailbox.clone(),
            max_messages: cfg.max_messages,
            max_body_tokens: cfg.max_body_tokens,
        }
    }
}

/// Selects the mailbox and decodes the most recent `max_messages` unseen
/// messages, oldest first. Any message that fails to parse aborts the batch.
pub fn fetch_unread(mb: &mut dyn Mailbox, opts: &FetchOptions) -> Result<Vec<FetchedMessage>> {
    mb.select(&opts.mailbox)
        .with_context(|| format!("selecting {}", opts.mailbox))?;

    let unseen = mb.search_unseen().context("searching for unseen messages")?;
    let start = unseen.len().saturating_sub(opts.max_messages);
    let recent = &unseen[start..];
    log::info!("{} unseen, fetching {}", unseen.len(), recent.len());

    let mut out = Vec::with_capacity(recent.len());
    for (i, &seq) in recent.iter().enumerate() {
        let raw = mb.fetch_rfc822(seq)?;
        let msg = decode_message(i + 1, &raw, opts.max_body_tokens)
            .with_context(|| format!("decoding message {seq}"))?;
        log::debug!(
            "message {} -> {} (truncated: {})",
            seq,
            msg.label(),
            msg.truncated
        );
        out.push(msg);
    }
    Ok(out)
}

pub fn decode_message(index: usize, raw: &[u8], max_body_tokens: usize) -> Result<FetchedMessage> {
    let parsed = mailparse::parse_mail(raw)?;
    let sender = decode_sender(&parsed);
    let (body, truncated) = truncate_tokens(extract_body(&parsed)?, max_body_tokens);
    Ok(FetchedMessage {
        index,
        sender,
        body,
        truncated,
    })
}
