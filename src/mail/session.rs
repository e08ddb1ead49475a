use anyhow::{Result, anyhow};
use native_tls::TlsConnector;

use crate::credentials::Credentials;
use crate::error::DigestError;
use crate::mail::mailbox::{Mailbox, Seq};

type TlsSession = imap::Session<native_tls::TlsStream<std::net::TcpStream>>;

/// Logged-in IMAP session. Logs out when dropped unless `logout` already ran.
pub struct MailSession {
    session: TlsSession,
    closed: bool,
}

/// Opens a TLS connection to `server` and logs in. `server` is a bare host,
/// `host:port`, or `imaps://host[:port]`; `default_port` fills in a missing port.
pub fn connect(
    server: &str,
    default_port: u16,
    creds: &Credentials,
) -> Result<MailSession, DigestError> {
    let (host, port) = split_host_port(server, default_port)?;
    log::info!("connecting to {}:{}", host, port);

    let tls = TlsConnector::builder()
        .build()
        .map_err(|e| DigestError::Connect(e.to_string()))?;
    let client = imap::connect((host.as_str(), port), host.as_str(), &tls)
        .map_err(|e| DigestError::Connect(e.to_string()))?;

    let session = client
        .login(&creds.email, &creds.password)
        .map_err(|(e, _client)| DigestError::Connect(e.to_string()))?;

    Ok(MailSession {
        session,
        closed: false,
    })
}

pub fn split_host_port(server: &str, default_port: u16) -> Result<(String, u16), DigestError> {
    let s = server.trim();
    let s = s.strip_prefix("imaps://").unwrap_or(s);
    let s = s.trim_end_matches('/');
    if s.is_empty() {
        return Err(DigestError::Connect("empty server address".to_string()));
    }

    if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| DigestError::Connect(format!("unclosed '[' in '{server}'")))?;
        let port = match tail.strip_prefix(':') {
            Some(port) => parse_port(port, server)?,
            None if tail.is_empty() => default_port,
            None => return Err(DigestError::Connect(format!("invalid address '{server}'"))),
        };
        return Ok((host.to_string(), port));
    }

    // More than one colon without brackets is a bare IPv6 literal.
    match s.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && !host.contains(':') => {
            Ok((host.to_string(), parse_port(port, server)?))
        }
        _ => Ok((s.to_string(), default_port)),
    }
}

fn parse_port(port: &str, server: &str) -> Result<u16, DigestError> {
    port.parse::<u16>()
        .map_err(|_| DigestError::Connect(format!("invalid port in '{server}'")))
}

impl MailSession {
    pub fn logout(mut self) -> Result<()> {
        self.closed = true;
        self.session.logout()?;
        Ok(())
    }
}

impl Drop for MailSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.session.logout() {
            log::warn!("IMAP logout failed: {e}");
        }
    }
}

impl Mailbox for MailSession {
    fn select(&mut self, name: &str) -> Result<()> {
        let mailbox = self.session.select(name)?;
        log::debug!("{} has {} messages", name, mailbox.exists);
        Ok(())
    }

    fn search_unseen(&mut self) -> Result<Vec<Seq>> {
        let mut seqs: Vec<Seq> = self.session.search("UNSEEN")?.into_iter().collect();
        seqs.sort_unstable();
        Ok(seqs)
    }

    fn fetch_rfc822(&mut self, seq: Seq) -> Result<Vec<u8>> {
        let fetches = self.session.fetch(seq.to_string(), "RFC822")?;
        let f = fetches
            .iter()
            .next()
            .ok_or_else(|| anyhow!("message {seq} not found"))?;
        let raw = f
            .body()
            .ok_or_else(|| anyhow!("message {seq}: server returned no RFC822 body"))?;
        Ok(raw.to_vec())
    }
}
