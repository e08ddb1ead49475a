use anyhow::{Context, Result};
use mailparse::{MailHeaderMap, ParsedMail};

/// Decodes RFC 2047 encoded-words in a raw header value. Values with no
/// declared charset come back unchanged.
pub fn decode_mime_words(raw: &[u8]) -> String {
    // mailparse expects a full "Key: value" header line
    let mut line = b"X: ".to_vec();
    line.extend_from_slice(raw);
    line.extend_from_slice(b"\r\n");

    match mailparse::parse_header(&line) {
        Ok((h, _idx)) => h.get_value(),
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    }
}

pub fn decode_sender(parsed: &ParsedMail) -> String {
    parsed
        .headers
        .get_first_header("From")
        .map(|h| decode_mime_words(h.get_value_raw()))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "(unknown)".to_string())
}

/// Multipart: the first text/plain part in walk order, or "" when there is
/// none. Single part: the payload, whatever its type.
pub fn extract_body(parsed: &ParsedMail) -> Result<String> {
    if parsed.ctype.mimetype.to_ascii_lowercase().starts_with("multipart/") {
        return Ok(first_plain_part(parsed)?.unwrap_or_default());
    }
    parsed.get_body().context("decoding message payload")
}

fn first_plain_part(p: &ParsedMail) -> Result<Option<String>> {
    if p.ctype.mimetype.eq_ignore_ascii_case("text/plain") {
        return p.get_body().context("decoding text/plain part").map(Some);
    }
    for sp in &p.subparts {
        if let Some(t) = first_plain_part(sp)? {
            return Ok(Some(t));
        }
    }
    Ok(None)
}

/// Caps `body` at `max_tokens` whitespace-separated tokens. Returns the body
/// untouched when it already fits, otherwise the leading tokens joined by
/// single spaces and `true`.
pub fn truncate_tokens(body: String, max_tokens: usize) -> (String, bool) {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    if tokens.len() <= max_tokens {
        return (body, false);
    }
    (tokens[..max_tokens].join(" "), true)
}
