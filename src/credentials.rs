use anyhow::{Result, anyhow};
use dialoguer::console::Term;
use dialoguer::{Input, Password};
use std::fs;
use std::io::{BufRead, ErrorKind, Write};
use std::path::Path;

use crate::error::DigestError;

/// Mailbox login. Lives only in memory for the length of the run.
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Interactive prompts on a terminal; plain lines from stdin otherwise.
pub fn prompt_credentials() -> Result<Credentials> {
    if !Term::stderr().is_term() {
        let stdin = std::io::stdin();
        return read_credentials(&mut stdin.lock(), &mut std::io::stdout());
    }

    let email: String = Input::new()
        .with_prompt("Please enter your email address")
        .interact_text()?;
    let password = Password::new()
        .with_prompt("Please enter your password")
        .interact()?;
    Ok(Credentials { email, password })
}

/// Reads the address then the secret, one line each, echoing the prompts to `out`.
pub fn read_credentials<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Credentials> {
    write!(out, "Please enter your email address: ")?;
    out.flush()?;
    let email = read_line(input)?
        .ok_or_else(|| anyhow!("no email address on stdin"))?
        .trim()
        .to_string();

    write!(out, "Please enter your password: ")?;
    out.flush()?;
    let password = read_line(input)?.ok_or_else(|| anyhow!("no password on stdin"))?;
    writeln!(out)?;

    Ok(Credentials { email, password })
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Reads the completion API key, trimmed. A missing or blank file is a
/// `DigestError` the entry point reports by name.
pub fn read_api_key(path: &Path) -> Result<String> {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(DigestError::MissingApiKey {
                path: path.to_path_buf(),
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    let key = s.trim();
    if key.is_empty() {
        return Err(DigestError::EmptyApiKey {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(key.to_string())
}
