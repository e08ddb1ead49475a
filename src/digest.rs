use anyhow::{Context, Result};
use std::io::Write;

use crate::config::Config;
use crate::domain::email::FetchedMessage;
use crate::llm::client::TextGenerator;

#[derive(Debug, Clone, Copy)]
pub struct DigestSettings {
    pub summary_max_tokens: u32,
    pub brief_max_tokens: u32,
}

impl From<&Config> for DigestSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            summary_max_tokens: cfg.summary_max_tokens,
            brief_max_tokens: cfg.brief_max_tokens,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Digest {
    /// `"Summary {i}: {text}\n\n"` entries, in message order.
    pub summaries: Vec<String>,
    pub brief: String,
}

pub fn summary_prompt(msg: &FetchedMessage) -> String {
    format!("Please summarize this email in 100 words:\n{msg}")
}

pub fn brief_prompt(summaries: &str) -> String {
    format!(
        "Please provide a single morning brief-like message that would tell me overall content \
         of my last 10 emails based on short summary descriptions of emails provided here:\n{summaries}"
    )
}

/// One summary call per message, in order, then one synthesis call. Progress
/// lines and the joined summaries are written to `out` as the calls go out.
pub fn build_digest<W: Write>(
    generator: &dyn TextGenerator,
    messages: &[FetchedMessage],
    settings: DigestSettings,
    out: &mut W,
) -> Result<Digest> {
    let mut summaries = Vec::with_capacity(messages.len());
    for msg in messages {
        writeln!(out, "Summarizing {}...", msg.label())?;
        out.flush()?;
        let text = generator
            .generate(&summary_prompt(msg), settings.summary_max_tokens)
            .with_context(|| format!("summarizing {}", msg.label()))?;
        summaries.push(format!("Summary {}: {}\n\n", msg.index, text));
    }

    let joined = summaries.concat();
    writeln!(out, "{joined}")?;
    writeln!(out, "Writing the brief from {} summaries...", summaries.len())?;
    out.flush()?;

    let brief = generator
        .generate(&brief_prompt(&joined), settings.brief_max_tokens)
        .context("synthesizing brief")?;

    Ok(Digest { summaries, brief })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every call and answers with a canned string.
    #[derive(Default)]
    struct RecordingGenerator {
        calls: RefCell<Vec<(String, u32)>>,
        fail_on_call: Option<usize>,
    }

    impl TextGenerator for RecordingGenerator {
        fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
            let mut calls = self.calls.borrow_mut();
            calls.push((prompt.to_string(), max_tokens));
            let n = calls.len();
            if self.fail_on_call == Some(n) {
                anyhow::bail!("backend rejected call {n}");
            }
            Ok(format!("generated {n}"))
        }
    }

    fn messages(n: usize) -> Vec<FetchedMessage> {
        (1..=n)
            .map(|i| FetchedMessage {
                index: i,
                sender: format!("s{i}@example.com"),
                body: format!("body {i}"),
                truncated: false,
            })
            .collect()
    }

    fn settings() -> DigestSettings {
        DigestSettings::from(&Config::default())
    }

    #[test]
    fn three_messages_make_four_calls() {
        let generator = RecordingGenerator::default();
        let mut out = Vec::new();
        let digest = build_digest(&generator, &messages(3), settings(), &mut out).unwrap();

        let calls = generator.calls.borrow();
        assert_eq!(calls.len(), 4);
        for (i, (prompt, budget)) in calls[..3].iter().enumerate() {
            assert!(prompt.starts_with("Please summarize this email in 100 words:\n"));
            assert!(prompt.contains(&format!("Email {}:\nFrom: s{}@example.com", i + 1, i + 1)));
            assert_eq!(*budget, 200);
        }
        let (final_prompt, final_budget) = &calls[3];
        assert_eq!(*final_budget, 1000);
        assert!(final_prompt.contains("Summary 1: generated 1\n\nSummary 2: generated 2"));

        assert_eq!(digest.brief, "generated 4");
        assert_eq!(digest.summaries[2], "Summary 3: generated 3\n\n");

        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = printed.lines().filter(|l| l.starts_with("Summary ")).collect();
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn progress_is_printed_per_call() {
        let generator = RecordingGenerator::default();
        let mut out = Vec::new();
        build_digest(&generator, &messages(2), settings(), &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        let first = printed.find("Summarizing Email 1...").unwrap();
        let second = printed.find("Summarizing Email 2...").unwrap();
        let summary = printed.find("Summary 1: generated 1").unwrap();
        let brief = printed.find("Writing the brief from 2 summaries...").unwrap();
        assert!(first < second && second < summary && summary < brief);
    }

    #[test]
    fn empty_batch_still_synthesizes() {
        let generator = RecordingGenerator::default();
        let digest = build_digest(&generator, &[], settings(), &mut Vec::new()).unwrap();
        assert_eq!(generator.calls.borrow().len(), 1);
        assert!(digest.summaries.is_empty());
    }

    #[test]
    fn backend_failure_stops_the_pipeline() {
        let generator = RecordingGenerator {
            fail_on_call: Some(2),
            ..Default::default()
        };
        let err = build_digest(&generator, &messages(3), settings(), &mut Vec::new()).unwrap_err();
        assert_eq!(generator.calls.borrow().len(), 2);
        assert!(format!("{err:#}").contains("summarizing Email 2"));
    }
}
