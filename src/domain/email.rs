use std::fmt;

/// One unread message, decoded and capped, ready to be summarised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMessage {
    /// 1-based position within the fetched batch.
    pub index: usize,
    pub sender: String,
    pub body: String,
    pub truncated: bool,
}

impl FetchedMessage {
    pub fn label(&self) -> String {
        if self.truncated {
            format!("Truncated Email {}", self.index)
        } else {
            format!("Email {}", self.index)
        }
    }
}

impl fmt::Display for FetchedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:\nFrom: {}\nMessage Body:\n{}\n\n",
            self.label(),
            self.sender,
            self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_layout() {
        let m = FetchedMessage {
            index: 2,
            sender: "Ann <ann@example.com>".into(),
            body: "hello".into(),
            truncated: false,
        };
        assert_eq!(
            m.to_string(),
            "Email 2:\nFrom: Ann <ann@example.com>\nMessage Body:\nhello\n\n"
        );
    }

    #[test]
    fn truncated_label() {
        let m = FetchedMessage {
            index: 7,
            sender: String::new(),
            body: String::new(),
            truncated: true,
        };
        assert_eq!(m.label(), "Truncated Email 7");
        assert!(m.to_string().starts_with("Truncated Email 7:\n"));
    }
}
