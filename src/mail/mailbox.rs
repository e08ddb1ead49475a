use anyhow::Result;

/// Sequence number of a message in the selected mailbox.
pub type Seq = u32;

/// The three IMAP operations the fetcher needs from a logged-in session.
pub trait Mailbox {
    fn select(&mut self, name: &str) -> Result<()>;

    /// Unseen messages, ascending.
    fn search_unseen(&mut self) -> Result<Vec<Seq>>;

    /// Full RFC 822 source of one message.
    fn fetch_rfc822(&mut self, seq: Seq) -> Result<Vec<u8>>;
}
