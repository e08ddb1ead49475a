pub mod config;
pub mod credentials;
pub mod digest;
pub mod error;

pub mod domain {
    pub mod email;
}

pub mod llm {
    pub mod client;
}

pub mod mail {
    pub mod decoders;
    pub mod fetcher;
    pub mod mailbox;
    pub mod session;
}
