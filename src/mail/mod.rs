pub mod decoders;
pub mod imap_client;
pub mod source;

pub use source::HeaderSource;
