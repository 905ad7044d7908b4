pub use triex_core::{DispatcherHandle, KeywordIndex, Reply, Request, ServerConfig};
pub mod client;
pub mod connection;
pub mod server;

pub use client::TrieClient;
pub use connection::{handle_connection, ConnectionLimits};
pub use server::TrieServer;
