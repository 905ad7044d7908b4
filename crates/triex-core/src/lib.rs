pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod registry;
pub mod request;

pub use config::ServerConfig;
pub use dispatcher::{Dispatcher, DispatcherHandle, DispatcherThread, RequestHandler};
pub use engine::{KeywordIndex, Snapshot};
pub use error::{Result, TrieXError};
pub use registry::WordRegistry;
pub use request::{Operation, Reply, Request, MAX_KEYWORD_CHARS};
