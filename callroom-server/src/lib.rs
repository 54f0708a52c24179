mod app;
mod config;
pub mod records;
mod room;
mod signaling;

pub use app::{router, serve};
pub use config::ServerConfig;
pub use records::{CallRecordStore, NewCall, StoredCall};
pub use room::*;
pub use signaling::*;
