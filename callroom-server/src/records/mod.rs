//! In-memory Call Record service for local development and tests.
//!
//! Production deployments point clients at the real call record API; this
//! module serves the same REST surface so a single binary can host a full call.

mod routes;
mod store;

pub use routes::routes;
pub use store::*;
