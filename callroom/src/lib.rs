pub use callroom_core::billing::{BillingSnapshot, Meter, cost_for};
pub use callroom_core::model::{CallId, PeerId, RoomId};

pub mod model {
    pub use callroom_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use callroom_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use callroom_client::*;
}
