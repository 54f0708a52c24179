mod call;
mod peer;
mod record;
mod room;
mod signaling;

pub use call::{CallId, CallStatus, EndReason, Role};
pub use peer::PeerId;
pub use record::{CallRecord, EndReport, Mentor, RecordStatus, Review};
pub use room::{ROOM_CAPACITY, RoomId};
pub use signaling::{ClientSignal, IceCandidate, SdpKind, ServerSignal, SessionDescription};
