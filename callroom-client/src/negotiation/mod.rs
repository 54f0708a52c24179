mod candidate_queue;
mod connection_state;
mod engine;
mod negotiation_event;

pub use candidate_queue::CandidateQueue;
pub use connection_state::ConnectionState;
pub use engine::NegotiationEngine;
pub use negotiation_event::NegotiationEvent;
