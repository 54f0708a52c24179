use callroom_core::IceCandidate;

/// Holds remote ICE candidates until the remote description is applied.
///
/// Candidates routinely outrun the offer or answer they belong to. They must be
/// kept and applied right after the remote description is set, never dropped.
#[derive(Debug, Default)]
pub struct CandidateQueue {
    remote_description_set: bool,
    pending: Vec<IceCandidate>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands the candidate back when it can be applied now, otherwise queues it.
    pub fn accept(&mut self, candidate: IceCandidate) -> Option<IceCandidate> {
        if self.remote_description_set {
            return Some(candidate);
        }
        self.pending.push(candidate);
        None
    }

    /// Marks the remote description as applied and drains the queue in arrival order.
    pub fn mark_remote_description_set(&mut self) -> Vec<IceCandidate> {
        self.remote_description_set = true;
        std::mem::take(&mut self.pending)
    }

    pub fn is_remote_description_set(&self) -> bool {
        self.remote_description_set
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
