/// User actions forwarded to a running call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallCommand {
    HangUp,
    SetMuted(bool),
}
