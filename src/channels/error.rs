use thiserror::Error;

use crate::protocol::{ClientId, UserId, WorldId};

/// Operation-time failures raised to the caller of a send or update
/// operation. These never crash the process; the socket handler decides
/// whether to log or to notify the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("world {0} has no registered channels")]
    WorldNotFound(WorldId),
    #[error("sender {0} has no cached identity")]
    SenderNotCached(ClientId),
    #[error("sender {0} has no presence connection")]
    SenderOffline(UserId),
}

/// Failure of a state-update submission: either a channel precondition or a
/// codec rejection of the payload itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Codec(#[from] crate::codec::CodecError),
}

/// Broadcast-scheduler misuse. A programming error; callers may treat it as
/// fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("broadcast scheduler is not running")]
    NotRunning,
}
