/// Task state definitions for tracking crawl progress
///
/// Every task created by the scheduler walks this state machine exactly once:
///
/// ```text
/// Created -> Cancelled
///         -> DepthExceeded
///         -> Duplicate
///         -> Fetching -> FetchFailed
///                     -> ParseFailed
///                     -> Expanding -> AwaitingChildren -> Done
/// ```
use crate::CrawlError;
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task has been spawned but has not started its work
    Created,

    /// Task holds a concurrency slot and is fetching or parsing its page
    Fetching,

    /// Page was classified and child tasks are being spawned
    Expanding,

    /// Task is waiting for its descendants to terminate
    AwaitingChildren,

    // ===== Terminal States =====
    /// The run's cancellation signal was observed
    Cancelled,

    /// The task's depth is beyond the configured maximum
    DepthExceeded,

    /// Another task already claimed this URL
    Duplicate,

    /// Request construction, transport, or status failure
    FetchFailed,

    /// The document could not be parsed
    ParseFailed,

    /// Page was processed and every child was spawned
    Done,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Created | Self::Fetching | Self::Expanding | Self::AwaitingChildren
        )
    }

    /// Returns true if the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        use TaskState::*;

        matches!(
            (self, next),
            (Created, Cancelled | DepthExceeded | Duplicate | Fetching)
                | (Fetching, Cancelled | FetchFailed | ParseFailed | Expanding)
                | (Expanding, AwaitingChildren | Done)
                | (AwaitingChildren, Done)
        )
    }

    /// Maps a task error to the terminal state it leaves the task in
    pub fn from_error(error: &CrawlError) -> Self {
        match error {
            CrawlError::Cancelled => Self::Cancelled,
            CrawlError::Parse { .. } => Self::ParseFailed,
            CrawlError::RequestBuild { .. }
            | CrawlError::Transport { .. }
            | CrawlError::Status { .. } => Self::FetchFailed,
        }
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Fetching => "fetching",
            Self::Expanding => "expanding",
            Self::AwaitingChildren => "awaiting_children",
            Self::Cancelled => "cancelled",
            Self::DepthExceeded => "depth_exceeded",
            Self::Duplicate => "duplicate",
            Self::FetchFailed => "fetch_failed",
            Self::ParseFailed => "parse_failed",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
