//! Identity and cancellation of one issued request.
//!
//! ```
//! use qrkit_states::{TaskHandle, TaskId};
//! use tokio_util::sync::CancellationToken;
//!
//! let handle = TaskHandle::new(TaskId::new("simple", 1), CancellationToken::new());
//!
//! // Later, when a newer request supersedes this one
//! handle.cancel();
//! assert!(handle.is_cancelled());
//! ```

use std::fmt;

use tokio_util::sync::CancellationToken;

/// Unique identifier for an issued request.
///
/// Combines a scope label (the session that issued it) with a generation counter.
/// Within one scope a higher generation always means a more recently issued request,
/// which is what lets a session recognise stale completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    scope: &'static str,
    generation: u64,
}

impl TaskId {
    pub fn new(scope: &'static str, generation: u64) -> Self {
        Self { scope, generation }
    }

    /// Name of the session that issued the request.
    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.scope, self.generation)
    }
}

/// Handle to an issued request with cooperative cancellation support.
///
/// Cancellation never aborts work that is already running: long loops are expected to
/// check `is_cancelled()` between steps, and single-shot work simply runs to completion
/// while its result gets discarded by the owner.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Marks the request as superseded. Clones observe it too.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}
