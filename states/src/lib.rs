//! Request tracking shared by every QR Studio session.
//!
//! Sessions issue work to a background executor and receive completions later, possibly
//! out of order. The types here make "only the latest request may write its result" a
//! property of the data instead of a convention.

mod task;
mod tracker;

pub use task::{TaskHandle, TaskId};
pub use tracker::RequestTracker;
