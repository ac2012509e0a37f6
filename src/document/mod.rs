//! Shared-document coordination: section locks and broadcast edits (§4.4).

mod coordinator;
mod section;

pub use coordinator::DocumentCoordinator;
pub use section::{LockState, Section, SECTION_WIDTH};
