pub mod entry_name;
pub mod memory;
mod provider;

pub use entry_name::{issue_entry_name, parse_issue_id, sanitize_component, EntryNameError};
pub use memory::{MemoryTracker, TrackerCall};
pub use provider::{Issue, Project, Tracker, TrackerError};
