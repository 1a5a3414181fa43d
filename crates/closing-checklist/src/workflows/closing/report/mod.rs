mod summary;
pub mod views;

pub use summary::{CategoryProgress, ChecklistReport, TaskSnapshot, UPCOMING_LIMIT};
