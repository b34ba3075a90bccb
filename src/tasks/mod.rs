//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expired-entry sweep: removes expired cache entries at configured intervals
//! - Scheduled invalidation: evicts whole cache namespaces on fixed schedules

mod cleanup;
mod invalidation;

pub use cleanup::spawn_cleanup_task;
pub use invalidation::{spawn_invalidation_tasks, InvalidationRule};
