//! State module for tracking crawl task progress
//!
//! # Components
//!
//! - `TaskState`: the lifecycle of a single crawl task, from creation to one of its
//!   terminal outcomes (cancelled, depth exceeded, duplicate, failed, done)

mod task_state;

pub use task_state::TaskState;
