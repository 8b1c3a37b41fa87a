pub mod config;
pub mod error;
pub mod fetch;
pub mod gradebook;
pub mod grading;
pub mod output;
pub mod store;
