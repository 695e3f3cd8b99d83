// Context assembly: student/catalog snapshots and prompt composition.

pub mod aggregator;
pub mod composer;
pub mod models;
pub mod prompts;
