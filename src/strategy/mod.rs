//! Import Strategies
//!
//! - Single job: `projection::ImportJob`, one or more documents sharing a
//!   column model
//! - Parallel: independent shards on the Rayon pool, tables concatenated

pub mod parallel;

pub use parallel::{project_shard, project_shards};
