//! Parallel Shard Import
//!
//! Uses Rayon to project independent documents at once. Each shard is its
//! own import job with its own allocator and column tree; the resulting
//! tables are concatenated in shard order with columns aligned by name.

use log::Log;
use rayon::prelude::*;

use crate::projection::{DocumentFormat, ImportJob, ImportOptions, ImportResult, Table};

/// Project one shard into a table
pub fn project_shard(
    shard: &[u8],
    format: DocumentFormat,
    options: &ImportOptions,
    sink: &dyn Log,
) -> ImportResult<Table> {
    let mut job = ImportJob::new(options.clone());
    job.import(format, shard, sink)?;
    Ok(job.finish().into_table())
}

/// Project every shard in parallel and concatenate the tables
///
/// `limit` applies per shard. The first error in shard order is returned.
pub fn project_shards<S>(
    shards: &[S],
    format: DocumentFormat,
    options: &ImportOptions,
    sink: &dyn Log,
) -> ImportResult<Table>
where
    S: AsRef<[u8]> + Sync,
{
    let tables: Vec<ImportResult<Table>> = shards
        .par_iter()
        .map(|shard| project_shard(shard.as_ref(), format, options, sink))
        .collect();

    let tables = tables.into_iter().collect::<ImportResult<Vec<_>>>()?;
    Ok(Table::concat(tables))
}
