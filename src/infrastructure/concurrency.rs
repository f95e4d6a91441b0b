/// Worker pool for batch extraction.
/// Each package is extracted by its own core instance; nothing is shared
/// between workers except the read-only options.

use anyhow::Result;
use tracing::info;

/// Build a rayon pool with `jobs` workers, defaulting to one per core.
pub fn build_pool(jobs: Option<usize>) -> Result<rayon::ThreadPool> {
    let cores = num_cpus::get();
    let workers = std::cmp::max(1, jobs.unwrap_or(cores));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("extract-{}", i))
        .build()?;

    info!(workers, cores, "initialized extraction pool");

    Ok(pool)
}
