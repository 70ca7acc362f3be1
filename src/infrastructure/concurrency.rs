//! Worker pool setup for batch conversion.

use anyhow::Result;

/// Number of workers when none is configured: half the logical CPUs, at least one.
pub fn default_workers() -> usize {
    std::cmp::max(1, num_cpus::get() / 2)
}

/// Initialize the global rayon thread pool.
/// `jobs` overrides the default worker count; zero is treated as one.
pub fn init_thread_pool(jobs: Option<usize>) -> Result<usize> {
    let workers = jobs.map(|j| j.max(1)).unwrap_or_else(default_workers);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    log::info!(
        "Initialized thread pool: {} workers (system has {} cores)",
        workers,
        num_cpus::get()
    );

    Ok(workers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workers_at_least_one() {
        assert!(default_workers() >= 1);
    }

    #[test]
    fn test_init_thread_pool_once() {
        // The global pool can only be built once per process; a second call must fail cleanly.
        let _ = init_thread_pool(Some(2));
        assert!(init_thread_pool(Some(2)).is_err());
    }
}
