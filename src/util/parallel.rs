use std::env;

use rayon::prelude::*;

pub const PARALLEL_ENV: &str = "PORTGRAPH_PARALLEL";

/// Worker count for batch runs: explicit value, then `PORTGRAPH_PARALLEL`,
/// then the machine's available parallelism.
pub fn resolve_jobs(override_value: Option<usize>) -> Option<usize> {
    if let Some(value) = override_value {
        return Some(value);
    }
    if let Some(parsed) = env::var(PARALLEL_ENV)
        .ok()
        .and_then(|value| value.trim().parse().ok())
    {
        return Some(parsed);
    }
    std::thread::available_parallelism().ok().map(|n| n.get())
}

/// Applies `func` to every item, on a dedicated pool when more than one job
/// is requested. Results are returned in input order.
pub fn map_items<T, R, F>(items: Vec<T>, jobs: Option<usize>, func: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    let pool = jobs
        .filter(|count| *count > 1)
        .and_then(|count| rayon::ThreadPoolBuilder::new().num_threads(count).build().ok());
    match pool {
        Some(pool) => pool.install(|| items.into_par_iter().map(func).collect()),
        None => items.into_iter().map(func).collect(),
    }
}
