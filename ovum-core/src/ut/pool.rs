// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::collections::BTreeMap;

use kdam::TqdmParallelIterator;
use rayon::prelude::*;

use crate::error::OvumError;
use crate::ut::track;

/// Per-task outcomes keyed by task identifier
pub type TaskResults<R> = BTreeMap<String, Result<R, OvumError>>;

/// Run independent tasks on a local pool of `threads` workers
///
/// Each task is identified by a string id. Results are keyed by that id, so
/// the returned map does not depend on the order in which workers finish.
/// A failing task is recorded in its slot and never stops the remaining
/// tasks.
///
/// # Arguments
///
/// * `tasks` - (id, input) pairs
/// * `threads` - Number of worker threads (at least one)
/// * `desc` - Progress bar description
/// * `verbose` - Show a progress bar
/// * `f` - Work applied to every input
///
/// # Examples
///
/// ```
/// use ovum_core::error::OvumError;
/// use ovum_core::ut::pool::run_tasks;
///
/// let tasks = vec![("b".to_string(), 2), ("a".to_string(), 1), ("c".to_string(), 0)];
///
/// let results = run_tasks(tasks, 2, "Squaring", false, |x: i32| {
///     if x == 0 {
///         return Err(OvumError::OtherError("zero".to_string()));
///     }
///     Ok(x * x)
/// })
/// .unwrap();
///
/// let keys: Vec<&String> = results.keys().collect();
/// assert_eq!(keys, vec!["a", "b", "c"]);
/// assert_eq!(results["b"], Ok(4));
/// assert!(results["c"].is_err());
/// ```
pub fn run_tasks<T, R, F>(
    tasks: Vec<(String, T)>,
    threads: usize,
    desc: &str,
    verbose: bool,
    f: F,
) -> Result<TaskResults<R>, OvumError>
where
    T: Send,
    R: Send,
    F: Fn(T) -> Result<R, OvumError> + Sync + Send,
{
    if threads < 1 {
        return Err(OvumError::OtherError(
            "Worker pools require at least one thread".to_string(),
        ));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|err| OvumError::OtherError(format!("Failed to build worker pool: {}", err)))?;

    let pb = track::progress_bar(tasks.len(), desc, verbose);

    let results = pool.install(|| {
        tasks
            .into_par_iter()
            .tqdm_with_bar(pb)
            .map(|(id, task)| (id, f(task)))
            .collect::<TaskResults<R>>()
    });

    if verbose {
        println!();
    }

    Ok(results)
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_run_tasks_keyed_by_id() {
        let tasks: Vec<(String, usize)> = (0..50).map(|i| (format!("task_{:02}", i), i)).collect();

        let results = run_tasks(tasks, 4, "Testing", false, |i| Ok(i * 2)).unwrap();

        assert_eq!(results.len(), 50);
        assert_eq!(results["task_07"], Ok(14));
        assert_eq!(results.keys().next().map(String::as_str), Some("task_00"));
    }

    #[test]
    fn test_run_tasks_zero_threads() {
        let tasks = vec![("a".to_string(), 1)];
        assert!(run_tasks(tasks, 0, "Testing", false, |i: i32| Ok(i)).is_err());
    }
}
