//! Bounded-concurrency scheduling of rule dispatches

use anyhow::{Context, Result, anyhow};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};

/// Runs jobs with at most `capacity` of them in flight.
///
/// Jobs are admitted in submission order; a job waiting for a slot never
/// overtakes one submitted before it.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyLimiter {
    /// Create a limiter; a capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity.max(1))),
        }
    }

    /// Run every job to completion and return their outputs in submission order.
    ///
    /// A job returning `Err` is fatal: no further job is admitted, jobs still
    /// running are aborted and the error is returned.
    pub async fn run_all<T, F>(&self, jobs: Vec<F>) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let total = jobs.len();
        let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
        let mut set = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            // Permits travel back with each result and are released in `collect`
            let permit = loop {
                tokio::select! {
                    biased;
                    Some(joined) = set.join_next(), if !set.is_empty() => {
                        collect(&mut results, joined)?;
                    }
                    permit = self.semaphore.clone().acquire_owned() => {
                        break permit.context("Concurrency limiter was closed")?;
                    }
                }
            };
            set.spawn(async move { (index, job.await, permit) });
        }

        while let Some(joined) = set.join_next().await {
            collect(&mut results, joined)?;
        }

        Ok(results.into_iter().flatten().collect())
    }
}

type Joined<T> = std::result::Result<(usize, Result<T>, OwnedSemaphorePermit), JoinError>;

fn collect<T>(results: &mut [Option<T>], joined: Joined<T>) -> Result<()> {
    let (index, result, _permit) = joined.map_err(|e| anyhow!("Rule task panicked: {e}"))?;
    results[index] = Some(result?);
    Ok(())
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_follow_submission_order() {
        let limiter = ConcurrencyLimiter::new(4);
        let jobs: Vec<_> = (0..8u64)
            .map(|i| async move {
                tokio::time::sleep(Duration::from_millis(40 - i * 5)).await;
                Ok::<_, anyhow::Error>(i)
            })
            .collect();
        let results = limiter.run_all(jobs).await.unwrap();
        assert_eq!(results, (0..8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_capacity_is_never_exceeded() {
        let limiter = ConcurrencyLimiter::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs: Vec<_> = (0..6)
            .map(|_| {
                let running = running.clone();
                let peak = peak.clone();
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, anyhow::Error>(())
                }
            })
            .collect();

        limiter.run_all(jobs).await.unwrap();
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_capacity_one_runs_sequentially_in_order() {
        let limiter = ConcurrencyLimiter::default();
        let log = Arc::new(Mutex::new(Vec::new()));

        let jobs: Vec<_> = (0..4u64)
            .map(|i| {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push(format!("start {i}"));
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    log.lock().unwrap().push(format!("end {i}"));
                    Ok::<_, anyhow::Error>(i)
                }
            })
            .collect();

        limiter.run_all(jobs).await.unwrap();
        let log = log.lock().unwrap();
        let expected: Vec<String> = (0..4)
            .flat_map(|i| [format!("start {i}"), format!("end {i}")])
            .collect();
        assert_eq!(*log, expected);
    }

    #[tokio::test]
    async fn test_fatal_job_error_is_returned() {
        let limiter = ConcurrencyLimiter::new(2);
        let jobs: Vec<std::pin::Pin<Box<dyn Future<Output = Result<u32>> + Send>>> = vec![
            Box::pin(async { Ok::<u32, anyhow::Error>(1) }),
            Box::pin(async { Err::<u32, _>(anyhow!("task contract violated")) }),
        ];
        let err = limiter.run_all(jobs).await.unwrap_err();
        assert_eq!(err.to_string(), "task contract violated");
    }

    #[tokio::test]
    async fn test_fatal_job_stops_later_jobs() {
        let limiter = ConcurrencyLimiter::new(1);
        let started = Arc::new(AtomicUsize::new(0));

        let mut jobs: Vec<std::pin::Pin<Box<dyn Future<Output = Result<()>> + Send>>> =
            vec![Box::pin(async { Err::<(), _>(anyhow!("task contract violated")) })];
        for _ in 0..3 {
            let started = started.clone();
            jobs.push(Box::pin(async move {
                started.fetch_add(1, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            }));
        }

        let err = limiter.run_all(jobs).await.unwrap_err();
        assert_eq!(err.to_string(), "task contract violated");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(started.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let results = ConcurrencyLimiter::new(0)
            .run_all(vec![async { Ok::<_, anyhow::Error>("done") }])
            .await
            .unwrap();
        assert_eq!(results, vec!["done"]);
    }
}
