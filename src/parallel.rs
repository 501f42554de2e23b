//! # Parallel Work Distribution
//!
//! [`Distributor::run`] applies a function to every item of a work list,
//! spread over a bounded number of workers. The list is cut into contiguous
//! chunks, one per worker, and every worker handles its chunk in order.
//!
//! By default each worker is a separate process created with `fork(2)`. A
//! unit of work that hangs or crashes takes down only its own worker, never
//! the control process or its siblings. [`Strategy::Threads`] runs the same
//! chunks on a `rayon` thread pool instead, for work that needs no isolation.
//!
//! A non-zero delay between items forces a single worker, so that the delay
//! throttles the run as a whole.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use log::{debug, error, warn};
use rayon::prelude::*;

use crate::config::Config;
use crate::error::{Error, Result};

/// How workers are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// One forked process per worker
    #[default]
    Process,
    /// One task per worker on a dedicated thread pool
    Threads,
}

/// Outcome of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Number of workers started
    pub workers: usize,
    /// Ranks of workers that reported a failed unit of work or died
    pub failed: Vec<usize>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// What a unit of work returns.
///
/// `()` always counts as success. An `Err` counts against the worker and is
/// logged; the rest of the chunk still runs.
pub trait UnitOutcome {
    /// Description of the failure, if the unit failed
    fn failure(self) -> Option<String>;
}

impl UnitOutcome for () {
    fn failure(self) -> Option<String> {
        None
    }
}

impl<E: fmt::Display> UnitOutcome for std::result::Result<(), E> {
    fn failure(self) -> Option<String> {
        self.err().map(|err| err.to_string())
    }
}

/// Number of workers for `len` items.
///
/// Never more than `len`, at least one when there is work, and exactly one
/// whenever `delay` is non-zero.
pub fn worker_count(len: usize, concurrency: usize, delay: Duration) -> usize {
    if len == 0 {
        return 0;
    }
    if !delay.is_zero() {
        return 1;
    }
    concurrency.clamp(1, len)
}

/// Cut `0..len` into contiguous chunks of `ceil(len / workers)` items.
///
/// Chunk `r` belongs to worker `r`. Trailing workers that would get no items
/// are left out.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 || workers == 0 {
        return Vec::new();
    }
    let chunk = len.div_ceil(workers);
    (0..workers)
        .map(|rank| (rank * chunk).min(len)..((rank + 1) * chunk).min(len))
        .filter(|range| !range.is_empty())
        .collect()
}

/// Runs a function over a work list in parallel workers
#[derive(Debug, Clone)]
pub struct Distributor {
    concurrency: usize,
    delay: Duration,
    strategy: Strategy,
}

impl Distributor {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            delay: Duration::ZERO,
            strategy: Strategy::default(),
        }
    }

    /// Distributor using `num_proc` and `sleep_time` from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.num_proc).with_delay(config.sleep_duration())
    }

    /// Sleep this long between items. Forces a single worker.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Worker count this distributor would use for `len` items
    pub fn worker_count(&self, len: usize) -> usize {
        worker_count(len, self.concurrency, self.delay)
    }

    /// Call `func` once for every item and wait for all workers to finish.
    ///
    /// A unit of work that panics or returns an error is logged and counted
    /// against its worker; the rest of the chunk still runs. If a worker
    /// process cannot be started, no further workers are started, the ones
    /// already running are waited for, and `Error::Spawn` is returned.
    pub fn run<T, F, R>(&self, work: &[T], func: F) -> Result<RunReport>
    where
        T: Sync,
        F: Fn(&T) -> R + Sync,
        R: UnitOutcome,
    {
        let ranges = partition(work.len(), self.worker_count(work.len()));
        debug!(
            "distributing {} items over {} workers ({:?})",
            work.len(),
            ranges.len(),
            self.strategy
        );
        match self.strategy {
            Strategy::Process => self.run_processes(work, &ranges, &func),
            Strategy::Threads => self.run_threads(work, &ranges, &func),
        }
    }

    fn run_processes<T, F, R>(
        &self,
        work: &[T],
        ranges: &[Range<usize>],
        func: &F,
    ) -> Result<RunReport>
    where
        F: Fn(&T) -> R,
        R: UnitOutcome,
    {
        spawn_and_join(ranges, |_, range| {
            let chunk = &work[range];
            fork_worker(|| run_chunk(chunk, func, self.delay))
        })
    }

    fn run_threads<T, F, R>(
        &self,
        work: &[T],
        ranges: &[Range<usize>],
        func: &F,
    ) -> Result<RunReport>
    where
        T: Sync,
        F: Fn(&T) -> R + Sync,
        R: UnitOutcome,
    {
        if ranges.is_empty() {
            return Ok(RunReport::default());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(ranges.len())
            .build()
            .map_err(|err| Error::Spawn {
                worker: 0,
                message: err.to_string(),
            })?;

        let failures: Vec<usize> = pool.install(|| {
            ranges
                .par_iter()
                .map(|range| run_chunk(&work[range.clone()], func, self.delay))
                .collect()
        });

        Ok(RunReport {
            workers: ranges.len(),
            failed: failures
                .iter()
                .enumerate()
                .filter(|(_, count)| **count > 0)
                .map(|(rank, _)| rank)
                .collect(),
        })
    }
}

/// Start one worker per range with `spawn`, then wait for all of them.
///
/// The first spawn failure stops further spawns; the workers already
/// running are still joined before `Error::Spawn` is returned.
fn spawn_and_join<S>(ranges: &[Range<usize>], mut spawn: S) -> Result<RunReport>
where
    S: FnMut(usize, Range<usize>) -> io::Result<libc::pid_t>,
{
    // pid -> worker rank; only ever touched by this process
    let mut outstanding: HashMap<libc::pid_t, usize> = HashMap::new();
    let mut spawn_error = None;

    for (rank, range) in ranges.iter().enumerate() {
        match spawn(rank, range.clone()) {
            Ok(pid) => {
                outstanding.insert(pid, rank);
            }
            Err(err) => {
                error!("failed to fork(): {}", err);
                spawn_error = Some(Error::Spawn {
                    worker: rank,
                    message: err.to_string(),
                });
                break;
            }
        }
    }

    let report = RunReport {
        workers: outstanding.len(),
        failed: join(&mut outstanding)?,
    };

    match spawn_error {
        Some(err) => Err(err),
        None => Ok(report),
    }
}

/// Process one chunk in order. Returns the number of failed items.
fn run_chunk<T, F, R>(items: &[T], func: &F, delay: Duration) -> usize
where
    F: Fn(&T) -> R,
    R: UnitOutcome,
{
    let mut failures = 0;
    for (i, item) in items.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        match panic::catch_unwind(AssertUnwindSafe(|| func(item).failure())) {
            Ok(None) => {}
            Ok(Some(message)) => {
                error!("unit of work {} failed: {}", i, message);
                failures += 1;
            }
            Err(_) => {
                error!("unit of work {} panicked", i);
                failures += 1;
            }
        }
    }
    failures
}

/// Fork a worker that runs `body` and exits; returns its pid in the parent.
fn fork_worker<F>(body: F) -> io::Result<libc::pid_t>
where
    F: FnOnce() -> usize,
{
    // anything still buffered would otherwise be written twice
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    // SAFETY: the child only runs `body` and then leaves through `_exit`,
    // never returning into the caller's stack frames.
    match unsafe { libc::fork() } {
        -1 => Err(io::Error::last_os_error()),
        0 => {
            let code = match panic::catch_unwind(AssertUnwindSafe(body)) {
                Ok(0) => 0,
                Ok(_) => 1,
                Err(_) => 2,
            };
            let _ = io::stdout().flush();
            let _ = io::stderr().flush();
            // SAFETY: terminating the child without running the parent's
            // atexit handlers or destructors.
            unsafe { libc::_exit(code) }
        }
        pid => Ok(pid),
    }
}

/// Result of waiting for one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reaped {
    /// The worker ended with this exit code (128 + signal if killed)
    Exited(i32),
    /// The pid is not (or no longer) a child of this process
    NotAChild,
    /// The wait was interrupted by a signal; try again
    Interrupted,
}

fn wait_for(pid: libc::pid_t) -> Result<Reaped> {
    let mut status: libc::c_int = 0;
    // SAFETY: `status` is a valid out-pointer for the duration of the call.
    let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
    if rc == -1 {
        let err = io::Error::last_os_error();
        return match err.raw_os_error() {
            Some(libc::ECHILD) => Ok(Reaped::NotAChild),
            Some(libc::EINTR) => Ok(Reaped::Interrupted),
            _ => Err(Error::Wait {
                message: err.to_string(),
            }),
        };
    }

    let code = if libc::WIFEXITED(status) {
        libc::WEXITSTATUS(status)
    } else if libc::WIFSIGNALED(status) {
        128 + libc::WTERMSIG(status)
    } else {
        1
    };
    Ok(Reaped::Exited(code))
}

/// Wait until no outstanding workers remain. Returns the ranks of workers
/// that exited non-zero, sorted.
///
/// A worker that is no longer our child was reaped elsewhere; its status is
/// lost, it counts as done, and the others are still waited for.
fn join(outstanding: &mut HashMap<libc::pid_t, usize>) -> Result<Vec<usize>> {
    let mut failed = Vec::new();

    loop {
        let next = outstanding.iter().next().map(|(&pid, &rank)| (pid, rank));
        let Some((pid, rank)) = next else {
            break;
        };
        match wait_for(pid)? {
            Reaped::Exited(code) => {
                outstanding.remove(&pid);
                if code != 0 {
                    warn!("worker {} (pid {}) exited with status {}", rank, pid, code);
                    failed.push(rank);
                }
            }
            Reaped::Interrupted => continue,
            Reaped::NotAChild => {
                debug!("worker {} (pid {}) was already reaped, considered done", rank, pid);
                outstanding.remove(&pid);
            }
        }
    }

    failed.sort_unstable();
    Ok(failed)
}
