//! # Pipeline Module
//!
//! Channel-connected producer and transform stages running on `may` coroutines.
//!
//! ## Overview
//!
//! - [`generator`] spawns a coroutine that emits a fixed sequence of items and
//!   then closes its channel.
//! - [`step`] spawns a coroutine that reads every item from an upstream
//!   [`Stage`], applies a function, and forwards the result downstream.
//!
//! Stages chain into pipelines; the downstream end is consumed as an
//! [`Iterator`]:
//!
//! ```rust,no_run
//! use patternkit::pipeline::{generator, step};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let numbers = generator(vec![1, 2, 3])?;
//! let squares = step(numbers, |n: i32| n * n)?;
//! assert_eq!(squares.collect_checked()?, vec![1, 4, 9]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Semantics
//!
//! - Channels are unbounded `may::sync::mpsc` channels; producers never block.
//! - Items arrive in production order through any chain of steps.
//! - A stage closes when its producer finishes; a closed upstream closes every
//!   downstream step in turn.
//! - A panic in a producer (the generator's iterator or a step's function) is
//!   recovered and closes the stage early. The failure is recorded before the
//!   channel closes and travels down the chain, so the consumer can tell a
//!   truncated stream from a complete one with [`Stage::failure`] or
//!   [`Stage::collect_checked`].
//! - Dropping a [`Stage`] is the only cancellation path: the producer's next send
//!   fails and it stops.

use may::coroutine;
use may::sync::mpsc;
use std::fmt;
use std::io;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, warn};

use crate::recovery::recover;
use crate::runtime_config::RuntimeConfig;

/// A producer that stopped early because it panicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    /// Name of the stage that panicked
    pub stage: String,
    /// Panic message
    pub message: String,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pipeline stage '{}' stopped early: {}",
            self.stage, self.message
        )
    }
}

impl std::error::Error for StageFailure {}

/// Receiving end of a pipeline stage.
///
/// Iterating blocks the current coroutine (or thread) until the next item is
/// available and yields `None` once the producer has closed the channel.
pub struct Stage<T> {
    rx: mpsc::Receiver<T>,
    failure: Arc<OnceLock<StageFailure>>,
}

impl<T> Stage<T> {
    /// Wrap an existing receiver, e.g. one fed by hand-written producer code.
    #[must_use]
    pub fn from_receiver(rx: mpsc::Receiver<T>) -> Self {
        Self {
            rx,
            failure: Arc::new(OnceLock::new()),
        }
    }

    /// Why this stage, or one upstream of it, stopped early.
    ///
    /// Only final once iteration has returned `None`.
    #[must_use]
    pub fn failure(&self) -> Option<&StageFailure> {
        self.failure.get()
    }

    /// Drain the stage into a vector, blocking until the producer closes.
    ///
    /// A truncated stream is returned as-is; see [`Stage::collect_checked`].
    #[must_use]
    pub fn collect_all(self) -> Vec<T> {
        self.collect()
    }

    /// Drain the stage, failing if any stage of the chain stopped early.
    ///
    /// # Errors
    ///
    /// Returns the [`StageFailure`] recorded by the panicking stage.
    pub fn collect_checked(mut self) -> Result<Vec<T>, StageFailure> {
        let items: Vec<T> = self.by_ref().collect();
        match self.failure.get() {
            Some(failure) => Err(failure.clone()),
            None => Ok(items),
        }
    }
}

impl<T> Iterator for Stage<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.rx.recv().ok()
    }
}

fn record_failure(slot: &OnceLock<StageFailure>, failure: StageFailure) {
    if slot.set(failure).is_err() {
        debug!("Stage failure already recorded");
    }
}

fn spawn_stage<F>(name: &str, stack_size: usize, body: F) -> io::Result<()>
where
    F: FnOnce() + Send + 'static,
{
    // SAFETY: may::coroutine::Builder::spawn() is unsafe because coroutines must
    // not hold thread-local references across yields. The body only owns its
    // channel endpoints and the captured closure, all of which are Send + 'static.
    let handle = unsafe {
        coroutine::Builder::new()
            .name(name.to_string())
            .stack_size(stack_size)
            .spawn(body)
    }?;
    // Stages are detached; the channel is the only link to the consumer.
    drop(handle);
    Ok(())
}

/// Emit every item of `items` on a new stage, then close it.
///
/// # Errors
///
/// Returns the coroutine builder's error if the producer cannot be spawned.
pub fn generator<T, I>(items: I) -> io::Result<Stage<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
{
    const NAME: &str = "pipeline-generator";
    let stack_size = RuntimeConfig::from_env().stack_size;
    let (tx, rx) = mpsc::channel();
    let failure = Arc::new(OnceLock::new());
    let failure_slot = Arc::clone(&failure);
    let items = items.into_iter();

    spawn_stage(NAME, stack_size, move || {
        let mut sent = 0usize;
        let outcome = recover(NAME, || {
            for item in items {
                if tx.send(item).is_err() {
                    debug!(sent, "Generator consumer dropped - stopping");
                    return;
                }
                sent += 1;
            }
            debug!(sent, "Generator exhausted");
        });
        if let Err(recovered) = outcome {
            error!(
                sent,
                panic_message = %recovered.message,
                "Generator panicked - closing stage early"
            );
            record_failure(
                &failure_slot,
                StageFailure {
                    stage: NAME.to_string(),
                    message: recovered.message,
                },
            );
        }
        // The failure is visible before the consumer sees the channel close.
        drop(tx);
    })?;

    Ok(Stage { rx, failure })
}

/// Map every item of `input` through `function` on a new stage.
///
/// The output closes after `input` closes and its last item was forwarded. If
/// `function` panics the output closes at that item and records a
/// [`StageFailure`]; an upstream failure is passed on unchanged.
///
/// # Errors
///
/// Returns the coroutine builder's error if the worker cannot be spawned.
pub fn step<T, U, F>(input: Stage<T>, function: F) -> io::Result<Stage<U>>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + 'static,
{
    const NAME: &str = "pipeline-step";
    let stack_size = RuntimeConfig::from_env().stack_size;
    let (tx, rx) = mpsc::channel();
    let failure = Arc::new(OnceLock::new());
    let failure_slot = Arc::clone(&failure);

    spawn_stage(NAME, stack_size, move || {
        let mut forwarded = 0usize;
        let outcome = recover(NAME, || {
            let mut input = input;
            for item in input.by_ref() {
                if tx.send(function(item)).is_err() {
                    debug!(forwarded, "Step consumer dropped - stopping");
                    return None;
                }
                forwarded += 1;
            }
            input.failure().cloned()
        });
        match outcome {
            Ok(None) => debug!(forwarded, "Step upstream closed"),
            Ok(Some(upstream)) => {
                warn!(forwarded, upstream = %upstream, "Step upstream stopped early");
                record_failure(&failure_slot, upstream);
            }
            Err(recovered) => {
                error!(
                    forwarded,
                    panic_message = %recovered.message,
                    "Step function panicked - closing stage early"
                );
                record_failure(
                    &failure_slot,
                    StageFailure {
                        stage: NAME.to_string(),
                        message: recovered.message,
                    },
                );
            }
        }
        // The failure is visible before the consumer sees the channel close.
        drop(tx);
    })?;

    Ok(Stage { rx, failure })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let failure = StageFailure {
            stage: "pipeline-step".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "pipeline stage 'pipeline-step' stopped early: boom"
        );
    }

    #[test]
    fn test_hand_fed_stage_has_no_failure() {
        let (tx, rx) = mpsc::channel();
        let stage = Stage::from_receiver(rx);
        tx.send(1).unwrap();
        drop(tx);
        assert!(stage.failure().is_none());
        assert_eq!(stage.collect_checked().unwrap(), vec![1]);
    }
}
