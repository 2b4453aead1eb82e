//! # Recovery Module
//!
//! Turns a panic inside a closure into a value, with the panic message and a stack
//! trace attached, instead of tearing down the coroutine or thread.
//!
//! ```rust
//! use patternkit::recovery::recover;
//!
//! let err = recover("demo", || -> u32 { panic!("boom") }).unwrap_err();
//! assert_eq!(err.message, "boom");
//! assert!(err.to_string().starts_with("Recovered from panic: boom"));
//! ```
//!
//! Every recovered panic is logged at `error` level with the `context` label,
//! the message and the backtrace. The process-wide panic hook still runs, so the
//! default hook's stderr line also appears unless a custom hook is installed.
//!
//! The backtrace is taken inside a panic hook, before unwinding, so it shows
//! the frame that panicked. The hook is installed on the first call to
//! [`recover`] and chains to whatever hook was set before it.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Once;
use tracing::error;

thread_local! {
    /// Backtrace of the latest panic on this thread. A coroutine can resume on
    /// another worker after a yield, but a panic and its unwind to
    /// `catch_unwind` never yield, so both sides see the same slot.
    static PANIC_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

fn install_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::force_capture();
            // Fails only during thread teardown, when no `recover` is left to read it.
            let _recorded = PANIC_BACKTRACE
                .try_with(|slot| *slot.borrow_mut() = Some(backtrace))
                .is_ok();
            previous(info);
        }));
    });
}

/// A panic caught by [`recover`].
#[derive(Debug)]
pub struct Recovered {
    /// Panic payload rendered as text
    pub message: String,
    /// Stack captured at the panic site
    pub backtrace: Backtrace,
}

impl fmt::Display for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recovered from panic: {}", self.message)?;
        writeln!(f, "Stack trace:")?;
        write!(f, "{}", self.backtrace)
    }
}

impl std::error::Error for Recovered {}

/// Render a panic payload as text.
///
/// `panic!` with a literal yields `&str`, with format arguments `String`;
/// anything else (e.g. `std::panic::panic_any(42)`) has no textual form.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Run `f`, converting a panic into [`Recovered`].
///
/// # Errors
///
/// Returns [`Recovered`] if `f` panicked.
pub fn recover<T, F>(context: &str, f: F) -> Result<T, Recovered>
where
    F: FnOnce() -> T,
{
    install_hook();
    PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = None);
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let backtrace = PANIC_BACKTRACE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(Backtrace::force_capture);
        let recovered = Recovered {
            message: panic_message(payload.as_ref()),
            backtrace,
        };
        error!(
            context = %context,
            panic_message = %recovered.message,
            backtrace = %recovered.backtrace,
            "Recovered from panic"
        );
        recovered
    })
}
