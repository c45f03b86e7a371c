//! Backtrace — shared diagnostic trail for one match operation.
//!
//! Every expander produced by a single [`resolve()`](crate::ExpanderResolver::resolve)
//! call holds a clone of the same [`Backtrace`] handle. Clones share one
//! append-only log, so nested expanders (`oneOf(startsWith("a"), ...)`)
//! report through a single trail that the caller can render after matching.
//!
//! # Example
//!
//! ```
//! use patex::{Backtrace, Value};
//!
//! let backtrace = Backtrace::new();
//! let shared = backtrace.clone();
//!
//! shared.expander_entrance("isEmail", &Value::from("nope"));
//! shared.expander_failed("isEmail", &Value::from("nope"), "\"nope\" is not a valid email address");
//!
//! assert_eq!(backtrace.len(), 2);
//! assert!(backtrace.same_as(&shared));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::Value;

/// One recorded event in a [`Backtrace`].
#[derive(Debug, Clone, PartialEq)]
pub enum BacktraceEntry {
    /// An expander started matching a value.
    Entrance {
        /// Expander name (e.g. `"startsWith"`).
        expander: String,
        /// The value being matched.
        value: Value,
    },
    /// An expander matched the value.
    Succeed {
        /// Expander name.
        expander: String,
        /// The value that matched.
        value: Value,
    },
    /// An expander rejected the value.
    Failed {
        /// Expander name.
        expander: String,
        /// The value that was rejected.
        value: Value,
        /// Why the value was rejected.
        error: String,
    },
}

impl BacktraceEntry {
    /// Name of the expander that recorded this entry.
    #[must_use]
    pub fn expander(&self) -> &str {
        match self {
            Self::Entrance { expander, .. }
            | Self::Succeed { expander, .. }
            | Self::Failed { expander, .. } => expander,
        }
    }

    /// Returns `true` for [`BacktraceEntry::Failed`].
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for BacktraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entrance { expander, value } => {
                write!(f, "#{expander} expander entrance: value {value}")
            }
            Self::Succeed { expander, value } => {
                write!(f, "#{expander} expander succeed: value {value}")
            }
            Self::Failed {
                expander,
                value,
                error,
            } => write!(f, "#{expander} expander failed: value {value}, error: {error}"),
        }
    }
}

/// Shared, append-only record of expander activity.
///
/// Cloning is cheap and yields a handle to the *same* log. Appends are
/// synchronized, so expanders may be matched from several threads.
#[derive(Clone, Default)]
pub struct Backtrace {
    entries: Arc<Mutex<Vec<BacktraceEntry>>>,
}

impl Backtrace {
    /// Create a new, empty backtrace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `expander` started matching `value`.
    pub fn expander_entrance(&self, expander: &str, value: &Value) {
        self.push(BacktraceEntry::Entrance {
            expander: expander.to_owned(),
            value: value.clone(),
        });
    }

    /// Record that `expander` matched `value`.
    pub fn expander_succeed(&self, expander: &str, value: &Value) {
        self.push(BacktraceEntry::Succeed {
            expander: expander.to_owned(),
            value: value.clone(),
        });
    }

    /// Record that `expander` rejected `value` with `error`.
    pub fn expander_failed(&self, expander: &str, value: &Value, error: impl Into<String>) {
        self.push(BacktraceEntry::Failed {
            expander: expander.to_owned(),
            value: value.clone(),
            error: error.into(),
        });
    }

    /// Snapshot of all entries recorded so far, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<BacktraceEntry> {
        self.lock().clone()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns `true` if both handles point to the same log.
    #[must_use]
    pub fn same_as(&self, other: &Backtrace) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    fn push(&self, entry: BacktraceEntry) {
        self.lock().push(entry);
    }

    // push is the only mutation; a poisoned log is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<BacktraceEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl fmt::Debug for Backtrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backtrace")
            .field("entries", &self.len())
            .finish()
    }
}

impl fmt::Display for Backtrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.lock().iter() {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
