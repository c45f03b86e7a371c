//! `PatternExpander` — the capability every resolved expander provides.
//!
//! An expander is a named, possibly parameterized predicate over a [`Value`]
//! (`@startsWith("foo")`, `@oneOf(...)`). Expanders are constructed by the
//! resolver from a list of already-resolved [`Argument`]s and the shared
//! [`Backtrace`] of the current match operation.
//!
//! # Construction
//!
//! Implementations opt into registry construction via [`IntoExpander`]: each
//! one validates its own arity and argument types through [`Arguments`], so a
//! bad pattern is reported by the expander that understands it.

use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

use crate::{Backtrace, ExpanderError, Value};

/// Matches actual values and records the outcome into the shared backtrace.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; per-instance state (last error,
/// counters) lives behind interior mutability.
///
/// # Example
///
/// ```
/// use patex::{Backtrace, ExpanderNode, ExpanderRegistry, PatternExpander};
///
/// let registry = ExpanderRegistry::new();
/// let expander = registry
///     .resolve(&ExpanderNode::new("startsWith").arg("foo"), Backtrace::new())
///     .unwrap();
///
/// assert!(expander.matches(&"foobar".into()));
/// assert!(!expander.matches(&"barfoo".into()));
/// assert!(expander.error().is_some());
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `PatternExpander`",
    label = "this type cannot be resolved as an expander",
    note = "implement `matches(&self, &Value) -> bool`, `error()`, `backtrace()` and `name()`"
)]
pub trait PatternExpander: Send + Sync + Debug {
    /// The name this expander reports under in the backtrace.
    fn name(&self) -> &str;

    /// Check if the given value matches.
    fn matches(&self, value: &Value) -> bool;

    /// Why the most recent [`matches`](Self::matches) call returned `false`.
    ///
    /// `None` before the first call and after a successful one.
    fn error(&self) -> Option<String>;

    /// The diagnostic trail this expander records into.
    fn backtrace(&self) -> &Backtrace;
}

#[diagnostic::do_not_recommend]
impl PatternExpander for Box<dyn PatternExpander> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn matches(&self, value: &Value) -> bool {
        (**self).matches(value)
    }

    fn error(&self) -> Option<String> {
        (**self).error()
    }

    fn backtrace(&self) -> &Backtrace {
        (**self).backtrace()
    }
}

/// Constructs a [`PatternExpander`] from resolved arguments.
///
/// Registering a type through this trait (see
/// [`ExpanderRegistry::register_expander`](crate::ExpanderRegistry::register_expander))
/// enforces the expander capability at compile time.
///
/// # Example
///
/// ```ignore
/// impl IntoExpander for IsEven {
///     const NAME: &'static str = "isEven";
///
///     fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
///         args.arity(0, 0)?;
///         Ok(IsEven { reporter: Reporter::new(Self::NAME, backtrace) })
///     }
/// }
/// ```
pub trait IntoExpander: PatternExpander + Sized + 'static {
    /// Stable name of this implementation (also its catalog identifier).
    const NAME: &'static str;

    /// Construct the expander.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::ArgumentCount`] or [`ExpanderError::InvalidArgument`]
    /// when the arguments don't fit this expander.
    fn from_arguments(arguments: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Arguments
// ═══════════════════════════════════════════════════════════════════════════════

/// A resolved constructor argument.
#[derive(Debug)]
pub enum Argument {
    /// A literal copied from the AST.
    Literal(Value),
    /// A live expander resolved from a nested AST node.
    Expander(Box<dyn PatternExpander>),
}

impl Argument {
    /// Short description of the argument kind, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Literal(value) => value.type_name(),
            Self::Expander(_) => "expander",
        }
    }
}

/// Positional, resolved arguments handed to an expander constructor.
///
/// Carries the name of the expander being built so that accessor errors name
/// it without every implementation repeating itself.
#[derive(Debug)]
pub struct Arguments {
    expander: String,
    items: Vec<Argument>,
}

impl Arguments {
    /// Wrap resolved arguments for the named expander.
    pub fn new(expander: impl Into<String>, items: Vec<Argument>) -> Self {
        Self {
            expander: expander.into(),
            items,
        }
    }

    /// Name of the expander being constructed.
    #[must_use]
    pub fn expander(&self) -> &str {
        &self.expander
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrow the argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.items.get(index)
    }

    /// Check the argument count is within `min..=max`.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::ArgumentCount`] otherwise.
    pub fn arity(&self, min: usize, max: usize) -> Result<(), ExpanderError> {
        self.check_count(min, Some(max))
    }

    /// Check there are at least `min` arguments.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::ArgumentCount`] otherwise.
    pub fn at_least(&self, min: usize) -> Result<(), ExpanderError> {
        self.check_count(min, None)
    }

    /// The literal at `index`.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::InvalidArgument`] if it is missing or a nested expander.
    pub fn literal(&self, index: usize) -> Result<&Value, ExpanderError> {
        match self.items.get(index) {
            Some(Argument::Literal(value)) => Ok(value),
            Some(other) => Err(self.invalid(format!(
                "argument {} must be a literal, got {}",
                index + 1,
                other.kind()
            ))),
            None => Err(self.invalid(format!("argument {} is missing", index + 1))),
        }
    }

    /// The string literal at `index`.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::InvalidArgument`] if it is not a string.
    pub fn string(&self, index: usize) -> Result<&str, ExpanderError> {
        let value = self.literal(index)?;
        value.as_str().ok_or_else(|| {
            self.invalid(format!(
                "argument {} must be a string, got {}",
                index + 1,
                value.type_name()
            ))
        })
    }

    /// The numeric literal at `index`. Numeric strings are accepted.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::InvalidArgument`] if it is not a number.
    pub fn number(&self, index: usize) -> Result<f64, ExpanderError> {
        let value = self.literal(index)?;
        let number = match value {
            Value::Int(_) | Value::Float(_) | Value::String(_) => value.as_number(),
            _ => None,
        };
        number.ok_or_else(|| {
            self.invalid(format!(
                "argument {} must be a number, got {value}",
                index + 1
            ))
        })
    }

    /// The integer literal at `index`.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::InvalidArgument`] if it is not an integer.
    pub fn int(&self, index: usize) -> Result<i64, ExpanderError> {
        let value = self.literal(index)?;
        value.as_int().ok_or_else(|| {
            self.invalid(format!(
                "argument {} must be an integer, got {}",
                index + 1,
                value.type_name()
            ))
        })
    }

    /// The boolean literal at `index`, or `default` when absent.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::InvalidArgument`] if present but not a boolean.
    pub fn optional_bool(&self, index: usize, default: bool) -> Result<bool, ExpanderError> {
        if index >= self.items.len() {
            return Ok(default);
        }
        let value = self.literal(index)?;
        value.as_bool().ok_or_else(|| {
            self.invalid(format!(
                "argument {} must be a boolean, got {}",
                index + 1,
                value.type_name()
            ))
        })
    }

    /// Consume the arguments, requiring every one to be a nested expander.
    ///
    /// # Errors
    ///
    /// [`ExpanderError::InvalidArgument`] naming the first literal found.
    pub fn into_expanders(self) -> Result<Vec<Box<dyn PatternExpander>>, ExpanderError> {
        let Self { expander, items } = self;
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Argument::Expander(e) => Ok(e),
                Argument::Literal(value) => Err(ExpanderError::InvalidArgument {
                    expander: expander.clone(),
                    reason: format!(
                        "argument {} must be an expander, got {}",
                        index + 1,
                        value.type_name()
                    ),
                }),
            })
            .collect()
    }

    /// Consume the arguments.
    #[must_use]
    pub fn into_vec(self) -> Vec<Argument> {
        self.items
    }

    /// Build an [`ExpanderError::InvalidArgument`] for this expander.
    #[must_use]
    pub fn invalid(&self, reason: impl Into<String>) -> ExpanderError {
        ExpanderError::InvalidArgument {
            expander: self.expander.clone(),
            reason: reason.into(),
        }
    }

    fn check_count(&self, min: usize, max: Option<usize>) -> Result<(), ExpanderError> {
        let got = self.items.len();
        if got < min || max.is_some_and(|max| got > max) {
            return Err(ExpanderError::ArgumentCount {
                expander: self.expander.clone(),
                min,
                max,
                got,
            });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Reporter
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-instance diagnostics: last error plus the shared backtrace handle.
///
/// Built-in expanders embed one and route every outcome through it, which
/// keeps the backtrace entries and [`PatternExpander::error`] consistent.
#[derive(Debug)]
pub struct Reporter {
    name: &'static str,
    backtrace: Backtrace,
    error: Mutex<Option<String>>,
}

impl Reporter {
    /// Create a reporter for `name` recording into `backtrace`.
    #[must_use]
    pub fn new(name: &'static str, backtrace: &Backtrace) -> Self {
        Self {
            name,
            backtrace: backtrace.clone(),
            error: Mutex::new(None),
        }
    }

    /// Expander name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The shared backtrace.
    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Last recorded error.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.slot().clone()
    }

    /// Record the start of a match.
    pub fn entrance(&self, value: &Value) {
        self.backtrace.expander_entrance(self.name, value);
    }

    /// Record a successful match and return `true`.
    pub fn succeed(&self, value: &Value) -> bool {
        *self.slot() = None;
        self.backtrace.expander_succeed(self.name, value);
        true
    }

    /// Record a failed match and return `false`.
    pub fn fail(&self, value: &Value, error: impl Into<String>) -> bool {
        let error = error.into();
        self.backtrace.expander_failed(self.name, value, error.clone());
        *self.slot() = Some(error);
        false
    }

    /// Record the outcome of `check`: `Ok` succeeds, `Err` fails with its message.
    pub fn finish(&self, value: &Value, check: Result<(), String>) -> bool {
        match check {
            Ok(()) => self.succeed(value),
            Err(error) => self.fail(value, error),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.error.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
