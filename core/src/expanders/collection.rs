//! Collection and composition expanders.
//!
//! `repeat` and `match` accept either a literal pattern or a nested expander.
//! Literal patterns compare structurally: object patterns require their keys
//! to be present (strict mode also forbids extra keys), array patterns compare
//! element-wise, scalars compare with [`Value::loosely_equals`].

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    Argument, Arguments, Backtrace, ExpanderError, IntoExpander, PatternExpander, Reporter, Value,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Patterns
// ═══════════════════════════════════════════════════════════════════════════════

/// A literal or nested-expander pattern.
#[derive(Debug)]
enum Pattern {
    Literal(Value),
    Expander(Box<dyn PatternExpander>),
}

impl Pattern {
    /// Take the first argument as the pattern.
    fn first(args: Arguments) -> Result<Self, ExpanderError> {
        let missing = args.invalid("argument 1 is missing");
        match args.into_vec().into_iter().next() {
            Some(Argument::Literal(value)) => Ok(Self::Literal(value)),
            Some(Argument::Expander(expander)) => Ok(Self::Expander(expander)),
            None => Err(missing),
        }
    }

    fn check(&self, actual: &Value, strict: bool) -> Result<(), String> {
        match self {
            Self::Literal(pattern) => structural(pattern, actual, strict),
            Self::Expander(expander) => {
                if expander.matches(actual) {
                    Ok(())
                } else {
                    Err(expander.error().unwrap_or_else(|| {
                        format!("value {actual} does not match #{}", expander.name())
                    }))
                }
            }
        }
    }
}

fn structural(pattern: &Value, actual: &Value, strict: bool) -> Result<(), String> {
    match (pattern, actual) {
        (Value::Object(expected), Value::Object(found)) => {
            for (key, inner) in expected {
                let Some(value) = found.get(key) else {
                    return Err(format!("missing key \"{key}\" in {actual}"));
                };
                structural(inner, value, strict)
                    .map_err(|err| format!("at key \"{key}\": {err}"))?;
            }
            if strict {
                if let Some(extra) = found.keys().find(|key| !expected.contains_key(*key)) {
                    return Err(format!("unexpected key \"{extra}\" in {actual}"));
                }
            }
            Ok(())
        }
        (Value::Array(expected), Value::Array(found)) => {
            if expected.len() != found.len() {
                return Err(format!(
                    "array {actual} has {} elements, expected {}",
                    found.len(),
                    expected.len()
                ));
            }
            for (index, (inner, value)) in expected.iter().zip(found).enumerate() {
                structural(inner, value, strict)
                    .map_err(|err| format!("at index {index}: {err}"))?;
            }
            Ok(())
        }
        _ if pattern.loosely_equals(actual) => Ok(()),
        _ => Err(format!("value {actual} does not match {pattern}")),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Membership and size
// ═══════════════════════════════════════════════════════════════════════════════

/// `@inArray(value)`: the actual array contains `value`.
#[derive(Debug)]
pub struct InArray {
    reporter: Reporter,
    needle: Value,
}

impl InArray {
    fn check(&self, value: &Value) -> Result<(), String> {
        let items = value
            .as_array()
            .ok_or_else(|| format!("{} {value} is not a valid array", value.type_name()))?;
        if items.iter().any(|item| item.loosely_equals(&self.needle)) {
            Ok(())
        } else {
            Err(format!("array {value} doesn't contain {}", self.needle))
        }
    }
}

impl IntoExpander for InArray {
    const NAME: &'static str = "inArray";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(1, 1)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            needle: args.literal(0)?.clone(),
        })
    }
}

/// `@count(n)`: the actual array or object has exactly `n` elements.
#[derive(Debug)]
pub struct Count {
    reporter: Reporter,
    expected: usize,
}

impl Count {
    fn check(&self, value: &Value) -> Result<(), String> {
        let len = match value {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => return Err(format!("{} {value} is not a valid array", value.type_name())),
        };
        if len == self.expected {
            Ok(())
        } else {
            Err(format!(
                "{} {value} has {len} elements, expected {}",
                value.type_name(),
                self.expected
            ))
        }
    }
}

impl IntoExpander for Count {
    const NAME: &'static str = "count";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(1, 1)?;
        let raw = args.int(0)?;
        let expected = usize::try_from(raw)
            .map_err(|_| args.invalid(format!("count must not be negative, got {raw}")))?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            expected,
        })
    }
}

/// `@hasProperty("key")`: the actual object has `key`.
#[derive(Debug)]
pub struct HasProperty {
    reporter: Reporter,
    key: String,
}

impl HasProperty {
    fn check(&self, value: &Value) -> Result<(), String> {
        let map = value
            .as_object()
            .ok_or_else(|| format!("{} {value} is not a valid object", value.type_name()))?;
        if map.contains_key(&self.key) {
            Ok(())
        } else {
            Err(format!("object {value} has no property \"{}\"", self.key))
        }
    }
}

impl IntoExpander for HasProperty {
    const NAME: &'static str = "hasProperty";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(1, 1)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            key: args.string(0)?.to_owned(),
        })
    }
}

/// `@isEmpty()`: null, `""`, `[]` or `{}`.
#[derive(Debug)]
pub struct IsEmpty {
    reporter: Reporter,
}

impl IsEmpty {
    fn check(&self, value: &Value) -> Result<(), String> {
        if value.is_empty() {
            Ok(())
        } else {
            Err(format!("value {value} is not empty"))
        }
    }
}

impl IntoExpander for IsEmpty {
    const NAME: &'static str = "isEmpty";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(0, 0)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

/// `@isNotEmpty()`
#[derive(Debug)]
pub struct IsNotEmpty {
    reporter: Reporter,
}

impl IsNotEmpty {
    fn check(&self, value: &Value) -> Result<(), String> {
        if value.is_empty() {
            Err(format!("value {value} is empty"))
        } else {
            Ok(())
        }
    }
}

impl IntoExpander for IsNotEmpty {
    const NAME: &'static str = "isNotEmpty";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(0, 0)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

/// `@optional()`: marks a field as optional; matches anything.
#[derive(Debug)]
pub struct Optional {
    reporter: Reporter,
}

impl Optional {
    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    fn check(&self, _value: &Value) -> Result<(), String> {
        Ok(())
    }
}

impl IntoExpander for Optional {
    const NAME: &'static str = "optional";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(0, 0)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Composition
// ═══════════════════════════════════════════════════════════════════════════════

/// `@oneOf(@a(), @b(), ...)`: any nested expander matches.
///
/// Children are tried in order and short-circuit on the first match.
#[derive(Debug)]
pub struct OneOf {
    reporter: Reporter,
    expanders: Vec<Box<dyn PatternExpander>>,
}

impl OneOf {
    fn check(&self, value: &Value) -> Result<(), String> {
        let mut errors = Vec::with_capacity(self.expanders.len());
        for expander in &self.expanders {
            if expander.matches(value) {
                return Ok(());
            }
            errors.push(
                expander
                    .error()
                    .unwrap_or_else(|| format!("#{} did not match", expander.name())),
            );
        }
        Err(format!(
            "none of the expanders matched: {}",
            errors.join("; ")
        ))
    }
}

impl IntoExpander for OneOf {
    const NAME: &'static str = "oneOf";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.at_least(2)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            expanders: args.into_expanders()?,
        })
    }
}

/// `@repeat(pattern, strict?)`: every element of the actual array matches.
///
/// `strict` (default `true`) forbids keys that the pattern does not name when
/// the pattern is a literal object. Each instance counts the elements matched
/// by its most recent call.
#[derive(Debug)]
pub struct Repeat {
    reporter: Reporter,
    pattern: Pattern,
    strict: bool,
    matched: AtomicUsize,
}

impl Repeat {
    /// Elements matched by the most recent [`matches`](PatternExpander::matches) call.
    #[must_use]
    pub fn matched(&self) -> usize {
        self.matched.load(Ordering::Relaxed)
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        self.matched.store(0, Ordering::Relaxed);
        let items = value
            .as_array()
            .ok_or_else(|| format!("{} {value} is not a valid array", value.type_name()))?;
        for (index, item) in items.iter().enumerate() {
            self.pattern
                .check(item, self.strict)
                .map_err(|err| format!("repeat element {index}: {err}"))?;
            self.matched.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

impl IntoExpander for Repeat {
    const NAME: &'static str = "repeat";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(1, 2)?;
        let strict = args.optional_bool(1, true)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            pattern: Pattern::first(args)?,
            strict,
            matched: AtomicUsize::new(0),
        })
    }
}

/// `@match(pattern)`: the actual value structurally contains `pattern`.
#[derive(Debug)]
pub struct StructuralMatch {
    reporter: Reporter,
    pattern: Pattern,
}

impl StructuralMatch {
    fn check(&self, value: &Value) -> Result<(), String> {
        self.pattern.check(value, false)
    }
}

impl IntoExpander for StructuralMatch {
    const NAME: &'static str = "match";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(1, 1)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            pattern: Pattern::first(args)?,
        })
    }
}

reporting_expander!(
    InArray,
    Count,
    HasProperty,
    IsEmpty,
    IsNotEmpty,
    Optional,
    OneOf,
    Repeat,
    StructuralMatch,
);
