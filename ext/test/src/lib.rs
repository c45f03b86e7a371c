//! patex-test: test expanders and conformance fixtures
//!
//! Provides expanders that exist only to observe the resolver, plus the YAML
//! fixture runner (feature = `"fixtures"`) that checks every built-in.
//!
//! # Example
//!
//! ```
//! use patex_test::prelude::*;
//!
//! let mut registry = ExpanderRegistry::new();
//! patex_test::register(&mut registry);
//!
//! let node = ExpanderNode::new("record").arg("a").arg(2);
//! let expander = registry.resolve(&node, Backtrace::new()).unwrap();
//! assert!(expander.matches(&Value::Null));
//! ```

use patex::prelude::*;
use patex::Constructed;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Expander name bound to [`Record`] by [`register`].
pub const RECORD: &str = "record";

/// Expander name bound to a non-conforming implementation by [`register`].
pub const NOT_AN_EXPANDER: &str = "notAnExpander";

/// Accepts any arguments and matches everything.
///
/// Keeps the literals it was constructed with and how many nested expanders it
/// received, so tests can assert on what the resolver handed over.
#[derive(Debug)]
pub struct Record {
    reporter: Reporter,
    literals: Vec<Value>,
    nested: usize,
}

impl Record {
    /// Literal arguments, in order.
    #[must_use]
    pub fn literals(&self) -> &[Value] {
        &self.literals
    }

    /// Number of nested expander arguments.
    #[must_use]
    pub fn nested(&self) -> usize {
        self.nested
    }
}

impl PatternExpander for Record {
    fn name(&self) -> &str {
        self.reporter.name()
    }

    fn matches(&self, value: &Value) -> bool {
        self.reporter.entrance(value);
        self.reporter.succeed(value)
    }

    fn error(&self) -> Option<String> {
        self.reporter.error()
    }

    fn backtrace(&self) -> &Backtrace {
        self.reporter.backtrace()
    }
}

impl IntoExpander for Record {
    const NAME: &'static str = RECORD;

    fn from_arguments(arguments: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        let mut literals = Vec::new();
        let mut nested = 0;
        for argument in arguments.into_vec() {
            match argument {
                Argument::Literal(value) => literals.push(value),
                Argument::Expander(_) => nested += 1,
            }
        }
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            literals,
            nested,
        })
    }
}

/// Register the test expanders.
///
/// - `record` → [`Record`]
/// - `notAnExpander` → constructs a `String`, so resolving it fails with
///   [`ExpanderError::InvalidExpanderType`]
pub fn register(registry: &mut ExpanderRegistry) -> &mut ExpanderRegistry {
    registry
        .register_expander::<Record>(RECORD)
        .register_factory(
            NOT_AN_EXPANDER,
            Implementation::erased("alloc::string::String", |_args, _backtrace| {
                Ok(Box::new(String::from("not an expander")) as Constructed)
            }),
        )
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{Record, NOT_AN_EXPANDER, RECORD};
    pub use patex::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_literals_in_order() {
        let args = Arguments::new(
            RECORD,
            vec![
                Argument::Literal("a".into()),
                Argument::Literal(Value::Int(2)),
                Argument::Literal(Value::Bool(false)),
            ],
        );
        let record = Record::from_arguments(args, &Backtrace::new()).unwrap();
        assert_eq!(
            record.literals(),
            &[Value::from("a"), Value::Int(2), Value::Bool(false)]
        );
        assert_eq!(record.nested(), 0);
    }

    #[test]
    fn register_adds_test_expanders() {
        let mut registry = ExpanderRegistry::new();
        register(&mut registry);
        assert!(registry.contains(RECORD));
        assert!(registry.contains(NOT_AN_EXPANDER));
    }

    #[test]
    fn not_an_expander_fails_resolution() {
        let mut registry = ExpanderRegistry::new();
        register(&mut registry);
        let err = registry
            .resolve(&ExpanderNode::new(NOT_AN_EXPANDER).arg(1), Backtrace::new())
            .unwrap_err();
        assert!(matches!(err, ExpanderError::InvalidExpanderType { .. }));
    }
}
