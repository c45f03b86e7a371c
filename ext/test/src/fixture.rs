//! Conformance fixture runner
//!
//! Loads YAML fixtures and runs them against the patex resolver.
//!
//! ```yaml
//! name: starts_with_basic
//! description: startsWith matches string prefixes
//! expander:
//!   name: startsWith
//!   arguments: ["foo"]
//! cases:
//!   - { name: prefix, value: "foobar", expect: true }
//!   - { name: not_prefix, value: "barfoo", expect: false }
//! ---
//! name: unknown_expander
//! description: unregistered names fail resolution
//! expander: { name: bogus }
//! expect_error: { kind: UnknownExpander, contains: bogus }
//! ```

use patex::prelude::*;
use serde::Deserialize;

/// A complete test fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub name: String,
    pub description: String,
    pub expander: ExpanderNode,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    #[serde(default)]
    pub expect_error: Option<ExpectedError>,
}

/// Test case: one value and whether it should match
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    pub expect: bool,
}

/// Resolution is expected to fail
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedError {
    /// `ExpanderError` variant name, e.g. `UnknownExpander`
    pub kind: String,
    /// Substring the error message must contain
    #[serde(default)]
    pub contains: Option<String>,
}

/// Variant name of an [`ExpanderError`], as written in fixtures.
#[must_use]
pub fn error_kind(error: &ExpanderError) -> &'static str {
    match error {
        ExpanderError::UnknownImplementation { .. } => "UnknownImplementation",
        ExpanderError::UndefinedExpander { .. } => "UndefinedExpander",
        ExpanderError::UnknownExpander { .. } => "UnknownExpander",
        ExpanderError::InvalidExpanderType { .. } => "InvalidExpanderType",
        ExpanderError::ArgumentCount { .. } => "ArgumentCount",
        ExpanderError::InvalidArgument { .. } => "InvalidArgument",
        ExpanderError::InvalidPattern { .. } => "InvalidPattern",
        ExpanderError::InvalidConfig { .. } => "InvalidConfig",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: bool,
    pub actual: bool,
    /// Error recorded by the expander on a failed match
    pub error: Option<String>,
}

/// Outcome of a whole fixture
#[derive(Debug)]
pub enum FixtureOutcome {
    /// The expander resolved; one result per case
    Cases(Vec<CaseResult>),
    /// Resolution failed as expected
    ExpectedError(ExpanderError),
    /// Resolution failed but the fixture expected success
    UnexpectedError(ExpanderError),
    /// Resolution failed with the wrong error
    WrongError {
        expected: String,
        actual: ExpanderError,
    },
    /// Resolution succeeded but the fixture expected an error
    MissingError { expected: String },
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Registry the fixture runs against: built-ins plus the test expanders.
    #[must_use]
    pub fn registry() -> ExpanderRegistry {
        let mut registry = ExpanderRegistry::new();
        crate::register(&mut registry);
        registry
    }

    /// Resolve the expander and run all test cases
    pub fn run(&self) -> FixtureOutcome {
        let resolved = Self::registry().resolve(&self.expander, Backtrace::new());
        match (resolved, &self.expect_error) {
            (Ok(expander), None) => FixtureOutcome::Cases(
                self.cases
                    .iter()
                    .map(|case| {
                        let actual = expander.matches(&case.value);
                        CaseResult {
                            case_name: case.name.clone(),
                            passed: actual == case.expect,
                            expected: case.expect,
                            actual,
                            error: expander.error(),
                        }
                    })
                    .collect(),
            ),
            (Ok(_), Some(expected)) => FixtureOutcome::MissingError {
                expected: expected.kind.clone(),
            },
            (Err(err), None) => FixtureOutcome::UnexpectedError(err),
            (Err(err), Some(expected)) => {
                let message = err.to_string();
                let kind_ok = error_kind(&err) == expected.kind;
                let text_ok = expected
                    .contains
                    .as_deref()
                    .map_or(true, |needle| message.contains(needle));
                if kind_ok && text_ok {
                    FixtureOutcome::ExpectedError(err)
                } else {
                    FixtureOutcome::WrongError {
                        expected: expected.kind.clone(),
                        actual: err,
                    }
                }
            }
        }
    }

    /// Run the fixture and panic on first failure
    pub fn run_and_assert(&self) {
        match self.run() {
            FixtureOutcome::Cases(results) => {
                for result in results {
                    assert!(
                        result.passed,
                        "Fixture '{}' case '{}' failed: expected {}, got {} ({:?})",
                        self.name, result.case_name, result.expected, result.actual, result.error
                    );
                }
            }
            FixtureOutcome::ExpectedError(_) => {}
            FixtureOutcome::UnexpectedError(err) => {
                panic!("Fixture '{}' failed to resolve: {err}", self.name)
            }
            FixtureOutcome::WrongError { expected, actual } => panic!(
                "Fixture '{}' expected {expected} error, got {} ({actual})",
                self.name,
                error_kind(&actual)
            ),
            FixtureOutcome::MissingError { expected } => panic!(
                "Fixture '{}' expected {expected} error, but resolution succeeded",
                self.name
            ),
        }
    }

    /// Every expander name used anywhere in this fixture's tree.
    #[must_use]
    pub fn expander_names(&self) -> Vec<&str> {
        fn walk<'a>(node: &'a ExpanderNode, names: &mut Vec<&'a str>) {
            names.push(node.name());
            for argument in node.arguments() {
                if let ExpanderArgument::Expander(child) = argument {
                    walk(child, names);
                }
            }
        }
        let mut names = Vec::new();
        walk(&self.expander, &mut names);
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_run_cases() {
        let fixture = Fixture::from_yaml(
            r#"
name: one_of
description: either prefix
expander:
  name: oneOf
  arguments:
    - expander: { name: startsWith, arguments: ["a"] }
    - expander: { name: startsWith, arguments: ["b"] }
cases:
  - { name: a, value: "apple", expect: true }
  - { name: c, value: "cherry", expect: false }
"#,
        )
        .unwrap();
        assert_eq!(fixture.expander_names(), vec!["oneOf", "startsWith", "startsWith"]);
        fixture.run_and_assert();
    }

    #[test]
    fn expected_error_matches_kind_and_text() {
        let fixture = Fixture::from_yaml(
            r#"
name: bogus
description: unknown name
expander: { name: bogus }
expect_error: { kind: UnknownExpander, contains: bogus }
"#,
        )
        .unwrap();
        assert!(matches!(fixture.run(), FixtureOutcome::ExpectedError(_)));
    }

    #[test]
    fn wrong_error_kind_is_reported() {
        let fixture = Fixture::from_yaml(
            r#"
name: bogus
description: unknown name
expander: { name: bogus }
expect_error: { kind: ArgumentCount }
"#,
        )
        .unwrap();
        assert!(matches!(fixture.run(), FixtureOutcome::WrongError { .. }));
    }

    #[test]
    fn missing_value_is_null() {
        let fixture = Fixture::from_yaml(
            r#"
name: empty
description: missing value means null
expander: { name: isEmpty }
cases:
  - { name: absent, expect: true }
"#,
        )
        .unwrap();
        assert_eq!(fixture.cases[0].value, Value::Null);
        fixture.run_and_assert();
    }
}
