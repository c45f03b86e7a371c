//! String expanders: prefix, suffix, substring, regex.
//!
//! `startsWith`, `endsWith`, `contains` and `notContains` take the needle plus
//! an optional `ignore_case` flag. Case folding is ASCII-only, and needles are
//! lowercased once at construction.

use regex::Regex;

use super::expect_str;
use crate::{Arguments, Backtrace, ExpanderError, IntoExpander, Reporter, Value};

/// `(needle, ignore_case)` for the substring family.
fn needle_arguments(args: &Arguments) -> Result<(String, bool), ExpanderError> {
    args.arity(1, 2)?;
    let ignore_case = args.optional_bool(1, false)?;
    let needle = args.string(0)?;
    let needle = if ignore_case {
        needle.to_ascii_lowercase()
    } else {
        needle.to_owned()
    };
    Ok((needle, ignore_case))
}

/// `@startsWith("prefix", ignore_case?)`
#[derive(Debug)]
pub struct StartsWith {
    reporter: Reporter,
    prefix: String,
    ignore_case: bool,
}

impl StartsWith {
    fn check(&self, value: &Value) -> Result<(), String> {
        let input = expect_str(value)?;
        let matched = if self.ignore_case {
            input
                .get(..self.prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(&self.prefix))
        } else {
            input.starts_with(self.prefix.as_str())
        };
        if matched {
            Ok(())
        } else {
            Err(format!(
                "string {value} doesn't start with \"{}\"",
                self.prefix
            ))
        }
    }
}

impl IntoExpander for StartsWith {
    const NAME: &'static str = "startsWith";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        let (prefix, ignore_case) = needle_arguments(&args)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            prefix,
            ignore_case,
        })
    }
}

/// `@endsWith("suffix", ignore_case?)`
#[derive(Debug)]
pub struct EndsWith {
    reporter: Reporter,
    suffix: String,
    ignore_case: bool,
}

impl EndsWith {
    fn check(&self, value: &Value) -> Result<(), String> {
        let input = expect_str(value)?;
        let matched = if self.ignore_case {
            input
                .len()
                .checked_sub(self.suffix.len())
                .and_then(|start| input.get(start..))
                .is_some_and(|tail| tail.eq_ignore_ascii_case(&self.suffix))
        } else {
            input.ends_with(self.suffix.as_str())
        };
        if matched {
            Ok(())
        } else {
            Err(format!("string {value} doesn't end with \"{}\"", self.suffix))
        }
    }
}

impl IntoExpander for EndsWith {
    const NAME: &'static str = "endsWith";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        let (suffix, ignore_case) = needle_arguments(&args)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            suffix,
            ignore_case,
        })
    }
}

/// `@contains("needle", ignore_case?)`
#[derive(Debug)]
pub struct Contains {
    reporter: Reporter,
    needle: String,
    ignore_case: bool,
}

fn contains(input: &str, needle: &str, ignore_case: bool) -> bool {
    if ignore_case {
        // needle is lowercased at construction
        input.to_ascii_lowercase().contains(needle)
    } else {
        input.contains(needle)
    }
}

impl Contains {
    fn check(&self, value: &Value) -> Result<(), String> {
        let input = expect_str(value)?;
        if contains(input, &self.needle, self.ignore_case) {
            Ok(())
        } else {
            Err(format!("string {value} doesn't contain \"{}\"", self.needle))
        }
    }
}

impl IntoExpander for Contains {
    const NAME: &'static str = "contains";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        let (needle, ignore_case) = needle_arguments(&args)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            needle,
            ignore_case,
        })
    }
}

/// `@notContains("needle", ignore_case?)`
#[derive(Debug)]
pub struct NotContains {
    reporter: Reporter,
    needle: String,
    ignore_case: bool,
}

impl NotContains {
    fn check(&self, value: &Value) -> Result<(), String> {
        let input = expect_str(value)?;
        if contains(input, &self.needle, self.ignore_case) {
            Err(format!("string {value} contains \"{}\"", self.needle))
        } else {
            Ok(())
        }
    }
}

impl IntoExpander for NotContains {
    const NAME: &'static str = "notContains";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        let (needle, ignore_case) = needle_arguments(&args)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            needle,
            ignore_case,
        })
    }
}

/// `@matchRegex("pattern")`
///
/// Uses Rust's `regex` crate (RE2 semantics, linear time). The pattern is
/// compiled once, at construction; an invalid pattern fails resolution with
/// [`ExpanderError::InvalidPattern`].
#[derive(Debug)]
pub struct MatchRegex {
    reporter: Reporter,
    regex: Regex,
}

impl MatchRegex {
    fn check(&self, value: &Value) -> Result<(), String> {
        let input = expect_str(value)?;
        if self.regex.is_match(input) {
            Ok(())
        } else {
            Err(format!(
                "string {value} doesn't match pattern \"{}\"",
                self.regex.as_str()
            ))
        }
    }
}

impl IntoExpander for MatchRegex {
    const NAME: &'static str = "matchRegex";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(1, 1)?;
        let pattern = args.string(0)?;
        let regex = Regex::new(pattern).map_err(|err| ExpanderError::InvalidPattern {
            expander: args.expander().to_owned(),
            pattern: pattern.to_owned(),
            message: err.to_string(),
        })?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            regex,
        })
    }
}

reporting_expander!(StartsWith, EndsWith, Contains, NotContains, MatchRegex);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expanders::testing::build;
    use crate::PatternExpander;

    #[test]
    fn starts_with() {
        let e: StartsWith = build(vec!["foo".into()]).unwrap();
        assert!(e.matches(&"foobar".into()));
        assert!(!e.matches(&"barfoo".into()));
        assert!(!e.matches(&Value::Int(1)));
        assert!(e.error().unwrap().contains("not a valid string"));
    }

    #[test]
    fn starts_with_ignore_case() {
        let e: StartsWith = build(vec!["FOO".into(), true.into()]).unwrap();
        assert!(e.matches(&"fooBar".into()));
        assert!(!e.matches(&"fo".into()));
    }

    #[test]
    fn starts_with_empty_prefix_matches_any_string() {
        let e: StartsWith = build(vec!["".into()]).unwrap();
        assert!(e.matches(&"".into()));
        assert!(e.matches(&"anything".into()));
    }

    #[test]
    fn ends_with() {
        let e: EndsWith = build(vec!["bar".into()]).unwrap();
        assert!(e.matches(&"foobar".into()));
        assert!(!e.matches(&"barfoo".into()));

        let e: EndsWith = build(vec!["BAR".into(), true.into()]).unwrap();
        assert!(e.matches(&"foobar".into()));
        assert!(!e.matches(&"ar".into()));
    }

    #[test]
    fn contains_and_not_contains() {
        let e: Contains = build(vec!["lo w".into()]).unwrap();
        assert!(e.matches(&"hello world".into()));
        assert!(!e.matches(&"hello".into()));

        let e: Contains = build(vec!["LO W".into(), true.into()]).unwrap();
        assert!(e.matches(&"Hello World".into()));

        let e: NotContains = build(vec!["secret".into()]).unwrap();
        assert!(e.matches(&"public data".into()));
        assert!(!e.matches(&"top secret".into()));
        assert!(e.error().unwrap().contains("contains \"secret\""));
    }

    #[test]
    fn match_regex() {
        let e: MatchRegex = build(vec![r"^user-\d+$".into()]).unwrap();
        assert!(e.matches(&"user-42".into()));
        assert!(!e.matches(&"user-x".into()));
    }

    #[test]
    fn invalid_regex_fails_construction() {
        let err = build::<MatchRegex>(vec!["[unclosed".into()]).unwrap_err();
        match err {
            ExpanderError::InvalidPattern {
                expander, pattern, ..
            } => {
                assert_eq!(expander, "matchRegex");
                assert_eq!(pattern, "[unclosed");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn argument_validation() {
        assert!(matches!(
            build::<StartsWith>(vec![]),
            Err(ExpanderError::ArgumentCount { got: 0, .. })
        ));
        assert!(matches!(
            build::<Contains>(vec!["a".into(), "yes".into()]),
            Err(ExpanderError::InvalidArgument { .. })
        ));
        assert!(matches!(
            build::<EndsWith>(vec![Value::Int(1)]),
            Err(ExpanderError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn records_into_backtrace() {
        let e: StartsWith = build(vec!["a".into()]).unwrap();
        e.matches(&"abc".into());
        e.matches(&"xyz".into());
        let entries = e.backtrace().entries();
        assert_eq!(entries.len(), 4);
        assert!(!entries[1].is_failure());
        assert!(entries[3].is_failure());
    }
}
