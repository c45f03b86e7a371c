//! Numeric comparisons. Numeric strings (`"10"`) count as numbers on both sides.

use crate::{Arguments, Backtrace, ExpanderError, IntoExpander, Reporter, Value};

fn number_of(value: &Value) -> Result<f64, String> {
    value
        .as_number()
        .ok_or_else(|| format!("value {value} is not a valid number"))
}

/// `@greaterThan(n)`
#[derive(Debug)]
pub struct GreaterThan {
    reporter: Reporter,
    bound: f64,
}

impl GreaterThan {
    fn check(&self, value: &Value) -> Result<(), String> {
        let actual = number_of(value)?;
        if actual > self.bound {
            Ok(())
        } else {
            Err(format!("value {value} is not greater than {}", self.bound))
        }
    }
}

impl IntoExpander for GreaterThan {
    const NAME: &'static str = "greaterThan";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(1, 1)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            bound: args.number(0)?,
        })
    }
}

/// `@lowerThan(n)`
#[derive(Debug)]
pub struct LowerThan {
    reporter: Reporter,
    bound: f64,
}

impl LowerThan {
    fn check(&self, value: &Value) -> Result<(), String> {
        let actual = number_of(value)?;
        if actual < self.bound {
            Ok(())
        } else {
            Err(format!("value {value} is not lower than {}", self.bound))
        }
    }
}

impl IntoExpander for LowerThan {
    const NAME: &'static str = "lowerThan";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(1, 1)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
            bound: args.number(0)?,
        })
    }
}

reporting_expander!(GreaterThan, LowerThan);
