//! Format expanders: email, URL, IP address, date/time.
//!
//! Dates accept RFC 3339, RFC 2822, `YYYY-MM-DD[ T]HH:MM[:SS[.fff]]` and
//! plain `YYYY-MM-DD`. Values carrying an offset are normalized to UTC; values
//! without one are taken as UTC.

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use url::Url;

use super::expect_str;
use crate::{Arguments, Backtrace, ExpanderError, IntoExpander, Reporter, Value};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(input) {
        return Some(parsed.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn datetime_of(value: &Value) -> Result<NaiveDateTime, String> {
    let input = expect_str(value)?;
    parse_datetime(input).ok_or_else(|| format!("value {value} is not a valid date"))
}

fn datetime_argument(args: &Arguments) -> Result<NaiveDateTime, ExpanderError> {
    args.arity(1, 1)?;
    let input = args.string(0)?;
    parse_datetime(input)
        .ok_or_else(|| args.invalid(format!("argument 1 must be a date, got \"{input}\"")))
}

/// Local part and domain syntax of an address like `user.name+tag@example.com`.
fn is_email(input: &str) -> bool {
    const LOCAL_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~.-";

    let Some((local, domain)) = input.rsplit_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local.len() <= 64
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || LOCAL_SPECIALS.contains(c));
    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = domain.len() <= 253
        && labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    local_ok && domain_ok
}

/// `@isEmail()`
#[derive(Debug)]
pub struct IsEmail {
    reporter: Reporter,
}

impl IsEmail {
    fn check(&self, value: &Value) -> Result<(), String> {
        if is_email(expect_str(value)?) {
            Ok(())
        } else {
            Err(format!("string {value} is not a valid email address"))
        }
    }
}

impl IntoExpander for IsEmail {
    const NAME: &'static str = "isEmail";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(0, 0)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

/// `@isUrl()`: an absolute URL (`scheme:...`).
#[derive(Debug)]
pub struct IsUrl {
    reporter: Reporter,
}

impl IsUrl {
    fn check(&self, value: &Value) -> Result<(), String> {
        Url::parse(expect_str(value)?)
            .map(|_| ())
            .map_err(|err| format!("string {value} is not a valid URL: {err}"))
    }
}

impl IntoExpander for IsUrl {
    const NAME: &'static str = "isUrl";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(0, 0)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

/// `@isIp()`: IPv4 or IPv6.
#[derive(Debug)]
pub struct IsIp {
    reporter: Reporter,
}

impl IsIp {
    fn check(&self, value: &Value) -> Result<(), String> {
        expect_str(value)?
            .parse::<IpAddr>()
            .map(|_| ())
            .map_err(|_| format!("string {value} is not a valid IP address"))
    }
}

impl IntoExpander for IsIp {
    const NAME: &'static str = "isIp";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(0, 0)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

/// `@isDateTime()`
#[derive(Debug)]
pub struct IsDateTime {
    reporter: Reporter,
}

impl IsDateTime {
    fn check(&self, value: &Value) -> Result<(), String> {
        datetime_of(value).map(|_| ())
    }
}

impl IntoExpander for IsDateTime {
    const NAME: &'static str = "isDateTime";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(0, 0)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

/// `@after("date")`: strictly later than the bound.
#[derive(Debug)]
pub struct After {
    reporter: Reporter,
    bound: NaiveDateTime,
}

impl After {
    fn check(&self, value: &Value) -> Result<(), String> {
        if datetime_of(value)? > self.bound {
            Ok(())
        } else {
            Err(format!("date {value} is not after {}", self.bound))
        }
    }
}

impl IntoExpander for After {
    const NAME: &'static str = "after";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        Ok(Self {
            bound: datetime_argument(&args)?,
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

/// `@before("date")`: strictly earlier than the bound.
#[derive(Debug)]
pub struct Before {
    reporter: Reporter,
    bound: NaiveDateTime,
}

impl Before {
    fn check(&self, value: &Value) -> Result<(), String> {
        if datetime_of(value)? < self.bound {
            Ok(())
        } else {
            Err(format!("date {value} is not before {}", self.bound))
        }
    }
}

impl IntoExpander for Before {
    const NAME: &'static str = "before";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        Ok(Self {
            bound: datetime_argument(&args)?,
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

reporting_expander!(IsEmail, IsUrl, IsIp, IsDateTime, After, Before);
