//! Timezone expanders.

use chrono_tz::Tz;

use super::expect_str;
use crate::{Arguments, Backtrace, ExpanderError, IntoExpander, Reporter, Value};

/// Known abbreviations, uppercase and sorted for binary search.
const TZ_ABBREVIATIONS: [&str; 60] = [
    "ACDT", "ACST", "ADT", "AEDT", "AEST", "AKDT", "AKST", "ART", "AST", "AWST", "BRT", "BST",
    "CAT", "CDT", "CEST", "CET", "CHST", "CLT", "COT", "CST", "EAT", "EDT", "EEST", "EET", "EST",
    "GMT", "GST", "HDT", "HKT", "HST", "ICT", "IDT", "IRST", "IST", "JST", "KST", "MDT", "MSK",
    "MST", "NDT", "NPT", "NST", "NZDT", "NZST", "PDT", "PET", "PHT", "PKT", "PST", "SAST", "SGT",
    "UTC", "WAT", "WEST", "WET", "WIB", "WIT", "WITA", "YDT", "YST",
];

/// `Z`, `±HH`, `±HHMM` or `±HH:MM`, at most `±14:00`.
fn is_tz_offset(input: &str) -> bool {
    if input == "Z" {
        return true;
    }
    let Some(rest) = input.strip_prefix(['+', '-']) else {
        return false;
    };
    let digits: String = match rest.len() {
        2 | 4 => rest.to_owned(),
        5 if rest.as_bytes()[2] == b':' => rest.replacen(':', "", 1),
        _ => return false,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let hours: u32 = digits[..2].parse().unwrap_or(u32::MAX);
    let minutes: u32 = digits.get(2..).filter(|m| !m.is_empty()).map_or(0, |m| {
        m.parse().unwrap_or(u32::MAX)
    });
    minutes < 60 && (hours < 14 || (hours == 14 && minutes == 0))
}

/// `@isTzOffset()`: e.g. `+01:00`, `-0530`, `Z`.
#[derive(Debug)]
pub struct IsTzOffset {
    reporter: Reporter,
}

impl IsTzOffset {
    fn check(&self, value: &Value) -> Result<(), String> {
        if is_tz_offset(expect_str(value)?) {
            Ok(())
        } else {
            Err(format!("string {value} is not a valid timezone offset"))
        }
    }
}

impl IntoExpander for IsTzOffset {
    const NAME: &'static str = "isTzOffset";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(0, 0)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

/// `@isTzAbbreviation()`: e.g. `CET`, `pst` (case-insensitive).
#[derive(Debug)]
pub struct IsTzAbbreviation {
    reporter: Reporter,
}

impl IsTzAbbreviation {
    fn check(&self, value: &Value) -> Result<(), String> {
        let upper = expect_str(value)?.to_ascii_uppercase();
        if TZ_ABBREVIATIONS.binary_search(&upper.as_str()).is_ok() {
            Ok(())
        } else {
            Err(format!("string {value} is not a valid timezone abbreviation"))
        }
    }
}

impl IntoExpander for IsTzAbbreviation {
    const NAME: &'static str = "isTzAbbreviation";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(0, 0)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

/// `@isTzIdentifier()`: an IANA zone name such as `Europe/Warsaw`.
#[derive(Debug)]
pub struct IsTzIdentifier {
    reporter: Reporter,
}

impl IsTzIdentifier {
    fn check(&self, value: &Value) -> Result<(), String> {
        expect_str(value)?
            .parse::<Tz>()
            .map(|_| ())
            .map_err(|_| format!("string {value} is not a valid timezone identifier"))
    }
}

impl IntoExpander for IsTzIdentifier {
    const NAME: &'static str = "isTzIdentifier";

    fn from_arguments(args: Arguments, backtrace: &Backtrace) -> Result<Self, ExpanderError> {
        args.arity(0, 0)?;
        Ok(Self {
            reporter: Reporter::new(Self::NAME, backtrace),
        })
    }
}

reporting_expander!(IsTzOffset, IsTzAbbreviation, IsTzIdentifier);
