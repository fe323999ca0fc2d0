//! Unit-expression grammar for dimension and attribute units.
//!
//! Exchange formats for forecast data require every axis to carry a
//! machine-parseable unit (e.g. "meters", "days since 2001-03-04").
//! This module implements a small udunits-style grammar:
//!
//! ```text
//! unit    := product | product "since" date
//! product := factor (("*" | "/" | whitespace) factor)*
//! factor  := name ("^"? signed-int)?
//! ```
//!
//! Unit strings are checked at definition time, so a malformed unit is
//! rejected before any output file is created.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{CoreError, CoreResult};

/// A single base unit raised to an integer power.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFactor {
    /// Canonical base-unit name (singular, lowercase).
    pub base: String,
    /// Integer exponent; negative for divisors.
    pub exponent: i32,
}

/// A parsed unit expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitExpression {
    /// Product of base-unit factors.
    pub factors: Vec<UnitFactor>,
    /// Epoch for offset time units ("days since 2001-03-04").
    pub since: Option<NaiveDate>,
}

impl UnitExpression {
    /// Whether this expression is a pure time unit (a single time base,
    /// exponent 1), with or without an epoch.
    pub fn is_time(&self) -> bool {
        self.factors.len() == 1
            && self.factors[0].exponent == 1
            && is_time_base(&self.factors[0].base)
    }
}

/// Recognized base units, keyed by their accepted spellings.
///
/// Singular canonical name first; plural forms are handled by stripping a
/// trailing 's' before lookup.
const BASE_UNITS: &[(&str, &str)] = &[
    ("m", "meter"),
    ("meter", "meter"),
    ("metre", "meter"),
    ("km", "kilometer"),
    ("kilometer", "kilometer"),
    ("cm", "centimeter"),
    ("centimeter", "centimeter"),
    ("s", "second"),
    ("sec", "second"),
    ("second", "second"),
    ("min", "minute"),
    ("minute", "minute"),
    ("h", "hour"),
    ("hr", "hour"),
    ("hour", "hour"),
    ("d", "day"),
    ("day", "day"),
    ("week", "week"),
    ("yr", "year"),
    ("year", "year"),
    ("g", "gram"),
    ("gram", "gram"),
    ("kg", "kilogram"),
    ("kilogram", "kilogram"),
    ("k", "kelvin"),
    ("kelvin", "kelvin"),
    ("celsius", "celsius"),
    ("percent", "percent"),
    ("%", "percent"),
    ("dimensionless", "dimensionless"),
    ("number", "number"),
    ("count", "number"),
    ("individual", "individual"),
];

/// Time bases that may carry a "since <date>" epoch.
fn is_time_base(base: &str) -> bool {
    matches!(base, "second" | "minute" | "hour" | "day" | "week" | "year")
}

/// Look up a base-unit name, tolerating case and a plural 's'.
fn lookup_base(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    for (spelling, canonical) in BASE_UNITS {
        if *spelling == lower {
            return Some(canonical);
        }
    }
    // Retry without a trailing plural 's' ("meters", "days").
    if let Some(stripped) = lower.strip_suffix('s') {
        if !stripped.is_empty() {
            for (spelling, canonical) in BASE_UNITS {
                if *spelling == stripped {
                    return Some(canonical);
                }
            }
        }
    }
    None
}

/// Parse a unit string against the grammar.
///
/// Returns `CoreError::MalformedUnit` naming the offending token on failure.
pub fn parse_unit(unit: &str) -> CoreResult<UnitExpression> {
    let malformed = |reason: String| CoreError::MalformedUnit {
        unit: unit.to_string(),
        reason,
    };

    let trimmed = unit.trim();
    if trimmed.is_empty() {
        return Err(malformed("empty unit string".to_string()));
    }

    // Split off an optional "since <date>" clause.
    let (product, since) = match split_since(trimmed) {
        Some((left, right)) => {
            let epoch = parse_epoch(right)
                .ok_or_else(|| malformed(format!("unparseable epoch '{}'", right)))?;
            (left, Some(epoch))
        }
        None => (trimmed, None),
    };

    let factors = parse_product(product).map_err(malformed)?;
    let expr = UnitExpression { factors, since };

    if expr.since.is_some() && !expr.is_time() {
        return Err(malformed(
            "'since' epoch is only valid after a pure time unit".to_string(),
        ));
    }

    Ok(expr)
}

/// Split "days since 2001-03-04" into the product and epoch parts.
fn split_since(s: &str) -> Option<(&str, &str)> {
    let lower = s.to_ascii_lowercase();
    let idx = lower.find(" since ")?;
    Some((&s[..idx], s[idx + " since ".len()..].trim()))
}

/// Parse the epoch of an offset time unit.
fn parse_epoch(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse the product part of a unit expression.
fn parse_product(s: &str) -> Result<Vec<UnitFactor>, String> {
    let mut factors = Vec::new();
    let mut sign = 1i32;
    let mut rest = s.trim();

    if rest.is_empty() {
        return Err("empty unit product".to_string());
    }

    while !rest.is_empty() {
        // Leading separator flips the sign for '/'.
        if let Some(stripped) = rest.strip_prefix('/') {
            sign = -1;
            rest = stripped.trim_start();
            continue;
        }
        if let Some(stripped) = rest.strip_prefix('*') {
            sign = 1;
            rest = stripped.trim_start();
            continue;
        }

        // Take the next token up to a separator.
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '*' || c == '/')
            .unwrap_or(rest.len());
        let token = &rest[..end];
        rest = rest[end..].trim_start();

        factors.push(parse_factor(token, sign)?);
        sign = 1;
    }

    Ok(factors)
}

/// Parse one "name", "name^n", or "name n" style factor token.
fn parse_factor(token: &str, sign: i32) -> Result<UnitFactor, String> {
    // Split the name from an optional exponent suffix.
    let name_end = token
        .find(|c: char| c == '^' || c == '-' || c.is_ascii_digit())
        .unwrap_or(token.len());
    let (name, exp_part) = token.split_at(name_end);

    if name.is_empty() {
        return Err(format!("expected unit name, found '{}'", token));
    }

    let base = lookup_base(name).ok_or_else(|| format!("unknown base unit '{}'", name))?;

    let exponent = if exp_part.is_empty() {
        1
    } else {
        let digits = exp_part.strip_prefix('^').unwrap_or(exp_part);
        digits
            .parse::<i32>()
            .map_err(|_| format!("invalid exponent '{}' on '{}'", exp_part, name))?
    };

    Ok(UnitFactor {
        base: base.to_string(),
        exponent: sign * exponent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_simple_units() {
        assert!(parse_unit("meters").is_ok());
        assert!(parse_unit("metre").is_ok());
        assert!(parse_unit("dimensionless").is_ok());
        assert!(parse_unit("percent").is_ok());
    }

    #[test]
    fn test_offset_time_unit() {
        let expr = parse_unit("days since 2001-03-04").unwrap();
        assert!(expr.is_time());
        assert_eq!(expr.since, NaiveDate::from_ymd_opt(2001, 3, 4));
        assert_eq!(expr.factors[0].base, "day");
    }

    #[test]
    fn test_compound_unit() {
        let expr = parse_unit("m/s").unwrap();
        assert_eq!(expr.factors.len(), 2);
        assert_eq!(expr.factors[0].base, "meter");
        assert_eq!(expr.factors[1].base, "second");
        assert_eq!(expr.factors[1].exponent, -1);
    }

    #[test]
    fn test_exponent_forms() {
        let a = parse_unit("m^2").unwrap();
        let b = parse_unit("m2").unwrap();
        assert_eq!(a.factors[0].exponent, 2);
        assert_eq!(b.factors[0].exponent, 2);
    }

    #[test]
    fn test_unknown_base_rejected() {
        let err = parse_unit("metrez").unwrap_err();
        assert!(err.to_string().contains("metrez"));
    }

    #[test]
    fn test_since_requires_date() {
        assert!(parse_unit("days since ").is_err());
        assert!(parse_unit("days since tomorrow").is_err());
    }

    #[test]
    fn test_since_requires_time_unit() {
        assert!(parse_unit("meters since 2001-03-04").is_err());
    }

    #[test]
    fn test_empty_unit_rejected() {
        assert!(parse_unit("").is_err());
        assert!(parse_unit("   ").is_err());
    }
}
