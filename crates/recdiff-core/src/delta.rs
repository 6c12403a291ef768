//! Delta rules: compact numeric change thresholds.
//!
//! Syntax:
//!
//! | Expression | Matches when                               |
//! |------------|--------------------------------------------|
//! | `+-`       | old and new have strictly opposite signs    |
//! | `+-X`      | `abs(new - old) > X`                        |
//! | `+X-Y`     | `(new - old) > X` or `(old - new) > Y`      |
//! | `...=`     | same, with `>=` instead of `>`              |
//! | `...%`     | delta is `100 * (new - old) / old`          |
//!
//! `X` and `Y` are non-negative decimals (`\d+(\.\d+)?`). `+X-` on its own
//! is rejected. A rule is parsed once and evaluated any number of times.

use crate::errors::DiffError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// `+[X]-[Y][=][%]`, anchored at the start; whatever follows is junk
static DELTA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+(?P<x>[0-9]+(?:\.[0-9]+)?)?-(?P<y>[0-9]+(?:\.[0-9]+)?)?(?P<eq>=)?(?P<pct>%)?")
        .expect("delta pattern compiles")
});

/// How a rule turns an (old, new) pair into a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaMode {
    /// Strict sign flip
    Sign,
    /// `new - old` against the thresholds
    Absolute,
    /// Percentage change relative to `old`
    Percent,
}

/// A compiled delta rule
///
/// Immutable once parsed. The original expression text is kept and is the
/// rule's canonical string form (`Display`, serde).
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRule {
    expr: String,
    mode: DeltaMode,
    dx: f64,
    dy: f64,
    inclusive: bool,
}

impl DeltaRule {
    /// Parse a rule expression.
    ///
    /// # Errors
    ///
    /// - `BadDeltaSyntax`: the text does not start with `+[X]-[Y]`
    /// - `DeltaTrailingJunk`: characters remain after the rule
    /// - `AsymmetricDelta`: `+X-` with no `Y`
    pub fn parse(expr: &str) -> Result<Self, DiffError> {
        let bad = || DiffError::BadDeltaSyntax {
            expr: expr.to_string(),
        };

        let caps = DELTA_PATTERN.captures(expr).ok_or_else(bad)?;
        let end = caps.get(0).map_or(0, |m| m.end());
        if end < expr.len() {
            return Err(DiffError::DeltaTrailingJunk {
                expr: expr.to_string(),
                junk: expr[end..].to_string(),
            });
        }

        let x = caps.name("x").map(|m| m.as_str());
        let y = caps.name("y").map(|m| m.as_str());
        let inclusive = caps.name("eq").is_some();
        let percent = caps.name("pct").is_some();

        match (x, y) {
            (None, None) => Ok(Self {
                expr: expr.to_string(),
                mode: DeltaMode::Sign,
                dx: 0.0,
                dy: 0.0,
                inclusive: false,
            }),
            (Some(_), None) => Err(DiffError::AsymmetricDelta {
                expr: expr.to_string(),
            }),
            (x, Some(y)) => {
                let y: f64 = y.parse().map_err(|_| bad())?;
                let x: f64 = match x {
                    Some(x) => x.parse().map_err(|_| bad())?,
                    None => y,
                };
                Ok(Self {
                    expr: expr.to_string(),
                    mode: if percent {
                        DeltaMode::Percent
                    } else {
                        DeltaMode::Absolute
                    },
                    dx: x,
                    dy: -y,
                    inclusive,
                })
            }
        }
    }

    /// Evaluate the rule against an old and a new value.
    ///
    /// Returns true when the change is large enough to report.
    pub fn matches(&self, old: f64, new: f64) -> bool {
        match self.mode {
            DeltaMode::Sign => (old < 0.0 && 0.0 < new) || (old > 0.0 && 0.0 > new),
            DeltaMode::Absolute => self.outside(new - old),
            DeltaMode::Percent => {
                // Undefined ratio counts as no change.
                if old == 0.0 {
                    return false;
                }
                self.outside(100.0 * (new - old) / old)
            }
        }
    }

    fn outside(&self, delta: f64) -> bool {
        if self.inclusive {
            delta >= self.dx || delta <= self.dy
        } else {
            delta > self.dx || delta < self.dy
        }
    }

    /// The expression this rule was parsed from
    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn mode(&self) -> DeltaMode {
        self.mode
    }

    /// Upper threshold (`+X`)
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Lower threshold (`-Y`, stored negative)
    pub fn dy(&self) -> f64 {
        self.dy
    }

    pub fn is_sign(&self) -> bool {
        self.mode == DeltaMode::Sign
    }

    pub fn is_percent(&self) -> bool {
        self.mode == DeltaMode::Percent
    }

    pub fn is_inclusive(&self) -> bool {
        self.inclusive
    }
}

impl fmt::Display for DeltaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

impl FromStr for DeltaRule {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DeltaRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.expr)
    }
}

impl<'de> Deserialize<'de> for DeltaRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let expr = String::deserialize(deserializer)?;
        DeltaRule::parse(&expr).map_err(serde::de::Error::custom)
    }
}
