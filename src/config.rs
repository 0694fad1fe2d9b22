//src/config.rs

use std::env;

/// Environment variable holding the accepted distance of an abundance
/// total from 1.
pub const SUM_TOLERANCE_VAR: &str = "BIOGATE_SUM_TOLERANCE";

/// Environment variable switching on parallel member validation.
pub const PARALLEL_VAR: &str = "BIOGATE_PARALLEL";

/// Knobs for a validation run.
///
/// The defaults reproduce the strict gate: the abundance column must sum
/// to exactly 1.0 and members are checked one after another.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorOptions {
    /// Largest accepted `|total - 1.0|`. Zero means exact equality.
    pub sum_tolerance: f64,
    /// Validate members on the rayon pool. Output order is unchanged.
    pub parallel: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            sum_tolerance: 0.0,
            parallel: false,
        }
    }
}

impl ValidatorOptions {
    /// Defaults overridden by `BIOGATE_SUM_TOLERANCE` and `BIOGATE_PARALLEL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut options = Self::default();

        if let Some(raw) = lookup(SUM_TOLERANCE_VAR) {
            match parse_tolerance(&raw) {
                Some(tol) => options.sum_tolerance = tol,
                None => log::warn!(
                    "ignoring {SUM_TOLERANCE_VAR}={raw:?}: expected a non-negative number"
                ),
            }
        }

        if let Some(raw) = lookup(PARALLEL_VAR) {
            match parse_flag(&raw) {
                Some(flag) => options.parallel = flag,
                None => log::warn!("ignoring {PARALLEL_VAR}={raw:?}: expected true or false"),
            }
        }

        options
    }

    /// Whether an accumulated abundance total counts as 1.
    /// With zero tolerance this is exact equality; NaN never matches.
    pub fn sum_matches(&self, total: f64) -> bool {
        (total - 1.0).abs() <= self.sum_tolerance
    }
}

pub fn parse_tolerance(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite() && *t >= 0.0)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
