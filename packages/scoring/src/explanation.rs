//! "Ranks highly in" explanations.
//!
//! Cites the three highest of the seven descriptive indicators (population
//! density is never cited). Equal values are ordered by display name so the
//! output is deterministic.

use equity_map_indicator_models::{Indicator, IndicatorSet};

/// Number of indicators cited in an explanation.
pub const EXPLAINED_INDICATORS: usize = 3;

const PREFIX: &str = "Ranks highly in: ";

/// Returns the `count` highest descriptive indicators, highest first.
#[must_use]
pub fn top_indicators(indicators: &IndicatorSet, count: usize) -> Vec<(Indicator, f64)> {
    let mut pairs = indicators.descriptive().to_vec();
    pairs.sort_by(|(a, a_value), (b, b_value)| {
        b_value
            .total_cmp(a_value)
            .then_with(|| a.display_name().cmp(b.display_name()))
    });
    pairs.truncate(count);
    pairs
}

/// Truncated whole percentage of a percentile (`0.959` -> `95`).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn whole_percent(value: f64) -> i64 {
    (value * 100.0).floor() as i64
}

/// Builds the explanation for one unit, e.g.
/// `"Ranks highly in: Asthma: 95%, PM25: 90%, Traffic: 80%"`.
#[must_use]
pub fn explain(indicators: &IndicatorSet) -> String {
    let parts: Vec<String> = top_indicators(indicators, EXPLAINED_INDICATORS)
        .into_iter()
        .map(|(indicator, value)| {
            format!("{}: {}%", indicator.display_name(), whole_percent(value))
        })
        .collect();
    format!("{PREFIX}{}", parts.join(", "))
}
