//! Timer duration detection from free-form step text
//!
//! "Simmer for 10-15 minutes" becomes 600 seconds. Ranges take their lower
//! bound, and every quantity found in the text is summed, so
//! "bake 1 hour 30 minutes" becomes 5400.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        \b
        (?:
            (?P<first>\d+(?:\.\d+)?)
            (?:\s*(?:-|–|—|to)\s*(?P<second>\d+(?:\.\d+)?))?
            \s*
          | (?P<half>half\s+an?)\s+
          | (?P<article>an?)\s+
        )
        (?P<unit>hours?|hrs?|h|minutes?|mins?|m|seconds?|secs?|s)
        \b",
    )
    .expect("duration pattern is valid")
});

/// Extract a timer duration in seconds from step text.
///
/// Returns `None` when the text mentions no time quantity, or when the total
/// is too large to be a duration.
pub fn parse_duration(text: &str) -> Option<u64> {
    let total: f64 = DURATION_PATTERN
        .captures_iter(text)
        .filter_map(|caps| Some(quantity(&caps)? * unit_seconds(&caps["unit"])))
        .sum();

    let seconds = total.round();
    // Totals that do not fit a signed seconds count are not timer durations
    if !seconds.is_finite() || seconds < 1.0 || seconds >= i64::MAX as f64 {
        return None;
    }
    Some(seconds as u64)
}

fn quantity(caps: &Captures<'_>) -> Option<f64> {
    if let Some(first) = caps.name("first") {
        // "10-15 minutes" and "10 to 15 minutes" start with the lower bound
        let first: f64 = first.as_str().parse().ok()?;
        return Some(match caps.name("second").and_then(|s| s.as_str().parse::<f64>().ok()) {
            Some(second) => first.min(second),
            None => first,
        });
    }
    if caps.name("half").is_some() {
        return Some(0.5);
    }
    caps.name("article").map(|_| 1.0)
}

fn unit_seconds(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().chars().next() {
        Some('h') => 3600.0,
        Some('m') => 60.0,
        _ => 1.0,
    }
}
