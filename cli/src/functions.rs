mod aggregator;
mod metrics;
mod source;

pub(crate) use aggregator::list_in_all_regions;
pub(crate) use source::AwsFunctionSource;
#[cfg(test)]
pub(crate) use source::{FunctionPage, FunctionSummary};

use chrono::{DateTime, Utc};

/// Shown instead of the last invocation time when there were no invocations in the lookback window
pub(crate) const INACTIVE: &str = "inactive for 30 days";

/// A Lambda function as shown in the list
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FunctionRecord {
    pub(crate) region: String,
    pub(crate) name: String,
    pub(crate) runtime: String,
    pub(crate) memory_size: i32,
    pub(crate) code_size: i64,
    pub(crate) last_modified: String,
    pub(crate) last_used: String,
}

impl FunctionRecord {
    pub(crate) fn is_inactive(&self) -> bool {
        self.last_used.starts_with("inactive")
    }
}

/// Describe when a function was used last
pub(crate) fn last_used(now: DateTime<Utc>, last_invocation: Option<DateTime<Utc>>) -> String {
    match last_invocation {
        Some(at) => ago(now, at),
        None => INACTIVE.to_string(),
    }
}

/// Average lengths in seconds, a year is 365.25 days and a month is a twelfth of it
const UNITS: [(u64, &str); 5] = [
    (31_557_600, "year"),
    (2_630_016, "month"),
    (86_400, "day"),
    (3_600, "hour"),
    (60, "minute"),
];

/// Relative age like "3 hours ago", only the most significant unit is kept
pub(crate) fn ago(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0) as u64;

    let Some((size, unit)) = UNITS.into_iter().find(|(size, _)| secs >= *size) else {
        return "just now".into();
    };

    let count = secs / size;
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {unit}{plural} ago")
}

/// Lambda reports modification time as e.g. "2019-10-01T12:00:00.000+0000"
pub(crate) fn parse_last_modified(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn no_invocations_is_inactive() {
        let now = Utc::now();
        assert_eq!(last_used(now, None), INACTIVE);
    }

    #[test]
    fn age_keeps_the_largest_unit() {
        let now = Utc::now();

        assert_eq!(ago(now, now - TimeDelta::seconds(5)), "just now");
        assert_eq!(ago(now, now + TimeDelta::seconds(5)), "just now");
        assert_eq!(ago(now, now - TimeDelta::seconds(61)), "1 minute ago");
        assert_eq!(ago(now, now - TimeDelta::minutes(190)), "3 hours ago");
        assert_eq!(ago(now, now - TimeDelta::hours(53)), "2 days ago");
        assert_eq!(ago(now, now - TimeDelta::days(400)), "1 year ago");
    }

    #[test]
    fn parses_lambda_timestamps() {
        let parsed = parse_last_modified("2019-10-01T12:00:00.000+0000").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2019-10-01T12:00:00+00:00");
        assert!(parse_last_modified("yesterday").is_none());
    }
}
