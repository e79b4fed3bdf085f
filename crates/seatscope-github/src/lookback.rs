//! Lookback windows for activity queries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How far back to consider repository activity.
///
/// The activity endpoint accepts the same values as a `time_period` query
/// parameter; [`Lookback::since`] gives the matching client-side cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lookback {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Lookback {
    /// The query-parameter value for the activity endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lookback::Day => "day",
            Lookback::Week => "week",
            Lookback::Month => "month",
            Lookback::Quarter => "quarter",
            Lookback::Year => "year",
        }
    }

    /// The earliest timestamp still inside the window.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let span = match self {
            Lookback::Day => Duration::days(1),
            Lookback::Week => Duration::weeks(1),
            Lookback::Month => Duration::days(30),
            Lookback::Quarter => Duration::days(90),
            Lookback::Year => Duration::days(365),
        };
        now - span
    }
}

impl std::fmt::Display for Lookback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Lookback::Day),
            "week" => Ok(Lookback::Week),
            "month" => Ok(Lookback::Month),
            "quarter" => Ok(Lookback::Quarter),
            "year" => Ok(Lookback::Year),
            _ => Err(format!("Invalid lookback period: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn since_subtracts_the_window() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(Lookback::Week.since(now), now - Duration::weeks(1));
        assert_eq!(Lookback::Quarter.since(now), now - Duration::days(90));
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Month".parse::<Lookback>().unwrap(), Lookback::Month);
        assert!("fortnight".parse::<Lookback>().is_err());
    }

    #[test]
    fn round_trips_through_serde() {
        let json = serde_json::to_string(&Lookback::Quarter).unwrap();
        assert_eq!(json, r#""quarter""#);
        let parsed: Lookback = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Lookback::Quarter);
    }
}
