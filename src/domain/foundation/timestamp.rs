//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Creates a timestamp from Unix seconds, as reported by the payment gateway.
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn from_unix_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the timestamp as Unix seconds.
    pub fn as_unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Adds the specified number of days, or `None` when the result falls
    /// outside chrono's representable range.
    ///
    /// Negative values subtract days.
    pub fn checked_add_days(&self, days: i64) -> Option<Self> {
        Duration::try_days(days)
            .and_then(|d| self.0.checked_add_signed(d))
            .map(Self)
    }

    /// Adds the specified number of seconds, or `None` on overflow.
    pub fn checked_add_secs(&self, secs: i64) -> Option<Self> {
        Duration::try_seconds(secs)
            .and_then(|d| self.0.checked_add_signed(d))
            .map(Self)
    }

    /// Adds days, clamping to the representable range.
    pub fn add_days(&self, days: i64) -> Self {
        self.checked_add_days(days)
            .unwrap_or_else(|| self.saturated(days >= 0))
    }

    /// Adds seconds, clamping to the representable range.
    pub fn add_secs(&self, secs: i64) -> Self {
        self.checked_add_secs(secs)
            .unwrap_or_else(|| self.saturated(secs >= 0))
    }

    fn saturated(&self, forward: bool) -> Self {
        if forward {
            Self(DateTime::<Utc>::MAX_UTC)
        } else {
            Self(DateTime::<Utc>::MIN_UTC)
        }
    }

    /// Formats with a chrono `strftime` pattern, e.g. `%d.%m.%Y`.
    pub fn format(&self, pattern: &str) -> String {
        self.0.format(pattern).to_string()
    }

    /// RFC 3339 representation used in API responses.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn from_unix_secs_round_trips() {
        let ts = Timestamp::from_unix_secs(1_704_067_200).unwrap();
        assert_eq!(ts.as_unix_secs(), 1_704_067_200);
    }

    #[test]
    fn add_days_moves_forward_and_back() {
        let t0 = Timestamp::from_unix_secs(1_704_067_200).unwrap();
        assert_eq!(t0.add_days(30).as_unix_secs(), 1_704_067_200 + 30 * 86_400);
        assert_eq!(t0.add_days(-1).as_unix_secs(), 1_704_067_200 - 86_400);
    }

    #[test]
    fn checked_add_days_reports_overflow() {
        let t0 = Timestamp::from_unix_secs(1_704_067_200).unwrap();
        assert!(t0.checked_add_days(200_000_000).is_none());
        assert!(t0.checked_add_days(i64::MAX).is_none());
        assert!(t0.checked_add_days(10).is_some());
    }

    #[test]
    fn add_days_clamps_instead_of_panicking() {
        let t0 = Timestamp::from_unix_secs(1_704_067_200).unwrap();
        assert_eq!(t0.add_days(i64::MAX), Timestamp(DateTime::<Utc>::MAX_UTC));
        assert_eq!(t0.add_secs(i64::MIN), Timestamp(DateTime::<Utc>::MIN_UTC));
    }

    #[test]
    fn ordering_helpers_agree() {
        let earlier = Timestamp::from_unix_secs(100).unwrap();
        let later = Timestamp::from_unix_secs(200).unwrap();
        assert!(earlier.is_before(&later));
        assert!(later.is_after(&earlier));
        assert!(!earlier.is_before(&earlier));
    }

    #[test]
    fn format_uses_day_month_year() {
        // 2024-01-01T00:00:00Z
        let ts = Timestamp::from_unix_secs(1_704_067_200).unwrap();
        assert_eq!(ts.format("%d.%m.%Y"), "01.01.2024");
        assert_eq!(ts.format("%d.%m.%Y %H:%M"), "01.01.2024 00:00");
    }
}
