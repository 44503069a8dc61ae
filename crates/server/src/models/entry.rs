//! Entry domain types.

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};

use petcare_core::{EntryId, PetId, UserId};

/// A timestamped free-text note about a pet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Entry {
    /// Unique entry ID.
    pub id: EntryId,
    /// Pet the note is about.
    pub pet_id: PetId,
    /// Author. Only the author may edit or delete the entry.
    pub user_id: UserId,
    /// Note text (never blank).
    pub content: String,
    /// Server-stamped creation time.
    pub created_at: DateTime<Utc>,
}

/// Time window for listing a pet's entries.
///
/// Windows are calendar-aligned in UTC: the current day, the current ISO week
/// (starting Monday) or the current month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryRange {
    #[default]
    Today,
    Week,
    Month,
    All,
}

impl EntryRange {
    /// Parse a `range` query value.
    ///
    /// `day` and `daily` are aliases for `today`. Missing or unknown values
    /// fall back to `today`.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            Some("week") => Self::Week,
            Some("month") => Self::Month,
            Some("all") => Self::All,
            _ => Self::Today,
        }
    }

    /// Canonical query value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::All => "all",
        }
    }

    /// Inclusive lower bound of the window containing `now`, or `None` for all.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let first_day = match self {
            Self::Today => today,
            Self::Week => today - Days::new(u64::from(today.weekday().num_days_from_monday())),
            Self::Month => today - Days::new(u64::from(today.day0())),
            Self::All => return None,
        };
        Some(first_day.and_time(NaiveTime::MIN).and_utc())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_aliases_and_fallback() {
        assert_eq!(EntryRange::parse(None), EntryRange::Today);
        assert_eq!(EntryRange::parse(Some("today")), EntryRange::Today);
        assert_eq!(EntryRange::parse(Some("day")), EntryRange::Today);
        assert_eq!(EntryRange::parse(Some("Daily")), EntryRange::Today);
        assert_eq!(EntryRange::parse(Some("WEEK")), EntryRange::Week);
        assert_eq!(EntryRange::parse(Some("month")), EntryRange::Month);
        assert_eq!(EntryRange::parse(Some("all")), EntryRange::All);
        assert_eq!(EntryRange::parse(Some("fortnight")), EntryRange::Today);
    }

    #[test]
    fn test_today_starts_at_midnight_utc() {
        let now = at(2025, 3, 14, 17, 45);
        assert_eq!(EntryRange::Today.start(now), Some(at(2025, 3, 14, 0, 0)));
    }

    #[test]
    fn test_week_starts_on_monday() {
        // 2025-03-14 is a Friday
        let now = at(2025, 3, 14, 9, 0);
        assert_eq!(EntryRange::Week.start(now), Some(at(2025, 3, 10, 0, 0)));

        // A Monday is its own week start
        let monday = at(2025, 3, 10, 23, 59);
        assert_eq!(EntryRange::Week.start(monday), Some(at(2025, 3, 10, 0, 0)));
    }

    #[test]
    fn test_week_can_span_month_boundary() {
        // 2025-04-02 is a Wednesday
        let now = at(2025, 4, 2, 12, 0);
        assert_eq!(EntryRange::Week.start(now), Some(at(2025, 3, 31, 0, 0)));
    }

    #[test]
    fn test_month_starts_on_first() {
        let now = at(2024, 2, 29, 8, 30);
        assert_eq!(EntryRange::Month.start(now), Some(at(2024, 2, 1, 0, 0)));
    }

    #[test]
    fn test_all_is_unbounded() {
        assert_eq!(EntryRange::All.start(Utc::now()), None);
    }

    #[test]
    fn test_as_str_round_trips_through_parse() {
        for range in [
            EntryRange::Today,
            EntryRange::Week,
            EntryRange::Month,
            EntryRange::All,
        ] {
            assert_eq!(EntryRange::parse(Some(range.as_str())), range);
        }
    }
}
