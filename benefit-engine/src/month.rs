use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use crate::error::{EngineError, EngineResult};

/// A calendar month (year + month granularity, not a rolling window).
///
/// Callers compute this once at the request boundary and pass it down so
/// eligibility decisions never read the wall clock themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Half-open UTC interval `[start, end)` covering the month, suitable
    /// for range predicates over indexed timestamp columns.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        (
            Self::month_start(self.year, self.month),
            Self::month_start(next_year, next_month),
        )
    }

    fn month_start(year: i32, month: u32) -> DateTime<Utc> {
        // month is validated at construction, day 1 always exists
        let date = NaiveDate::from_ymd_opt(year, month, 1).expect("month in 1..=12");
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight exists"))
    }
}

impl std::fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_out_of_range_month() {
        assert!(BillingMonth::new(2025, 0).is_err());
        assert!(BillingMonth::new(2025, 13).is_err());
        assert!(BillingMonth::new(2025, 12).is_ok());
    }

    #[test]
    fn bounds_cover_the_month() {
        let month = BillingMonth::new(2025, 10).unwrap();
        let (start, end) = month.bounds();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let month = BillingMonth::new(2025, 12).unwrap();
        let (_, end) = month.bounds();
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn from_datetime_extracts_year_and_month() {
        let at = Utc.with_ymd_and_hms(2025, 10, 17, 13, 45, 0).unwrap();
        let month = BillingMonth::from_datetime(at);
        assert_eq!(month.year(), 2025);
        assert_eq!(month.month(), 10);
        assert_eq!(month.to_string(), "2025-10");
    }
}
