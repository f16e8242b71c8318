//! Stata `%t` date formats.
//!
//! Stata counts dates from 1960-01-01: `%td` in days, `%tc`/`%tC` in
//! milliseconds, and `%tw`, `%tm`, `%tq`, `%th` in weeks, months, quarters
//! and half-years. `%ty` holds the year itself.

use chrono::NaiveDate;

/// Days from 1960-01-01 to 1970-01-01.
const EPOCH_OFFSET_DAYS: i64 = 3653;
const EPOCH_OFFSET_MS: i64 = EPOCH_OFFSET_DAYS * 86_400_000;
const BASE_YEAR: i64 = 1960;

/// Calendar unit of a `%t` display format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `%tc` and `%tC`, milliseconds.
    Clock,
    /// `%td` (and the pre-10 `%d`), days.
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl DateFormat {
    /// Recognises `%td`, `%-tdCCYY-NN-DD`, `%tc` and friends. Generic `%tg`
    /// and non-date formats give `None`.
    pub fn from_display_format(format: &str) -> Option<Self> {
        let spec = format.strip_prefix('%')?;
        let spec = spec.strip_prefix('-').unwrap_or(spec);
        let mut chars = spec.chars();
        match (chars.next()?, chars.next()) {
            ('t', Some('c' | 'C')) => Some(Self::Clock),
            ('t', Some('d')) | ('d', _) => Some(Self::Daily),
            ('t', Some('w')) => Some(Self::Weekly),
            ('t', Some('m')) => Some(Self::Monthly),
            ('t', Some('q')) => Some(Self::Quarterly),
            ('t', Some('h')) => Some(Self::HalfYearly),
            ('t', Some('y')) => Some(Self::Yearly),
            _ => None,
        }
    }

    pub const fn is_clock(self) -> bool {
        matches!(self, Self::Clock)
    }

    /// Days since 1970-01-01 of the first day of period `value`.
    ///
    /// `None` for [`DateFormat::Clock`] and for periods outside chrono's range.
    pub fn unix_days(self, value: i64) -> Option<i64> {
        let (year, month) = match self {
            Self::Clock => return None,
            Self::Daily => return value.checked_sub(EPOCH_OFFSET_DAYS),
            // Stata weeks split the year into 52 blocks; week 52 runs long.
            Self::Weekly => {
                let start = first_of(BASE_YEAR.checked_add(value.div_euclid(52))?, 1)?;
                let days = start.signed_duration_since(unix_epoch()?).num_days();
                return days.checked_add(7 * value.rem_euclid(52));
            }
            Self::Monthly => (BASE_YEAR + value.div_euclid(12), value.rem_euclid(12) + 1),
            Self::Quarterly => (BASE_YEAR + value.div_euclid(4), 3 * value.rem_euclid(4) + 1),
            Self::HalfYearly => (BASE_YEAR + value.div_euclid(2), 6 * value.rem_euclid(2) + 1),
            Self::Yearly => (value, 1),
        };
        let date = first_of(year, month)?;
        Some(date.signed_duration_since(unix_epoch()?).num_days())
    }
}

/// Milliseconds since 1970-01-01 00:00 of a `%tc` value.
pub fn unix_millis(value: i64) -> Option<i64> {
    value.checked_sub(EPOCH_OFFSET_MS)
}

fn first_of(year: i64, month: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, u32::try_from(month).ok()?, 1)
}

fn unix_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_display_formats() {
        assert_eq!(DateFormat::from_display_format("%td"), Some(DateFormat::Daily));
        assert_eq!(
            DateFormat::from_display_format("%-tdCCYY-NN-DD"),
            Some(DateFormat::Daily)
        );
        assert_eq!(DateFormat::from_display_format("%d"), Some(DateFormat::Daily));
        assert_eq!(DateFormat::from_display_format("%tcHH:MM"), Some(DateFormat::Clock));
        assert_eq!(DateFormat::from_display_format("%tC"), Some(DateFormat::Clock));
        assert_eq!(DateFormat::from_display_format("%tq"), Some(DateFormat::Quarterly));
        assert_eq!(DateFormat::from_display_format("%tg"), None);
        assert_eq!(DateFormat::from_display_format("%9.0g"), None);
        assert_eq!(DateFormat::from_display_format(""), None);
    }

    #[test]
    fn daily_and_clock_shift_to_the_unix_epoch() {
        assert_eq!(DateFormat::Daily.unix_days(0), Some(-3653));
        assert_eq!(DateFormat::Daily.unix_days(3653), Some(0));
        assert_eq!(unix_millis(315_619_200_000), Some(0));
        assert_eq!(DateFormat::Clock.unix_days(0), None);
    }

    #[test]
    fn periods_start_on_their_first_day() {
        let days = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .signed_duration_since(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
                .num_days()
        };
        // 2020m3, 2020q2, 2020h2, 2020w2
        assert_eq!(DateFormat::Monthly.unix_days(722), Some(days(2020, 3, 1)));
        assert_eq!(DateFormat::Quarterly.unix_days(241), Some(days(2020, 4, 1)));
        assert_eq!(DateFormat::HalfYearly.unix_days(121), Some(days(2020, 7, 1)));
        assert_eq!(DateFormat::Weekly.unix_days(3121), Some(days(2020, 1, 8)));
        assert_eq!(DateFormat::Yearly.unix_days(1999), Some(days(1999, 1, 1)));
        assert_eq!(DateFormat::Monthly.unix_days(-1), Some(days(1959, 12, 1)));
    }
}
