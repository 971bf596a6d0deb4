use core::cmp::Ordering;

use crate::{
    civil::{Date, Weekday},
    error::{Error, RangeError},
};

// Resolved selector dates compare in a fixed reference year. It is a leap
// year so that selectors anchored late in February resolve there too.
const REFERENCE_YEAR: i16 = 2000;

/// The offset basis that a rule's time-of-day is expressed against.
///
/// A daylight saving rule names a moment like "01:00". Whether that
/// reading is to be taken straight from UTC, from the zone's standard
/// time, or from the local wall clock (standard time plus whatever
/// daylight saving was in effect just before the switch) differs between
/// zones, so each rule carries its basis explicitly.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Indicator {
    /// The time-of-day is a UTC reading.
    Utc = 0,
    /// The time-of-day is read from the zone's standard time.
    Standard = 1,
    /// The time-of-day is read from the local wall clock.
    Wall = 2,
}

/// A selector picking one calendar date per year.
///
/// Every variant resolves to a concrete date in any supported year via
/// [`Rule::date_in`]. The variants cover the patterns that occur in
/// real-world daylight saving arrangements.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DaySpec {
    /// A fixed calendar day, such as March 30.
    ///
    /// February 29 is rejected at rule construction, since it does not
    /// exist in most years.
    Fixed { month: i8, day: i8 },
    /// The last given weekday of a month, such as the last Sunday of
    /// March.
    LastWeekday { month: i8, weekday: Weekday },
    /// The first given weekday on or after a day of the month. "The
    /// second Sunday of March" is expressed as the first Sunday on or
    /// after March 8. The resolved date can roll into the following
    /// month.
    WeekdayOnOrAfter { month: i8, day: i8, weekday: Weekday },
    /// The last given weekday on or before a day of the month. The
    /// resolved date can roll into the preceding month.
    WeekdayOnOrBefore { month: i8, day: i8, weekday: Weekday },
}

impl DaySpec {
    /// Returns the month this selector is anchored in.
    pub fn month(self) -> i8 {
        match self {
            DaySpec::Fixed { month, .. } => month,
            DaySpec::LastWeekday { month, .. } => month,
            DaySpec::WeekdayOnOrAfter { month, .. } => month,
            DaySpec::WeekdayOnOrBefore { month, .. } => month,
        }
    }

    fn check(self) -> Result<(), Error> {
        let month = self.month();
        if month < 1 || month > 12 {
            return Err(RangeError::new("month", month, 1, 12).into());
        }
        let day = match self {
            DaySpec::Fixed { day, .. } => day,
            DaySpec::LastWeekday { .. } => return Ok(()),
            DaySpec::WeekdayOnOrAfter { day, .. } => day,
            DaySpec::WeekdayOnOrBefore { day, .. } => day,
        };
        // Anchor days are capped at the month length of a non-leap year,
        // so resolution is total: no selector can name February 29.
        let last = crate::civil::days_in_month(REFERENCE_YEAR + 1, month);
        if day < 1 || day > last {
            return Err(RangeError::new("day", day, 1, last).into());
        }
        Ok(())
    }
}

/// One recurring annual daylight saving switch.
///
/// A rule describes how to pick its calendar date in any given year, the
/// time-of-day the switch happens, the daylight saving amount in effect
/// after it (zero for rules that return to standard time), and the offset
/// basis its time-of-day is expressed against.
///
/// Rules are immutable. A rule on its own names no absolute instant; only
/// a [`RuleModel`](crate::RuleModel), which supplies the standard offset
/// and the predecessor rule in the annual cycle, can place it on the
/// POSIX time scale.
///
/// # Example
///
/// The United States springs forward on the second Sunday of March at
/// 02:00 on the wall clock:
///
/// ```
/// use tzcycle::{civil::{date, Weekday}, DaySpec, Indicator, Rule};
///
/// let spring = Rule::new(
///     DaySpec::WeekdayOnOrAfter { month: 3, day: 8, weekday: Weekday::Sunday },
///     2 * 60 * 60,
///     3_600,
///     Indicator::Wall,
/// )?;
/// assert_eq!(spring.date_in(2021), date(2021, 3, 14));
///
/// # Ok::<(), tzcycle::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Rule {
    day: DaySpec,
    time: i32,
    savings: i32,
    indicator: Indicator,
}

impl Rule {
    /// The maximum supported time-of-day, in seconds after local
    /// midnight. A value at or beyond 24 hours names a moment in a
    /// following civil day, which some real-world rules use.
    pub const MAX_TIME_OF_DAY: i32 = 604_799;

    /// Creates a rule from a date selector, a time-of-day in seconds
    /// after local midnight, a daylight saving amount in seconds and the
    /// offset basis of the time-of-day.
    ///
    /// # Errors
    ///
    /// This returns an error when the selector's components are out of
    /// range, the time-of-day is not in `0..=604799` or the savings are
    /// not in `-93599..=93599`.
    pub fn new(
        day: DaySpec,
        time_of_day: i32,
        savings: i32,
        indicator: Indicator,
    ) -> Result<Rule, Error> {
        day.check()?;
        if time_of_day < 0 || time_of_day > Rule::MAX_TIME_OF_DAY {
            return Err(RangeError::new(
                "time-of-day seconds",
                time_of_day,
                0,
                Rule::MAX_TIME_OF_DAY,
            )
            .into());
        }
        if savings < -93_599 || savings > 93_599 {
            return Err(
                RangeError::new("savings", savings, -93_599, 93_599).into()
            );
        }
        Ok(Rule { day, time: time_of_day, savings, indicator })
    }

    /// Resolves this rule's date selector in the given year.
    ///
    /// # Panics
    ///
    /// This panics when the given year is outside `-9999..=9999`.
    pub fn date_in(&self, year: i16) -> Date {
        assert!(
            year >= Date::MIN.year() && year <= Date::MAX.year(),
            "year {year} is not in the supported range",
        );
        match self.day {
            DaySpec::Fixed { month, day } => Date::new(year, month, day)
                .expect("fixed selector days are validated at construction"),
            DaySpec::LastWeekday { month, weekday } => {
                Date::last_of_month(year, month).on_or_before(weekday)
            }
            DaySpec::WeekdayOnOrAfter { month, day, weekday } => {
                Date::new(year, month, day)
                    .expect("anchor days are validated at construction")
                    .on_or_after(weekday)
            }
            DaySpec::WeekdayOnOrBefore { month, day, weekday } => {
                Date::new(year, month, day)
                    .expect("anchor days are validated at construction")
                    .on_or_before(weekday)
            }
        }
    }

    /// Returns this rule's date selector.
    pub fn day(&self) -> DaySpec {
        self.day
    }

    /// Returns this rule's time-of-day, in seconds after local midnight
    /// of the resolved date.
    pub fn time_of_day(&self) -> i32 {
        self.time
    }

    /// Returns the daylight saving amount in seconds that is in effect
    /// after this rule fires. Zero means a return to standard time.
    pub fn savings(&self) -> i32 {
        self.savings
    }

    /// Returns the offset basis this rule's time-of-day is expressed
    /// against.
    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    /// The position of this rule within a single calendar year, laid out
    /// January through December.
    ///
    /// The day component is relative to January 1 of the reference year,
    /// so selectors that roll across a year boundary stay ordered with
    /// their month. Time-of-day compares as read: with no daylight saving
    /// in effect the standard and wall bases coincide, and no fixed
    /// quantity can translate a UTC reading without knowing the standard
    /// offset, so the raw reading is the only year-independent key. The
    /// indicator itself breaks remaining ties.
    pub(crate) fn annual_key(&self) -> (i8, i32, i32, u8) {
        let relative_day = self.date_in(REFERENCE_YEAR).to_epoch_day()
            - Date::new(REFERENCE_YEAR, 1, 1)
                .expect("reference new year exists")
                .to_epoch_day();
        (self.day.month(), relative_day, self.time, self.indicator as u8)
    }

    pub(crate) fn cmp_annual(&self, other: &Rule) -> Ordering {
        self.annual_key()
            .cmp(&other.annual_key())
            .then_with(|| self.savings.cmp(&other.savings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civil::date;

    fn last_sunday(month: i8, time: i32, savings: i32) -> Rule {
        let day = DaySpec::LastWeekday { month, weekday: Weekday::Sunday };
        Rule::new(day, time, savings, Indicator::Utc).unwrap()
    }

    #[test]
    fn resolve_last_weekday() {
        let rule = last_sunday(3, 3_600, 3_600);
        assert_eq!(rule.date_in(2020), date(2020, 3, 29));
        assert_eq!(rule.date_in(2021), date(2021, 3, 28));
        assert_eq!(rule.date_in(2026), date(2026, 3, 29));

        let rule = last_sunday(10, 3_600, 0);
        assert_eq!(rule.date_in(2020), date(2020, 10, 25));
        assert_eq!(rule.date_in(2021), date(2021, 10, 31));
    }

    #[test]
    fn resolve_on_or_after() {
        let day = DaySpec::WeekdayOnOrAfter {
            month: 3,
            day: 8,
            weekday: Weekday::Sunday,
        };
        let rule = Rule::new(day, 7_200, 3_600, Indicator::Wall).unwrap();
        assert_eq!(rule.date_in(2021), date(2021, 3, 14));
        assert_eq!(rule.date_in(2020), date(2020, 3, 8));

        // An anchor late in the month can roll into the next one.
        let day = DaySpec::WeekdayOnOrAfter {
            month: 12,
            day: 29,
            weekday: Weekday::Sunday,
        };
        let rule = Rule::new(day, 0, 0, Indicator::Utc).unwrap();
        assert_eq!(rule.date_in(2021), date(2022, 1, 2));
    }

    #[test]
    fn resolve_on_or_before() {
        let day = DaySpec::WeekdayOnOrBefore {
            month: 4,
            day: 7,
            weekday: Weekday::Sunday,
        };
        let rule = Rule::new(day, 10_800, 0, Indicator::Wall).unwrap();
        assert_eq!(rule.date_in(2020), date(2020, 4, 5));
        assert_eq!(rule.date_in(2023), date(2023, 4, 2));
    }

    #[test]
    fn resolve_fixed() {
        let day = DaySpec::Fixed { month: 3, day: 30 };
        let rule = Rule::new(day, 0, 3_600, Indicator::Standard).unwrap();
        assert_eq!(rule.date_in(1999), date(1999, 3, 30));
        assert_eq!(rule.date_in(2000), date(2000, 3, 30));
    }

    #[test]
    fn component_ranges() {
        let sunday = Weekday::Sunday;
        let err = Rule::new(
            DaySpec::Fixed { month: 13, day: 1 },
            0,
            0,
            Indicator::Utc,
        )
        .unwrap_err();
        assert!(err.is_range());

        // February 29 exists in some years only, so it cannot anchor a
        // selector.
        assert!(Rule::new(
            DaySpec::Fixed { month: 2, day: 29 },
            0,
            0,
            Indicator::Utc,
        )
        .is_err());
        assert!(Rule::new(
            DaySpec::WeekdayOnOrAfter { month: 2, day: 29, weekday: sunday },
            0,
            0,
            Indicator::Utc,
        )
        .is_err());
        assert!(Rule::new(
            DaySpec::Fixed { month: 4, day: 31 },
            0,
            0,
            Indicator::Utc,
        )
        .is_err());

        let day = DaySpec::Fixed { month: 1, day: 1 };
        assert!(Rule::new(day, -1, 0, Indicator::Utc).is_err());
        assert!(Rule::new(day, 604_800, 0, Indicator::Utc).is_err());
        assert!(Rule::new(day, 0, 93_600, Indicator::Utc).is_err());
        assert!(Rule::new(day, 0, -93_600, Indicator::Utc).is_err());
    }

    #[test]
    fn annual_ordering() {
        let march = last_sunday(3, 3_600, 3_600);
        let october = last_sunday(10, 3_600, 0);
        assert_eq!(march.cmp_annual(&october), Ordering::Less);
        assert_eq!(october.cmp_annual(&march), Ordering::Greater);

        let early = last_sunday(3, 3_600, 3_600);
        let late = last_sunday(3, 7_200, 3_600);
        assert_eq!(early.cmp_annual(&late), Ordering::Less);

        assert_eq!(march.cmp_annual(&march), Ordering::Equal);
    }
}
