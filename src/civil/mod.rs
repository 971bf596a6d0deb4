/*!
Civil (wall-clock) date and time types.

These types carry no offset or zone of their own. A [`Date`] names a day
in the proleptic Gregorian calendar, a [`Time`] names a clock reading on
some unspecified day, and a [`Weekday`] names a day of the week. They
exist to express rule dates and local-time queries; everything absolute
lives in [`Timestamp`](crate::Timestamp).
*/

pub use self::{
    date::{date, Date},
    time::{time, Time},
    weekday::Weekday,
};

pub(crate) use self::date::{days_in_month, year_of_second};

mod date;
mod time;
mod weekday;
