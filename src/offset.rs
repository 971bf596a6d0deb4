use crate::error::{Error, RangeError};

/// An offset from UTC, as a signed number of seconds.
///
/// Positive offsets are east of the prime meridian and negative offsets
/// are west of it. The supported range is `-93599..=93599` seconds, that
/// is, a hair under 26 hours either side of UTC. This comfortably covers
/// every total offset a daylight saving rule can produce on top of a real
/// standard offset.
///
/// # Example
///
/// ```
/// use tzcycle::Offset;
///
/// let offset = Offset::from_seconds(-18_000)?;
/// assert_eq!(offset.to_string(), "-05:00");
/// assert_eq!(Offset::constant(5), Offset::from_seconds(18_000)?);
///
/// # Ok::<(), tzcycle::Error>(())
/// ```
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Offset {
    second: i32,
}

impl Offset {
    /// The offset of UTC itself, zero seconds.
    pub const UTC: Offset = Offset { second: 0 };

    /// The minimum supported offset, `-25:59:59` from UTC.
    pub const MIN: Offset = Offset { second: -93_599 };

    /// The maximum supported offset, `25:59:59` from UTC.
    pub const MAX: Offset = Offset { second: 93_599 };

    /// Creates an offset from a signed number of seconds from UTC.
    ///
    /// # Errors
    ///
    /// This returns an error when the given number of seconds is not in
    /// `-93599..=93599`.
    pub fn from_seconds(second: i32) -> Result<Offset, Error> {
        if second < Offset::MIN.second || second > Offset::MAX.second {
            return Err(RangeError::new(
                "offset seconds",
                second,
                Offset::MIN.second,
                Offset::MAX.second,
            )
            .into());
        }
        Ok(Offset { second })
    }

    /// Creates an offset from a whole number of hours from UTC.
    ///
    /// # Panics
    ///
    /// This panics when the given number of hours is not in `-25..=25`.
    /// For fallible construction, use [`Offset::from_seconds`].
    pub const fn constant(hours: i8) -> Offset {
        if hours < -25 || hours > 25 {
            panic!("invalid offset hours");
        }
        Offset { second: (hours as i32) * 3_600 }
    }

    /// Returns this offset as a signed number of seconds from UTC.
    pub const fn seconds(self) -> i32 {
        self.second
    }

    /// Used where the caller has already established that the seconds are
    /// in range, such as re-deriving a total offset that construction
    /// validated.
    pub(crate) const fn from_seconds_unchecked(second: i32) -> Offset {
        Offset { second }
    }
}

impl core::fmt::Display for Offset {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let sign = if self.second < 0 { '-' } else { '+' };
        let total = self.second.unsigned_abs();
        let (hours, minutes, seconds) =
            (total / 3_600, (total / 60) % 60, total % 60);
        write!(f, "{sign}{hours:02}:{minutes:02}")?;
        if seconds != 0 {
            write!(f, ":{seconds:02}")?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for Offset {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}
