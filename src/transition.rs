use crate::{offset::Offset, timestamp::Timestamp};

/// An instant at which a zone's total offset from UTC changes.
///
/// A transition carries the total offset in effect strictly before its
/// instant, the total offset in effect at and after it, and the daylight
/// saving amount contained in the new total offset. From the two offsets
/// follow the two interesting shapes a switch can take on local clocks:
///
/// * a *gap*, when the total offset grows and some wall-clock readings
/// are skipped, and
/// * an *overlap*, when the total offset shrinks and some wall-clock
/// readings occur twice.
///
/// # Example
///
/// ```
/// use tzcycle::{Offset, Timestamp, Transition};
///
/// // Central Europe springing forward in 2020.
/// let t = Transition::new(
///     Timestamp::new(1_585_443_600),
///     Offset::constant(1),
///     Offset::constant(2),
///     3_600,
/// );
/// assert!(t.is_gap());
/// assert!(!t.is_overlap());
/// assert!(t.is_daylight_saving());
/// ```
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Transition {
    timestamp: Timestamp,
    previous_offset: Offset,
    total_offset: Offset,
    savings: i32,
}

impl Transition {
    /// Creates a transition record.
    ///
    /// `savings` is the daylight saving portion of `total_offset`, in
    /// seconds; zero means the transition ends daylight saving time.
    pub fn new(
        timestamp: Timestamp,
        previous_offset: Offset,
        total_offset: Offset,
        savings: i32,
    ) -> Transition {
        Transition { timestamp, previous_offset, total_offset, savings }
    }

    /// Returns the instant this transition takes effect.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns the total offset in effect strictly before this
    /// transition.
    pub fn previous_offset(&self) -> Offset {
        self.previous_offset
    }

    /// Returns the total offset in effect at and after this transition.
    pub fn total_offset(&self) -> Offset {
        self.total_offset
    }

    /// Returns the daylight saving amount contained in the new total
    /// offset, in seconds.
    pub fn savings(&self) -> i32 {
        self.savings
    }

    /// Returns true when this transition moves local clocks forward,
    /// skipping some wall-clock readings.
    pub fn is_gap(&self) -> bool {
        self.total_offset > self.previous_offset
    }

    /// Returns true when this transition moves local clocks backward,
    /// repeating some wall-clock readings.
    pub fn is_overlap(&self) -> bool {
        self.total_offset < self.previous_offset
    }

    /// Returns true when daylight saving time is in effect after this
    /// transition.
    pub fn is_daylight_saving(&self) -> bool {
        self.savings != 0
    }
}

impl core::fmt::Debug for Transition {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{timestamp} [{previous} -> {total}, dst {savings}s]",
            timestamp = self.timestamp,
            previous = self.previous_offset,
            total = self.total_offset,
            savings = self.savings,
        )
    }
}
