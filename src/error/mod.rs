pub(crate) mod model;
pub(crate) mod wire;

/// An error that can occur in this crate.
///
/// Errors fall into three groups:
///
/// * Construction failures: an invalid rule set (too few or too many rules,
/// no rule returning to standard time, duplicate firing positions) or an
/// initial transition that contradicts the rules it precedes.
/// * Component range failures: a month, day, time-of-day or offset value
/// outside its documented range.
/// * Malformed binary proxies during deserialization.
///
/// # Introspection is limited
///
/// Other than implementing the [`std::error::Error`] trait, the
/// [`core::fmt::Debug`] trait and the [`core::fmt::Display`] trait, this
/// error type provides limited introspection capabilities. Coarse
/// predicates such as [`Error::is_range`] and [`Error::is_invalid_rules`]
/// distinguish the groups above, but there is no finer grained access to
/// the failure. This follows from keeping a single error type for all
/// fallible operations, which composes better than one error type per
/// module.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
}

#[derive(Clone, Debug)]
pub(crate) enum ErrorKind {
    Range(RangeError),
    Model(model::ModelError),
    Wire(wire::WireError),
}

impl Error {
    /// Returns true when this error is a result of a component value being
    /// out of its documented range.
    ///
    /// # Example
    ///
    /// ```
    /// use tzcycle::Offset;
    ///
    /// // A zonal offset is limited to about 26 hours either side of UTC.
    /// assert!(Offset::from_seconds(200_000).unwrap_err().is_range());
    /// ```
    pub fn is_range(&self) -> bool {
        matches!(self.kind, ErrorKind::Range(_))
    }

    /// Returns true when this error originated from an unusable rule set:
    /// fewer than two rules, 128 or more rules, no rule with zero daylight
    /// saving or two rules occupying the same position in the annual cycle.
    pub fn is_invalid_rules(&self) -> bool {
        use self::model::ModelError::*;

        matches!(
            self.kind,
            ErrorKind::Model(
                TooFewRules(_) | TooManyRules(_) | NoStandardRule
                    | DuplicateRule
            )
        )
    }

    /// Returns true when this error originated from an initial transition
    /// that contradicts the model built on top of it.
    pub fn is_inconsistent_initial(&self) -> bool {
        use self::model::ModelError::*;

        matches!(
            self.kind,
            ErrorKind::Model(
                InitialSavings | InitialOffsetMismatch | InconsistentInitial
            )
        )
    }

    /// Returns true when this error is a result of asking for the
    /// transitions in an interval whose start lies after its end.
    pub fn is_invalid_interval(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Model(model::ModelError::IntervalStartAfterEnd)
        )
    }

    /// Returns true when this error is a result of decoding a malformed
    /// binary proxy.
    pub fn is_malformed_stream(&self) -> bool {
        matches!(self.kind, ErrorKind::Wire(_))
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.kind {
            ErrorKind::Range(ref err) => core::fmt::Display::fmt(err, f),
            ErrorKind::Model(ref err) => core::fmt::Display::fmt(err, f),
            ErrorKind::Wire(ref err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind }
    }
}

/// A value was outside its documented range.
#[derive(Clone, Debug)]
pub(crate) struct RangeError {
    what: &'static str,
    value: i64,
    min: i64,
    max: i64,
}

impl RangeError {
    pub(crate) fn new(
        what: &'static str,
        value: impl Into<i64>,
        min: impl Into<i64>,
        max: impl Into<i64>,
    ) -> RangeError {
        RangeError {
            what,
            value: value.into(),
            min: min.into(),
            max: max.into(),
        }
    }
}

impl From<RangeError> for Error {
    #[cold]
    #[inline(never)]
    fn from(err: RangeError) -> Error {
        ErrorKind::Range(err).into()
    }
}

impl core::fmt::Display for RangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let RangeError { what, value, min, max } = *self;
        write!(
            f,
            "parameter '{what}' with value {value} \
             is not in the required range of {min}..={max}",
        )
    }
}
