use crate::error;

/// A failure to build or query a rule model.
#[derive(Clone, Debug)]
pub(crate) enum ModelError {
    /// Fewer than two rules were supplied.
    TooFewRules(usize),
    /// 128 or more rules were supplied.
    TooManyRules(usize),
    /// No rule with zero daylight saving exists, so standard time would
    /// never return.
    NoStandardRule,
    /// Two rules occupy the same position in the annual cycle.
    DuplicateRule,
    /// The initial transition carries a daylight saving amount.
    InitialSavings,
    /// The initial transition's previous and total offsets disagree.
    InitialOffsetMismatch,
    /// The initial transition's total offset does not match the previous
    /// offset of the first rule-generated transition after it.
    InconsistentInitial,
    /// An enumeration interval whose start lies after its end.
    IntervalStartAfterEnd,
}

impl From<ModelError> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: ModelError) -> error::Error {
        error::ErrorKind::Model(err).into()
    }
}

impl core::fmt::Display for ModelError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ModelError::*;

        match *self {
            TooFewRules(len) => write!(
                f,
                "at least 2 daylight saving rules are required, \
                 but only {len} were given",
            ),
            TooManyRules(len) => write!(
                f,
                "at most 127 daylight saving rules are supported, \
                 but {len} were given",
            ),
            NoStandardRule => f.write_str(
                "no daylight saving rule with zero savings found, \
                 so the model could never return to standard time",
            ),
            DuplicateRule => f.write_str(
                "two daylight saving rules fire at the same position \
                 in the annual cycle",
            ),
            InitialSavings => f.write_str(
                "the initial transition must not carry any daylight saving",
            ),
            InitialOffsetMismatch => f.write_str(
                "the initial transition must have equal previous and \
                 total offsets",
            ),
            InconsistentInitial => f.write_str(
                "the initial transition's total offset disagrees with \
                 the first rule-generated transition after it",
            ),
            IntervalStartAfterEnd => {
                f.write_str("interval start is after interval end")
            }
        }
    }
}
