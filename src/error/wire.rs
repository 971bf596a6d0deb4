use crate::error;

/// A defect in the compact binary proxy of a rule model.
#[derive(Clone, Debug)]
pub(crate) enum WireError {
    /// The stream ended before the announced content did.
    UnexpectedEof,
    /// The envelope header byte does not announce a rule model.
    ModelTag(u8),
    /// A rule header byte announces an unknown selector kind.
    RuleTag(u8),
    /// A rule header byte announces an unknown time indicator.
    IndicatorBits(u8),
    /// Bytes remain after the announced content.
    TrailingBytes(usize),
}

impl From<WireError> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: WireError) -> error::Error {
        error::ErrorKind::Wire(err).into()
    }
}

impl core::fmt::Display for WireError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::WireError::*;

        match *self {
            UnexpectedEof => {
                f.write_str("unexpected end of rule model binary proxy")
            }
            ModelTag(header) => write!(
                f,
                "expected rule model type tag in proxy header, \
                 but found header byte {header:#04x}",
            ),
            RuleTag(header) => write!(
                f,
                "unknown rule selector tag in proxy header byte {header:#04x}",
            ),
            IndicatorBits(bits) => write!(
                f,
                "unknown time indicator {bits} in rule proxy header",
            ),
            TrailingBytes(len) => write!(
                f,
                "found {len} trailing bytes after rule model binary proxy",
            ),
        }
    }
}
