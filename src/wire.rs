/*!
The compact binary proxy of a rule model.

A model serializes as a single envelope: one header byte whose top five
bits carry the type tag, the initial transition as big-endian fixed-width
integers, a one-byte rule count and then each rule through its own
tagged proxy. Decoding is strict. Unknown tags, short payloads and
trailing bytes are all refused, and everything that decodes structurally
is re-validated by the ordinary model constructor, so no malformed or
inconsistent model can enter through this path.
*/

use crate::{
    civil::Weekday,
    error::{wire::WireError, Error},
    model::RuleModel,
    offset::Offset,
    rule::{DaySpec, Indicator, Rule},
    timestamp::Timestamp,
    transition::Transition,
};

/// Type tag of the rule model envelope, in the top five bits of its
/// header byte. The low three bits are reserved and zero.
const MODEL_TAG: u8 = 25;

/// Type tags of the rule proxies, in the top five bits of each rule
/// header byte. The low bits carry the rule's time indicator.
const FIXED_TAG: u8 = 26;
const LAST_WEEKDAY_TAG: u8 = 27;
const ON_OR_AFTER_TAG: u8 = 28;
const ON_OR_BEFORE_TAG: u8 = 29;

impl RuleModel {
    /// Serializes this model as its compact binary proxy.
    ///
    /// # Example
    ///
    /// ```
    /// use tzcycle::{civil::Weekday, DaySpec, Indicator, Offset, Rule, RuleModel};
    ///
    /// let model = RuleModel::new(
    ///     Offset::constant(1),
    ///     vec![
    ///         Rule::new(
    ///             DaySpec::LastWeekday { month: 3, weekday: Weekday::Sunday },
    ///             3_600,
    ///             3_600,
    ///             Indicator::Utc,
    ///         )?,
    ///         Rule::new(
    ///             DaySpec::LastWeekday { month: 10, weekday: Weekday::Sunday },
    ///             3_600,
    ///             0,
    ///             Indicator::Utc,
    ///         )?,
    ///     ],
    /// )?;
    /// let roundtrip = RuleModel::from_bytes(&model.to_bytes())?;
    /// assert_eq!(roundtrip, model);
    ///
    /// # Ok::<(), tzcycle::Error>(())
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let initial = self.initial_transition();
        let rules = self.rules();

        let mut buf = Vec::with_capacity(22 + rules.len() * 13);
        buf.push(MODEL_TAG << 3);
        buf.extend_from_slice(
            &initial.timestamp().as_second().to_be_bytes(),
        );
        buf.extend_from_slice(
            &initial.previous_offset().seconds().to_be_bytes(),
        );
        buf.extend_from_slice(
            &initial.total_offset().seconds().to_be_bytes(),
        );
        buf.extend_from_slice(&initial.savings().to_be_bytes());
        // Construction keeps the count under 128, so it fits a byte.
        buf.push(rules.len() as u8);
        for rule in rules {
            write_rule(rule, &mut buf);
        }
        buf
    }

    /// Deserializes a model from its compact binary proxy.
    ///
    /// This is the only decoding path. The decoded initial transition and
    /// rules pass through the ordinary constructor, so this fails exactly
    /// when constructing the same model directly would, in addition to
    /// failing on structural defects in the stream itself.
    ///
    /// # Errors
    ///
    /// This returns an error when the stream is truncated, carries an
    /// unknown tag, has trailing bytes, or describes a model that fails
    /// construction-time validation.
    pub fn from_bytes(bytes: &[u8]) -> Result<RuleModel, Error> {
        let mut reader = Reader::new(bytes);
        let header = reader.u8()?;
        if header != MODEL_TAG << 3 {
            return Err(WireError::ModelTag(header).into());
        }
        let posix = reader.i64()?;
        let previous = Offset::from_seconds(reader.i32()?)?;
        let total = Offset::from_seconds(reader.i32()?)?;
        let savings = reader.i32()?;
        let count = reader.u8()?;
        let mut rules = Vec::with_capacity(count as usize);
        for _ in 0..count {
            rules.push(read_rule(&mut reader)?);
        }
        if reader.remaining() != 0 {
            return Err(WireError::TrailingBytes(reader.remaining()).into());
        }

        let initial = Transition::new(
            Timestamp::new(posix),
            previous,
            total,
            savings,
        );
        RuleModel::starting_at(initial, rules)
    }
}

fn write_rule(rule: &Rule, buf: &mut Vec<u8>) {
    let indicator = rule.indicator() as u8;
    match rule.day() {
        DaySpec::Fixed { month, day } => {
            buf.push(FIXED_TAG << 3 | indicator);
            buf.push(month as u8);
            buf.push(day as u8);
        }
        DaySpec::LastWeekday { month, weekday } => {
            buf.push(LAST_WEEKDAY_TAG << 3 | indicator);
            buf.push(month as u8);
            buf.push(weekday.to_sunday_zero_offset() as u8);
        }
        DaySpec::WeekdayOnOrAfter { month, day, weekday } => {
            buf.push(ON_OR_AFTER_TAG << 3 | indicator);
            buf.push(month as u8);
            buf.push(day as u8);
            buf.push(weekday.to_sunday_zero_offset() as u8);
        }
        DaySpec::WeekdayOnOrBefore { month, day, weekday } => {
            buf.push(ON_OR_BEFORE_TAG << 3 | indicator);
            buf.push(month as u8);
            buf.push(day as u8);
            buf.push(weekday.to_sunday_zero_offset() as u8);
        }
    }
    buf.extend_from_slice(&rule.time_of_day().to_be_bytes());
    buf.extend_from_slice(&rule.savings().to_be_bytes());
}

fn read_rule(reader: &mut Reader<'_>) -> Result<Rule, Error> {
    let header = reader.u8()?;
    let indicator = match header & 0b111 {
        0 => Indicator::Utc,
        1 => Indicator::Standard,
        2 => Indicator::Wall,
        bits => return Err(WireError::IndicatorBits(bits).into()),
    };
    let day = match header >> 3 {
        FIXED_TAG => DaySpec::Fixed {
            month: reader.u8()? as i8,
            day: reader.u8()? as i8,
        },
        LAST_WEEKDAY_TAG => DaySpec::LastWeekday {
            month: reader.u8()? as i8,
            weekday: read_weekday(reader)?,
        },
        ON_OR_AFTER_TAG => DaySpec::WeekdayOnOrAfter {
            month: reader.u8()? as i8,
            day: reader.u8()? as i8,
            weekday: read_weekday(reader)?,
        },
        ON_OR_BEFORE_TAG => DaySpec::WeekdayOnOrBefore {
            month: reader.u8()? as i8,
            day: reader.u8()? as i8,
            weekday: read_weekday(reader)?,
        },
        _ => return Err(WireError::RuleTag(header).into()),
    };
    let time = reader.i32()?;
    let savings = reader.i32()?;
    Rule::new(day, time, savings, indicator)
}

fn read_weekday(reader: &mut Reader<'_>) -> Result<Weekday, Error> {
    Weekday::from_sunday_zero_offset(reader.u8()? as i8)
}

/// A cursor over the proxy bytes, reading big-endian fixed-width
/// integers.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Reader<'a> {
        Reader { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < len {
            return Err(WireError::UnexpectedEof.into());
        }
        let taken = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(taken)
    }

    fn u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    fn i32(&mut self) -> Result<i32, Error> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().expect("4 bytes were taken")))
    }

    fn i64(&mut self) -> Result<i64, Error> {
        let bytes = self.take(8)?;
        Ok(i64::from_be_bytes(bytes.try_into().expect("8 bytes were taken")))
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::RuleModel;

    impl serde::Serialize for RuleModel {
        fn serialize<S: serde::Serializer>(
            &self,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }

    impl<'de> serde::Deserialize<'de> for RuleModel {
        fn deserialize<D: serde::Deserializer<'de>>(
            deserializer: D,
        ) -> Result<RuleModel, D::Error> {
            struct ProxyVisitor;

            impl<'de> serde::de::Visitor<'de> for ProxyVisitor {
                type Value = RuleModel;

                fn expecting(
                    &self,
                    f: &mut core::fmt::Formatter,
                ) -> core::fmt::Result {
                    f.write_str("a rule model binary proxy")
                }

                fn visit_bytes<E: serde::de::Error>(
                    self,
                    bytes: &[u8],
                ) -> Result<RuleModel, E> {
                    RuleModel::from_bytes(bytes).map_err(E::custom)
                }

                fn visit_seq<A: serde::de::SeqAccess<'de>>(
                    self,
                    mut seq: A,
                ) -> Result<RuleModel, A::Error> {
                    let mut bytes =
                        Vec::with_capacity(seq.size_hint().unwrap_or(0));
                    while let Some(byte) = seq.next_element::<u8>()? {
                        bytes.push(byte);
                    }
                    RuleModel::from_bytes(&bytes)
                        .map_err(serde::de::Error::custom)
                }
            }

            deserializer.deserialize_bytes(ProxyVisitor)
        }
    }
}
