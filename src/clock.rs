use std::time::SystemTime;

use crate::timestamp::Timestamp;

/// A source of the current time.
///
/// A [`RuleModel`](crate::RuleModel) consults a time source exactly once,
/// at construction, to precompute its default transition preview and to
/// bound its internal year cache. It plays no role in any query, so a
/// fixed implementation makes a model fully deterministic:
///
/// ```
/// use tzcycle::{Timestamp, TimeSource};
///
/// struct FixedClock(i64);
///
/// impl TimeSource for FixedClock {
///     fn now(&self) -> Timestamp {
///         Timestamp::new(self.0)
///     }
/// }
/// ```
pub trait TimeSource {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// The system clock, read through [`std::time::SystemTime`].
///
/// This is the time source behind [`RuleModel::new`](crate::RuleModel::new)
/// and [`RuleModel::starting_at`](crate::RuleModel::starting_at).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        let second = match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)
        {
            Ok(elapsed) => elapsed.as_secs() as i64,
            // The system clock reads before the epoch.
            Err(ahead) => -(ahead.duration().as_secs() as i64),
        };
        Timestamp::new(second)
    }
}
