/*!
A rule-based time zone transition engine.

This crate models time zones whose behavior is defined by a small set of
recurring annual daylight saving rules layered over a fixed standard
offset. Given such a model, it answers, for any point in absolute or civil
time: what the total offset from UTC is, where the next and previous
transitions fall, and how local wall-clock readings map back to instants
across the gaps and overlaps that daylight saving switches produce.

A model of this kind is useful in two roles. It can stand alone for zones
that are fully described by a recurring pattern, and it can serve as the
extrapolation tail of a historical transition table, taking over beyond
the last explicitly recorded transition. The historical table itself, and
parsers for zone data formats, are out of scope here.

# Example

This configures Central European Time: standard offset `+01:00`, with
clocks moving one hour ahead on the last Sunday of March and back on the
last Sunday of October, both at `01:00` UTC.

```
use tzcycle::{
    civil::{date, time, Weekday},
    DaySpec, Indicator, Offset, Rule, RuleModel, Timestamp,
};

let rules = vec![
    Rule::new(
        DaySpec::LastWeekday { month: 3, weekday: Weekday::Sunday },
        3_600,
        3_600,
        Indicator::Utc,
    )?,
    Rule::new(
        DaySpec::LastWeekday { month: 10, weekday: Weekday::Sunday },
        3_600,
        0,
        Indicator::Utc,
    )?,
];
let model = RuleModel::new(Offset::from_seconds(3_600)?, rules)?;

// The spring switch of 2020 happened on March 29 at 01:00 UTC.
let next = model.next_transition(Timestamp::new(1_585_443_599)).unwrap();
assert_eq!(next.timestamp(), Timestamp::new(1_585_443_600));
assert_eq!(next.previous_offset().seconds(), 3_600);
assert_eq!(next.total_offset().seconds(), 7_200);
assert!(next.is_gap());

// 02:30 on that morning never appeared on local clocks.
assert_eq!(model.valid_offsets(date(2020, 3, 29), time(2, 30, 0)), vec![]);

# Ok::<(), tzcycle::Error>(())
```

# Organization

The main type is [`RuleModel`]. It is built from an [`Offset`] (or an
initial [`Transition`] marking where the rule-based era begins) and a list
of [`Rule`] values, each of which picks one calendar date per year via a
[`DaySpec`] selector and carries a time-of-day, a daylight saving amount
and an [`Indicator`] saying which offset basis its time-of-day is
expressed against.

All queries on a constructed model are read-only and thread-safe. The only
mutable state is an internal per-year memo of expanded transitions, which
is populated on demand and bounded to roughly a century past construction
time.

# Crate features

* **logging** (enabled by default) -
  Emits trace-level messages on cache population via the `log` crate.
* **serde** -
  Implements `Serialize` and `Deserialize` for [`RuleModel`] in terms of
  its compact binary proxy (see [`RuleModel::to_bytes`]).
*/

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(missing_debug_implementations)]

pub use crate::{
    clock::{SystemClock, TimeSource},
    error::Error,
    model::{RuleModel, Start},
    offset::Offset,
    rule::{DaySpec, Indicator, Rule},
    timestamp::Timestamp,
    transition::Transition,
};

#[macro_use]
mod logging;

pub mod civil;
mod clock;
mod error;
mod model;
mod offset;
mod rule;
mod timestamp;
mod transition;
mod wire;
