use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Arc, RwLock},
};

use crate::{
    civil::{self, Date, Time},
    clock::{SystemClock, TimeSource},
    error::{model::ModelError, Error},
    offset::Offset,
    rule::{Indicator, Rule},
    timestamp::Timestamp,
    transition::Transition,
};

/// How far past construction time expanded years are retained. Years
/// beyond the horizon are recomputed on every lookup, so pathological
/// far-future queries cannot grow memory without bound.
const CACHE_HORIZON_YEARS: i16 = 100;

/// Where the rule-based era of a model begins.
///
/// The distinction matters for every query: transitions are only ever
/// reported from within the rule-based era, and local times from before
/// it resolve against the initial offset alone.
#[derive(Clone, Copy, Debug)]
pub enum Start {
    /// The rules apply for all time. The given offset is the zone's
    /// standard offset.
    Boundless(Offset),
    /// The rule-based era begins at this transition, typically the last
    /// entry of a historical transition table. Its previous and total
    /// offsets must both equal the standard offset and it must carry no
    /// daylight saving.
    At(Transition),
}

/// A time zone model built from recurring annual daylight saving rules.
///
/// A `RuleModel` owns a fixed standard offset and an ordered cycle of
/// [`Rule`]s describing how the total offset changes through a year. From
/// those inputs alone it can place every past and future transition on
/// the POSIX time scale, so it works both as a standalone model for zones
/// with a purely recurring pattern and as the extrapolation tail beyond
/// the last record of a historical transition table.
///
/// # Construction
///
/// [`RuleModel::new`] models rules that apply for all time;
/// [`RuleModel::starting_at`] anchors the rule-based era at an initial
/// transition. Both validate the rule cycle: it must contain at least two
/// and fewer than 128 rules, at least one rule must return to standard
/// time, and no two rules may occupy the same position in the annual
/// cycle. An initial transition must additionally agree with the first
/// transition the rules generate after it.
///
/// # Concurrency
///
/// All queries are read-only and the model is `Send + Sync`. Expanded
/// years are memoised internally; concurrent lookups of the same year
/// race benignly, with losers adopting the published list.
///
/// # Example
///
/// ```
/// use tzcycle::{
///     civil::Weekday, DaySpec, Indicator, Offset, Rule, RuleModel,
///     Timestamp,
/// };
///
/// // Central European Time.
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
///
/// // Both switches of 2020, in order.
/// let transitions = model.transitions_in(
///     Timestamp::new(1_577_836_800), // 2020-01-01T00:00:00Z
///     Timestamp::new(1_609_459_200), // 2021-01-01T00:00:00Z
/// )?;
/// assert_eq!(transitions.len(), 2);
/// assert!(transitions[0].is_gap());
/// assert!(transitions[1].is_overlap());
///
/// # Ok::<(), tzcycle::Error>(())
/// ```
pub struct RuleModel {
    std_offset: Offset,
    /// `None` means the rules apply for all time.
    start: Option<Timestamp>,
    /// In canonical annual order.
    rules: Vec<Rule>,
    last_cached_year: i16,
    std_transitions: Vec<Transition>,
    cache: RwLock<HashMap<i16, Arc<[Transition]>>>,
}

impl RuleModel {
    /// Creates a model whose rules apply for all time, using the system
    /// clock to precompute the default transition preview.
    ///
    /// # Errors
    ///
    /// This returns an error when the rule cycle is unusable; see the
    /// type-level documentation for the constraints.
    pub fn new(
        standard_offset: Offset,
        rules: Vec<Rule>,
    ) -> Result<RuleModel, Error> {
        RuleModel::with_clock(
            Start::Boundless(standard_offset),
            rules,
            &SystemClock,
        )
    }

    /// Creates a model whose rule-based era begins at the given
    /// transition, using the system clock to precompute the default
    /// transition preview.
    ///
    /// # Errors
    ///
    /// In addition to the rule cycle constraints, this returns an error
    /// when the initial transition carries daylight saving, when its
    /// previous and total offsets differ, or when its total offset
    /// disagrees with the first transition the rules generate after it.
    pub fn starting_at(
        initial: Transition,
        rules: Vec<Rule>,
    ) -> Result<RuleModel, Error> {
        RuleModel::with_clock(Start::At(initial), rules, &SystemClock)
    }

    /// Creates a model with an explicit time source.
    ///
    /// The clock is consulted exactly once, to precompute
    /// [`RuleModel::std_transitions`] and to bound the internal year
    /// cache. It has no effect on any query, so a fixed clock yields a
    /// fully deterministic model.
    pub fn with_clock(
        start: Start,
        mut rules: Vec<Rule>,
        clock: &dyn TimeSource,
    ) -> Result<RuleModel, Error> {
        if rules.len() < 2 {
            return Err(ModelError::TooFewRules(rules.len()).into());
        }
        if rules.len() >= 128 {
            return Err(ModelError::TooManyRules(rules.len()).into());
        }
        rules.sort_by(|r1, r2| r1.cmp_annual(r2));
        if rules.windows(2).any(|w| w[0].annual_key() == w[1].annual_key()) {
            return Err(ModelError::DuplicateRule.into());
        }
        if !rules.iter().any(|rule| rule.savings() == 0) {
            return Err(ModelError::NoStandardRule.into());
        }

        let (std_offset, start) = match start {
            Start::Boundless(offset) => (offset, None),
            Start::At(initial) => {
                if initial.savings() != 0 {
                    return Err(ModelError::InitialSavings.into());
                }
                if initial.previous_offset() != initial.total_offset() {
                    return Err(ModelError::InitialOffsetMismatch.into());
                }
                let std = initial.total_offset();
                if initial.timestamp().as_second() == i64::MIN {
                    // An era starting at the minimum instant is
                    // indistinguishable from one that never started.
                    (std, None)
                } else {
                    (std, Some(initial.timestamp()))
                }
            }
        };

        // Every total offset the cycle can produce must be representable.
        for rule in rules.iter() {
            Offset::from_seconds(std_offset.seconds() + rule.savings())?;
        }

        let pre_model = start.map_or(i64::MIN, Timestamp::as_second);
        if let Some(begin) = start {
            // The rules take over exactly where the pre-model era left
            // off, so the first generated transition must depart from the
            // initial total offset.
            let first = next_after(
                begin.as_second(),
                pre_model,
                std_offset.seconds(),
                &rules,
            );
            if let Some(first) = first {
                if first.previous_offset() != std_offset {
                    return Err(ModelError::InconsistentInitial.into());
                }
            }
        }

        let now = clock.now().as_second();
        let last_cached_year = civil::year_of_second(now)
            .saturating_add(CACHE_HORIZON_YEARS)
            .min(Date::MAX.year());
        let std_transitions = compute_transitions(
            pre_model,
            std_offset.seconds(),
            &rules,
            Timestamp::UNIX_EPOCH.as_second(),
            one_year_after(now),
        );
        debug!(
            "built rule model: {len} rules, standard offset {std_offset}, \
             era start {start:?}",
            len = rules.len(),
        );

        Ok(RuleModel {
            std_offset,
            start,
            rules,
            last_cached_year,
            std_transitions,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the total offset in effect before any rule has fired: the
    /// zone's standard offset.
    pub fn initial_offset(&self) -> Offset {
        self.std_offset
    }

    /// Returns the instant at which the rule-based era begins, or `None`
    /// when the rules apply for all time.
    pub fn start(&self) -> Option<Timestamp> {
        self.start
    }

    /// Returns the rule cycle in canonical annual order, January through
    /// December.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the greatest transition at or before the given instant,
    /// or `None` when the instant precedes the rule-based era.
    pub fn start_transition(&self, at: Timestamp) -> Option<Transition> {
        let pre_model = self.pre_model_second();
        let at = at.as_second();
        if at <= pre_model {
            return None;
        }

        let std = self.std_offset.seconds();
        let n = self.rules.len();
        let rule = &self.rules[0];
        let previous = &self.rules[n - 1];
        let shift = offset_shift(rule, std, previous.savings());
        let year = seed_year(at, shift);
        let transitions = self.year_transitions(year);

        let mut current: Option<Transition> = None;
        for i in 0..n {
            let zt = transitions[i];
            let tt = zt.timestamp().as_second();

            if at < tt {
                if current.is_none() {
                    // The match is the slot before this one, wrapping to
                    // the previous year's last transition.
                    let candidate = if i == 0 {
                        if year > Date::MIN.year() {
                            Some(self.year_transitions(year - 1)[n - 1])
                        } else {
                            None
                        }
                    } else {
                        Some(transitions[i - 1])
                    };
                    if let Some(zt) = candidate {
                        if zt.timestamp().as_second() > pre_model {
                            current = Some(zt);
                        }
                    }
                }
                break;
            } else if tt > pre_model {
                current = Some(zt);
            }
        }
        current
    }

    /// Returns the first transition strictly after the given instant (or
    /// after the era start, whichever is later).
    ///
    /// The rule cycle always produces another transition, so this is
    /// `None` only when the next one would fall beyond the supported
    /// civil year range.
    pub fn next_transition(&self, at: Timestamp) -> Option<Transition> {
        next_after(
            at.as_second(),
            self.pre_model_second(),
            self.std_offset.seconds(),
            &self.rules,
        )
    }

    /// Returns the transitions whose instants lie in `[start, end)` and
    /// within the rule-based era, in strictly ascending order.
    ///
    /// # Errors
    ///
    /// This returns an error when `start` is after `end`.
    pub fn transitions_in(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Transition>, Error> {
        if start > end {
            return Err(ModelError::IntervalStartAfterEnd.into());
        }
        Ok(compute_transitions(
            self.pre_model_second(),
            self.std_offset.seconds(),
            &self.rules,
            start.as_second(),
            end.as_second(),
        ))
    }

    /// Returns the transition whose gap or overlap window contains the
    /// given local date and time, or `None` when the local reading is
    /// unambiguous.
    pub fn conflict_transition(
        &self,
        date: Date,
        time: Time,
    ) -> Option<Transition> {
        let local = local_second(date, time);
        let pre_model = self.pre_model_second();
        if local
            <= pre_model.saturating_add(self.std_offset.seconds() as i64)
        {
            // Entirely within the pre-model era.
            return None;
        }

        for t in self.year_transitions(date.year()).iter() {
            let tt = t.timestamp().as_second();
            let previous = t.previous_offset().seconds() as i64;
            let total = t.total_offset().seconds() as i64;

            if t.is_gap() {
                if local < tt + previous {
                    return None;
                } else if local < tt + total {
                    return Some(*t);
                }
            } else if t.is_overlap() {
                if local < tt + total {
                    return None;
                } else if local < tt + previous {
                    return Some(*t);
                }
            }
        }
        None
    }

    /// Returns the total offsets that the given local date and time can
    /// legitimately denote.
    ///
    /// The result has one entry for an unambiguous reading, none for a
    /// reading inside a gap, and two for a reading inside an overlap. In
    /// the overlap case the order is the offset in effect after the
    /// transition, then the one before it.
    pub fn valid_offsets(&self, date: Date, time: Time) -> Vec<Offset> {
        let local = local_second(date, time);
        let pre_model = self.pre_model_second();
        let mut last = self.std_offset;
        if local <= pre_model.saturating_add(last.seconds() as i64) {
            return vec![last];
        }

        for t in self.year_transitions(date.year()).iter() {
            let tt = t.timestamp().as_second();
            let previous = t.previous_offset();
            let total = t.total_offset();
            last = total;

            if t.is_gap() {
                if local < tt + previous.seconds() as i64 {
                    return vec![previous];
                } else if local < tt + total.seconds() as i64 {
                    return vec![];
                }
            } else if t.is_overlap() {
                if local < tt + total.seconds() as i64 {
                    return vec![previous];
                } else if local < tt + previous.seconds() as i64 {
                    return vec![total, previous];
                }
            }
        }
        vec![last]
    }

    /// Returns the transitions between the Unix epoch and one year past
    /// construction time, precomputed at construction.
    pub fn std_transitions(&self) -> &[Transition] {
        &self.std_transitions
    }

    /// The transition the rule-based era departs from, reconstructed for
    /// the wire proxy. For a boundless model its instant is the minimum.
    pub(crate) fn initial_transition(&self) -> Transition {
        Transition::new(
            self.start.unwrap_or(Timestamp::new(i64::MIN)),
            self.std_offset,
            self.std_offset,
            0,
        )
    }

    fn pre_model_second(&self) -> i64 {
        self.start.map_or(i64::MIN, Timestamp::as_second)
    }

    /// Returns the given year's transitions, one per rule in firing
    /// order, through the concurrent memo.
    fn year_transitions(&self, year: i16) -> Arc<[Transition]> {
        {
            let cache =
                self.cache.read().expect("year cache lock is never poisoned");
            if let Some(list) = cache.get(&year) {
                return Arc::clone(list);
            }
        }

        let list: Arc<[Transition]> =
            expand_year(year, self.std_offset.seconds(), &self.rules).into();
        if year <= self.last_cached_year {
            let mut cache = self
                .cache
                .write()
                .expect("year cache lock is never poisoned");
            match cache.entry(year) {
                // Another writer raced us here. Its list is the published
                // one, so ours is discarded.
                Entry::Occupied(entry) => return Arc::clone(entry.get()),
                Entry::Vacant(entry) => {
                    trace!(
                        "caching {len} transitions for year {year}",
                        len = list.len(),
                    );
                    entry.insert(Arc::clone(&list));
                }
            }
        }
        list
    }
}

impl PartialEq for RuleModel {
    fn eq(&self, other: &RuleModel) -> bool {
        self.std_offset == other.std_offset
            && self.start == other.start
            && self.rules == other.rules
    }
}

impl Eq for RuleModel {}

impl core::fmt::Debug for RuleModel {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("RuleModel")
            .field("standard_offset", &self.std_offset)
            .field("start", &self.start)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

/// Converts the basis a rule's time-of-day is expressed against into the
/// number of seconds to subtract when reducing the rule's local instant
/// to POSIX seconds.
fn offset_shift(rule: &Rule, std: i32, previous_savings: i32) -> i32 {
    match rule.indicator() {
        Indicator::Utc => 0,
        Indicator::Standard => std,
        Indicator::Wall => std + previous_savings,
    }
}

/// The POSIX second at which the rule fires in the given year.
fn transition_second(rule: &Rule, year: i16, shift: i32) -> i64 {
    let epoch_day = rule.date_in(year).to_epoch_day() as i64;
    epoch_day * 86_400 + rule.time_of_day() as i64 - shift as i64
}

fn make_transition(
    rule: &Rule,
    previous: &Rule,
    std: i32,
    tt: i64,
) -> Transition {
    // Construction verified that the standard offset plus any rule's
    // savings stays in range.
    Transition::new(
        Timestamp::new(tt),
        Offset::from_seconds_unchecked(std + previous.savings()),
        Offset::from_seconds_unchecked(std + rule.savings()),
        rule.savings(),
    )
}

/// The civil year that the given instant lands in after applying a rule's
/// basis shift. Biasing by the shift keeps rules expressed in standard or
/// wall time near a January boundary attributed to their nominal year.
fn seed_year(second: i64, shift: i32) -> i16 {
    civil::year_of_second(second.saturating_add(shift as i64))
}

/// Materialises one civil year of the cycle: exactly one transition per
/// rule, in firing order. The offset each transition departs from is the
/// one its cycle predecessor establishes, wrapping from the head of the
/// cycle back to its tail within the same year.
fn expand_year(year: i16, std: i32, rules: &[Rule]) -> Vec<Transition> {
    let n = rules.len();
    let mut list = Vec::with_capacity(n);
    for i in 0..n {
        let rule = &rules[i];
        let previous = &rules[(i + n - 1) % n];
        let shift = offset_shift(rule, std, previous.savings());
        let tt = transition_second(rule, year, shift);
        list.push(make_transition(rule, previous, std, tt));
    }
    list
}

/// The incremental enumeration behind `transitions_in` and the standard
/// preview: walk the cycle from a seed year, stepping the year on each
/// wrap, and keep everything in `[start, end)` that falls after the era
/// start.
fn compute_transitions(
    pre_model: i64,
    std: i32,
    rules: &[Rule],
    start: i64,
    end: i64,
) -> Vec<Transition> {
    if end <= pre_model || start == end {
        return Vec::new();
    }

    let n = rules.len();
    let mut transitions = Vec::new();
    // Seed the year from the cycle head's basis shift; see `seed_year`.
    let first_shift = offset_shift(&rules[0], std, rules[n - 1].savings());
    let mut year = seed_year(start.max(pre_model), first_shift);
    let mut i: usize = 0;
    loop {
        let rule = &rules[i % n];
        let previous = &rules[(i + n - 1) % n];
        let shift = offset_shift(rule, std, previous.savings());

        if i > 0 && i % n == 0 {
            if year >= Date::MAX.year() {
                // Nothing past the supported civil range is representable.
                break;
            }
            year += 1;
        }

        let tt = transition_second(rule, year, shift);
        i += 1;

        if tt >= end {
            break;
        }
        if tt >= start && tt > pre_model {
            transitions.push(make_transition(rule, previous, std, tt));
        }
    }
    transitions
}

/// The first transition strictly after the given second (or after the era
/// start, whichever is later).
fn next_after(
    second: i64,
    pre_model: i64,
    std: i32,
    rules: &[Rule],
) -> Option<Transition> {
    let start = second.max(pre_model);
    let n = rules.len();
    let first_shift = offset_shift(&rules[0], std, rules[n - 1].savings());
    let mut year = seed_year(start, first_shift);
    let mut i: usize = 0;
    loop {
        let rule = &rules[i % n];
        let previous = &rules[(i + n - 1) % n];
        let shift = offset_shift(rule, std, previous.savings());

        if i > 0 && i % n == 0 {
            if year >= Date::MAX.year() {
                return None;
            }
            year += 1;
        }

        let tt = transition_second(rule, year, shift);
        if tt > start {
            return Some(make_transition(rule, previous, std, tt));
        }
        i += 1;
    }
}

/// Reduces a local date and clock time to a local second count: days
/// since the epoch times 86400, plus the seconds of the day.
fn local_second(date: Date, time: Time) -> i64 {
    date.to_epoch_day() as i64 * 86_400 + time.to_second_of_day() as i64
}

/// The POSIX second one calendar year after the given one, with February
/// 29 clamped to 28 as needed.
fn one_year_after(second: i64) -> i64 {
    let date = Date::from_epoch_day_clamped(second.div_euclid(86_400));
    let year = date.year().saturating_add(1).min(Date::MAX.year());
    let day = date.day().min(civil::days_in_month(year, date.month()));
    let date = Date::new(year, date.month(), day)
        .expect("clamped date components are valid");
    date.to_epoch_day() as i64 * 86_400 + second.rem_euclid(86_400)
}

#[cfg(test)]
mod tests {
    use quickcheck::TestResult;

    use super::*;
    use crate::{
        civil::{date, time, Weekday},
        rule::DaySpec,
    };

    /// 2024-01-01T00:00:00Z, for deterministic previews.
    const NOW: i64 = 1_704_067_200;

    struct FixedClock(i64);

    impl TimeSource for FixedClock {
        fn now(&self) -> Timestamp {
            Timestamp::new(self.0)
        }
    }

    fn rule(
        day: DaySpec,
        time: i32,
        savings: i32,
        indicator: Indicator,
    ) -> Rule {
        Rule::new(day, time, savings, indicator).unwrap()
    }

    fn eu_rules() -> Vec<Rule> {
        vec![
            rule(
                DaySpec::LastWeekday { month: 3, weekday: Weekday::Sunday },
                3_600,
                3_600,
                Indicator::Utc,
            ),
            rule(
                DaySpec::LastWeekday { month: 10, weekday: Weekday::Sunday },
                3_600,
                0,
                Indicator::Utc,
            ),
        ]
    }

    /// Central European Time with a fixed construction clock.
    fn eu_model() -> RuleModel {
        RuleModel::with_clock(
            Start::Boundless(Offset::constant(1)),
            eu_rules(),
            &FixedClock(NOW),
        )
        .unwrap()
    }

    /// US Eastern Time: wall-clock switches at 02:00 local.
    fn us_model() -> RuleModel {
        let rules = vec![
            rule(
                DaySpec::WeekdayOnOrAfter {
                    month: 3,
                    day: 8,
                    weekday: Weekday::Sunday,
                },
                7_200,
                3_600,
                Indicator::Wall,
            ),
            rule(
                DaySpec::WeekdayOnOrAfter {
                    month: 11,
                    day: 1,
                    weekday: Weekday::Sunday,
                },
                7_200,
                0,
                Indicator::Wall,
            ),
        ];
        RuleModel::with_clock(
            Start::Boundless(Offset::from_seconds(-18_000).unwrap()),
            rules,
            &FixedClock(NOW),
        )
        .unwrap()
    }

    /// A southern-hemisphere pattern in the style of Australia's
    /// south-east: daylight saving spans the year boundary.
    fn southern_model() -> RuleModel {
        let rules = vec![
            rule(
                DaySpec::WeekdayOnOrAfter {
                    month: 10,
                    day: 1,
                    weekday: Weekday::Sunday,
                },
                7_200,
                3_600,
                Indicator::Wall,
            ),
            rule(
                DaySpec::WeekdayOnOrAfter {
                    month: 4,
                    day: 1,
                    weekday: Weekday::Sunday,
                },
                10_800,
                0,
                Indicator::Wall,
            ),
        ];
        RuleModel::with_clock(
            Start::Boundless(Offset::constant(10)),
            rules,
            &FixedClock(NOW),
        )
        .unwrap()
    }

    #[test]
    fn eu_spring_forward() {
        let model = eu_model();
        // One second before 2020-03-29T01:00:00Z.
        let next =
            model.next_transition(Timestamp::new(1_585_443_599)).unwrap();
        assert_eq!(next.timestamp(), Timestamp::new(1_585_443_600));
        assert_eq!(next.previous_offset(), Offset::constant(1));
        assert_eq!(next.total_offset(), Offset::constant(2));
        assert_eq!(next.savings(), 3_600);
        assert!(next.is_gap());

        // At the transition instant itself, the next one is autumn's.
        let next =
            model.next_transition(Timestamp::new(1_585_443_600)).unwrap();
        assert_eq!(next.timestamp(), Timestamp::new(1_603_587_600));
        assert!(next.is_overlap());
    }

    #[test]
    fn eu_gap_resolution() {
        let model = eu_model();
        // 02:30 on the morning of the spring switch never happened.
        let gap_date = date(2020, 3, 29);
        assert_eq!(model.valid_offsets(gap_date, time(2, 30, 0)), vec![]);
        let conflict =
            model.conflict_transition(gap_date, time(2, 30, 0)).unwrap();
        assert_eq!(conflict.timestamp(), Timestamp::new(1_585_443_600));
        assert!(conflict.is_gap());

        // Just before and after the gap the reading is unambiguous.
        assert_eq!(
            model.valid_offsets(gap_date, time(1, 59, 59)),
            vec![Offset::constant(1)],
        );
        assert_eq!(
            model.valid_offsets(gap_date, time(3, 0, 0)),
            vec![Offset::constant(2)],
        );
        assert_eq!(model.conflict_transition(gap_date, time(12, 0, 0)), None);
    }

    #[test]
    fn eu_overlap_resolution() {
        let model = eu_model();
        // 02:30 on the morning of the autumn switch happened twice. The
        // offset in effect after the switch is listed first.
        let fold_date = date(2020, 10, 25);
        assert_eq!(
            model.valid_offsets(fold_date, time(2, 30, 0)),
            vec![Offset::constant(1), Offset::constant(2)],
        );
        let conflict =
            model.conflict_transition(fold_date, time(2, 30, 0)).unwrap();
        assert_eq!(conflict.timestamp(), Timestamp::new(1_603_587_600));
        assert!(conflict.is_overlap());

        // Midsummer is plainly daylight saving time.
        assert_eq!(
            model.valid_offsets(date(2020, 7, 1), time(12, 0, 0)),
            vec![Offset::constant(2)],
        );
    }

    #[test]
    fn us_wall_clock_rules() {
        let model = us_model();
        // One second before 2021-03-14T07:00:00Z, which is 02:00 EST.
        let next =
            model.next_transition(Timestamp::new(1_615_705_199)).unwrap();
        assert_eq!(next.timestamp(), Timestamp::new(1_615_705_200));
        assert_eq!(next.previous_offset().seconds(), -18_000);
        assert_eq!(next.total_offset().seconds(), -14_400);

        // The autumn switch is expressed against the wall clock too, so
        // its shift includes the daylight saving then in effect.
        let next = model.next_transition(next.timestamp()).unwrap();
        assert_eq!(next.timestamp(), Timestamp::new(1_636_264_800));
        assert_eq!(next.total_offset().seconds(), -18_000);
    }

    #[test]
    fn southern_year_boundary_interleaving() {
        let model = southern_model();
        let transitions = model
            .transitions_in(
                Timestamp::new(1_577_836_800), // 2020-01-01T00:00:00Z
                Timestamp::new(1_640_995_200), // 2022-01-01T00:00:00Z
            )
            .unwrap();
        assert_eq!(transitions.len(), 4);
        assert!(transitions
            .windows(2)
            .all(|w| w[0].timestamp() < w[1].timestamp()));
        // April 2020, October 2020, April 2021, October 2021.
        assert_eq!(
            transitions[0].timestamp(),
            Timestamp::new(1_586_016_000), // 2020-04-05T03:00 AEDT
        );
        assert_eq!(
            transitions[1].timestamp(),
            Timestamp::new(1_601_740_800), // 2020-10-04T02:00 AEST
        );
        assert!(!transitions[0].is_daylight_saving());
        assert!(transitions[1].is_daylight_saving());
        assert!(!transitions[2].is_daylight_saving());
        assert!(transitions[3].is_daylight_saving());
    }

    #[test]
    fn interval_edge_cases() {
        let model = eu_model();
        let at = Timestamp::new(1_600_000_000);
        assert_eq!(model.transitions_in(at, at).unwrap(), vec![]);

        let err = model
            .transitions_in(at, Timestamp::new(999_999_999))
            .unwrap_err();
        assert!(err.is_invalid_interval());
    }

    #[test]
    fn era_start_gates_queries() {
        // The rule-based era takes over at 2000-01-01T00:00:00Z.
        let initial = Transition::new(
            Timestamp::new(946_684_800),
            Offset::constant(1),
            Offset::constant(1),
            0,
        );
        let model = RuleModel::starting_at(initial, eu_rules()).unwrap();
        assert_eq!(model.start(), Some(Timestamp::new(946_684_800)));

        // An hour before the era there is no start transition.
        assert_eq!(
            model.start_transition(Timestamp::new(946_681_200)),
            None,
        );

        // Enumerations clip at the era start: nothing in 1999 shows up.
        let transitions = model
            .transitions_in(
                Timestamp::new(915_148_800),   // 1999-01-01T00:00:00Z
                Timestamp::new(1_000_000_000),
            )
            .unwrap();
        assert!(!transitions.is_empty());
        assert!(transitions
            .iter()
            .all(|t| t.timestamp() > Timestamp::new(946_684_800)));
        // The first one is the spring switch of 2000.
        assert_eq!(transitions[0].timestamp(), Timestamp::new(954_032_400));
        assert_eq!(
            model.next_transition(Timestamp::new(0)).unwrap().timestamp(),
            Timestamp::new(954_032_400),
        );

        // Local readings from before the era resolve to the standard
        // offset without conflicts.
        assert_eq!(
            model.valid_offsets(date(1999, 6, 1), time(12, 0, 0)),
            vec![Offset::constant(1)],
        );
        assert_eq!(
            model.conflict_transition(date(1999, 6, 1), time(12, 0, 0)),
            None,
        );
    }

    #[test]
    fn era_start_must_agree_with_rules() {
        // Midsummer 2000 was daylight saving time in this cycle, so an
        // initial standard-time transition there contradicts the rules.
        let initial = Transition::new(
            Timestamp::new(959_817_600), // 2000-06-01T00:00:00Z
            Offset::constant(1),
            Offset::constant(1),
            0,
        );
        let err = RuleModel::starting_at(initial, eu_rules()).unwrap_err();
        assert!(err.is_inconsistent_initial());

        // Carrying daylight saving on the initial transition is refused.
        let initial = Transition::new(
            Timestamp::new(946_684_800),
            Offset::constant(1),
            Offset::constant(2),
            3_600,
        );
        let err = RuleModel::starting_at(initial, eu_rules()).unwrap_err();
        assert!(err.is_inconsistent_initial());
    }

    #[test]
    fn minimum_era_start_is_boundless() {
        let initial = Transition::new(
            Timestamp::new(i64::MIN),
            Offset::constant(1),
            Offset::constant(1),
            0,
        );
        let model = RuleModel::starting_at(initial, eu_rules()).unwrap();
        assert_eq!(model.start(), None);
        assert_eq!(model, eu_model());
    }

    #[test]
    fn unusable_rule_cycles() {
        let spring = eu_rules().remove(0);
        let err = RuleModel::new(Offset::constant(1), vec![spring])
            .unwrap_err();
        assert!(err.is_invalid_rules());

        // Two rules that never return to standard time.
        let rules = vec![
            rule(
                DaySpec::LastWeekday { month: 3, weekday: Weekday::Sunday },
                3_600,
                3_600,
                Indicator::Utc,
            ),
            rule(
                DaySpec::LastWeekday { month: 10, weekday: Weekday::Sunday },
                3_600,
                1_800,
                Indicator::Utc,
            ),
        ];
        let err = RuleModel::new(Offset::constant(1), rules).unwrap_err();
        assert!(err.is_invalid_rules());

        // Two rules on the same position in the cycle.
        let mut rules = eu_rules();
        rules.push(rule(
            DaySpec::LastWeekday { month: 3, weekday: Weekday::Sunday },
            3_600,
            1_800,
            Indicator::Utc,
        ));
        let err = RuleModel::new(Offset::constant(1), rules).unwrap_err();
        assert!(err.is_invalid_rules());

        // Far too many rules.
        let mut rules = Vec::new();
        for month in 1..=12 {
            for day in 1..=11 {
                rules.push(rule(
                    DaySpec::Fixed { month, day },
                    0,
                    0,
                    Indicator::Utc,
                ));
            }
        }
        assert!(rules.len() >= 128);
        let err = RuleModel::new(Offset::constant(1), rules).unwrap_err();
        assert!(err.is_invalid_rules());
    }

    #[test]
    fn total_offsets_must_be_representable() {
        let rules = vec![
            rule(
                DaySpec::LastWeekday { month: 3, weekday: Weekday::Sunday },
                3_600,
                90_000,
                Indicator::Utc,
            ),
            rule(
                DaySpec::LastWeekday { month: 10, weekday: Weekday::Sunday },
                3_600,
                0,
                Indicator::Utc,
            ),
        ];
        let err = RuleModel::new(Offset::constant(25), rules).unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn rules_are_canonically_ordered() {
        // Hand the rules over autumn first; the model stores the cycle
        // in calendar order.
        let mut rules = eu_rules();
        rules.reverse();
        let model = RuleModel::with_clock(
            Start::Boundless(Offset::constant(1)),
            rules,
            &FixedClock(NOW),
        )
        .unwrap();
        assert_eq!(model.rules()[0].day().month(), 3);
        assert_eq!(model.rules()[1].day().month(), 10);
        assert_eq!(model, eu_model());
    }

    #[test]
    fn std_transition_preview() {
        let model = eu_model();
        let preview = model.std_transitions();
        // Two transitions per year from 1970 through 2024 inclusive.
        assert_eq!(preview.len(), 110);
        assert_eq!(preview[0].timestamp(), Timestamp::new(7_520_400));
        assert!(preview
            .windows(2)
            .all(|w| w[0].timestamp() < w[1].timestamp()));

        // The preview is exactly the enumeration over the same interval.
        let computed = model
            .transitions_in(
                Timestamp::UNIX_EPOCH,
                Timestamp::new(1_735_689_600), // 2025-01-01T00:00:00Z
            )
            .unwrap();
        assert_eq!(preview, computed.as_slice());
    }

    #[test]
    fn fixed_clocks_make_equal_models() {
        let first = eu_model();
        let second = eu_model();
        assert_eq!(first, second);
        assert_eq!(first.std_transitions(), second.std_transitions());

        for at in [-1_000_000_000, 0, 1_585_443_600, 2_000_000_000] {
            let at = Timestamp::new(at);
            assert_eq!(first.start_transition(at), second.start_transition(at));
            assert_eq!(first.next_transition(at), second.next_transition(at));
        }
    }

    #[test]
    fn far_future_years_are_still_answered() {
        // Well past the cache horizon of a 2024 construction clock.
        let model = eu_model();
        let july_2300 =
            Timestamp::new(date(2300, 7, 1).to_epoch_day() as i64 * 86_400);
        let start = model.start_transition(july_2300).unwrap();
        assert!(start.is_gap());
        assert!(start.timestamp() < july_2300);
        let next = model.next_transition(july_2300).unwrap();
        assert!(next.is_overlap());
        assert!(next.timestamp() > july_2300);
    }

    #[test]
    fn concurrent_lookups_agree() {
        let model = std::sync::Arc::new(eu_model());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let model = std::sync::Arc::clone(&model);
            handles.push(std::thread::spawn(move || {
                let mut starts = Vec::new();
                for i in 0..200 {
                    let at = Timestamp::new(800_000_000 + i * 7_000_000);
                    starts.push(model.start_transition(at));
                }
                starts
            }));
        }
        let mut results = handles.into_iter().map(|h| h.join().unwrap());
        let first = results.next().unwrap();
        for other in results {
            assert_eq!(first, other);
        }
    }

    quickcheck::quickcheck! {
        fn prop_start_transition_is_adjacent(at: i32) -> TestResult {
            let model = eu_model();
            let at = Timestamp::new(at as i64);
            let Some(start) = model.start_transition(at) else {
                return TestResult::discard();
            };
            if start.timestamp() > at {
                return TestResult::failed();
            }
            // Nothing lies strictly between the match and the query.
            let next = model.next_transition(start.timestamp()).unwrap();
            TestResult::from_bool(next.timestamp() > at)
        }

        fn prop_next_transition_round_trips(at: i32) -> bool {
            let model = us_model();
            let at = Timestamp::new(at as i64);
            let next = model.next_transition(at).unwrap();
            next.timestamp() > at
                && model.start_transition(next.timestamp()) == Some(next)
                && model.next_transition(Timestamp::new(
                    next.timestamp().as_second() - 1,
                )) == Some(next)
        }

        fn prop_enumeration_is_sorted_and_bounded(a: i32, b: i32) -> bool {
            let model = southern_model();
            let (a, b) = if a <= b { (a, b) } else { (b, a) };
            let (start, end) =
                (Timestamp::new(a as i64), Timestamp::new(b as i64));
            let transitions = model.transitions_in(start, end).unwrap();
            transitions
                .windows(2)
                .all(|w| w[0].timestamp() < w[1].timestamp())
                && transitions.iter().all(|t| {
                    start <= t.timestamp() && t.timestamp() < end
                })
                && transitions.iter().all(|t| {
                    model.start_transition(t.timestamp()) == Some(*t)
                })
        }

        fn prop_offset_count_matches_conflict(
            day_offset: u16,
            second: u32
        ) -> bool {
            let model = us_model();
            // Roughly the two decades starting 2015.
            let epoch_day = 16_436 + (day_offset % 7_300) as i64;
            let date = Date::from_epoch_day_clamped(epoch_day);
            let time = Time::from_second_of_day((second % 86_400) as i32);
            let offsets = model.valid_offsets(date, time);
            match model.conflict_transition(date, time) {
                None => offsets.len() == 1,
                Some(t) if t.is_gap() => offsets.is_empty(),
                Some(t) if t.is_overlap() => offsets.len() == 2,
                Some(_) => false,
            }
        }
    }
}
