use tracing::{debug, trace};

use super::{CommercialInterval, MatchPolicy, OvershootPolicy};
use crate::Result;
use crate::composition::BlockComposition;
use crate::duration_units::DurationUnitSet;
use crate::silent_interval::SilentInterval;

/// Match `intervals` against the expected blocks in `structures`, in order.
///
/// Returns the commercial spans found so far once the scan ends or every structure has been
/// matched; nothing is matched past the last structure. An empty `structures` list yields no
/// spans.
pub fn match_structures(
    intervals: &[SilentInterval],
    units: &DurationUnitSet,
    structures: &[BlockComposition],
    monolithic_mode: bool,
    policy: MatchPolicy,
) -> Result<Vec<CommercialInterval>> {
    let mut matcher = GuidedMatcher::new(structures, units, monolithic_mode, policy)?;

    for (index, interval) in intervals.iter().enumerate() {
        if !matcher.observe(interval, &intervals[index + 1..])? {
            break;
        }
    }

    Ok(matcher.finish())
}

/// Scan state of the structure-guided matcher.
///
/// Holds the current target block, the divider candidates accumulated towards it and the spans
/// matched so far. Feed intervals in order with [`observe`](Self::observe).
#[derive(Debug)]
pub struct GuidedMatcher<'a> {
    structures: &'a [BlockComposition],
    base_units: &'a DurationUnitSet,
    monolithic_mode: bool,
    policy: MatchPolicy,

    cursor: usize,
    // Base units, plus the target's monolithic duration while such a block is targeted.
    target_units: DurationUnitSet,
    candidates: Vec<SilentInterval>,
    found: Vec<CommercialInterval>,
}

impl<'a> GuidedMatcher<'a> {
    pub fn new(
        structures: &'a [BlockComposition],
        units: &'a DurationUnitSet,
        monolithic_mode: bool,
        policy: MatchPolicy,
    ) -> Result<Self> {
        let target_units = match structures.first() {
            Some(target) => units_for(units, target)?,
            None => units.clone(),
        };

        Ok(Self {
            structures,
            base_units: units,
            monolithic_mode,
            policy,
            cursor: 0,
            target_units,
            candidates: Vec::new(),
            found: Vec::new(),
        })
    }

    /// The block currently being matched, or `None` once every block has been matched.
    pub fn target(&self) -> Option<&'a BlockComposition> {
        self.structures.get(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.target().is_none()
    }

    /// Dividers accumulated towards the current target.
    pub fn candidates(&self) -> &[SilentInterval] {
        &self.candidates
    }

    /// Consume the next interval. `following` are the intervals after it, in order.
    ///
    /// Returns `Ok(false)` once the structure list is exhausted and scanning should stop.
    pub fn observe(
        &mut self,
        interval: &SilentInterval,
        following: &[SilentInterval],
    ) -> Result<bool> {
        let Some(target) = self.target() else {
            return Ok(false);
        };

        if interval.is_divider_candidate_with(
            following,
            &self.target_units,
            target.margin_sec(),
            self.policy.band,
        ) {
            trace!(
                start_sec = interval.start_sec(),
                end_sec = interval.end_sec(),
                "divider candidate"
            );
            self.candidates.push(*interval);
        }

        if !self.has_enough_candidates(target) {
            return Ok(true);
        }

        let anchor = self.candidates[0];
        let combined_sec = interval.end_sec() - anchor.start_sec();
        let nominal_sec = target.nominal_duration_sec();

        if combined_sec <= nominal_sec {
            return Ok(true);
        }

        if combined_sec < nominal_sec + target.margin_sec() {
            let span = CommercialInterval::from(
                target.resolve(anchor.end_sec(), interval.start_sec()),
            );
            debug!(
                structure = self.cursor,
                start_sec = span.start_sec,
                end_sec = span.end_sec,
                combined_sec,
                "matched commercial block"
            );
            self.found.push(span);
            self.candidates.clear();
            self.advance()?;
            return Ok(!self.is_exhausted());
        }

        trace!(
            anchor_sec = anchor.start_sec(),
            combined_sec, "candidate run overshot the block"
        );
        self.reset_after_overshoot();
        Ok(true)
    }

    /// Spans matched so far, in scan order.
    pub fn finish(self) -> Vec<CommercialInterval> {
        self.found
    }

    fn has_enough_candidates(&self, target: &BlockComposition) -> bool {
        if target.is_monolithic() {
            return self.candidates.len() == 1;
        }
        let threshold = if self.monolithic_mode { 0 } else { 1 };
        self.candidates.len() > threshold
    }

    fn advance(&mut self) -> Result<()> {
        self.cursor += 1;
        if let Some(next) = self.target() {
            self.target_units = units_for(self.base_units, next)?;
            debug!(
                structure = self.cursor,
                nominal_sec = next.nominal_duration_sec(),
                margin_sec = next.margin_sec(),
                "advanced to next expected block"
            );
        }
        Ok(())
    }

    fn reset_after_overshoot(&mut self) {
        match self.policy.overshoot {
            OvershootPolicy::Clear => self.candidates.clear(),
            OvershootPolicy::RetainLast => {
                // A lone candidate is the stale anchor itself; keeping it would overshoot forever.
                let last = if self.candidates.len() > 1 {
                    self.candidates.last().copied()
                } else {
                    None
                };
                self.candidates.clear();
                self.candidates.extend(last);
            }
        }
    }
}

fn units_for(units: &DurationUnitSet, target: &BlockComposition) -> Result<DurationUnitSet> {
    match target.monolithic_duration_sec() {
        Some(duration_sec) => units.with(duration_sec),
        None => Ok(units.clone()),
    }
}
