use serde::{Deserialize, Serialize};
use statig::prelude::*;
use std::fmt;

use crate::weight::{round2, ToleranceBand};

#[derive(Debug, Clone, PartialEq)]
pub enum DispenseEvent {
    Start { band: ToleranceBand },
    Tick { increment: f64 },
    Reset,
}

/// Externally visible phase of a dispensing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispensePhase {
    Idle,
    Running,
    Settled,
}

/// Result of a single sampling tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// No run was active; nothing changed.
    Ignored,
    /// Weight committed below the band; run continues.
    Advanced { weight: f64 },
    /// Proposed weight overshot the band and was clamped to its upper bound.
    /// The run settles on the following tick.
    Clamped { weight: f64 },
    /// Weight landed in the band and the run is over.
    Settled { weight: f64 },
}

impl TickOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, TickOutcome::Settled { .. })
    }
}

#[derive(Debug, Default)]
struct Dispenser {
    band: ToleranceBand,
    current_weight: f64,
    final_weight: Option<f64>,
    holding_at_upper: bool,
    ticks: u32,
    last_outcome: Option<TickOutcome>,
}

#[state_machine(initial = "State::idle()", state(derive(Debug, Clone, PartialEq)))]
impl Dispenser {
    #[state]
    fn idle(&mut self, event: &DispenseEvent) -> Outcome<State> {
        match event {
            DispenseEvent::Start { band } => {
                self.begin(*band);
                Transition(State::running())
            }
            DispenseEvent::Tick { .. } => {
                self.last_outcome = Some(TickOutcome::Ignored);
                Handled
            }
            DispenseEvent::Reset => {
                self.clear();
                Handled
            }
        }
    }

    #[state]
    fn running(&mut self, event: &DispenseEvent) -> Outcome<State> {
        match event {
            DispenseEvent::Tick { increment } => {
                let outcome = self.advance(*increment);
                self.last_outcome = Some(outcome);
                if outcome.is_settled() {
                    Transition(State::settled())
                } else {
                    Handled
                }
            }
            DispenseEvent::Start { .. } => {
                tracing::debug!("Start ignored: run already active");
                Handled
            }
            DispenseEvent::Reset => {
                self.clear();
                tracing::debug!("Active run reset");
                Transition(State::idle())
            }
        }
    }

    #[state]
    fn settled(&mut self, event: &DispenseEvent) -> Outcome<State> {
        match event {
            DispenseEvent::Tick { .. } => {
                self.last_outcome = Some(TickOutcome::Ignored);
                Handled
            }
            DispenseEvent::Start { .. } => Handled,
            DispenseEvent::Reset => {
                self.clear();
                Transition(State::idle())
            }
        }
    }
}

impl Dispenser {
    fn begin(&mut self, band: ToleranceBand) {
        self.band = band;
        self.holding_at_upper = false;
        self.ticks = 0;
        self.final_weight = None;
        if band.is_degenerate() {
            tracing::warn!(
                lower = band.lower,
                upper = band.upper,
                "Dispensing started against a degenerate tolerance band; run cannot settle"
            );
        } else {
            tracing::info!(
                lower = band.lower,
                upper = band.upper,
                current_weight = self.current_weight,
                "Dispensing run started"
            );
        }
    }

    fn clear(&mut self) {
        self.band = ToleranceBand::default();
        self.current_weight = 0.0;
        self.final_weight = None;
        self.holding_at_upper = false;
        self.ticks = 0;
        self.last_outcome = None;
    }

    /// Settlement is decided on the unclamped proposal. A clamp commits the
    /// upper bound and settles on the next tick instead.
    ///
    /// The clamped value is `band.upper` as computed, not rounded to two
    /// decimals, so a non-round target can settle at e.g. 34.9965g.
    fn advance(&mut self, increment: f64) -> TickOutcome {
        self.ticks += 1;

        if self.holding_at_upper {
            self.holding_at_upper = false;
            return self.settle(self.current_weight);
        }

        let proposed = round2(self.current_weight + increment);
        if !self.band.is_degenerate() && self.band.contains(proposed) {
            self.settle(proposed)
        } else if proposed > self.band.upper {
            self.current_weight = self.band.upper;
            self.holding_at_upper = !self.band.is_degenerate();
            tracing::debug!(
                tick = self.ticks,
                proposed,
                clamped = self.current_weight,
                "Proposed weight overshot tolerance band"
            );
            TickOutcome::Clamped {
                weight: self.current_weight,
            }
        } else {
            self.current_weight = proposed;
            tracing::debug!(tick = self.ticks, weight = proposed, "Weight sample committed");
            TickOutcome::Advanced { weight: proposed }
        }
    }

    fn settle(&mut self, weight: f64) -> TickOutcome {
        self.current_weight = weight;
        self.final_weight = Some(weight);
        tracing::info!(tick = self.ticks, final_weight = weight, "Dispensing settled");
        TickOutcome::Settled { weight }
    }
}

/// Models the physical dispensing process: `Idle -> Running -> Settled`.
///
/// The simulator is passive. Something else (the workflow timer) has to feed
/// it ticks, each carrying the sampled increment.
pub struct DispensingSimulator {
    machine: StateMachine<Dispenser>,
}

impl Default for DispensingSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl DispensingSimulator {
    pub fn new() -> Self {
        Self {
            machine: Dispenser::default().state_machine(),
        }
    }

    /// `Idle -> Running`. Returns `false` when no transition happened.
    pub fn start(&mut self, band: ToleranceBand) -> bool {
        if self.phase() != DispensePhase::Idle {
            return false;
        }
        self.machine.handle(&DispenseEvent::Start { band });
        self.phase() == DispensePhase::Running
    }

    pub fn tick(&mut self, increment: f64) -> TickOutcome {
        self.machine.handle(&DispenseEvent::Tick { increment });
        self.machine
            .inner()
            .last_outcome
            .unwrap_or(TickOutcome::Ignored)
    }

    /// Hard reset back to `Idle` with zero weight, from any phase.
    pub fn reset(&mut self) {
        self.machine.handle(&DispenseEvent::Reset);
    }

    pub fn phase(&self) -> DispensePhase {
        match self.machine.state() {
            State::Idle { .. } => DispensePhase::Idle,
            State::Running { .. } => DispensePhase::Running,
            State::Settled { .. } => DispensePhase::Settled,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == DispensePhase::Running
    }

    pub fn current_weight(&self) -> f64 {
        self.machine.inner().current_weight
    }

    pub fn final_weight(&self) -> Option<f64> {
        self.machine.inner().final_weight
    }

    pub fn band(&self) -> ToleranceBand {
        self.machine.inner().band
    }

    /// Ticks applied during the current run.
    pub fn ticks(&self) -> u32 {
        self.machine.inner().ticks
    }
}

impl fmt::Debug for DispensingSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispensingSimulator")
            .field("phase", &self.phase())
            .field("current_weight", &self.current_weight())
            .field("final_weight", &self.final_weight())
            .field("band", &self.band())
            .finish()
    }
}
