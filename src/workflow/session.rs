use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;

use crate::config::DispenserConfig;
use crate::dispensing::{DispensingSimulator, TickOutcome, TickTimer};
use crate::identifiers::{BatchIdentifier, IdentifierGenerator, ProductIdentifier};
use crate::sampling::{RandomIncrements, WeightSampler};
use crate::weight::{progress_percent, TargetSource, TargetWeight, WeightTargetGenerator};

use super::snapshot::WorkflowSnapshot;

/// Identifies one dispensing run so that ticks from a torn-down run are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

#[derive(Debug)]
struct DispensingRun {
    id: RunId,
    timer: Option<TickTimer>,
}

impl DispensingRun {
    fn cancel(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.cancel();
        }
    }
}

pub fn completion_message(final_weight: f64) -> String {
    format!("Dispensing completed with final weight: {final_weight:.2}g")
}

/// Single owner of all workflow state.
///
/// Every command performs its dependent resets in one call. Commands whose
/// precondition does not hold are ignored and report `false`.
pub struct Session {
    identifiers: IdentifierGenerator<StdRng>,
    targets: Box<dyn TargetSource>,
    sampler: Box<dyn WeightSampler>,
    tolerance: f64,

    product: Option<ProductIdentifier>,
    batch: Option<BatchIdentifier>,
    approved: bool,
    target: Option<TargetWeight>,
    simulator: DispensingSimulator,
    run: Option<DispensingRun>,
    next_run: u64,
    final_weight: Option<f64>,
    completion_message: Option<String>,
    settled_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(
        identifiers: IdentifierGenerator<StdRng>,
        targets: Box<dyn TargetSource>,
        sampler: Box<dyn WeightSampler>,
        tolerance: f64,
    ) -> Self {
        Self {
            identifiers,
            targets,
            sampler,
            tolerance,
            product: None,
            batch: None,
            approved: false,
            target: None,
            simulator: DispensingSimulator::new(),
            run: None,
            next_run: 0,
            final_weight: None,
            completion_message: None,
            settled_at: None,
        }
    }

    /// Builds every random source from `rng`, so a seeded `rng` makes the
    /// whole session reproducible.
    pub fn from_config(config: &DispenserConfig, rng: &mut StdRng) -> Self {
        let identifiers = IdentifierGenerator::new(StdRng::from_rng(rng));
        let targets = WeightTargetGenerator::with_range(
            StdRng::from_rng(rng),
            config.target.min,
            config.target.max,
        );
        let sampler = RandomIncrements::with_range(
            StdRng::from_rng(rng),
            config.dispensing.increment_min,
            config.dispensing.increment_max,
        );
        Self::new(
            identifiers,
            Box::new(targets),
            Box::new(sampler),
            config.dispensing.tolerance,
        )
    }

    pub fn with_targets(mut self, targets: Box<dyn TargetSource>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_sampler(mut self, sampler: Box<dyn WeightSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    /// Selects a product and resets everything downstream of it, even when
    /// the same product is selected again. Any active run is torn down.
    pub fn select_identifier(&mut self, product: ProductIdentifier) {
        self.cancel_run();
        self.simulator.reset();

        let batch = self.identifiers.derive_batch(&product);
        tracing::info!(product = %product, batch = %batch, "Product selected");

        self.product = Some(product);
        self.batch = Some(batch);
        self.approved = false;
        self.target = None;
        self.final_weight = None;
        self.completion_message = None;
        self.settled_at = None;
    }

    /// Approves the selected product and draws its target weight.
    pub fn approve(&mut self) -> bool {
        if self.approved {
            tracing::debug!("Approve ignored: already approved");
            return false;
        }
        let Some(product) = self.product.as_ref() else {
            tracing::debug!("Approve ignored: no product selected");
            return false;
        };

        let target = self.targets.next_target();
        tracing::info!(product = %product, target = %target, "Target weight approved");

        self.approved = true;
        self.target = Some(target);
        self.simulator.reset();
        self.final_weight = None;
        self.completion_message = None;
        self.settled_at = None;
        true
    }

    /// Dispensing may start only once per approval, from zero weight.
    pub fn can_start(&self) -> bool {
        self.approved
            && self.target.is_some()
            && self.run.is_none()
            && !self.simulator.is_running()
            && self.simulator.current_weight() == 0.0
    }

    /// Moves the simulator to `Running` and registers a new run. The caller
    /// attaches the timer that feeds it.
    pub fn begin_run(&mut self) -> Option<RunId> {
        if !self.can_start() {
            tracing::debug!(
                approved = self.approved,
                running = self.run.is_some(),
                current_weight = self.simulator.current_weight(),
                "Start dispensing ignored"
            );
            return None;
        }
        let target = self.target?;
        if !self.simulator.start(target.band(self.tolerance)) {
            return None;
        }

        self.next_run += 1;
        let id = RunId(self.next_run);
        self.run = Some(DispensingRun { id, timer: None });
        tracing::info!(run = %id, target = %target, "Dispensing started");
        Some(id)
    }

    /// Hands the run its timer. A timer for a run that is no longer active is
    /// cancelled on the spot.
    pub fn attach_timer(&mut self, id: RunId, mut timer: TickTimer) {
        match self.run.as_mut() {
            Some(run) if run.id == id => run.timer = Some(timer),
            _ => timer.cancel(),
        }
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.run.as_ref().map(|run| run.id)
    }

    /// Applies one sampling tick for `id`. Ticks for any other run are ignored.
    pub fn tick(&mut self, id: RunId) -> TickOutcome {
        if self.active_run() != Some(id) {
            return TickOutcome::Ignored;
        }

        let increment = self.sampler.next_increment();
        let outcome = self.simulator.tick(increment);
        if let TickOutcome::Settled { weight } = outcome {
            self.cancel_run();
            self.on_settled(weight);
        }
        outcome
    }

    /// Records the final weight and completion message of a settled run.
    pub fn on_settled(&mut self, final_weight: f64) {
        let message = completion_message(final_weight);
        tracing::info!(final_weight, "{}", message);
        self.final_weight = Some(final_weight);
        self.completion_message = Some(message);
        self.settled_at = Some(Utc::now());
    }

    /// Cancels the active run's timer, if any. Safe to call repeatedly.
    pub fn cancel_run(&mut self) {
        if let Some(mut run) = self.run.take() {
            run.cancel();
            tracing::debug!(run = %run.id, "Dispensing run torn down");
        }
    }

    pub fn product(&self) -> Option<&ProductIdentifier> {
        self.product.as_ref()
    }

    pub fn batch(&self) -> Option<&BatchIdentifier> {
        self.batch.as_ref()
    }

    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn target(&self) -> Option<TargetWeight> {
        self.target
    }

    pub fn current_weight(&self) -> f64 {
        self.simulator.current_weight()
    }

    pub fn final_weight(&self) -> Option<f64> {
        self.final_weight
    }

    pub fn completion_message(&self) -> Option<&str> {
        self.completion_message.as_deref()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let target = self.target.map(TargetWeight::grams);
        let current_weight = self.simulator.current_weight();
        WorkflowSnapshot {
            product: self.product.clone(),
            batch: self.batch.clone(),
            approved: self.approved,
            target,
            current_weight,
            dispensing: self.run.is_some(),
            can_start: self.can_start(),
            phase: self.simulator.phase(),
            ticks: self.simulator.ticks(),
            progress_percent: progress_percent(current_weight, target.unwrap_or(0.0)),
            final_weight: self.final_weight,
            completion_message: self.completion_message.clone(),
            settled_at: self.settled_at,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("product", &self.product)
            .field("batch", &self.batch)
            .field("approved", &self.approved)
            .field("target", &self.target)
            .field("simulator", &self.simulator)
            .field("run", &self.active_run())
            .field("final_weight", &self.final_weight)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispensing::DispensePhase;
    use crate::sampling::ScriptedIncrements;
    use crate::weight::FixedTarget;

    fn session(target: f64, increments: Vec<f64>) -> Session {
        let mut rng = StdRng::seed_from_u64(17);
        Session::from_config(&DispenserConfig::default(), &mut rng)
            .with_targets(Box::new(FixedTarget(TargetWeight::new(target))))
            .with_sampler(Box::new(ScriptedIncrements::new(increments)))
    }

    fn product() -> ProductIdentifier {
        ProductIdentifier::parse("12345-6789-01").unwrap()
    }

    #[test]
    fn test_approve_without_selection_is_ignored() {
        let mut session = session(10.0, vec![]);
        assert!(!session.approve());
        assert!(!session.is_approved());
        assert_eq!(session.target(), None);
    }

    #[test]
    fn test_approve_once_per_selection() {
        let mut session = session(10.0, vec![]);
        session.select_identifier(product());
        assert!(session.approve());
        assert_eq!(session.target(), Some(TargetWeight::new(10.0)));
        assert!(!session.approve());
    }

    #[test]
    fn test_select_derives_batch_from_product_suffix() {
        let mut session = session(10.0, vec![]);
        session.select_identifier(product());
        let batch = session.batch().unwrap().as_str().to_string();
        assert!(batch.starts_with("9-01"));
        assert_eq!(batch.len(), 8);
    }

    #[test]
    fn test_full_run_settles_and_produces_message() {
        let mut session = session(10.0, vec![9.0, 0.4, 0.8]);
        session.select_identifier(product());
        session.approve();

        let run = session.begin_run().unwrap();
        assert!(session.begin_run().is_none());

        assert_eq!(session.tick(run), TickOutcome::Advanced { weight: 9.0 });
        assert_eq!(session.tick(run), TickOutcome::Advanced { weight: 9.4 });
        assert_eq!(session.tick(run), TickOutcome::Settled { weight: 10.2 });

        assert_eq!(session.final_weight(), Some(10.2));
        assert_eq!(
            session.completion_message(),
            Some("Dispensing completed with final weight: 10.20g")
        );
        assert_eq!(session.active_run(), None);
        assert_eq!(session.tick(run), TickOutcome::Ignored);

        // Weight is no longer zero, so no second run for this approval
        assert!(!session.can_start());
        assert!(session.begin_run().is_none());
    }

    #[test]
    fn test_reselect_resets_everything() {
        let mut session = session(10.0, vec![2.0, 2.0]);
        session.select_identifier(product());
        session.approve();
        let run = session.begin_run().unwrap();
        session.tick(run);
        assert_eq!(session.current_weight(), 2.0);

        session.select_identifier(product());
        let snapshot = session.snapshot();
        assert!(!snapshot.approved);
        assert_eq!(snapshot.target, None);
        assert_eq!(snapshot.current_weight, 0.0);
        assert!(!snapshot.dispensing);
        assert_eq!(snapshot.phase, DispensePhase::Idle);
        assert_eq!(snapshot.final_weight, None);
        assert_eq!(snapshot.completion_message, None);

        // The old run can no longer move the weight
        assert_eq!(session.tick(run), TickOutcome::Ignored);
        assert_eq!(session.current_weight(), 0.0);
    }

    #[test]
    fn test_start_requires_approval() {
        let mut session = session(10.0, vec![]);
        assert!(session.begin_run().is_none());
        session.select_identifier(product());
        assert!(session.begin_run().is_none());
        session.approve();
        assert!(session.can_start());
        assert!(session.begin_run().is_some());
    }

    #[test]
    fn test_cancel_run_is_idempotent() {
        let mut session = session(10.0, vec![]);
        session.cancel_run();
        session.select_identifier(product());
        session.approve();
        session.begin_run();
        session.cancel_run();
        session.cancel_run();
        assert_eq!(session.active_run(), None);
    }

    #[test]
    fn test_snapshot_progress_guards_missing_target() {
        let mut session = session(10.0, vec![]);
        session.select_identifier(product());
        assert_eq!(session.snapshot().progress_percent, 0.0);
    }

    #[test]
    fn test_run_settles_as_soon_as_weight_enters_band() {
        let mut session = session(10.0, vec![9.4, 0.4, 0.4]);
        session.select_identifier(product());
        session.approve();
        let run = session.begin_run().unwrap();

        assert_eq!(session.tick(run), TickOutcome::Advanced { weight: 9.4 });
        assert_eq!(session.tick(run), TickOutcome::Settled { weight: 9.8 });
        assert_eq!(session.snapshot().ticks, 2);
        assert_eq!(
            session.completion_message(),
            Some("Dispensing completed with final weight: 9.80g")
        );
    }

    #[test]
    fn test_zero_target_run_clamps_without_settling() {
        let mut session = session(0.0, vec![0.3; 10]);
        session.select_identifier(product());
        assert!(session.approve());
        let run = session.begin_run().unwrap();

        for _ in 0..10 {
            assert_eq!(session.tick(run), TickOutcome::Clamped { weight: 0.0 });
            let snapshot = session.snapshot();
            assert_eq!(snapshot.progress_percent, 0.0);
            assert!(snapshot.dispensing);
            assert_eq!(snapshot.phase, DispensePhase::Running);
        }
        assert_eq!(session.final_weight(), None);

        session.cancel_run();
        assert!(!session.snapshot().dispensing);
    }
}
