use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use crate::config::DispenserConfig;
use crate::dispensing::{TickControl, TickOutcome, TickTimer};
use crate::identifiers::{IdentifierGenerator, ProductCatalog, ProductIdentifier};
use crate::telemetry::generate_session_id;

use super::session::Session;
use super::snapshot::WorkflowSnapshot;

/// Cloneable handle that orchestrates selection, approval and dispensing.
///
/// All state lives in one [`Session`] behind an async mutex. Ticks of the
/// active run take the same lock, so a tick always runs to completion before
/// the next tick or command. Every change is published on a watch channel.
#[derive(Clone)]
pub struct WorkflowController {
    session: Arc<Mutex<Session>>,
    catalog: Arc<ProductCatalog>,
    signals: Arc<watch::Sender<WorkflowSnapshot>>,
    tick_interval: Duration,
    session_id: Arc<str>,
}

impl WorkflowController {
    /// Generates the catalog and session from `config`. With a configured
    /// seed the catalog, batches, targets and increments are reproducible.
    pub fn from_config(config: &DispenserConfig) -> Self {
        let mut rng = match config.catalog.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut generator = IdentifierGenerator::new(StdRng::from_rng(&mut rng));
        let catalog = ProductCatalog::generate(&mut generator, config.catalog.size);
        let session = Session::from_config(config, &mut rng);
        Self::new(catalog, session, config.dispensing.tick_interval())
    }

    pub fn new(catalog: ProductCatalog, session: Session, tick_interval: Duration) -> Self {
        let (signals, _) = watch::channel(session.snapshot());
        let session_id: Arc<str> = generate_session_id().into();
        tracing::info!(
            session_id = %session_id,
            catalog_size = catalog.len(),
            tick_interval_ms = tick_interval.as_millis() as u64,
            "Dispensing workflow ready"
        );
        Self {
            session: Arc::new(Mutex::new(session)),
            catalog: Arc::new(catalog),
            signals: Arc::new(signals),
            tick_interval,
            session_id,
        }
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub async fn select_identifier(&self, product: ProductIdentifier) {
        let mut session = self.session.lock().await;
        session.select_identifier(product);
        self.publish(&session);
    }

    pub async fn approve(&self) -> bool {
        let mut session = self.session.lock().await;
        let approved = session.approve();
        if approved {
            self.publish(&session);
        }
        approved
    }

    /// Starts the periodic sampling run. Ignored unless approved, at zero
    /// weight and not already running.
    pub async fn start_dispensing(&self) -> bool {
        let mut session = self.session.lock().await;
        let Some(run_id) = session.begin_run() else {
            return false;
        };

        let weak = Arc::downgrade(&self.session);
        let signals = Arc::clone(&self.signals);
        let timer = TickTimer::spawn(self.tick_interval, move || {
            let weak = weak.clone();
            let signals = Arc::clone(&signals);
            async move {
                let Some(session) = weak.upgrade() else {
                    return TickControl::Stop;
                };
                let mut session = session.lock().await;
                match session.tick(run_id) {
                    TickOutcome::Ignored => TickControl::Stop,
                    TickOutcome::Settled { .. } => {
                        signals.send_replace(session.snapshot());
                        TickControl::Stop
                    }
                    TickOutcome::Advanced { .. } | TickOutcome::Clamped { .. } => {
                        signals.send_replace(session.snapshot());
                        TickControl::Continue
                    }
                }
            }
        });
        session.attach_timer(run_id, timer);
        self.publish(&session);
        true
    }

    /// Tears down any active run. Workflow values are left as they are.
    pub async fn shutdown(&self) {
        let mut session = self.session.lock().await;
        session.cancel_run();
        self.publish(&session);
        tracing::info!(session_id = %self.session_id, "Dispensing workflow shut down");
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        self.session.lock().await.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.signals.subscribe()
    }

    /// Waits until the current run settles or stops. Returns the last
    /// snapshot observed.
    pub async fn wait_for_completion(&self) -> WorkflowSnapshot {
        let mut signals = self.subscribe();
        let observed = signals
            .wait_for(|snapshot| snapshot.is_complete() || !snapshot.dispensing)
            .await
            .map(|snapshot| snapshot.clone());
        match observed {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshot().await,
        }
    }

    fn publish(&self, session: &Session) {
        self.signals.send_replace(session.snapshot());
    }
}

impl std::fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowController")
            .field("session_id", &self.session_id)
            .field("catalog", &self.catalog.len())
            .field("tick_interval", &self.tick_interval)
            .field("session", &"Arc<Mutex<Session>>")
            .finish()
    }
}
