// Powder Dispenser Library - Simulated Dispensing Workflow
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod dispensing;
pub mod errors;
pub mod identifiers;
pub mod sampling;
pub mod telemetry;
pub mod weight;
pub mod workflow;

// Re-export key types for easy access
pub use crate::config::{config, init_config, DispenserConfig};
pub use crate::dispensing::{DispensePhase, DispensingSimulator, TickOutcome, TickTimer};
pub use crate::errors::DispenserError;
pub use crate::identifiers::{BatchIdentifier, IdentifierGenerator, ProductCatalog, ProductIdentifier};
pub use crate::sampling::{RandomIncrements, ScriptedIncrements, WeightSampler};
pub use crate::telemetry::{create_session_span, generate_session_id, init_telemetry, shutdown_telemetry};
pub use crate::weight::{FixedTarget, TargetSource, TargetWeight, ToleranceBand, WeightTargetGenerator};
pub use crate::workflow::{RunId, Session, WorkflowController, WorkflowSnapshot};
