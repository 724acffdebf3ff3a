use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dispensing::DispensePhase;
use crate::identifiers::{BatchIdentifier, ProductIdentifier};

/// Read-only view of the workflow, published after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub product: Option<ProductIdentifier>,
    pub batch: Option<BatchIdentifier>,
    pub approved: bool,
    /// Required weight in grams
    pub target: Option<f64>,
    pub current_weight: f64,
    /// A run is active and its timer is live
    pub dispensing: bool,
    /// "Start Dispensing" is currently allowed
    pub can_start: bool,
    pub phase: DispensePhase,
    pub ticks: u32,
    pub progress_percent: f64,
    pub final_weight: Option<f64>,
    pub completion_message: Option<String>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl WorkflowSnapshot {
    pub fn empty() -> Self {
        Self {
            product: None,
            batch: None,
            approved: false,
            target: None,
            current_weight: 0.0,
            dispensing: false,
            can_start: false,
            phase: DispensePhase::Idle,
            ticks: 0,
            progress_percent: 0.0,
            final_weight: None,
            completion_message: None,
            settled_at: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.final_weight.is_some()
    }
}

impl Default for WorkflowSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
