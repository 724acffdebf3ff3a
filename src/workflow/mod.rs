// Workflow orchestration: one session, four commands, published snapshots

pub mod controller;
pub mod session;
pub mod snapshot;

pub use controller::WorkflowController;
pub use session::{completion_message, RunId, Session};
pub use snapshot::WorkflowSnapshot;
