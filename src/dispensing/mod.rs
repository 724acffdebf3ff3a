// Dispensing simulation: the run state machine and the timer that drives it

pub mod state_machine;
pub mod timer;

pub use state_machine::{DispenseEvent, DispensePhase, DispensingSimulator, TickOutcome};
pub use timer::{TickControl, TickTimer};
