use anyhow::Result;

use crate::workflow::{WorkflowController, WorkflowSnapshot};

use super::render;

pub mod catalog;
pub mod run;
pub mod shell;
pub mod show_config;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Streams weight samples until the active run settles or stops.
///
/// Ctrl-C tears the run down and returns the state at that point.
pub async fn follow_run(controller: &WorkflowController, quiet: bool) -> Result<WorkflowSnapshot> {
    let mut signals = controller.subscribe();
    loop {
        let snapshot = signals.borrow_and_update().clone();
        if !quiet && (snapshot.dispensing || snapshot.is_complete()) {
            println!("{}", render::weight_line(&snapshot));
        }
        if snapshot.is_complete() || !snapshot.dispensing {
            return Ok(snapshot);
        }

        tokio::select! {
            changed = signals.changed() => {
                if changed.is_err() {
                    return Ok(controller.snapshot().await);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("🛑 Interrupted - stopping dispenser");
                controller.shutdown().await;
                return Ok(controller.snapshot().await);
            }
        }
    }
}

pub async fn show_how_to_start() -> Result<()> {
    println!("⚗️  Powder Dispenser - Simulated Dispensing Workflow");
    println!();
    println!("To get started:");
    println!("  📋 powder-dispenser catalog          # List selectable NDCs");
    println!("  ▶️  powder-dispenser run --ndc 0      # Dispense the first NDC");
    println!("  💬 powder-dispenser shell            # Interactive session");
    println!("  ⚙️  powder-dispenser config           # Show effective configuration");
    println!();
    println!("💡 Use --seed to replay the same catalog, targets and weights.");
    Ok(())
}
