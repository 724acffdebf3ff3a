// Text rendering of workflow state for the terminal

use crate::identifiers::ProductCatalog;
use crate::workflow::WorkflowSnapshot;

const BAR_WIDTH: usize = 30;

pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn catalog_lines(catalog: &ProductCatalog) -> Vec<String> {
    catalog
        .iter()
        .enumerate()
        .map(|(index, product)| format!("  {index:>2}  {product}"))
        .collect()
}

pub fn weight_line(snapshot: &WorkflowSnapshot) -> String {
    format!(
        "⚖️  {:>7.2}g {} {:>5.1}%",
        snapshot.current_weight,
        progress_bar(snapshot.progress_percent),
        snapshot.progress_percent
    )
}

pub fn status_lines(snapshot: &WorkflowSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    match (&snapshot.product, &snapshot.batch) {
        (Some(product), Some(batch)) => {
            lines.push(format!("🧪 NDC: {product}"));
            lines.push(format!("🏷️  Lot Number: {batch}"));
        }
        _ => {
            lines.push("🧪 No NDC selected".to_string());
            return lines;
        }
    }

    match snapshot.target {
        Some(target) if snapshot.approved => {
            lines.push(format!("🎯 Required Weight: {target:.2}g"))
        }
        _ => lines.push("⏳ Awaiting approval".to_string()),
    }

    if snapshot.dispensing || snapshot.current_weight > 0.0 {
        lines.push(weight_line(snapshot));
    } else if snapshot.can_start {
        lines.push("▶️  Ready to start dispensing".to_string());
    }

    if let Some(final_weight) = snapshot.final_weight {
        lines.push(format!("✅ Dispensing Complete - Final Weight: {final_weight:.2}g"));
    }
    if let Some(message) = &snapshot.completion_message {
        lines.push(format!("📋 {message}"));
    }
    lines
}
