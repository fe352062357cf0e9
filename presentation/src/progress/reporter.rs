//! Progress reporting for graph execution

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sql_agent_application::GraphProgressNotifier;
use std::sync::Mutex;
use std::time::Duration;

/// Human-readable label for a node id.
pub fn node_label(node: &str) -> &str {
    match node {
        "list_tables" => "Listing tables",
        "call_get_schema" => "Choosing tables",
        "get_schema" => "Reading schema",
        "generate_query" => "Writing query",
        "check_query" => "Checking query",
        "run_query" => "Running query",
        "agent" => "Thinking",
        "tools" => "Calling tools",
        other => other,
    }
}

/// Spinner on stderr that follows the graph node by node
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        let spinner = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        f(spinner);
    }

    /// Remove the spinner line; call once the run has ended.
    pub fn finish(&self) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.finish();
    }
}

impl GraphProgressNotifier for ProgressReporter {
    fn on_node_start(&self, node: &str) {
        self.with_spinner(|pb| {
            pb.set_prefix(node_label(node).to_string());
            pb.set_message("...");
        });
    }

    fn on_node_complete(&self, node: &str, step: usize) {
        self.with_spinner(|pb| {
            pb.println(format!(
                "  {} {} {}",
                "v".green(),
                format!("[{}]", step).dimmed(),
                node_label(node)
            ));
        });
    }

    fn on_node_failed(&self, node: &str, error: &str) {
        self.with_spinner(|pb| {
            pb.println(format!("  {} {}: {}", "x".red(), node_label(node), error));
        });
        self.finish();
    }
}

/// Plain-text progress on stderr (no terminal control)
pub struct SimpleProgress;

impl GraphProgressNotifier for SimpleProgress {
    fn on_node_start(&self, node: &str) {
        eprintln!("{} {}", "->".cyan(), node_label(node).bold());
    }

    fn on_node_complete(&self, _node: &str, _step: usize) {}

    fn on_node_failed(&self, node: &str, error: &str) {
        eprintln!("  {} {} failed: {}", "x".red(), node_label(node), error);
    }
}
