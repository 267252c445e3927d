//! Colorful console output for matcher runs.
//!
//! Provides a custom `tracing` layer that formats matcher events with colors.
//! Initialized on the first call to [`crate::align_with`] when the `console`
//! feature is enabled.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Target prefix of the events this layer prints.
const TARGET: &str = "linkforge_solver";

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect. Does
/// nothing if another global subscriber is already installed.
pub fn init() {
    INIT.get_or_init(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "linkforge_solver=info".parse::<Directive>() {
            filter = filter.add_directive(directive);
        }

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(LinkConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats matcher events with colors.
pub struct LinkConsoleLayer;

impl<S: Subscriber> Layer<S> for LinkConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with(TARGET) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    matcher: Option<String>,
    constraint: Option<String>,
    relation: Option<String>,
    score: Option<String>,
    best: Option<String>,
    candidates: Option<u64>,
    committed: Option<u64>,
    alignments: Option<u64>,
    count: Option<u64>,
    depth: Option<u64>,
    kept: Option<u64>,
    iteration: Option<u64>,
    nodes: Option<u64>,
}

impl EventVisitor {
    fn set_str(&mut self, name: &str, value: String) {
        match name {
            "event" => self.event = Some(value),
            "matcher" => self.matcher = Some(value),
            "constraint" => self.constraint = Some(value),
            "relation" => self.relation = Some(value),
            "score" => self.score = Some(value),
            "best" => self.best = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_str(field.name(), s.trim_matches('"').to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "candidates" => self.candidates = Some(value),
            "committed" => self.committed = Some(value),
            "alignments" => self.alignments = Some(value),
            "count" => self.count = Some(value),
            "depth" => self.depth = Some(value),
            "kept" => self.kept = Some(value),
            "iteration" => self.iteration = Some(value),
            "nodes" => self.nodes = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_str(field.name(), value.to_string());
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "match_start" => format_match_start(v),
        "match_end" => format_match_end(v),
        "beam_level" => format_beam_level(v),
        "progress" => format_progress(v),
        "candidates_dropped" => format_dropped(v),
        _ => String::new(),
    }
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_match_start(v: &EventVisitor) -> String {
    let matcher = v.matcher.as_deref().unwrap_or("matcher");
    let constraint = v.constraint.as_deref().unwrap_or("threshold");

    format!(
        "{} {} {} {} under {}: candidates ({}), committed ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        format!("[{}]", matcher).bright_cyan(),
        "started".white().bold(),
        constraint.bright_magenta(),
        count(v.candidates).bright_yellow(),
        count(v.committed).bright_yellow(),
    )
}

fn format_match_end(v: &EventVisitor) -> String {
    let matcher = v.matcher.as_deref().unwrap_or("matcher");
    let score = v.score.as_deref().unwrap_or("N/A");

    format!(
        "{} {} {} {}: alignments ({}), score ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        format!("[{}]", matcher).bright_cyan(),
        "ended".white().bold(),
        count(v.alignments).bright_yellow(),
        score.bright_green(),
    )
}

fn format_beam_level(v: &EventVisitor) -> String {
    format!(
        "    {} Level {:>5} | kept {:>7} | best {}",
        "->".bright_blue(),
        count(v.depth).white(),
        count(v.kept).white(),
        v.best.as_deref().unwrap_or("N/A").bright_green(),
    )
}

fn format_progress(v: &EventVisitor) -> String {
    format!(
        "    {} Iteration {:>9} | nodes {:>9} | best {}",
        "->".bright_blue(),
        count(v.iteration).white(),
        count(v.nodes).white(),
        v.best.as_deref().unwrap_or("N/A").bright_green(),
    )
}

fn format_dropped(v: &EventVisitor) -> String {
    format!(
        "{} {} {} dropped {} candidate(s) with unsupported relation {}",
        timestamp().bright_black(),
        "WARN".yellow(),
        "[Matcher]".bright_cyan(),
        count(v.count).bright_yellow(),
        v.relation.as_deref().unwrap_or("?").yellow(),
    )
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_event_prints_nothing() {
        let v = EventVisitor {
            event: Some("step".into()),
            ..Default::default()
        };
        assert!(format_event(&v).is_empty());
    }

    #[test]
    fn test_match_end_mentions_counts() {
        let v = EventVisitor {
            event: Some("match_end".into()),
            matcher: Some("beam-search".into()),
            alignments: Some(12_345),
            score: Some("3.1416".into()),
            ..Default::default()
        };
        let out = format_event(&v);
        assert!(out.contains("beam-search"));
        assert!(out.contains("12,345"));
        assert!(out.contains("3.1416"));
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
