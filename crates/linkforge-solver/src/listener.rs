//! Progress notifications from matchers.
//!
//! Matchers report stage transitions, diagnostic messages and search
//! progress to a [`MatchListener`]. Every callback has an empty default, so
//! [`NoOpListener`] (or any listener that ignores everything) is valid.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use linkforge_solver::listener::{CountingListener, Level, ListenerSet, MatchListener, Stage};
//!
//! let counter = Arc::new(CountingListener::new());
//! let mut listeners = ListenerSet::new();
//! listeners.add_listener(counter.clone());
//!
//! listeners.message(Stage::Matching, Level::Warning, "dropped 3 candidates");
//! assert_eq!(counter.warning_count(), 1);
//! ```

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use linkforge_core::AlignmentScore;
use tracing::{debug, error, info, warn};

/// Stage of a matching run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Initializing,
    Matching,
    Completed,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Initializing => "initializing",
            Stage::Matching => "matching",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        })
    }
}

/// Severity of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// The run cannot continue.
    Critical,
    /// The run continues, but the result may be affected.
    Warning,
    /// Normal progress information.
    Info,
}

/// Receives notifications from a matching run.
pub trait MatchListener: Send + Sync + Debug {
    /// Called when the run enters a new stage.
    fn on_stage(&self, _stage: Stage) {}

    /// Called with a diagnostic message.
    fn message(&self, _stage: Stage, _level: Level, _message: &str) {}

    /// Called after beam search trims a level.
    ///
    /// # Arguments
    ///
    /// * `depth` - Number of alignments added on every branch of the level
    /// * `frontier` - Number of states kept
    /// * `best` - Best score seen so far
    fn on_level_completed(&self, _depth: usize, _frontier: usize, _best: AlignmentScore) {}

    /// Called when a search finds a better complete state.
    fn on_best_improved(&self, _iteration: usize, _score: AlignmentScore) {}
}

/// A listener that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpListener;

impl MatchListener for NoOpListener {}

/// Broadcasts notifications to several listeners in registration order.
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Arc<dyn MatchListener>>,
}

impl ListenerSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener.
    pub fn add_listener(&mut self, listener: Arc<dyn MatchListener>) {
        self.listeners.push(listener);
    }

    /// Removes all listeners.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Returns the number of listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if there are any listeners registered.
    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }
}

impl Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl MatchListener for ListenerSet {
    fn on_stage(&self, stage: Stage) {
        for listener in &self.listeners {
            listener.on_stage(stage);
        }
    }

    fn message(&self, stage: Stage, level: Level, message: &str) {
        for listener in &self.listeners {
            listener.message(stage, level, message);
        }
    }

    fn on_level_completed(&self, depth: usize, frontier: usize, best: AlignmentScore) {
        for listener in &self.listeners {
            listener.on_level_completed(depth, frontier, best);
        }
    }

    fn on_best_improved(&self, iteration: usize, score: AlignmentScore) {
        for listener in &self.listeners {
            listener.on_best_improved(iteration, score);
        }
    }
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingListener {
    prefix: String,
}

impl LoggingListener {
    /// Creates a new logging listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logging listener whose messages start with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl MatchListener for LoggingListener {
    fn on_stage(&self, stage: Stage) {
        info!(event = "stage", stage = %stage, "{}stage {}", self.prefix, stage);
    }

    fn message(&self, stage: Stage, level: Level, message: &str) {
        match level {
            Level::Critical => error!(stage = %stage, "{}{}", self.prefix, message),
            Level::Warning => warn!(stage = %stage, "{}{}", self.prefix, message),
            Level::Info => info!(stage = %stage, "{}{}", self.prefix, message),
        }
    }

    fn on_level_completed(&self, depth: usize, frontier: usize, best: AlignmentScore) {
        debug!(
            event = "beam_level",
            depth = depth,
            frontier = frontier,
            best = %best,
        );
    }

    fn on_best_improved(&self, iteration: usize, score: AlignmentScore) {
        debug!(event = "best_improved", iteration = iteration, score = %score);
    }
}

/// Counts notifications; handy in tests.
#[derive(Debug, Default)]
pub struct CountingListener {
    stages: AtomicUsize,
    infos: AtomicUsize,
    warnings: AtomicUsize,
    criticals: AtomicUsize,
    levels: AtomicUsize,
    improvements: AtomicUsize,
}

impl CountingListener {
    /// Creates a new counting listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stage transitions.
    pub fn stage_count(&self) -> usize {
        self.stages.load(Ordering::SeqCst)
    }

    /// Returns the number of info messages.
    pub fn info_count(&self) -> usize {
        self.infos.load(Ordering::SeqCst)
    }

    /// Returns the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }

    /// Returns the number of critical messages.
    pub fn critical_count(&self) -> usize {
        self.criticals.load(Ordering::SeqCst)
    }

    /// Returns the number of completed beam levels.
    pub fn level_count(&self) -> usize {
        self.levels.load(Ordering::SeqCst)
    }

    /// Returns the number of best-state improvements.
    pub fn improvement_count(&self) -> usize {
        self.improvements.load(Ordering::SeqCst)
    }

    /// Resets all counts to zero.
    pub fn reset(&self) {
        for counter in [
            &self.stages,
            &self.infos,
            &self.warnings,
            &self.criticals,
            &self.levels,
            &self.improvements,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
    }
}

impl MatchListener for CountingListener {
    fn on_stage(&self, _stage: Stage) {
        self.stages.fetch_add(1, Ordering::SeqCst);
    }

    fn message(&self, _stage: Stage, level: Level, _message: &str) {
        let counter = match level {
            Level::Critical => &self.criticals,
            Level::Warning => &self.warnings,
            Level::Info => &self.infos,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn on_level_completed(&self, _depth: usize, _frontier: usize, _best: AlignmentScore) {
        self.levels.fetch_add(1, Ordering::SeqCst);
    }

    fn on_best_improved(&self, _iteration: usize, _score: AlignmentScore) {
        self.improvements.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
