//! Tests for match listeners.

use super::*;

#[test]
fn test_listener_set_new() {
    let set = ListenerSet::new();
    assert_eq!(set.listener_count(), 0);
    assert!(!set.has_listeners());
}

#[test]
fn test_listener_set_broadcasts() {
    let mut set = ListenerSet::new();
    let first = Arc::new(CountingListener::new());
    let second = Arc::new(CountingListener::new());
    set.add_listener(first.clone());
    set.add_listener(second.clone());
    set.add_listener(Arc::new(NoOpListener));

    set.on_stage(Stage::Initializing);
    set.message(Stage::Matching, Level::Info, "started");
    set.message(Stage::Matching, Level::Critical, "conflict");
    set.on_level_completed(1, 4, AlignmentScore::of(0.5));
    set.on_best_improved(3, AlignmentScore::of(0.7));

    for counter in [&first, &second] {
        assert_eq!(counter.stage_count(), 1);
        assert_eq!(counter.info_count(), 1);
        assert_eq!(counter.critical_count(), 1);
        assert_eq!(counter.warning_count(), 0);
        assert_eq!(counter.level_count(), 1);
        assert_eq!(counter.improvement_count(), 1);
    }
    assert_eq!(set.listener_count(), 3);

    set.clear_listeners();
    assert!(!set.has_listeners());
}

#[test]
fn test_counting_listener_reset() {
    let listener = CountingListener::new();
    listener.message(Stage::Matching, Level::Warning, "w");
    listener.on_stage(Stage::Completed);
    listener.reset();
    assert_eq!(listener.warning_count(), 0);
    assert_eq!(listener.stage_count(), 0);
}

#[test]
fn test_counting_listener_thread_safety() {
    let listener = CountingListener::new();

    rayon::scope(|s| {
        for _ in 0..4 {
            s.spawn(|_| {
                for _ in 0..1000 {
                    listener.message(Stage::Matching, Level::Info, "tick");
                    listener.on_best_improved(0, AlignmentScore::ZERO);
                }
            });
        }
    });

    assert_eq!(listener.info_count(), 4000);
    assert_eq!(listener.improvement_count(), 4000);
}

#[test]
fn test_logging_listener_accepts_everything() {
    let listener = LoggingListener::with_prefix("[test] ");
    listener.on_stage(Stage::Matching);
    listener.message(Stage::Matching, Level::Warning, "w");
    listener.on_level_completed(2, 8, AlignmentScore::of(1.0));
    listener.on_best_improved(5, AlignmentScore::of(1.0));
}

#[test]
fn test_stage_display() {
    assert_eq!(Stage::Initializing.to_string(), "initializing");
    assert_eq!(Stage::Failed.to_string(), "failed");
    assert!(Level::Critical < Level::Info);
}
