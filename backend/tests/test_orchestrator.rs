//! Orchestrator Integration Tests
//!
//! JSON config, deterministic replay (trajectory digest), snapshots and the
//! event log of full runs.

use jump_simulator_core_rs::models::{Event, JumpSet, RateFactory, RateState, RateWindow};
use jump_simulator_core_rs::orchestrator::{
    validate_snapshot, Orchestrator, OrchestratorConfig, RunSnapshot, SimulationError,
};
use jump_simulator_core_rs::processes::{hawkes_jump_set, HawkesParams, HawkesState};
use jump_simulator_core_rs::{AggregatorError, ConfigError, QueueMethod, RngManager};

// ============================================================================
// Test Helpers
// ============================================================================

fn hawkes_config(seed: u64) -> OrchestratorConfig {
    OrchestratorConfig::from_json(&format!(
        r#"{{"rng_seed": {}, "t0": 0.0, "end_time": 20.0, "record_events": true}}"#,
        seed
    ))
    .unwrap()
}

/// Mutually exciting pair: jump 1 is excited by both, jump 0 only by itself
fn hawkes_run(
    seed: u64,
) -> Orchestrator<HawkesState, HawkesParams, QueueMethod<HawkesState, HawkesParams, RngManager>> {
    let params = HawkesParams::new(0.8, 0.4, 1.2).unwrap();
    let (jumps, graph) = hawkes_jump_set(vec![vec![0], vec![0, 1]]);
    Orchestrator::with_queue_method(hawkes_config(seed), jumps, Some(graph), HawkesState::new(2), params)
        .unwrap()
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_from_json_defaults() {
    let config = OrchestratorConfig::from_json(r#"{"rng_seed": 3, "end_time": 4.5}"#).unwrap();

    assert_eq!(config.rng_seed, 3);
    assert_eq!(config.t0, 0.0);
    assert_eq!(config.end_time, 4.5);
    assert!(config.record_events);
    assert_eq!(config.max_events, None);
}

#[test]
fn test_config_from_json_validates() {
    let result = OrchestratorConfig::from_json(r#"{"rng_seed": 3, "t0": 5.0, "end_time": 1.0}"#);
    assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));

    let result = OrchestratorConfig::from_json(r#"{"rng_seed": 3, "end_time": 1.0, "max_events": 0}"#);
    assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
}

#[test]
fn test_construction_errors_propagate() {
    let jumps = JumpSet::<Vec<i64>, ()>::new();
    let result = Orchestrator::with_queue_method(OrchestratorConfig::new(1, 0.0, 1.0), jumps, None, vec![], ());

    assert!(matches!(
        result.err(),
        Some(SimulationError::Aggregator(AggregatorError::Config(ConfigError::EmptyJumpSet)))
    ));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_same_seed_same_digest() {
    let mut run1 = hawkes_run(12345);
    let mut run2 = hawkes_run(12345);

    let summary1 = run1.run().unwrap();
    let summary2 = run2.run().unwrap();

    assert_eq!(summary1, summary2);
    assert_eq!(run1.event_log().digest(), run2.event_log().digest());
    assert_eq!(run1.state(), run2.state());
}

#[test]
fn test_different_seeds_differ() {
    let mut run1 = hawkes_run(1);
    let mut run2 = hawkes_run(2);

    run1.run().unwrap();
    run2.run().unwrap();

    assert_ne!(run1.event_log().digest(), run2.event_log().digest());
}

#[test]
fn test_config_hash_stable() {
    let run1 = hawkes_run(77);
    let run2 = hawkes_run(77);
    let run3 = hawkes_run(78);

    assert_eq!(run1.config_hash(), run2.config_hash());
    assert_ne!(run1.config_hash(), run3.config_hash());
}

// ============================================================================
// Event Log
// ============================================================================

#[test]
fn test_event_log_matches_state() {
    let mut run = hawkes_run(99);
    let summary = run.run().unwrap();
    let log = run.event_log();

    assert!(summary.terminated);
    assert_eq!(log.fired_count(), summary.events_fired);
    assert_eq!(log.fire_times(0), run.state().history[0]);
    assert_eq!(log.fire_times(1), run.state().history[1]);
    assert!(matches!(log.events().last(), Some(Event::Terminated { .. })));

    let json = log.to_json().unwrap();
    assert!(json.contains("\"type\":\"Fired\""));
}

#[test]
fn test_firing_jump_zero_resamples_both() {
    let mut run = hawkes_run(5);

    while let Some(outcome) = run.step().unwrap() {
        let resampled: Vec<usize> = outcome.resampled.iter().map(|&(j, _)| j).collect();
        let expected = if outcome.jump == 0 { vec![0, 1] } else { vec![1] };
        assert_eq!(resampled, expected);
    }
}

#[test]
fn test_step_after_termination_returns_none() {
    let jumps = JumpSet::<Vec<i64>, ()>::new().with_constant(|_u, _p, _t| 3.0, |u, _p, _t| u[0] += 1);
    let mut run =
        Orchestrator::with_queue_method(OrchestratorConfig::new(8, 0.0, 2.0), jumps, None, vec![0], ()).unwrap();

    let summary = run.run().unwrap();
    assert!(run.step().unwrap().is_none());
    assert_eq!(run.events_fired(), summary.events_fired);
    assert_eq!(run.into_state()[0] as usize, summary.events_fired);
}

#[test]
fn test_step_after_aggregator_failure_keeps_failing() {
    // Rate 2 until the first fire, then bounds that violate lower <= upper
    struct BreaksAfterFire;

    impl RateFactory<Vec<i64>, ()> for BreaksAfterFire {
        fn window(&self, _prior: &RateState, _t0: f64, _t: f64, u: &Vec<i64>, _p: &()) -> RateWindow {
            let mut window = RateWindow::constant(2.0);
            if u[0] > 0 {
                window.lower = 3.0;
            }
            window
        }

        fn rate(&self, _installed: &RateState, _u: &Vec<i64>, _p: &(), _t: f64) -> f64 {
            2.0
        }
    }

    let jumps = JumpSet::<Vec<i64>, ()>::new().with_conditional(BreaksAfterFire, |u, _, _| u[0] += 1);
    let mut run = Orchestrator::with_queue_method(
        OrchestratorConfig::new(8, 0.0, 50.0),
        jumps,
        Some(vec![vec![]]),
        vec![0],
        (),
    )
    .unwrap();

    assert!(matches!(
        run.step(),
        Err(SimulationError::Aggregator(AggregatorError::Sampling(_)))
    ));
    for _ in 0..2 {
        assert!(matches!(
            run.step(),
            Err(SimulationError::Aggregator(AggregatorError::Failed))
        ));
    }
    assert!(run.run().is_err());
    assert_eq!(run.state()[0], 1);
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_snapshots_valid_throughout_run() {
    let mut run = hawkes_run(31337);
    let hash = run.config_hash().to_string();

    loop {
        let snapshot = run.snapshot();
        validate_snapshot(&snapshot, &hash).unwrap();
        assert_eq!(snapshot.rng_state, run.aggregator().rng().get_state());
        if run.step().unwrap().is_none() {
            break;
        }
    }

    let done = run.snapshot();
    assert_eq!(done.next_jump, None);
    assert!(done.queued_times.iter().all(Option::is_none));
}

#[test]
fn test_snapshot_json_roundtrip() {
    let mut run = hawkes_run(4);
    run.step().unwrap();

    let snapshot = run.snapshot();
    let restored = RunSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();

    assert_eq!(restored, snapshot);
    assert!(validate_snapshot(&restored, "not-the-hash").is_err());
}
