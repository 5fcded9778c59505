// tests/barrier_policies.rs

mod common;
use crate::common::{Recorder, init_tracing};

use taskrunner::barrier::{BarrierOptions, Outcome, Policy, Signal, make_barrier};
use taskrunner::errors::TaskrunnerError;

type TestError = &'static str;

#[test]
fn fail_fast_first_error_fires_immediately_and_later_signals_are_ignored() {
    init_tracing();

    let done: Recorder<Option<TestError>> = Recorder::new();
    let signal = Signal::fail_fast(3, done.sink()).unwrap();

    signal.signal(Some("errA"));
    assert_eq!(done.calls(), vec![Some("errA")]);
    assert!(signal.is_terminal());

    signal.signal(None);
    signal.signal(Some("errB"));
    assert_eq!(done.calls(), vec![Some("errA")], "callback fires exactly once");
}

#[test]
fn fail_fast_without_errors_fires_after_the_last_signal() {
    init_tracing();

    let done: Recorder<Option<TestError>> = Recorder::new();
    let signal = Signal::fail_fast(3, done.sink()).unwrap();

    signal.done();
    signal.done();
    assert!(done.is_empty());
    assert_eq!(signal.remaining(), 1);

    signal.done();
    assert_eq!(done.calls(), vec![None]);
    assert_eq!(signal.remaining(), 0);
}

#[test]
fn fail_fast_reports_error_carried_by_the_final_signal() {
    init_tracing();

    let done: Recorder<Option<TestError>> = Recorder::new();
    let signal = Signal::fail_fast(2, done.sink()).unwrap();

    signal.done();
    signal.fail("last");

    assert_eq!(done.calls(), vec![Some("last")]);
}

#[test]
fn fail_fast_error_midway_short_circuits() {
    init_tracing();

    let done: Recorder<Option<TestError>> = Recorder::new();
    let signal = Signal::fail_fast(4, done.sink()).unwrap();

    signal.done();
    signal.fail("second");
    assert_eq!(done.calls(), vec![Some("second")]);

    signal.done();
    signal.done();
    assert_eq!(done.len(), 1);
}

#[test]
fn accumulate_collects_errors_in_signal_order() {
    init_tracing();

    let done: Recorder<Vec<TestError>> = Recorder::new();
    let signal = Signal::accumulate(2, done.sink()).unwrap();

    signal.fail("e1");
    assert!(done.is_empty(), "accumulate never short-circuits");
    signal.fail("e2");

    assert_eq!(done.calls(), vec![vec!["e1", "e2"]]);
}

#[test]
fn accumulate_without_errors_reports_empty_list() {
    init_tracing();

    let done: Recorder<Vec<TestError>> = Recorder::new();
    let signal = Signal::accumulate(2, done.sink()).unwrap();

    signal.done();
    signal.done();

    assert_eq!(done.calls(), vec![Vec::<TestError>::new()]);
}

#[test]
fn accumulate_mixes_successes_and_errors() {
    init_tracing();

    let done: Recorder<Vec<TestError>> = Recorder::new();
    let signal = Signal::accumulate(4, done.sink()).unwrap();

    signal.done();
    signal.fail("x");
    signal.done();
    signal.fail("y");
    signal.fail("ignored: barrier already complete");

    assert_eq!(done.calls(), vec![vec!["x", "y"]]);
}

#[test]
fn count_of_one_fires_on_the_first_signal() {
    init_tracing();

    let ff: Recorder<Option<TestError>> = Recorder::new();
    Signal::fail_fast(1, ff.sink()).unwrap().done();
    assert_eq!(ff.calls(), vec![None]);

    let acc: Recorder<Vec<TestError>> = Recorder::new();
    Signal::accumulate(1, acc.sink()).unwrap().fail("only");
    assert_eq!(acc.calls(), vec![vec!["only"]]);
}

#[test]
fn zero_count_is_an_invalid_argument() {
    init_tracing();

    let done: Recorder<Outcome<TestError>> = Recorder::new();
    let result = make_barrier(0, BarrierOptions::default(), done.sink());

    match result {
        Err(TaskrunnerError::InvalidArgument(msg)) => assert!(msg.contains("positive")),
        Err(e) => panic!("Expected InvalidArgument, got: {:?}", e),
        Ok(s) => panic!("Expected error, got {:?}", s),
    }
    assert!(done.is_empty());
}

#[test]
fn make_barrier_selects_policy_from_options() {
    init_tracing();

    let ff: Recorder<Outcome<TestError>> = Recorder::new();
    let signal = make_barrier(3, BarrierOptions::default(), ff.sink()).unwrap();
    assert_eq!(signal.policy(), Policy::FailFast);
    signal.fail("errA");
    signal.done();
    signal.done();
    assert_eq!(ff.calls(), vec![Outcome::FailFast(Some("errA"))]);

    let acc: Recorder<Outcome<TestError>> = Recorder::new();
    let signal = make_barrier(2, BarrierOptions::accumulate(), acc.sink()).unwrap();
    assert_eq!(signal.policy(), Policy::Accumulate);
    assert_eq!(signal.count(), 2);
    signal.fail("e1");
    signal.fail("e2");
    assert_eq!(acc.calls(), vec![Outcome::Accumulated(vec!["e1", "e2"])]);
}

#[test]
fn outcome_helpers_reflect_errors() {
    assert!(Outcome::<TestError>::FailFast(None).is_success());
    assert!(!Outcome::FailFast(Some("e")).is_success());
    assert!(Outcome::<TestError>::Accumulated(vec![]).is_success());
    assert_eq!(
        Outcome::Accumulated(vec!["a", "b"]).into_errors(),
        vec!["a", "b"]
    );
    assert_eq!(Outcome::FailFast(Some("a")).into_errors(), vec!["a"]);
}

#[test]
fn clones_share_one_countdown() {
    init_tracing();

    let done: Recorder<Option<TestError>> = Recorder::new();
    let signal = Signal::fail_fast(3, done.sink()).unwrap();
    let handles: Vec<_> = (0..3).map(|_| signal.clone()).collect();

    for handle in &handles {
        assert!(done.is_empty());
        handle.done();
    }

    assert_eq!(done.calls(), vec![None]);
    assert!(handles.iter().all(Signal::is_terminal));
}

#[test]
fn callback_may_signal_again_without_refiring() {
    init_tracing();

    let done: Recorder<Option<TestError>> = Recorder::new();
    let slot: std::rc::Rc<std::cell::RefCell<Option<Signal<TestError>>>> = Default::default();

    let sink = done.sink();
    let inner = std::rc::Rc::clone(&slot);
    let signal = Signal::fail_fast(1, move |error| {
        if let Some(signal) = inner.borrow().as_ref() {
            signal.fail("from inside the callback");
        }
        sink(error);
    })
    .unwrap();
    *slot.borrow_mut() = Some(signal.clone());

    signal.done();

    assert_eq!(done.calls(), vec![None]);
}

#[test]
fn barrier_options_deserialize_from_toml() {
    let opts: BarrierOptions = toml::from_str("accumulate_errors = true").unwrap();
    assert_eq!(opts.policy(), Policy::Accumulate);

    let opts: BarrierOptions = toml::from_str("").unwrap();
    assert_eq!(opts.policy(), Policy::FailFast);
    assert_eq!(BarrierOptions::from(Policy::Accumulate), BarrierOptions::accumulate());
}
