//! Timer engine behavior under a paused Tokio clock and a manual wall clock

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, OnceLock,
    },
    time::Duration,
};

use chrono::TimeDelta;
use enhance_your_calm::{
    engine::{Phase, TICK_CADENCE},
    ManualClock, TimerEngine, TimerError, TimerListener,
};
use tokio::time::sleep;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[derive(Default)]
struct Recorder {
    ticks: Mutex<Vec<Duration>>,
    elapsed: AtomicUsize,
}

impl Recorder {
    fn ticks(&self) -> Vec<Duration> {
        self.ticks.lock().unwrap().clone()
    }

    fn elapsed_count(&self) -> usize {
        self.elapsed.load(Ordering::SeqCst)
    }
}

impl TimerListener for Recorder {
    fn on_tick(&self, remaining: Duration) {
        self.ticks.lock().unwrap().push(remaining);
    }

    fn on_elapsed(&self) {
        self.elapsed.fetch_add(1, Ordering::SeqCst);
    }
}

fn engine_with_recorder(interval: Duration) -> (Arc<ManualClock>, TimerEngine, Arc<Recorder>) {
    let clock = Arc::new(ManualClock::default());
    let engine = TimerEngine::with_clock(interval, clock.clone()).unwrap();
    let recorder = Arc::new(Recorder::default());
    engine.add_listener(recorder.clone());
    (clock, engine, recorder)
}

#[tokio::test(start_paused = true)]
async fn test_pause_and_resume_reaches_elapsed_once() {
    let (clock, engine, recorder) = engine_with_recorder(ms(10_000));

    engine.start();
    clock.advance(TimeDelta::milliseconds(3_000));
    sleep(ms(250)).await;
    engine.stop();

    assert!(!engine.is_running());
    assert_eq!(engine.remaining(), ms(7_000));
    assert_eq!(engine.phase(), Phase::Partial);

    // Time spent paused does not count
    clock.advance(TimeDelta::minutes(10));
    sleep(ms(1_000)).await;
    assert_eq!(engine.remaining(), ms(7_000));

    engine.start();
    clock.advance(TimeDelta::milliseconds(7_000));
    sleep(ms(250)).await;

    assert!(engine.is_elapsed());
    assert!(!engine.is_running());
    assert_eq!(engine.phase(), Phase::Elapsed);
    assert_eq!(recorder.elapsed_count(), 1);

    let ticks_at_elapse = recorder.ticks().len();
    sleep(ms(2_000)).await;
    assert_eq!(recorder.elapsed_count(), 1);
    assert_eq!(recorder.ticks().len(), ticks_at_elapse);
}

#[tokio::test(start_paused = true)]
async fn test_first_tick_waits_one_cadence() {
    let (clock, engine, recorder) = engine_with_recorder(ms(10_000));

    engine.start();
    clock.advance(TimeDelta::milliseconds(500));
    sleep(TICK_CADENCE / 2).await;
    assert!(recorder.ticks().is_empty());

    sleep(TICK_CADENCE).await;
    assert_eq!(recorder.ticks(), vec![ms(9_500)]);
}

#[tokio::test(start_paused = true)]
async fn test_double_start_is_single_run() {
    let (clock, engine, recorder) = engine_with_recorder(ms(10_000));

    engine.start();
    clock.advance(TimeDelta::milliseconds(1_000));
    engine.start();
    sleep(ms(250)).await;

    // One ticker, and the start timestamp was not moved by the second call
    assert_eq!(recorder.ticks(), vec![ms(9_000)]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_scheduled_tick() {
    let (clock, engine, recorder) = engine_with_recorder(ms(10_000));

    engine.start();
    clock.advance(TimeDelta::milliseconds(20_000));
    engine.stop();
    sleep(ms(1_000)).await;

    assert!(recorder.ticks().is_empty());
    assert_eq!(recorder.elapsed_count(), 0);
    assert_eq!(engine.remaining(), ms(10_000));
    assert!(!engine.is_elapsed());
    assert_eq!(engine.phase(), Phase::Fresh);
}

#[tokio::test(start_paused = true)]
async fn test_late_tick_elapses_once() {
    let (clock, engine, recorder) = engine_with_recorder(ms(10_000));

    engine.start();
    clock.advance(TimeDelta::seconds(60));
    sleep(ms(1_000)).await;

    assert_eq!(recorder.ticks(), vec![Duration::ZERO]);
    assert_eq!(recorder.elapsed_count(), 1);
    assert!(engine.is_elapsed());
}

#[tokio::test(start_paused = true)]
async fn test_ticks_are_non_increasing() {
    let (clock, engine, recorder) = engine_with_recorder(ms(10_000));

    engine.start();
    for step in 0..12 {
        // Jitter the wall clock, including one step backwards
        let delta = if step == 4 { -300 } else { 1_100 };
        clock.advance(TimeDelta::milliseconds(delta));
        sleep(TICK_CADENCE).await;
    }
    sleep(ms(500)).await;

    let ticks = recorder.ticks();
    assert!(!ticks.is_empty());
    assert!(ticks.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(ticks.last(), Some(&Duration::ZERO));
    assert_eq!(recorder.elapsed_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_while_running_is_noop() {
    let (clock, engine, _recorder) = engine_with_recorder(ms(10_000));

    engine.start();
    clock.advance(TimeDelta::milliseconds(2_000));
    sleep(ms(250)).await;
    engine.reset();

    assert!(engine.is_running());
    assert_eq!(engine.remaining(), ms(8_000));

    engine.stop();
    engine.reset();
    assert_eq!(engine.remaining(), engine.interval());
    assert_eq!(engine.phase(), Phase::Fresh);
}

#[tokio::test(start_paused = true)]
async fn test_reset_after_elapsed_allows_new_run() {
    let (clock, engine, recorder) = engine_with_recorder(ms(1_000));

    engine.start();
    clock.advance(TimeDelta::milliseconds(1_000));
    sleep(ms(250)).await;
    assert!(engine.is_elapsed());

    // Elapsed is terminal until reset
    engine.start();
    assert!(!engine.is_running());

    engine.reset();
    assert_eq!(engine.remaining(), ms(1_000));
    engine.start();
    clock.advance(TimeDelta::milliseconds(1_000));
    sleep(ms(250)).await;
    assert_eq!(recorder.elapsed_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_set_interval_while_running() {
    let (clock, engine, recorder) = engine_with_recorder(ms(10_000));

    engine.start();
    engine.set_interval(ms(5_000)).unwrap();
    clock.advance(TimeDelta::milliseconds(6_000));
    sleep(ms(1_000)).await;

    assert!(!engine.is_running());
    assert!(recorder.ticks().is_empty());
    assert_eq!(engine.interval(), ms(5_000));
    assert_eq!(engine.remaining(), ms(5_000));
}

#[tokio::test(start_paused = true)]
async fn test_rejection_keeps_prior_state() {
    let (clock, engine, _recorder) = engine_with_recorder(ms(10_000));
    engine.start();
    clock.advance(TimeDelta::milliseconds(1_000));
    sleep(ms(250)).await;

    assert_eq!(
        engine.set_interval(Duration::ZERO),
        Err(TimerError::NonPositiveInterval(0))
    );
    assert!(engine.is_running());
    assert_eq!(engine.interval(), ms(10_000));
    assert_eq!(engine.remaining(), ms(9_000));
}

#[tokio::test(start_paused = true)]
async fn test_restore_round_trip_and_stops() {
    let (clock, engine, _recorder) = engine_with_recorder(ms(10_000));
    engine.start();
    clock.advance(TimeDelta::milliseconds(4_000));
    sleep(ms(250)).await;
    engine.stop();

    let snapshot = engine.snapshot();
    let restored = TimerEngine::with_clock(ms(60_000), clock.clone()).unwrap();
    restored.restore(&snapshot);
    assert_eq!(restored.interval(), engine.interval());
    assert_eq!(restored.remaining(), engine.remaining());
    assert!(!restored.is_running());

    // Restoring a running engine leaves it stopped with no stray ticks
    let recorder = Arc::new(Recorder::default());
    restored.add_listener(recorder.clone());
    restored.start();
    restored.restore(&snapshot);
    sleep(ms(1_000)).await;
    assert!(!restored.is_running());
    assert!(recorder.ticks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_listeners_notified_in_registration_order() {
    struct Tagged {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl TimerListener for Tagged {
        fn on_tick(&self, _remaining: Duration) {
            self.log.lock().unwrap().push(format!("{}:tick", self.tag));
        }

        fn on_elapsed(&self) {
            self.log.lock().unwrap().push(format!("{}:elapsed", self.tag));
        }
    }

    let clock = Arc::new(ManualClock::default());
    let engine = TimerEngine::with_clock(ms(1_000), clock.clone()).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let first: Arc<dyn TimerListener> = Arc::new(Tagged { tag: "a", log: log.clone() });
    let second: Arc<dyn TimerListener> = Arc::new(Tagged { tag: "b", log: log.clone() });

    assert!(engine.add_listener(first.clone()));
    assert!(engine.add_listener(second.clone()));
    assert!(!engine.add_listener(first.clone()));

    engine.start();
    clock.advance(TimeDelta::milliseconds(1_000));
    sleep(ms(250)).await;

    assert_eq!(
        *log.lock().unwrap(),
        vec!["a:tick", "b:tick", "a:elapsed", "b:elapsed"]
    );

    assert!(engine.remove_listener(&first));
    assert!(!engine.remove_listener(&first));
}

#[tokio::test(start_paused = true)]
async fn test_listener_can_stop_engine_from_tick() {
    #[derive(Default)]
    struct StopOnTick {
        engine: OnceLock<TimerEngine>,
        ticks: AtomicUsize,
    }

    impl TimerListener for StopOnTick {
        fn on_tick(&self, _remaining: Duration) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            if let Some(engine) = self.engine.get() {
                engine.stop();
            }
        }

        fn on_elapsed(&self) {}
    }

    let clock = Arc::new(ManualClock::default());
    let engine = TimerEngine::with_clock(ms(10_000), clock.clone()).unwrap();
    let listener = Arc::new(StopOnTick::default());
    let _ = listener.engine.set(engine.clone());
    engine.add_listener(listener.clone());

    engine.start();
    clock.advance(TimeDelta::milliseconds(1_000));
    sleep(ms(1_000)).await;

    assert_eq!(listener.ticks.load(Ordering::SeqCst), 1);
    assert!(!engine.is_running());
    assert_eq!(engine.remaining(), ms(9_000));
}

#[tokio::test(start_paused = true)]
async fn test_final_tick_sees_stopped_and_elapsed() {
    #[derive(Default)]
    struct FinalTickState {
        engine: OnceLock<TimerEngine>,
        seen: Mutex<Vec<(Duration, bool, bool)>>,
    }

    impl TimerListener for FinalTickState {
        fn on_tick(&self, remaining: Duration) {
            if let Some(engine) = self.engine.get() {
                self.seen
                    .lock()
                    .unwrap()
                    .push((remaining, engine.is_running(), engine.is_elapsed()));
            }
        }

        fn on_elapsed(&self) {}
    }

    let clock = Arc::new(ManualClock::default());
    let engine = TimerEngine::with_clock(ms(1_000), clock.clone()).unwrap();
    let listener = Arc::new(FinalTickState::default());
    let _ = listener.engine.set(engine.clone());
    engine.add_listener(listener.clone());

    engine.start();
    clock.advance(TimeDelta::milliseconds(400));
    sleep(ms(250)).await;
    clock.advance(TimeDelta::milliseconds(600));
    sleep(ms(200)).await;

    assert_eq!(
        *listener.seen.lock().unwrap(),
        vec![(ms(600), true, false), (Duration::ZERO, false, true)]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_waits_for_in_flight_tick() {
    struct SlowLog {
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl TimerListener for SlowLog {
        fn on_tick(&self, _remaining: Duration) {
            self.log.lock().unwrap().push("tick begin");
            std::thread::sleep(ms(300));
            self.log.lock().unwrap().push("tick end");
        }

        fn on_elapsed(&self) {}
    }

    let engine = TimerEngine::new(ms(60_000)).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    engine.add_listener(Arc::new(SlowLog { log: log.clone() }));

    engine.start();
    // The first tick fires one cadence in and is still notifying here
    sleep(TICK_CADENCE + ms(100)).await;
    engine.stop();
    log.lock().unwrap().push("stopped");
    assert!(!engine.is_running());

    sleep(ms(800)).await;
    assert_eq!(*log.lock().unwrap(), vec!["tick begin", "tick end", "stopped"]);
}

#[test]
fn test_new_rejects_zero() {
    assert_eq!(
        TimerEngine::new(Duration::ZERO).unwrap_err(),
        TimerError::NonPositiveInterval(0)
    );
}
