use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ruleta::app::{App, AppState, Flow, Settings};
use ruleta::assets::{AssetReference, MemoryAssetStore};
use ruleta::engine::SpinState;
use ruleta::rng::ScriptedSource;
use ruleta::runtime::{ChannelEventSource, Clock, ManualClock, Runner, WheelEvent};
use ruleta::wheel::{segment_at, Category};

fn key(c: char) -> WheelEvent {
    WheelEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless session using the internal runtime without a TTY: pick a level,
// spin, and let frames run until the wheel lands.
#[test]
fn headless_spin_session_lands() {
    let mut store = MemoryAssetStore::new();
    store.insert(&AssetReference::new(Category::Tercero, 4, "jpg"));
    let mut app = App::new(
        ScriptedSource::new(vec![7, 4]),
        ScriptedSource::new(vec![4]),
        store,
        Settings {
            duration_input: "0.5".into(),
            ..Settings::default()
        },
    );

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), ManualClock::new());

    tx.send(key('l')).unwrap();
    tx.send(key('2')).unwrap();
    tx.send(key('g')).unwrap();

    let mut intermediates = 0;
    for _ in 0..200u32 {
        let (event, now) = runner.step();
        match event {
            WheelEvent::Frame => {
                let before = app.presenter.store().request_count();
                app.on_frame(now);
                if app.engine.is_spinning() && app.presenter.store().request_count() > before {
                    intermediates += 1;
                }
            }
            WheelEvent::Resize => {}
            WheelEvent::Key(k) => {
                assert_eq!(app.on_key(k, now), Flow::Continue);
            }
        }
        runner.clock().advance(Duration::from_millis(33));
        if app.last_result.is_some() {
            break;
        }
    }

    assert_eq!(app.engine.category(), Some(Category::Tercero));
    assert_eq!(app.engine.state(), SpinState::Idle);
    assert_eq!(app.state, AppState::Wheel);
    assert_eq!(app.last_result, Some(7));
    assert!(intermediates > 0, "numbers should flash while spinning");

    let rotation = app.engine.cumulative_rotation();
    assert_eq!(rotation, -(4.0 * 360.0 + 7.0 * 36.0 + 18.0));
    assert_eq!(segment_at(rotation), 7);
    assert_eq!(app.animator.displayed_angle(), rotation);

    let view = app.presenter.view();
    assert_eq!(view.number, Some(7));
    assert!(!view.hint_visible);
    let outcome = app.presenter.final_outcome().expect("final envelope");
    assert!(outcome.found);
    assert_eq!(outcome.number, Some(7));
}

#[test]
fn headless_spin_without_level_is_refused() {
    let mut app = App::new(
        ScriptedSource::new(vec![1, 3]),
        ScriptedSource::new(vec![0]),
        MemoryAssetStore::with_all("jpg"),
        Settings::default(),
    );

    app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), Duration::ZERO);
    assert_eq!(app.state, AppState::Prompt);

    for frame in 1..=10u64 {
        app.on_frame(Duration::from_millis(frame * 33));
    }
    assert_eq!(app.engine.state(), SpinState::Idle);
    assert_eq!(app.engine.cumulative_rotation(), 0.0);
    assert_eq!(app.presenter.store().request_count(), 0);
    assert!(app.presenter.view().hint_visible);
}

#[test]
fn headless_back_to_back_spins_keep_turning_forward() {
    let mut app = App::new(
        ScriptedSource::new(vec![2, 3, 9, 7]),
        ScriptedSource::new(vec![0]),
        MemoryAssetStore::with_all("jpg"),
        Settings {
            duration_input: "abc".into(),
            level: Some(Category::Adultos),
            ..Settings::default()
        },
    );
    assert_eq!(app.effective_duration().as_secs_f64(), 4.0);

    let clock = ManualClock::new();
    let mut results = Vec::new();
    for _ in 0..2 {
        app.spin(clock.now()).unwrap();
        while app.engine.is_spinning() {
            clock.advance(Duration::from_millis(33));
            app.on_frame(clock.now());
        }
        results.push(app.last_result);
    }

    assert_eq!(results, vec![Some(2), Some(9)]);
    let first = 3.0 * 360.0 + 2.0 * 36.0 + 18.0;
    let second = 7.0 * 360.0 + 9.0 * 36.0 + 18.0;
    assert_eq!(app.engine.cumulative_rotation(), -(first + second));
    assert_eq!(segment_at(app.engine.cumulative_rotation()), 9);
}
