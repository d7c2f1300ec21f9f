use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tapt::clock::SystemClock;
use tapt::config::{Difficulty, Mode};
use tapt::keymap::{command_for, Command};
use tapt::passages::{Passage, PassagePool};
use tapt::render::{Phase, RecordingRenderer};
use tapt::runtime::{AppEvent, FixedTicker, Runner, TestEventSource, ThreadScheduler};
use tapt::session::{Collaborators, SessionConfig, TypingSession};
use tapt::store::MemoryResultStore;

// Headless integration using the internal runtime without a TTY: keys go
// through the same channel the tick thread posts to.
fn session_with(
    text: &str,
    mode: Mode,
    secs: u32,
    tx: mpsc::Sender<AppEvent>,
) -> (TypingSession, RecordingRenderer, MemoryResultStore) {
    let renderer = RecordingRenderer::new();
    let store = MemoryResultStore::default();
    let pool = PassagePool::default().with_passages(
        Difficulty::Medium,
        vec![Passage {
            text: text.to_string(),
        }],
    );
    let session = TypingSession::new(
        SessionConfig {
            difficulty: Difficulty::Medium,
            mode,
            timed_duration_secs: secs,
        },
        Collaborators {
            provider: Box::new(pool),
            store: Box::new(store.clone()),
            scheduler: Box::new(ThreadScheduler::new(tx)),
            clock: Box::new(SystemClock),
            renderer: Box::new(renderer.clone()),
        },
    );
    (session, renderer, store)
}

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn dispatch(session: &mut TypingSession, event: AppEvent) -> bool {
    match event {
        AppEvent::Tick(id) => session.tick(id),
        AppEvent::Resize => session.refresh(),
        AppEvent::FocusGained => session.focus_changed(true),
        AppEvent::FocusLost => session.focus_changed(false),
        AppEvent::Key(key) => match command_for(key) {
            Some(Command::Quit) => return false,
            Some(Command::SetDifficulty(d)) => session.set_difficulty(d),
            Some(Command::ToggleMode) => {
                let mode = session.config().mode.toggled();
                session.set_mode(mode)
            }
            Some(Command::Type(k)) => session.apply_keystroke(k),
            None => {}
        },
    }
    true
}

#[test]
fn headless_passage_flow_completes() {
    let (tx, rx) = mpsc::channel();
    let (mut session, renderer, _store) = session_with("hi", Mode::Passage, 60, tx.clone());

    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key('h')).unwrap();
    tx.send(key('i')).unwrap();

    for _ in 0..100u32 {
        if let Some(event) = runner.step() {
            dispatch(&mut session, event);
        }
        if session.phase() == Phase::Finished {
            break;
        }
    }

    assert_eq!(session.phase(), Phase::Finished, "passage should finish");
    let reports = renderer.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].typed_count, 2);
    assert_eq!(reports[0].accuracy, 100);
}

#[test]
fn headless_timed_session_finishes_by_time() {
    let (tx, rx) = mpsc::channel();
    let (mut session, renderer, _store) =
        session_with("a long passage nobody finishes", Mode::Timed, 1, tx.clone());

    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(20)),
    );

    tx.send(key('a')).unwrap();

    // one real-time tick of a second ends a one second countdown
    for _ in 0..200u32 {
        if let Some(event) = runner.step() {
            dispatch(&mut session, event);
        }
        if session.phase() == Phase::Finished {
            break;
        }
    }

    assert_eq!(
        session.phase(),
        Phase::Finished,
        "timed session should finish by timeout"
    );
    assert_eq!(renderer.reports().len(), 1);

    // the tick thread was cancelled: nothing else arrives
    let frames = renderer.len();
    std::thread::sleep(Duration::from_millis(1_200));
    while let Some(event) = runner.step() {
        dispatch(&mut session, event);
    }
    assert_eq!(renderer.len(), frames);
}

#[test]
fn headless_quit_and_restart_keys() {
    let (tx, _rx) = mpsc::channel();
    let (mut session, _renderer, _store) = session_with("hello", Mode::Passage, 60, tx);

    assert!(dispatch(&mut session, key('h')));
    assert_eq!(session.phase(), Phase::Active);

    let esc = AppEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    assert!(dispatch(&mut session, esc));
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.typed_count(), 0);

    let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(!dispatch(&mut session, ctrl_c));
}
