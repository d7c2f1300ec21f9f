use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Identifies the scheduled task a tick came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickId(pub u64);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    FocusGained,
    FocusLost,
    Tick(TickId),
}

/// Source of terminal events (keyboard, resize, focus, ticks)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(CtEvent::FocusGained) => AppEvent::FocusGained,
                Ok(CtEvent::FocusLost) => AppEvent::FocusLost,
                Ok(_) => continue,
                Err(err) => {
                    tracing::error!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if reader_tx.send(ev).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    /// Sender for other producers (tick threads) feeding the same loop
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the ticker interval; None when nothing arrived
    pub fn step(&self) -> Option<AppEvent> {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Cancellable token for a periodic tick
#[derive(Clone, Debug)]
pub struct TickHandle {
    id: TickId,
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    pub fn new(id: TickId) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> TickId {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Starts periodic ticks; every schedule call gets a fresh id
pub trait TickScheduler {
    fn schedule(&mut self, period: Duration) -> TickHandle;
}

/// One thread per schedule, posting `AppEvent::Tick` until cancelled
pub struct ThreadScheduler {
    tx: Sender<AppEvent>,
    next_id: u64,
}

impl ThreadScheduler {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self { tx, next_id: 0 }
    }
}

impl TickScheduler for ThreadScheduler {
    fn schedule(&mut self, period: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle::new(TickId(self.next_id));
        let thread_handle = handle.clone();
        let tx = self.tx.clone();

        std::thread::spawn(move || {
            let started = Instant::now();
            let mut n: u32 = 1;
            loop {
                // deadlines measured from the start so ticks do not drift
                let deadline = started + period * n;
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
                if thread_handle.is_cancelled()
                    || tx.send(AppEvent::Tick(thread_handle.id())).is_err()
                {
                    break;
                }
                n += 1;
            }
        });

        handle
    }
}

/// Records handles instead of spawning threads; ticks are delivered by hand
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    handles: Rc<RefCell<Vec<TickHandle>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<TickHandle> {
        self.handles.borrow().clone()
    }

    /// The most recent handle if it has not been cancelled
    pub fn live(&self) -> Option<TickId> {
        self.handles
            .borrow()
            .last()
            .filter(|h| !h.is_cancelled())
            .map(TickHandle::id)
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, _period: Duration) -> TickHandle {
        let mut handles = self.handles.borrow_mut();
        let handle = TickHandle::new(TickId(handles.len() as u64 + 1));
        handles.push(handle.clone());
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn step_returns_none_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        assert!(runner.step().is_none());
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        tx.send(AppEvent::Tick(TickId(3))).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        assert_matches!(runner.step(), Some(AppEvent::Resize));
        assert_matches!(runner.step(), Some(AppEvent::Tick(TickId(3))));
    }

    #[test]
    fn cancelled_handle_is_visible_through_clones() {
        let handle = TickHandle::new(TickId(1));
        let clone = handle.clone();
        assert!(!clone.is_cancelled());
        handle.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn thread_scheduler_ticks_until_cancelled() {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = ThreadScheduler::new(tx);
        let handle = scheduler.schedule(Duration::from_millis(5));

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_matches!(first, AppEvent::Tick(id) if id == handle.id());

        handle.cancel();
        // drain anything already in flight, then the channel goes quiet
        std::thread::sleep(Duration::from_millis(30));
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn thread_scheduler_hands_out_distinct_ids() {
        let (tx, _rx) = mpsc::channel();
        let mut scheduler = ThreadScheduler::new(tx);
        let a = scheduler.schedule(Duration::from_secs(60));
        let b = scheduler.schedule(Duration::from_secs(60));
        assert_ne!(a.id(), b.id());
        a.cancel();
        b.cancel();
    }

    #[test]
    fn manual_scheduler_tracks_live_handle() {
        let mut scheduler = ManualScheduler::new();
        assert_eq!(scheduler.live(), None);

        let handle = scheduler.schedule(Duration::from_secs(1));
        assert_eq!(scheduler.live(), Some(handle.id()));

        handle.cancel();
        assert_eq!(scheduler.live(), None);
        assert_eq!(scheduler.scheduled().len(), 1);
    }
}
