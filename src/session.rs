use crate::clock::Clock;
use crate::config::{Config, Difficulty, Mode};
use crate::error::SessionError;
use crate::keymap::Keystroke;
use crate::metrics::{self, Metrics};
use crate::passages::TextProvider;
use crate::render::{ClockReading, FinalReport, Phase, Renderer, Snapshot, Verdict};
use crate::runtime::{TickHandle, TickId, TickScheduler};
use crate::store::ResultStore;
use std::time::Duration;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub mode: Mode,
    pub timed_duration_secs: u32,
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            difficulty: cfg.difficulty,
            mode: cfg.mode,
            // a zero-length countdown would end on the first tick
            timed_duration_secs: cfg.timed_duration_secs.max(1),
        }
    }
}

/// Everything the session talks to
pub struct Collaborators {
    pub provider: Box<dyn TextProvider>,
    pub store: Box<dyn ResultStore>,
    pub scheduler: Box<dyn TickScheduler>,
    pub clock: Box<dyn Clock>,
    pub renderer: Box<dyn Renderer>,
}

/// State machine for one typing test: Idle -> Active -> Finished -> Idle
pub struct TypingSession {
    config: SessionConfig,
    deps: Collaborators,
    text: Vec<char>,
    input: Vec<char>,
    verdicts: Vec<Verdict>,
    phase: Phase,
    timer_secs: u32,
    started_at_ms: Option<u64>,
    typed_count: u32,
    error_count: u32,
    personal_best: u32,
    tick: Option<TickHandle>,
    focus_lost: bool,
    report: Option<FinalReport>,
    error: Option<SessionError>,
}

impl TypingSession {
    /// Reads the personal best once and loads the first text.
    pub fn new(config: SessionConfig, deps: Collaborators) -> Self {
        let personal_best = deps.store.best();
        let mut session = Self {
            config,
            deps,
            text: Vec::new(),
            input: Vec::new(),
            verdicts: Vec::new(),
            phase: Phase::Idle,
            timer_secs: 0,
            started_at_ms: None,
            typed_count: 0,
            error_count: 0,
            personal_best,
            tick: None,
            focus_lost: false,
            report: None,
            error: None,
        };
        // a failure leaves the session Unavailable and is shown by the renderer
        let _ = session.reset(false);
        session
    }

    /// Loads a new text. Without `preserve_stats` the whole test starts over.
    pub fn reset(&mut self, preserve_stats: bool) -> Result<(), SessionError> {
        if !preserve_stats {
            self.stop_ticking();
            self.phase = Phase::Idle;
            self.timer_secs = self.initial_timer();
            self.started_at_ms = None;
            self.typed_count = 0;
            self.error_count = 0;
            self.focus_lost = false;
            self.report = None;
        }

        self.input.clear();
        let result = match self.deps.provider.random_text(self.config.difficulty) {
            Ok(text) => {
                self.text = text.chars().collect();
                self.verdicts = vec![Verdict::Unset; self.text.len()];
                self.error = None;
                if self.phase == Phase::Unavailable {
                    self.phase = Phase::Idle;
                }
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, difficulty = %self.config.difficulty, "cannot load text");
                self.stop_ticking();
                self.phase = Phase::Unavailable;
                self.text.clear();
                self.verdicts.clear();
                self.error = Some(err.clone());
                Err(err)
            }
        };

        self.render();
        result
    }

    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Active;
        self.started_at_ms = Some(self.deps.clock.now_ms());
        self.timer_secs = self.initial_timer();
        self.tick = Some(self.deps.scheduler.schedule(TICK_PERIOD));
        tracing::info!(
            mode = %self.config.mode,
            difficulty = %self.config.difficulty,
            "test started"
        );
        self.render();
    }

    /// One second passed. Ticks from a cancelled or replaced handle do nothing.
    pub fn tick(&mut self, id: TickId) {
        let live = self.tick.as_ref().map(TickHandle::id);
        if self.phase != Phase::Active || live != Some(id) {
            tracing::debug!(?id, ?live, "ignoring stale tick");
            return;
        }

        match self.config.mode {
            Mode::Timed => {
                self.timer_secs = self.timer_secs.saturating_sub(1);
                if self.timer_secs == 0 {
                    self.finish();
                    return;
                }
            }
            Mode::Passage => self.timer_secs += 1,
        }
        self.render();
    }

    pub fn apply_keystroke(&mut self, key: Keystroke) {
        match key {
            Keystroke::Restart => {
                let _ = self.reset(false);
                return;
            }
            Keystroke::Other => return,
            Keystroke::Char(_) | Keystroke::Backspace => {}
        }

        match (self.phase, key) {
            (Phase::Active, _) => {}
            (Phase::Idle, Keystroke::Char(_)) => self.start(),
            _ => return,
        }

        match key {
            Keystroke::Backspace => {
                if self.input.pop().is_some() {
                    self.verdicts[self.input.len()] = Verdict::Unset;
                }
            }
            Keystroke::Char(c) => {
                let idx = self.input.len();
                if idx < self.text.len() {
                    let verdict = if c == self.text[idx] {
                        Verdict::Correct
                    } else {
                        self.error_count += 1;
                        Verdict::Incorrect
                    };
                    self.verdicts[idx] = verdict;
                    self.input.push(c);
                    self.typed_count += 1;
                }

                if self.input.len() == self.text.len() {
                    match self.config.mode {
                        Mode::Passage => self.finish(),
                        Mode::Timed => {
                            let _ = self.reset(true);
                        }
                    }
                    return;
                }
            }
            Keystroke::Restart | Keystroke::Other => {}
        }

        self.render();
    }

    /// Stops the clock, settles the personal best and publishes the report.
    pub fn finish(&mut self) {
        if self.phase != Phase::Active {
            return;
        }
        self.stop_ticking();
        self.phase = Phase::Finished;
        self.focus_lost = false;

        let metrics = self.compute_metrics();
        let is_new_record = metrics.wpm > self.personal_best;
        if is_new_record {
            tracing::info!(wpm = metrics.wpm, previous = self.personal_best, "new personal best");
            self.personal_best = metrics.wpm;
            if let Err(err) = self.deps.store.set_best(metrics.wpm) {
                tracing::warn!(%err, "failed to persist personal best");
            }
        }

        let report = FinalReport {
            wpm: metrics.wpm,
            accuracy: metrics.accuracy,
            typed_count: self.typed_count,
            error_count: self.error_count,
            is_new_record,
            personal_best: self.personal_best,
        };
        tracing::info!(?report, "test finished");
        self.report = Some(report);
        self.render();
    }

    pub fn compute_metrics(&self) -> Metrics {
        let elapsed_secs = self.started_at_ms.map(|started| {
            self.deps.clock.now_ms().saturating_sub(started) as f64 / 1000.0
        });
        metrics::compute(self.typed_count, self.error_count, elapsed_secs)
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
        let _ = self.reset(false);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.config.mode = mode;
        let _ = self.reset(false);
    }

    /// Focus loss is reported while a test runs; timing carries on regardless.
    pub fn focus_changed(&mut self, focused: bool) {
        let focus_lost = !focused && self.phase == Phase::Active;
        if focus_lost != self.focus_lost {
            self.focus_lost = focus_lost;
            self.render();
        }
    }

    /// Redraw without a state change (terminal resize).
    pub fn refresh(&mut self) {
        self.render();
    }

    pub fn snapshot(&self) -> Snapshot {
        let metrics = match self.report {
            Some(report) => Metrics {
                wpm: report.wpm,
                accuracy: report.accuracy,
            },
            None => self.compute_metrics(),
        };
        let clock = match self.config.mode {
            Mode::Timed => ClockReading::Remaining(self.timer_secs),
            Mode::Passage => ClockReading::Elapsed(self.timer_secs),
        };

        Snapshot {
            text: self.text.clone(),
            verdicts: self.verdicts.clone(),
            cursor: self.input.len(),
            metrics,
            clock,
            phase: self.phase,
            difficulty: self.config.difficulty,
            mode: self.config.mode,
            personal_best: self.personal_best,
            focus_lost: self.focus_lost,
            report: self.report,
            error: self.error.clone(),
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    pub fn cursor(&self) -> usize {
        self.input.len()
    }

    pub fn typed_count(&self) -> u32 {
        self.typed_count
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn timer_secs(&self) -> u32 {
        self.timer_secs
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn personal_best(&self) -> u32 {
        self.personal_best
    }

    pub fn report(&self) -> Option<FinalReport> {
        self.report
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    fn initial_timer(&self) -> u32 {
        match self.config.mode {
            Mode::Timed => self.config.timed_duration_secs,
            Mode::Passage => 0,
        }
    }

    fn stop_ticking(&mut self) {
        if let Some(handle) = self.tick.take() {
            handle.cancel();
        }
    }

    fn render(&mut self) {
        let snapshot = self.snapshot();
        self.deps.renderer.render(&snapshot);
    }
}

impl Drop for TypingSession {
    fn drop(&mut self) {
        self.stop_ticking();
    }
}
