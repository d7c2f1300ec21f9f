use crate::config::{Difficulty, Mode};
use crate::error::SessionError;
use crate::metrics::Metrics;
use std::cell::RefCell;
use std::rc::Rc;

/// Correctness of one character of the text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Unset,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// text loaded, waiting for the first printable key
    Idle,
    Active,
    Finished,
    /// no text could be loaded; only a restart can leave this
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockReading {
    Remaining(u32),
    Elapsed(u32),
}

impl ClockReading {
    pub fn seconds(&self) -> u32 {
        match *self {
            ClockReading::Remaining(s) | ClockReading::Elapsed(s) => s,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinalReport {
    pub wpm: u32,
    pub accuracy: u32,
    pub typed_count: u32,
    pub error_count: u32,
    pub is_new_record: bool,
    pub personal_best: u32,
}

/// Everything a renderer needs to draw one frame
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub text: Vec<char>,
    pub verdicts: Vec<Verdict>,
    pub cursor: usize,
    pub metrics: Metrics,
    pub clock: ClockReading,
    pub phase: Phase,
    pub difficulty: Difficulty,
    pub mode: Mode,
    pub personal_best: u32,
    pub focus_lost: bool,
    pub report: Option<FinalReport>,
    pub error: Option<SessionError>,
}

/// Write-only sink for session state
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot);
}

/// Keeps every frame it is given; clones share the log
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Rc<RefCell<Vec<Snapshot>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.borrow().is_empty()
    }

    pub fn last(&self) -> Option<Snapshot> {
        self.frames.borrow().last().cloned()
    }

    pub fn reports(&self) -> Vec<FinalReport> {
        self.frames
            .borrow()
            .iter()
            .filter_map(|frame| frame.report)
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, snapshot: &Snapshot) {
        self.frames.borrow_mut().push(snapshot.clone());
    }
}
