/// Characters per word for WPM.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Below this many seconds the sample is too small to report a rate.
pub const MIN_ELAPSED_SECS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub wpm: u32,
    pub accuracy: u32,
}

impl Metrics {
    pub const EMPTY: Metrics = Metrics {
        wpm: 0,
        accuracy: 100,
    };
}

impl Default for Metrics {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Live and final metrics. `elapsed_secs` is `None` before the session started.
pub fn compute(typed_count: u32, error_count: u32, elapsed_secs: Option<f64>) -> Metrics {
    let elapsed_secs = match elapsed_secs {
        Some(secs) if secs > MIN_ELAPSED_SECS => secs,
        _ => return Metrics::EMPTY,
    };

    Metrics {
        wpm: wpm(typed_count, elapsed_secs),
        accuracy: accuracy(typed_count, error_count),
    }
}

pub fn wpm(typed_count: u32, elapsed_secs: f64) -> u32 {
    let minutes = elapsed_secs / 60.0;
    let rate = (typed_count as f64 / CHARS_PER_WORD) / minutes;
    if rate.is_finite() && rate > 0.0 {
        rate.round() as u32
    } else {
        0
    }
}

/// Share of committed keystrokes that matched, as a whole percentage.
pub fn accuracy(typed_count: u32, error_count: u32) -> u32 {
    if typed_count == 0 {
        return 100;
    }
    let correct = typed_count.saturating_sub(error_count);
    ((correct as f64 / typed_count as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_with_nothing_typed_is_perfect() {
        assert_eq!(accuracy(0, 0), 100);
    }

    #[test]
    fn accuracy_rounds_to_nearest() {
        assert_eq!(accuracy(3, 1), 67);
        assert_eq!(accuracy(3, 2), 33);
        assert_eq!(accuracy(8, 1), 88);
        assert_eq!(accuracy(1000, 1), 100);
        assert_eq!(accuracy(4, 4), 0);
    }

    #[test]
    fn accuracy_never_increases_with_more_errors() {
        for typed in 0..60u32 {
            let mut previous = accuracy(typed, 0);
            for errors in 1..=typed {
                let current = accuracy(typed, errors);
                assert!(
                    current <= previous,
                    "accuracy({typed}, {errors}) = {current} > {previous}"
                );
                assert!(current <= 100);
                previous = current;
            }
        }
    }

    #[test]
    fn compute_without_start_is_empty() {
        assert_eq!(compute(0, 0, None), Metrics::EMPTY);
        assert_eq!(compute(12, 3, None), Metrics::EMPTY);
    }

    #[test]
    fn compute_within_first_tenth_of_a_second_is_empty() {
        assert_eq!(compute(3, 1, Some(0.1)), Metrics::EMPTY);
        assert_eq!(compute(3, 1, Some(0.0)), Metrics::EMPTY);
    }

    #[test]
    fn three_correct_chars_in_six_seconds() {
        let metrics = compute(3, 0, Some(6.0));
        assert_eq!(metrics, Metrics { wpm: 6, accuracy: 100 });
    }

    #[test]
    fn three_chars_one_wrong_in_a_minute() {
        let metrics = compute(3, 1, Some(60.0));
        assert_eq!(metrics, Metrics { wpm: 1, accuracy: 67 });
    }

    #[test]
    fn wpm_uses_five_chars_per_word() {
        // 300 chars in one minute = 60 words
        assert_eq!(wpm(300, 60.0), 60);
        assert_eq!(wpm(300, 30.0), 120);
        assert_eq!(wpm(0, 30.0), 0);
    }

    #[test]
    fn default_metrics_match_empty() {
        assert_eq!(Metrics::default(), Metrics::EMPTY);
    }
}
