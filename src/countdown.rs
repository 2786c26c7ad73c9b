// Countdown timing against the wall clock.
// Remaining time derives from the elapsed interval since the run's epoch,
// never from frame count, so the displayed value is frame-rate independent.

use crate::types::{Severity, Timestamp, TimerReport, TimerSettings};

/// Classify remaining time into a severity bucket.
/// Boundary values belong to the more severe bucket.
pub fn classify(remaining_sec: u32, warn_at_sec: u32, panic_at_sec: u32) -> Severity {
    if remaining_sec <= panic_at_sec {
        Severity::Critical
    } else if remaining_sec <= warn_at_sec {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

/// Render whole seconds as MM:SS.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Countdown engine.
///
/// `remaining_sec` is recomputed on every tick as
/// `duration - floor(now - start_epoch)`; pausing freezes the value and
/// resuming re-derives the epoch from it, so a pause interval of any length
/// neither gains nor loses run time.
#[derive(Debug, Clone)]
pub struct CountdownEngine {
    settings: TimerSettings,
    remaining_sec: u32,
    running: bool,
    /// Wall-clock instant corresponding to `remaining == duration` for the
    /// current run. Recomputed whenever `running` flips to true.
    start_epoch: Option<Timestamp>,
    finish_emitted: bool,
}

impl CountdownEngine {
    pub fn new(settings: TimerSettings) -> Self {
        CountdownEngine {
            remaining_sec: settings.duration_sec,
            settings,
            running: false,
            start_epoch: None,
            finish_emitted: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_sec(&self) -> u32 {
        self.remaining_sec
    }

    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    /// Begin or resume the countdown. Returns false when already running or
    /// when the run is over (`remaining == 0`), both no-ops.
    pub fn start(&mut self, now: Timestamp) -> bool {
        if self.running || self.remaining_sec == 0 {
            return false;
        }
        let spent = self.settings.duration_sec.saturating_sub(self.remaining_sec);
        self.start_epoch = Some(now.minus_seconds(spent));
        self.running = true;
        self.finish_emitted = false;
        true
    }

    /// Freeze the countdown at its last computed value.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stop and restore `remaining` to a (possibly new) full duration.
    pub fn reset(&mut self, new_duration_sec: u32) {
        self.settings.duration_sec = new_duration_sec;
        self.remaining_sec = new_duration_sec;
        self.running = false;
        self.start_epoch = None;
        self.finish_emitted = false;
    }

    pub fn set_thresholds(&mut self, warn_at_sec: u32, panic_at_sec: u32) {
        self.settings.warn_at_sec = warn_at_sec;
        self.settings.panic_at_sec = panic_at_sec;
    }

    /// Change the total duration without discarding time already spent.
    ///
    /// While running this re-baselines the epoch so the displayed remaining
    /// time becomes `new_duration - elapsed_so_far`, clamped at zero; a
    /// shrink below the elapsed time completes the run.
    pub fn set_duration(&mut self, new_duration_sec: u32, now: Timestamp) -> TimerReport {
        let spent = self.settings.duration_sec.saturating_sub(self.remaining_sec);
        let prev_remaining = self.remaining_sec;
        self.settings.duration_sec = new_duration_sec;
        self.remaining_sec = new_duration_sec.saturating_sub(spent);

        let mut finished_now = false;
        if self.remaining_sec == 0 {
            if self.running && !self.finish_emitted {
                self.finish_emitted = true;
                finished_now = true;
            }
            self.running = false;
        } else if self.running {
            self.start_epoch = Some(now.minus_seconds(spent));
        }
        self.report(prev_remaining, finished_now)
    }

    /// Recompute remaining time from the wall clock. A no-op while paused or
    /// stopped: a callback that was already in flight when the engine was
    /// cancelled observes `running == false` and leaves state untouched.
    pub fn tick(&mut self, now: Timestamp) -> TimerReport {
        if !self.running {
            return self.report(self.remaining_sec, false);
        }
        let epoch = self.start_epoch.unwrap_or(now);
        let elapsed = now.seconds_since(epoch);
        let prev_remaining = self.remaining_sec;
        self.remaining_sec = self.settings.duration_sec.saturating_sub(elapsed);

        let mut finished_now = false;
        if self.remaining_sec == 0 {
            self.running = false;
            if !self.finish_emitted {
                self.finish_emitted = true;
                finished_now = true;
            }
        }
        self.report(prev_remaining, finished_now)
    }

    /// Current state without advancing time.
    pub fn snapshot(&self) -> TimerReport {
        self.report(self.remaining_sec, false)
    }

    fn report(&self, prev_remaining: u32, finished_now: bool) -> TimerReport {
        let remaining = self.remaining_sec;
        // A pulse marks the single integer-second transition onto a threshold;
        // sub-second ticks at the same value do not re-fire it.
        let pulse = remaining != prev_remaining
            && (remaining == self.settings.warn_at_sec
                || remaining == self.settings.panic_at_sec);
        TimerReport {
            remaining_sec: remaining,
            severity: classify(
                remaining,
                self.settings.warn_at_sec,
                self.settings.panic_at_sec,
            ),
            pulse,
            finished: finished_now,
            running: self.running,
            clock: format_clock(remaining),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn settings(duration: u32) -> TimerSettings {
        TimerSettings {
            duration_sec: duration,
            warn_at_sec: 60,
            panic_at_sec: 20,
        }
    }

    fn at_secs(s: u64) -> Timestamp {
        Timestamp::from_micros(s * 1_000_000)
    }

    #[test]
    fn classification_table() {
        assert_eq!(classify(61, 60, 20), Severity::Normal);
        assert_eq!(classify(60, 60, 20), Severity::Warning);
        assert_eq!(classify(21, 60, 20), Severity::Warning);
        assert_eq!(classify(20, 60, 20), Severity::Critical);
        assert_eq!(classify(0, 60, 20), Severity::Critical);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(3599), "59:59");
    }

    #[test]
    fn fresh_engine_holds_full_duration() {
        let engine = CountdownEngine::new(settings(300));
        assert_eq!(engine.remaining_sec(), 300);
        assert!(!engine.is_running());
    }

    #[test]
    fn start_then_immediate_sample_is_full_duration() {
        let mut engine = CountdownEngine::new(settings(300));
        assert!(engine.start(at_secs(10)));
        let report = engine.tick(at_secs(10));
        assert_eq!(report.remaining_sec, 300);
        assert!(report.running);
    }

    #[test]
    fn remaining_tracks_wall_clock_not_tick_count() {
        let mut engine = CountdownEngine::new(settings(300));
        engine.start(at_secs(0));
        // Many sub-second ticks within the same second leave the value alone.
        for us in [100_000u64, 250_000, 700_000, 999_999] {
            let report = engine.tick(Timestamp::from_micros(us));
            assert_eq!(report.remaining_sec, 300);
        }
        // One single tick after a long gap accounts for the whole gap.
        let report = engine.tick(at_secs(42));
        assert_eq!(report.remaining_sec, 258);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut engine = CountdownEngine::new(settings(300));
        engine.start(at_secs(0));
        assert_eq!(engine.tick(at_secs(5)).remaining_sec, 295);
        engine.pause();

        // Ticks while paused change nothing, no matter how much time passes.
        assert_eq!(engine.tick(at_secs(500)).remaining_sec, 295);
        assert_eq!(engine.tick(at_secs(9_000)).remaining_sec, 295);

        // Resuming much later continues from 295, not from where the wall
        // clock would have been.
        engine.start(at_secs(10_000));
        assert_eq!(engine.tick(at_secs(10_000)).remaining_sec, 295);
        assert_eq!(engine.tick(at_secs(10_003)).remaining_sec, 292);
    }

    #[test]
    fn finish_fires_exactly_once() {
        let mut engine = CountdownEngine::new(settings(3));
        engine.start(at_secs(0));
        assert!(!engine.tick(at_secs(2)).finished);
        let report = engine.tick(at_secs(3));
        assert!(report.finished);
        assert_eq!(report.remaining_sec, 0);
        assert!(!report.running);
        // Subsequent ticks never re-fire.
        assert!(!engine.tick(at_secs(4)).finished);
        assert!(!engine.tick(at_secs(100)).finished);
    }

    #[test]
    fn start_at_zero_is_a_no_op() {
        let mut engine = CountdownEngine::new(settings(1));
        engine.start(at_secs(0));
        engine.tick(at_secs(5));
        assert_eq!(engine.remaining_sec(), 0);
        assert!(!engine.start(at_secs(6)));
        assert!(!engine.is_running());
    }

    #[test]
    fn reset_restores_and_rearms_finish() {
        let mut engine = CountdownEngine::new(settings(2));
        engine.start(at_secs(0));
        assert!(engine.tick(at_secs(2)).finished);

        engine.reset(10);
        assert_eq!(engine.remaining_sec(), 10);
        assert!(!engine.is_running());

        engine.start(at_secs(100));
        let report = engine.tick(at_secs(110));
        assert!(report.finished, "finish fires again on the next run");
    }

    #[test]
    fn zero_duration_never_runs() {
        let mut engine = CountdownEngine::new(settings(0));
        assert!(!engine.start(at_secs(0)));
        let report = engine.tick(at_secs(1));
        assert_eq!(report.remaining_sec, 0);
        assert!(!report.finished);
    }

    #[test]
    fn pulse_on_threshold_crossing_only() {
        let mut engine = CountdownEngine::new(settings(62));
        engine.start(at_secs(0));
        assert!(!engine.tick(at_secs(1)).pulse); // 61
        assert!(engine.tick(at_secs(2)).pulse); // 60 == warn
        assert!(!engine.tick(Timestamp::from_micros(2_500_000)).pulse); // still 60
        assert!(!engine.tick(at_secs(3)).pulse); // 59
        assert!(engine.tick(at_secs(42)).pulse); // 20 == panic
        assert!(!engine.tick(at_secs(43)).pulse); // 19
    }

    #[test]
    fn shrink_duration_mid_run_rebaselines() {
        let mut engine = CountdownEngine::new(settings(300));
        engine.start(at_secs(0));
        engine.tick(at_secs(100)); // 200 left, 100 spent
        let report = engine.set_duration(150, at_secs(100));
        assert_eq!(report.remaining_sec, 50);
        assert!(report.running);
        assert_eq!(engine.tick(at_secs(110)).remaining_sec, 40);
    }

    #[test]
    fn grow_duration_mid_run_extends() {
        let mut engine = CountdownEngine::new(settings(60));
        engine.start(at_secs(0));
        engine.tick(at_secs(30)); // 30 spent
        let report = engine.set_duration(600, at_secs(30));
        assert_eq!(report.remaining_sec, 570);
        assert_eq!(engine.tick(at_secs(31)).remaining_sec, 569);
    }

    #[test]
    fn shrink_below_elapsed_completes_without_going_negative() {
        let mut engine = CountdownEngine::new(settings(300));
        engine.start(at_secs(0));
        engine.tick(at_secs(100)); // 100 spent
        let report = engine.set_duration(40, at_secs(100));
        assert_eq!(report.remaining_sec, 0);
        assert!(report.finished);
        assert!(!report.running);
        // The finish latch holds across later ticks.
        assert!(!engine.tick(at_secs(101)).finished);
    }

    #[test]
    fn stop_then_tick_leaves_remaining_untouched() {
        let mut engine = CountdownEngine::new(settings(120));
        engine.start(at_secs(0));
        engine.tick(at_secs(7));
        engine.pause();
        let before = engine.remaining_sec();
        // A stale callback that was already scheduled when the engine was
        // paused must not apply an update.
        let report = engine.tick(at_secs(8));
        assert_eq!(report.remaining_sec, before);
        assert_eq!(engine.remaining_sec(), before);
    }

    proptest! {
        #[test]
        fn remaining_never_escapes_bounds(
            duration in 0u32..=7_200,
            start_us in 0u64..=1_000_000_000,
            elapsed_us in 0u64..=100_000_000_000,
        ) {
            let mut engine = CountdownEngine::new(settings(duration));
            engine.start(Timestamp::from_micros(start_us));
            let report = engine.tick(Timestamp::from_micros(start_us + elapsed_us));
            prop_assert!(report.remaining_sec <= duration);
        }

        #[test]
        fn start_samples_full_duration(
            duration in 1u32..=7_200,
            start_us in 0u64..=1_000_000_000,
        ) {
            let mut engine = CountdownEngine::new(settings(duration));
            let t0 = Timestamp::from_micros(start_us);
            engine.start(t0);
            prop_assert_eq!(engine.tick(t0).remaining_sec, duration);
        }

        #[test]
        fn pause_resume_is_additive(
            duration in 10u32..=3_600,
            first_run in 0u32..=9,
            gap_secs in 1u64..=1_000_000,
            second_run in 0u32..=9,
        ) {
            let mut engine = CountdownEngine::new(settings(duration));
            engine.start(at_secs(0));
            engine.tick(at_secs(u64::from(first_run)));
            engine.pause();

            let resume_at = u64::from(first_run) + gap_secs;
            engine.start(at_secs(resume_at));
            let report = engine.tick(at_secs(resume_at + u64::from(second_run)));

            // Only the running intervals count; the gap is invisible.
            prop_assert_eq!(
                report.remaining_sec,
                duration.saturating_sub(first_run + second_run)
            );
        }

        #[test]
        fn finish_count_is_one_per_run(
            duration in 1u32..=60,
            overshoot_ticks in 1usize..=20,
        ) {
            let mut engine = CountdownEngine::new(settings(duration));
            engine.start(at_secs(0));
            let mut finishes = 0;
            for i in 0..overshoot_ticks {
                let t = u64::from(duration) + i as u64;
                if engine.tick(at_secs(t)).finished {
                    finishes += 1;
                }
            }
            prop_assert_eq!(finishes, 1);
        }

        #[test]
        fn severity_matches_bucket_definition(
            remaining in 0u32..=10_000,
            panic_at in 0u32..=100,
            warn_margin in 0u32..=100,
        ) {
            let warn_at = panic_at + warn_margin;
            let severity = classify(remaining, warn_at, panic_at);
            if remaining <= panic_at {
                prop_assert_eq!(severity, Severity::Critical);
            } else if remaining <= warn_at {
                prop_assert_eq!(severity, Severity::Warning);
            } else {
                prop_assert_eq!(severity, Severity::Normal);
            }
        }
    }
}
