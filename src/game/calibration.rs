use std::cmp::Ordering;
use std::fmt;

use log::{debug, info};
use smallvec::SmallVec;

/// Silence before the first metronome beat.
pub const LEAD_IN_S: f32 = 1.0;
pub const BEAT_INTERVAL_S: f32 = 0.5;
pub const TOTAL_BEATS: u32 = 20;
/// Beats at the start the player only listens to; taps during them are
/// rejected.
pub const LISTEN_BEATS: u32 = 4;
/// Taps farther than this from the beat's ideal time are discarded.
pub const ACCEPT_WINDOW_S: f32 = 0.25;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CalibrationPhase {
    Ready,
    BeatSequence,
    Complete,
}

/// A metronome click the collaborator should sound. Every fourth beat is
/// accented.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BeatCue {
    pub index: u32,
    pub accent: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CalibrationError {
    InsufficientData,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData => {
                write!(f, "calibration captured no usable taps; offset unchanged")
            }
        }
    }
}

impl std::error::Error for CalibrationError {}

/// Offset calibration as a plain state machine advanced by the gameplay
/// clock. The caller ticks it every frame, sounds the returned cues, feeds
/// taps in, and persists the finished median.
#[derive(Clone, Debug)]
pub struct Calibration {
    pub phase: CalibrationPhase,
    start_clock_s: f32,
    beats_cued: u32,
    samples: Vec<f32>,
}

impl Calibration {
    pub fn begin(now_s: f32) -> Self {
        info!("calibration started: {TOTAL_BEATS} beats at {BEAT_INTERVAL_S}s intervals");
        Self {
            phase: CalibrationPhase::Ready,
            start_clock_s: now_s,
            beats_cued: 0,
            samples: Vec::new(),
        }
    }

    #[inline(always)]
    fn ideal_beat_time(&self, index: u32) -> f32 {
        self.start_clock_s + LEAD_IN_S + index as f32 * BEAT_INTERVAL_S
    }

    /// Emits every cue whose ideal time has arrived (several after a stall)
    /// and advances the phase: Ready becomes BeatSequence on the first cue,
    /// BeatSequence becomes Complete one interval after the final beat.
    pub fn tick(&mut self, now_s: f32) -> SmallVec<[BeatCue; 4]> {
        let mut cues = SmallVec::new();
        if self.phase == CalibrationPhase::Complete {
            return cues;
        }
        while self.beats_cued < TOTAL_BEATS && now_s >= self.ideal_beat_time(self.beats_cued) {
            cues.push(BeatCue {
                index: self.beats_cued,
                accent: self.beats_cued % 4 == 3,
            });
            self.beats_cued += 1;
            self.phase = CalibrationPhase::BeatSequence;
        }
        if self.beats_cued == TOTAL_BEATS && now_s >= self.ideal_beat_time(TOTAL_BEATS) {
            self.phase = CalibrationPhase::Complete;
        }
        cues
    }

    /// Records one tap against the most recently cued beat. Returns the
    /// captured difference, or None when the tap was rejected (listen-only
    /// prefix, outside the acceptance window, or no beat cued yet).
    pub fn tap(&mut self, now_s: f32) -> Option<f32> {
        if self.phase != CalibrationPhase::BeatSequence || self.beats_cued == 0 {
            return None;
        }
        let last = self.beats_cued - 1;
        if last < LISTEN_BEATS {
            return None;
        }
        let diff = now_s - self.ideal_beat_time(last);
        if diff.abs() > ACCEPT_WINDOW_S {
            return None;
        }
        debug!("calibration tap on beat {last}: {:+.1} ms", diff * 1000.0);
        self.samples.push(diff);
        Some(diff)
    }

    #[inline(always)]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[inline(always)]
    pub fn is_complete(&self) -> bool {
        self.phase == CalibrationPhase::Complete
    }

    /// Median of the captured differences (mean of the middle pair when
    /// even), rounded to the nearest millisecond. Fails without samples;
    /// the stored offset must then stay untouched.
    pub fn finish(&self) -> Result<f32, CalibrationError> {
        if self.samples.is_empty() {
            return Err(CalibrationError::InsufficientData);
        }
        let mut sorted = self.samples.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) * 0.5
        };
        Ok((median * 1000.0).round() / 1000.0)
    }
}
