//! A headless timing and judgment core for lane-based rhythm games:
//! - stop-aware tempo maps (BPM 0 freezes scroll, never elapsed time)
//! - PERFECT/GREAT/GOOD windows with FAST/SLOW tags and passive misses
//! - tap and hold note life cycles with early-release drops
//! - max-score-normalized scoring, combo tracking, and rank tiers
//! - lane-based input dispatch for keys and pointer contacts
//! - metronome tap calibration for the stored global offset
//!
//! Everything is owned, synchronous state driven by the caller's audio
//! clock; rendering and audio output belong to collaborators reading the
//! session's public surface.

pub mod app;
pub mod game;
pub mod settings;

pub use game::calibration::{BeatCue, Calibration, CalibrationError};
pub use game::chart::{ChartData, load_chart_data};
pub use game::judgment::{JudgeGrade, Judgment, TimingProfile, TimingTag};
pub use game::note::{Note, NoteKind, NotePhase};
pub use game::session::{HitEffect, Session, SessionOptions};
pub use game::summary::{Rank, StageSummary};
pub use game::tempo::TempoMap;
