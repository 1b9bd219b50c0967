use std::path::Path;

use log::{debug, info, warn};

use crate::game::calibration::{BEAT_INTERVAL_S, Calibration, LEAD_IN_S, LISTEN_BEATS};
use crate::game::chart::{self, ChartData};
use crate::game::judgment::color_hint;
use crate::game::note::Note;
use crate::game::session::{Session, SessionOptions};
use crate::game::tempo::{TempoMap, scroll_multiplier};
use crate::settings;

/// Simulated audio-clock step for the headless driver.
const SIM_TICK_S: f32 = 1.0 / 240.0;
/// Hard cap (one simulated hour) so a malformed chart cannot spin the
/// driver forever.
const MAX_TICKS: u32 = 60 * 60 * 240;

/// Runs one chart through a session in autoplay and reports the summary.
/// With no arguments a built-in exercise chart is used; otherwise the first
/// argument is a chart JSON path and the optional second the difficulty.
/// `--calibrate` instead drives the offset calibration with a simulated
/// player.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).is_some_and(|a| a == "--calibrate") {
        run_calibration_demo();
        return Ok(());
    }
    let chart_data = match args.get(1) {
        Some(path) => chart::load_chart_data(Path::new(path), args.get(2).map(String::as_str))?,
        None => builtin_chart(),
    };

    let settings = settings::get();
    info!(
        "playing '{}': {} notes, scroll x{:.2}",
        chart_data.difficulty,
        chart_data.notes.len(),
        scroll_multiplier(
            settings.scroll_speed_for(settings.lane_count),
            chart_data.tempo.max_bpm(),
            900.0
        )
    );

    let mut session = Session::new(
        chart_data,
        SessionOptions {
            lane_count: settings.lane_count as usize,
            global_offset_s: settings.global_offset_seconds,
            autoplay: true,
            ..SessionOptions::default()
        },
    );

    let mut clock = 0.0f32;
    session.begin(clock);
    let mut reported = 0usize;
    for _ in 0..MAX_TICKS {
        if session.finished {
            break;
        }
        clock += SIM_TICK_S;
        session.tick(clock);
        for judgment in &session.judgments[reported..] {
            debug!(
                "{:>7.3}s lane {} {:?} [{}]",
                judgment.music_time_s,
                judgment.lane,
                judgment.grade,
                color_hint(judgment.grade)
            );
        }
        reported = session.judgments.len();
    }

    let summary = session.finish();
    info!("{summary}");
    Ok(())
}

/// Simulated tap tendency in seconds, cycled per beat. Slightly late with
/// jitter, the way a real player on uncalibrated audio taps.
const DEMO_TAP_ERRORS_S: [f32; 5] = [0.021, 0.017, 0.022, 0.016, 0.019];

/// Drives the calibration state machine end to end with a simulated player
/// and logs the offset a real run would hand to the settings layer.
fn run_calibration_demo() {
    let mut calibration = Calibration::begin(0.0);
    let mut clock = 0.0f32;
    let mut tapped = 0usize;
    while !calibration.is_complete() {
        clock += SIM_TICK_S;
        for cue in calibration.tick(clock) {
            if cue.index < LISTEN_BEATS {
                continue;
            }
            let ideal = LEAD_IN_S + cue.index as f32 * BEAT_INTERVAL_S;
            let error = DEMO_TAP_ERRORS_S[tapped % DEMO_TAP_ERRORS_S.len()];
            if calibration.tap(ideal + error).is_some() {
                tapped += 1;
            }
        }
    }
    match calibration.finish() {
        Ok(offset) => info!("calibration demo: {tapped} taps captured, offset {offset:+.3}s"),
        Err(e) => warn!("calibration demo captured nothing: {e}"),
    }
}

/// A short fixed chart exercising taps, holds, and a full stop.
fn builtin_chart() -> ChartData {
    let events = [(0.0, 150.0), (4.0, 0.0), (4.5, 150.0)];
    let notes = vec![
        Note::tap(0, 0.8),
        Note::tap(1, 1.2),
        Note::tap(2, 1.6),
        Note::hold(3, 2.0, 0.8),
        Note::tap(0, 3.2),
        Note::tap(3, 3.6),
        Note::hold(1, 5.0, 1.0),
        Note::tap(2, 5.4),
        Note::tap(0, 6.2),
    ];
    ChartData {
        difficulty: "Exercise".to_string(),
        offset_s: 0.0,
        tempo: TempoMap::from_events(&events, 150.0),
        notes,
    }
}
