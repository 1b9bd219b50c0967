use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::game::note::Note;
use crate::game::tempo::TempoMap;

/// One tempo change as the converter pipeline writes it. A stop is a pair
/// of events: BPM 0 at the stop, the resumed BPM at its end.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct BpmEventDef {
    pub time: f32,
    pub bpm: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct NoteDef {
    pub time: f32,
    pub lane: usize,
    /// Zero or absent for taps; hold length in seconds otherwise.
    #[serde(default)]
    pub duration: f32,
}

/// A chart file as produced by the simfile converters: top-level tempo
/// metadata plus one array of notes per difficulty name.
#[derive(Clone, Debug, Deserialize)]
pub struct ChartFile {
    #[serde(default)]
    pub bpm: f32,
    #[serde(default)]
    pub offset: f32,
    #[serde(default, rename = "bpmEvents")]
    pub bpm_events: Vec<BpmEventDef>,
    // Difficulty arrays keep their author-chosen names, so they arrive as
    // leftover keys. Values that fail to parse as note lists are skipped.
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl ChartFile {
    /// Difficulty names whose values are arrays, in sorted order.
    pub fn difficulty_names(&self) -> Vec<&str> {
        self.extra
            .iter()
            .filter(|(_, v)| v.is_array())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Note definitions for the requested difficulty, or the first playable
    /// one when the request is absent or unknown.
    pub fn notes_for(&self, requested: Option<&str>) -> (String, Vec<NoteDef>) {
        if let Some(name) = requested
            && let Some(value) = self.extra.get(name)
            && let Ok(defs) = serde_json::from_value::<Vec<NoteDef>>(value.clone())
        {
            return (name.to_string(), defs);
        }
        for (name, value) in &self.extra {
            if let Ok(defs) = serde_json::from_value::<Vec<NoteDef>>(value.clone()) {
                if let Some(missing) = requested {
                    warn!("difficulty '{missing}' not found, falling back to '{name}'");
                }
                return (name.clone(), defs);
            }
        }
        warn!("chart has no playable difficulty");
        (String::new(), Vec::new())
    }

    /// Resolves the file into playable data. Tempo problems never fail:
    /// missing or malformed events degrade to a single-event map at the
    /// chart BPM (or the global fallback).
    pub fn into_chart_data(self, requested: Option<&str>) -> ChartData {
        let (difficulty, defs) = self.notes_for(requested);
        let pairs: Vec<(f32, f32)> = self.bpm_events.iter().map(|e| (e.time, e.bpm)).collect();
        let tempo = TempoMap::from_events(&pairs, self.bpm);

        let mut notes: Vec<Note> = defs
            .iter()
            .map(|d| {
                if d.duration > 0.0 {
                    Note::hold(d.lane, d.time, d.duration)
                } else {
                    Note::tap(d.lane, d.time)
                }
            })
            .collect();
        notes.sort_by(|a, b| a.time_s.partial_cmp(&b.time_s).unwrap_or(Ordering::Equal));

        ChartData {
            difficulty,
            offset_s: self.offset,
            tempo,
            notes,
        }
    }
}

/// A chart resolved to one difficulty, ready to hand to a session.
#[derive(Clone, Debug)]
pub struct ChartData {
    pub difficulty: String,
    pub offset_s: f32,
    pub tempo: TempoMap,
    pub notes: Vec<Note>,
}

impl ChartData {
    /// Highest lane index used plus one; sessions widen to it when the
    /// configured lane count is smaller.
    pub fn observed_lanes(&self) -> usize {
        self.notes.iter().map(|n| n.lane + 1).max().unwrap_or(0)
    }
}

/// Reads and resolves a chart file from disk.
pub fn load_chart_data(
    path: &Path,
    difficulty: Option<&str>,
) -> Result<ChartData, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let file: ChartFile = serde_json::from_str(&text)?;
    Ok(file.into_chart_data(difficulty))
}

#[cfg(test)]
mod tests {
    use super::ChartFile;
    use crate::game::note::NoteKind;
    use crate::game::tempo::FALLBACK_BPM;

    const CONVERTER_JSON: &str = r#"{
        "bpm": 174.0,
        "offset": 0.009,
        "bpmEvents": [
            { "time": 0.0, "bpm": 174.0 },
            { "time": 8.0, "bpm": 0.0 },
            { "time": 9.0, "bpm": 174.0 }
        ],
        "Easy": [
            { "time": 2.0, "lane": 1 },
            { "time": 1.0, "lane": 0 },
            { "time": 3.0, "lane": 2, "duration": 1.5 }
        ],
        "Hard": [
            { "time": 0.5, "lane": 3, "duration": 0 }
        ]
    }"#;

    #[test]
    fn converter_output_parses_with_sorted_notes_and_hold_kinds() {
        let file: ChartFile = serde_json::from_str(CONVERTER_JSON).expect("valid chart JSON");
        assert_eq!(file.difficulty_names(), vec!["Easy", "Hard"]);

        let data = file.into_chart_data(Some("Easy"));
        assert_eq!(data.difficulty, "Easy");
        assert!((data.offset_s - 0.009).abs() < 1e-6);
        assert_eq!(data.notes.len(), 3);
        assert!(
            (data.notes[0].time_s - 1.0).abs() < f32::EPSILON,
            "notes must come out time-sorted"
        );
        assert!(
            matches!(data.notes[2].kind, NoteKind::Hold { duration_s } if (duration_s - 1.5).abs() < f32::EPSILON)
        );
        assert_eq!(data.tempo.events().len(), 3);
        assert_eq!(data.observed_lanes(), 3);
    }

    #[test]
    fn zero_duration_notes_are_taps() {
        let file: ChartFile = serde_json::from_str(CONVERTER_JSON).expect("valid chart JSON");
        let data = file.into_chart_data(Some("Hard"));
        assert_eq!(data.notes.len(), 1);
        assert!(matches!(data.notes[0].kind, NoteKind::Tap));
    }

    #[test]
    fn unknown_difficulties_fall_back_to_the_first_playable_one() {
        let file: ChartFile = serde_json::from_str(CONVERTER_JSON).expect("valid chart JSON");
        let (name, defs) = file.notes_for(Some("Expert"));
        assert_eq!(name, "Easy");
        assert_eq!(defs.len(), 3);
    }

    #[test]
    fn missing_tempo_events_degrade_to_the_chart_bpm() {
        let json = r#"{ "bpm": 128.0, "Normal": [ { "time": 1.0, "lane": 0 } ] }"#;
        let file: ChartFile = serde_json::from_str(json).expect("valid chart JSON");
        let data = file.into_chart_data(None);
        assert_eq!(data.tempo.events().len(), 1);
        assert!((data.tempo.events()[0].bpm - 128.0).abs() < f32::EPSILON);
        assert!((data.offset_s).abs() < f32::EPSILON, "offset defaults to 0");
    }

    #[test]
    fn charts_without_any_bpm_use_the_global_fallback() {
        let json = r#"{ "Normal": [ { "time": 1.0, "lane": 0 } ] }"#;
        let file: ChartFile = serde_json::from_str(json).expect("valid chart JSON");
        let data = file.into_chart_data(None);
        assert!((data.tempo.events()[0].bpm - FALLBACK_BPM).abs() < f32::EPSILON);
    }

    #[test]
    fn non_note_extras_are_skipped_when_picking_a_difficulty() {
        let json = r#"{
            "bpm": 150.0,
            "artist": "someone",
            "Normal": [ { "time": 1.0, "lane": 0 } ]
        }"#;
        let file: ChartFile = serde_json::from_str(json).expect("valid chart JSON");
        assert_eq!(file.difficulty_names(), vec!["Normal"]);
        let (name, defs) = file.notes_for(None);
        assert_eq!(name, "Normal");
        assert_eq!(defs.len(), 1);
    }
}
