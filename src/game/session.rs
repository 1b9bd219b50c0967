use std::cmp::Ordering;

use log::{debug, info, trace};

use crate::game::chart::ChartData;
use crate::game::input::{InputSource, LANE_RATIOS_7, LaneLayout, PointerTracker};
use crate::game::judgment::{
    JudgeGrade, Judgment, TimingProfile, TimingTag, classify_offset_s,
};
use crate::game::note::{Note, NoteKind, NotePhase};
use crate::game::scoring::ScoreState;
use crate::game::summary::StageSummary;
use crate::game::tempo::TempoMap;

/// Silence between starting a session and music time zero.
pub const WAIT_START_LEAD_IN_S: f32 = 1.5;
/// Releasing a hold earlier than this before its tail is a drop.
pub const HOLD_RELEASE_TOLERANCE_S: f32 = 0.1;
pub const LANE_LIGHT_PRESS: f32 = 0.3;
pub const LANE_LIGHT_HOLDING: f32 = 0.2;
pub const LANE_LIGHT_DECAY: f32 = 0.05;
pub const HIT_EFFECT_LIFETIME_S: f32 = 0.3;
/// Tail silence after the last note before the session finishes.
pub const STAGE_END_GRACE_S: f32 = 2.0;

/// A judgment burst collaborators animate at the receptor row.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitEffect {
    pub lane: usize,
    pub grade: JudgeGrade,
    pub spawned_at_s: f32,
}

#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub profile: TimingProfile,
    pub lane_count: usize,
    pub global_offset_s: f32,
    pub autoplay: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            profile: TimingProfile::default(),
            lane_count: 4,
            global_offset_s: 0.0,
            autoplay: false,
        }
    }
}

/// One play-through of a chart. Owns every piece of gameplay state; the
/// driver feeds it the audio clock and raw-input edges, renderers read the
/// public surface each frame.
#[derive(Clone, Debug)]
pub struct Session {
    pub notes: Vec<Note>,
    pub tempo: TempoMap,
    pub profile: TimingProfile,
    pub score: ScoreState,
    pub layout: LaneLayout,
    pub lane_lights: Vec<f32>,
    pub hit_effects: Vec<HitEffect>,
    pub judgments: Vec<Judgment>,
    pub last_judgment: Option<Judgment>,
    pub autoplay: bool,
    pub stage_cleared: bool,
    pub finished: bool,
    lane_count: usize,
    lane_pressed: Vec<bool>,
    pointers: PointerTracker,
    chart_offset_s: f32,
    global_offset_s: f32,
    start_clock_s: Option<f32>,
    music_time_s: f32,
    last_note_end_s: f32,
}

impl Session {
    pub fn new(chart: ChartData, options: SessionOptions) -> Self {
        let lane_count = options.lane_count.max(chart.observed_lanes()).max(1);
        let mut notes = chart.notes;
        notes.sort_by(|a, b| a.time_s.partial_cmp(&b.time_s).unwrap_or(Ordering::Equal));
        let layout = if lane_count == LANE_RATIOS_7.len() {
            LaneLayout::weighted(&LANE_RATIOS_7)
        } else {
            LaneLayout::uniform(lane_count)
        };
        let score = ScoreState::new(&notes);
        let last_note_end_s = notes.iter().map(Note::end_time_s).fold(0.0f32, f32::max);

        Self {
            notes,
            tempo: chart.tempo,
            profile: options.profile,
            score,
            layout,
            lane_lights: vec![0.0; lane_count],
            hit_effects: Vec::new(),
            judgments: Vec::new(),
            last_judgment: None,
            autoplay: options.autoplay,
            stage_cleared: false,
            finished: false,
            lane_count,
            lane_pressed: vec![false; lane_count],
            pointers: PointerTracker::default(),
            chart_offset_s: chart.offset_s,
            global_offset_s: options.global_offset_s,
            start_clock_s: None,
            music_time_s: -WAIT_START_LEAD_IN_S,
            last_note_end_s,
        }
    }

    /// Anchors the music clock. Music time starts at the negative waiting
    /// lead-in and crosses zero when the song proper begins.
    pub fn begin(&mut self, now_s: f32) {
        self.start_clock_s = Some(now_s + WAIT_START_LEAD_IN_S - self.chart_offset_s);
        info!(
            "session started: {} notes, {} units, {} lanes",
            self.notes.len(),
            self.score.total_units,
            self.lane_count
        );
    }

    #[inline(always)]
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Music time as of the last tick.
    #[inline(always)]
    pub fn music_time(&self) -> f32 {
        self.music_time_s
    }

    /// Live offset adjustment mid-session; persisting it is the caller's
    /// business.
    pub fn set_global_offset(&mut self, offset_s: f32) {
        self.global_offset_s = offset_s;
    }

    #[inline(always)]
    fn music_time_at(&self, now_s: f32) -> Option<f32> {
        self.start_clock_s.map(|s| now_s - s - self.global_offset_s)
    }

    /// Scroll distance between the current music time and a note, for
    /// renderers placing it on the field.
    pub fn scroll_distance_to(&self, note: &Note) -> f32 {
        self.tempo.distance_at(note.time_s) - self.tempo.distance_at(self.music_time_s)
    }

    /// Per-frame update. Order matters: autoplay presses happen before the
    /// passive scans so an autoplayed hold never counts as missed.
    pub fn tick(&mut self, now_s: f32) {
        let Some(t) = self.music_time_at(now_s) else {
            return;
        };
        self.music_time_s = t;
        if self.finished {
            return;
        }
        trace!("music {t:.3}s, combo {}", self.score.combo);

        if self.autoplay {
            self.advance_autoplay(t);
        }
        self.apply_passive_misses(t);
        self.complete_due_holds(t);

        for light in &mut self.lane_lights {
            *light = (*light - LANE_LIGHT_DECAY).max(0.0);
        }
        for note in &self.notes {
            if note.is_holding() {
                let light = &mut self.lane_lights[note.lane];
                *light = light.max(LANE_LIGHT_HOLDING);
            }
        }
        self.hit_effects
            .retain(|e| t - e.spawned_at_s < HIT_EFFECT_LIFETIME_S);

        if !self.stage_cleared && self.notes.iter().all(Note::is_resolved) {
            self.stage_cleared = true;
            info!("stage cleared at {t:.3}s");
        }
        if t > self.last_note_end_s + STAGE_END_GRACE_S {
            self.finished = true;
            info!("session finished: score {}", self.score.display_score());
        }
    }

    /// A lane press. Grades the earliest pending note in the lane, or
    /// nothing when the press lands outside every window. Duplicate downs
    /// while the lane is already pressed are dropped.
    pub fn lane_down(&mut self, lane: usize, source: InputSource, now_s: f32) {
        if lane >= self.lane_count || self.lane_pressed[lane] {
            return;
        }
        self.lane_pressed[lane] = true;
        self.lane_lights[lane] = LANE_LIGHT_PRESS;
        let Some(t) = self.music_time_at(now_s) else {
            return;
        };
        if self.finished {
            return;
        }
        let Some(idx) = self
            .notes
            .iter()
            .position(|n| n.lane == lane && n.phase == NotePhase::Pending)
        else {
            return;
        };
        let offset = self.tempo.effective_offset(t, self.notes[idx].time_s);
        let Some((grade, tag)) = classify_offset_s(offset, &self.profile) else {
            // Outside every window: the press consumes nothing.
            debug!("{source:?} press on lane {lane} ignored ({offset:+.3}s out of range)");
            return;
        };
        self.notes[idx].phase = match self.notes[idx].kind {
            NoteKind::Hold { .. } => NotePhase::Held,
            NoteKind::Tap => NotePhase::Hit,
        };
        self.record_judgment(Judgment {
            grade,
            tag: Some(tag),
            offset_s: offset,
            music_time_s: t,
            lane,
        });
    }

    /// A lane release. Drops a held note released before its tolerance
    /// window; a release with no held note only clears the pressed flag.
    pub fn lane_up(&mut self, lane: usize, _source: InputSource, now_s: f32) {
        if lane >= self.lane_count {
            return;
        }
        self.lane_pressed[lane] = false;
        let Some(t) = self.music_time_at(now_s) else {
            return;
        };
        if self.finished {
            return;
        }
        let Some(idx) = self
            .notes
            .iter()
            .position(|n| n.lane == lane && n.phase == NotePhase::Held)
        else {
            return;
        };
        let end = self.notes[idx].end_time_s();
        if t < end - HOLD_RELEASE_TOLERANCE_S {
            self.notes[idx].phase = NotePhase::LetGo;
            self.record_judgment(Judgment {
                grade: JudgeGrade::Miss,
                tag: None,
                offset_s: t - end,
                music_time_s: t,
                lane,
            });
        }
        // Inside the tolerance the note stays held; completion fires on a
        // later tick.
    }

    /// A pointer contact. Resolves the lane from the normalized position,
    /// remembers the id, and dispatches the press. Contacts outside the
    /// field are dropped entirely.
    pub fn pointer_down(&mut self, id: u64, x_normalized: f32, now_s: f32) {
        let Some(lane) = self.layout.lane_at(x_normalized) else {
            return;
        };
        self.pointers.press(id, lane);
        self.lane_down(lane, InputSource::Pointer, now_s);
    }

    pub fn pointer_up(&mut self, id: u64, now_s: f32) {
        if let Some(lane) = self.pointers.release(id) {
            self.lane_up(lane, InputSource::Pointer, now_s);
        }
    }

    /// The finished-session report.
    pub fn finish(&self) -> StageSummary {
        StageSummary::from_score(&self.score)
    }

    fn advance_autoplay(&mut self, t: f32) {
        for i in 0..self.notes.len() {
            let note = self.notes[i];
            if note.phase != NotePhase::Pending {
                continue;
            }
            if self.tempo.effective_offset(t, note.time_s) > 0.0 {
                continue;
            }
            self.lane_lights[note.lane] = LANE_LIGHT_PRESS;
            self.notes[i].phase = match note.kind {
                NoteKind::Hold { .. } => NotePhase::Held,
                NoteKind::Tap => NotePhase::Hit,
            };
            self.record_judgment(Judgment {
                grade: JudgeGrade::Perfect,
                tag: None,
                offset_s: 0.0,
                music_time_s: t,
                lane: note.lane,
            });
        }
    }

    /// Notes whose stop-aware offset fell past the widest window are gone;
    /// no input can reach them anymore.
    fn apply_passive_misses(&mut self, t: f32) {
        for i in 0..self.notes.len() {
            let note = self.notes[i];
            if note.phase != NotePhase::Pending {
                continue;
            }
            let offset = self.tempo.effective_offset(t, note.time_s);
            if offset < -self.profile.good_s() {
                self.notes[i].phase = NotePhase::Missed;
                self.record_judgment(Judgment {
                    grade: JudgeGrade::Miss,
                    tag: None,
                    offset_s: offset,
                    music_time_s: t,
                    lane: note.lane,
                });
            }
        }
    }

    /// A note still held when the clock reaches its tail completes at full
    /// credit.
    fn complete_due_holds(&mut self, t: f32) {
        for i in 0..self.notes.len() {
            let note = self.notes[i];
            if note.phase != NotePhase::Held || t < note.end_time_s() {
                continue;
            }
            self.notes[i].phase = NotePhase::Completed;
            self.record_judgment(Judgment {
                grade: JudgeGrade::Perfect,
                tag: None,
                offset_s: 0.0,
                music_time_s: t,
                lane: note.lane,
            });
        }
    }

    fn record_judgment(&mut self, judgment: Judgment) {
        self.score.apply(judgment.grade);
        self.hit_effects.push(HitEffect {
            lane: judgment.lane,
            grade: judgment.grade,
            spawned_at_s: judgment.music_time_s,
        });
        let tag_label = match judgment.tag {
            Some(TimingTag::Fast) => " FAST",
            Some(TimingTag::Slow) => " SLOW",
            None => "",
        };
        debug!(
            "lane {}: {:?}{tag_label} ({:+.1} ms), combo {}",
            judgment.lane,
            judgment.grade,
            judgment.offset_s * 1000.0,
            self.score.combo
        );
        self.last_judgment = Some(judgment);
        self.judgments.push(judgment);
    }
}
