use std::collections::HashMap;

use crate::game::judgment::{JudgeGrade, grade_weight};
use crate::game::note::Note;

/// Ceiling of the display score.
pub const MAX_SCORE: f64 = 1_000_000.0;

/// Max-score-normalized tally. Every chart is worth the same total: the
/// ceiling split evenly across all units, with holds counting twice (press
/// and completion each award one unit share).
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreState {
    pub score: f64,
    pub combo: u32,
    pub max_combo: u32,
    pub counts: HashMap<JudgeGrade, u32>,
    pub total_units: u32,
    pub unit_score: f64,
}

impl ScoreState {
    pub fn new(notes: &[Note]) -> Self {
        let total_units: u32 = notes.iter().map(Note::units).sum();
        Self {
            score: 0.0,
            combo: 0,
            max_combo: 0,
            counts: HashMap::from_iter([
                (JudgeGrade::Perfect, 0),
                (JudgeGrade::Great, 0),
                (JudgeGrade::Good, 0),
                (JudgeGrade::Miss, 0),
            ]),
            total_units,
            unit_score: MAX_SCORE / f64::from(total_units.max(1)),
        }
    }

    /// Applies one graded unit: MISS zeroes the combo and awards nothing,
    /// every other grade extends the combo and adds its weighted unit share.
    /// The running score is clamped at the ceiling.
    pub fn apply(&mut self, grade: JudgeGrade) {
        *self.counts.entry(grade).or_insert(0) += 1;
        if grade == JudgeGrade::Miss {
            self.combo = 0;
            return;
        }
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.score = (self.score + self.unit_score * grade_weight(grade)).min(MAX_SCORE);
    }

    #[inline(always)]
    pub fn count(&self, grade: JudgeGrade) -> u32 {
        self.counts.get(&grade).copied().unwrap_or(0)
    }

    /// Rounded integral score for presentation.
    #[inline(always)]
    pub fn display_score(&self) -> u32 {
        self.score.round() as u32
    }

    /// Zero misses over a non-empty chart.
    pub fn is_full_combo(&self) -> bool {
        self.total_units > 0 && self.count(JudgeGrade::Miss) == 0
    }

    /// Full combo without a single GREAT or GOOD.
    pub fn is_all_perfect(&self) -> bool {
        self.is_full_combo()
            && self.count(JudgeGrade::Great) == 0
            && self.count(JudgeGrade::Good) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_SCORE, ScoreState};
    use crate::game::judgment::JudgeGrade;
    use crate::game::note::Note;

    fn four_taps() -> Vec<Note> {
        (0..4).map(|i| Note::tap(i, i as f32)).collect()
    }

    #[test]
    fn unit_share_splits_the_ceiling_across_taps_and_holds() {
        let notes = vec![
            Note::tap(0, 1.0),
            Note::tap(1, 2.0),
            Note::tap(2, 3.0),
            Note::hold(3, 4.0, 1.0),
        ];
        let score = ScoreState::new(&notes);
        assert_eq!(score.total_units, 5, "a hold counts two units");
        assert!((score.unit_score - 200_000.0).abs() < 1e-9);
    }

    #[test]
    fn grade_weights_shape_the_final_score() {
        let mut score = ScoreState::new(&four_taps());
        score.apply(JudgeGrade::Perfect);
        score.apply(JudgeGrade::Great);
        score.apply(JudgeGrade::Good);
        score.apply(JudgeGrade::Miss);
        assert_eq!(
            score.display_score(),
            400_000,
            "250k + 125k + 25k + 0 expected"
        );
    }

    #[test]
    fn combo_resets_on_miss_and_remembers_its_peak() {
        let mut score = ScoreState::new(&four_taps());
        score.apply(JudgeGrade::Perfect);
        score.apply(JudgeGrade::Perfect);
        score.apply(JudgeGrade::Good);
        assert_eq!(score.combo, 3);
        score.apply(JudgeGrade::Miss);
        assert_eq!(score.combo, 0, "a miss breaks the combo");
        assert_eq!(score.max_combo, 3, "the peak survives the break");
    }

    #[test]
    fn all_perfects_round_up_to_exactly_the_ceiling() {
        let notes: Vec<Note> = (0..3).map(|i| Note::tap(i, i as f32)).collect();
        let mut score = ScoreState::new(&notes);
        for _ in 0..3 {
            score.apply(JudgeGrade::Perfect);
        }
        assert_eq!(
            score.display_score(),
            1_000_000,
            "three thirds must present as the full ceiling"
        );
    }

    #[test]
    fn the_running_score_never_exceeds_the_ceiling() {
        let notes = vec![Note::tap(0, 1.0)];
        let mut score = ScoreState::new(&notes);
        score.apply(JudgeGrade::Perfect);
        score.apply(JudgeGrade::Perfect);
        assert!(score.score <= MAX_SCORE);
        assert_eq!(score.display_score(), 1_000_000);
    }

    #[test]
    fn result_flags_track_misses_and_lesser_grades() {
        let mut fc = ScoreState::new(&four_taps());
        for _ in 0..3 {
            fc.apply(JudgeGrade::Perfect);
        }
        fc.apply(JudgeGrade::Great);
        assert!(fc.is_full_combo());
        assert!(!fc.is_all_perfect(), "a GREAT spoils all-perfect");

        let mut ap = ScoreState::new(&four_taps());
        for _ in 0..4 {
            ap.apply(JudgeGrade::Perfect);
        }
        assert!(ap.is_full_combo() && ap.is_all_perfect());

        let mut broken = ScoreState::new(&four_taps());
        broken.apply(JudgeGrade::Miss);
        assert!(!broken.is_full_combo() && !broken.is_all_perfect());

        let empty = ScoreState::new(&[]);
        assert!(
            !empty.is_full_combo(),
            "an empty chart earns no result flags"
        );
    }
}
