/// Base judgment half-window widths in seconds, tightest first
/// (PERFECT, GREAT, GOOD).
pub const BASE_WINDOWS_S: [f32; 3] = [0.033, 0.092, 0.142];

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JudgeGrade {
    Perfect,
    Great,
    Good,
    Miss,
}

/// Early/late display tag. Purely cosmetic; never affects scoring.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TimingTag {
    Fast,
    Slow,
}

/// Half-widths of the grading windows in seconds, tightest first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimingProfile {
    pub windows_s: [f32; 3],
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self {
            windows_s: BASE_WINDOWS_S,
        }
    }
}

impl TimingProfile {
    #[inline(always)]
    pub fn perfect_s(&self) -> f32 {
        self.windows_s[0]
    }

    #[inline(always)]
    pub fn great_s(&self) -> f32 {
        self.windows_s[1]
    }

    #[inline(always)]
    pub fn good_s(&self) -> f32 {
        self.windows_s[2]
    }
}

/// A single recorded grading event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Judgment {
    pub grade: JudgeGrade,
    // None for passive misses and hold completions; those have no meaningful
    // early/late direction.
    pub tag: Option<TimingTag>,
    pub offset_s: f32,
    pub music_time_s: f32,
    pub lane: usize,
}

/// Classifies a stop-aware timing offset against the grading windows.
/// Window boundaries are inclusive; an offset beyond the GOOD window yields
/// no judgment at all and the input must not consume a note.
#[inline(always)]
pub fn classify_offset_s(offset_s: f32, profile: &TimingProfile) -> Option<(JudgeGrade, TimingTag)> {
    let abs = offset_s.abs();
    let tag = if offset_s > 0.0 {
        TimingTag::Fast
    } else {
        TimingTag::Slow
    };
    if abs <= profile.windows_s[0] {
        Some((JudgeGrade::Perfect, tag))
    } else if abs <= profile.windows_s[1] {
        Some((JudgeGrade::Great, tag))
    } else if abs <= profile.windows_s[2] {
        Some((JudgeGrade::Good, tag))
    } else {
        None
    }
}

/// Score weight per grade, applied to the per-unit score share.
#[inline(always)]
pub const fn grade_weight(grade: JudgeGrade) -> f64 {
    match grade {
        JudgeGrade::Perfect => 1.0,
        JudgeGrade::Great => 0.5,
        JudgeGrade::Good => 0.1,
        JudgeGrade::Miss => 0.0,
    }
}

/// Hex color collaborators use for judgment popups.
#[inline(always)]
pub const fn color_hint(grade: JudgeGrade) -> &'static str {
    match grade {
        JudgeGrade::Perfect => "#ffd700",
        JudgeGrade::Great => "#0f0",
        JudgeGrade::Good => "#00fffa",
        JudgeGrade::Miss => "#888",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        JudgeGrade, TimingProfile, TimingTag, classify_offset_s, color_hint, grade_weight,
    };

    #[test]
    fn early_tap_inside_tightest_window_is_perfect_fast() {
        let profile = TimingProfile::default();
        let result = classify_offset_s(0.020, &profile);
        assert_eq!(
            result,
            Some((JudgeGrade::Perfect, TimingTag::Fast)),
            "0.020s early should grade PERFECT with a FAST tag"
        );
    }

    #[test]
    fn late_tap_in_widest_window_is_good_slow() {
        let profile = TimingProfile::default();
        let result = classify_offset_s(-0.110, &profile);
        assert_eq!(
            result,
            Some((JudgeGrade::Good, TimingTag::Slow)),
            "0.110s late should grade GOOD with a SLOW tag"
        );
    }

    #[test]
    fn offsets_beyond_the_good_window_are_ignored() {
        let profile = TimingProfile::default();
        assert_eq!(
            classify_offset_s(0.200, &profile),
            None,
            "an 0.200s early press must not produce a judgment"
        );
        assert_eq!(
            classify_offset_s(-0.200, &profile),
            None,
            "an 0.200s late press must not produce a judgment"
        );
    }

    #[test]
    fn window_boundaries_are_inclusive_and_take_the_tighter_grade() {
        let profile = TimingProfile::default();
        assert_eq!(
            classify_offset_s(0.033, &profile).map(|(g, _)| g),
            Some(JudgeGrade::Perfect),
            "exactly the PERFECT boundary grades PERFECT"
        );
        assert_eq!(
            classify_offset_s(-0.092, &profile).map(|(g, _)| g),
            Some(JudgeGrade::Great),
            "exactly the GREAT boundary grades GREAT"
        );
        assert_eq!(
            classify_offset_s(0.142, &profile).map(|(g, _)| g),
            Some(JudgeGrade::Good),
            "exactly the GOOD boundary still grades GOOD"
        );
        assert_eq!(
            classify_offset_s(0.1421, &profile),
            None,
            "just past the GOOD boundary is no judgment"
        );
    }

    #[test]
    fn zero_offset_tags_slow() {
        let profile = TimingProfile::default();
        assert_eq!(
            classify_offset_s(0.0, &profile),
            Some((JudgeGrade::Perfect, TimingTag::Slow)),
            "a dead-on press is PERFECT and tags SLOW by convention"
        );
    }

    #[test]
    fn grade_weights_and_colors_match_the_scoring_table() {
        assert!((grade_weight(JudgeGrade::Perfect) - 1.0).abs() < f64::EPSILON);
        assert!((grade_weight(JudgeGrade::Great) - 0.5).abs() < f64::EPSILON);
        assert!((grade_weight(JudgeGrade::Good) - 0.1).abs() < f64::EPSILON);
        assert!(grade_weight(JudgeGrade::Miss).abs() < f64::EPSILON);
        assert_eq!(color_hint(JudgeGrade::Perfect), "#ffd700");
        assert_eq!(color_hint(JudgeGrade::Miss), "#888");
    }
}
