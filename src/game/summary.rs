use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Local};

use crate::game::judgment::JudgeGrade;
use crate::game::scoring::ScoreState;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    C,
    B,
    A,
    S,
    SS,
    SSS,
}

impl Rank {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SSS => "SSS",
            Self::SS => "SS",
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank tier for a display score.
pub fn rank_for_score(score: u32) -> Rank {
    if score >= 990_000 {
        Rank::SSS
    } else if score >= 950_000 {
        Rank::SS
    } else if score >= 900_000 {
        Rank::S
    } else if score >= 800_000 {
        Rank::A
    } else if score >= 700_000 {
        Rank::B
    } else {
        Rank::C
    }
}

/// Everything the results screen needs from a finished session.
#[derive(Clone, Debug)]
pub struct StageSummary {
    pub score: u32,
    pub rank: Rank,
    pub max_combo: u32,
    pub counts: HashMap<JudgeGrade, u32>,
    pub full_combo: bool,
    pub all_perfect: bool,
    pub ended_at: DateTime<Local>,
}

impl StageSummary {
    pub fn from_score(score: &ScoreState) -> Self {
        let display = score.display_score();
        Self {
            score: display,
            rank: rank_for_score(display),
            max_combo: score.max_combo,
            counts: score.counts.clone(),
            full_combo: score.is_full_combo(),
            all_perfect: score.is_all_perfect(),
            ended_at: Local::now(),
        }
    }

    fn count(&self, grade: JudgeGrade) -> u32 {
        self.counts.get(&grade).copied().unwrap_or(0)
    }
}

impl fmt::Display for StageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:07} | P:{} G:{} O:{} M:{} | max combo {}{}",
            self.rank,
            self.score,
            self.count(JudgeGrade::Perfect),
            self.count(JudgeGrade::Great),
            self.count(JudgeGrade::Good),
            self.count(JudgeGrade::Miss),
            self.max_combo,
            if self.all_perfect {
                " | ALL PERFECT"
            } else if self.full_combo {
                " | FULL COMBO"
            } else {
                ""
            }
        )
    }
}
