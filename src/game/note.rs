#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NoteKind {
    Tap,
    Hold { duration_s: f32 },
}

/// Life cycle phase. Taps move Pending -> Hit | Missed; holds move
/// Pending -> Held -> Completed | LetGo, or Pending -> Missed when never
/// pressed. Terminal phases never change again.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NotePhase {
    Pending,
    Held,
    Hit,
    Missed,
    Completed,
    LetGo,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Note {
    pub lane: usize,
    pub time_s: f32,
    pub kind: NoteKind,
    pub phase: NotePhase,
}

impl Note {
    pub fn tap(lane: usize, time_s: f32) -> Self {
        Self {
            lane,
            time_s,
            kind: NoteKind::Tap,
            phase: NotePhase::Pending,
        }
    }

    pub fn hold(lane: usize, time_s: f32, duration_s: f32) -> Self {
        Self {
            lane,
            time_s,
            kind: NoteKind::Hold { duration_s },
            phase: NotePhase::Pending,
        }
    }

    #[inline(always)]
    pub fn is_hold(&self) -> bool {
        matches!(self.kind, NoteKind::Hold { .. })
    }

    /// Time the note stops mattering: the tail end for holds, the head
    /// time for taps.
    #[inline(always)]
    pub fn end_time_s(&self) -> f32 {
        match self.kind {
            NoteKind::Tap => self.time_s,
            NoteKind::Hold { duration_s } => self.time_s + duration_s,
        }
    }

    /// Scoring units: holds carry two (press and completion), taps one.
    #[inline(always)]
    pub fn units(&self) -> u32 {
        if self.is_hold() { 2 } else { 1 }
    }

    #[inline(always)]
    pub fn is_resolved(&self) -> bool {
        !matches!(self.phase, NotePhase::Pending | NotePhase::Held)
    }

    /// Renderers draw Pending and Held notes; every terminal phase hides.
    #[inline(always)]
    pub fn is_visible(&self) -> bool {
        matches!(self.phase, NotePhase::Pending | NotePhase::Held)
    }

    #[inline(always)]
    pub fn is_holding(&self) -> bool {
        self.phase == NotePhase::Held
    }
}
