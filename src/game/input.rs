use rustc_hash::FxHashMap;

/// Default key bindings, left to right.
pub const DEFAULT_KEYS_4: [char; 4] = ['d', 'f', 'j', 'k'];
pub const DEFAULT_KEYS_7: [char; 7] = ['s', 'd', 'f', ' ', 'j', 'k', 'l'];

/// Relative lane widths for the 7-lane mode; the center lane is wider.
pub const LANE_RATIOS_7: [f32; 7] = [1.0, 1.0, 1.0, 1.5, 1.0, 1.0, 1.0];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard,
    Pointer,
}

/// Character-to-lane bindings. Callers are expected to filter OS key
/// auto-repeat before dispatching; the session's per-lane pressed flag
/// catches whatever slips through.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyMap {
    bindings: FxHashMap<char, usize>,
}

impl KeyMap {
    /// Default bindings for the given lane count: the 7-lane set when it
    /// fits, otherwise the home-row set truncated to the count. Lanes past
    /// the set stay unbound until the caller binds them.
    pub fn for_lanes(lane_count: usize) -> Self {
        let keys: &[char] = if lane_count == DEFAULT_KEYS_7.len() {
            &DEFAULT_KEYS_7
        } else {
            &DEFAULT_KEYS_4
        };
        let mut map = Self::default();
        for (lane, key) in keys.iter().enumerate().take(lane_count) {
            map.bind(*key, lane);
        }
        map
    }

    pub fn bind(&mut self, key: char, lane: usize) {
        self.bindings.insert(key.to_ascii_lowercase(), lane);
    }

    #[inline(always)]
    pub fn lane_for(&self, key: char) -> Option<usize> {
        self.bindings.get(&key.to_ascii_lowercase()).copied()
    }
}

/// Normalized per-lane hit rectangles over `[0, 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneLayout {
    // lane_count + 1 boundaries; first is 0.0, last is exactly 1.0.
    bounds: Vec<f32>,
}

impl LaneLayout {
    pub fn uniform(lane_count: usize) -> Self {
        Self::weighted(&vec![1.0; lane_count.max(1)])
    }

    /// Ratio-weighted rectangles. Non-positive or non-finite ratios are
    /// treated as zero width; a degenerate total degrades to uniform.
    pub fn weighted(ratios: &[f32]) -> Self {
        let total: f32 = ratios
            .iter()
            .map(|r| if r.is_finite() && *r > 0.0 { *r } else { 0.0 })
            .sum();
        if ratios.is_empty() || total <= 0.0 {
            return Self::uniform(ratios.len());
        }
        let mut bounds = Vec::with_capacity(ratios.len() + 1);
        bounds.push(0.0);
        let mut cumulative = 0.0f32;
        for r in ratios {
            if r.is_finite() && *r > 0.0 {
                cumulative += *r;
            }
            bounds.push(cumulative / total);
        }
        // Guard against accumulation error on the right edge.
        if let Some(last) = bounds.last_mut() {
            *last = 1.0;
        }
        Self { bounds }
    }

    #[inline(always)]
    pub fn lane_count(&self) -> usize {
        self.bounds.len() - 1
    }

    /// Maps a normalized horizontal position to its lane. Positions outside
    /// `[0, 1)` (including NaN) resolve to no lane and the event is dropped.
    #[inline(always)]
    pub fn lane_at(&self, x: f32) -> Option<usize> {
        if !(0.0..1.0).contains(&x) {
            return None;
        }
        let idx = self.bounds.partition_point(|b| *b <= x);
        Some((idx - 1).min(self.lane_count() - 1))
    }

    /// Normalized `(left, right)` span of a lane, for renderers.
    pub fn lane_span(&self, lane: usize) -> Option<(f32, f32)> {
        if lane >= self.lane_count() {
            return None;
        }
        Some((self.bounds[lane], self.bounds[lane + 1]))
    }
}

/// Maps live pointer/contact ids to the lane they pressed, so the matching
/// up-event releases the same lane even if the contact drifted sideways.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    active: FxHashMap<u64, usize>,
}

impl PointerTracker {
    pub fn press(&mut self, id: u64, lane: usize) {
        self.active.insert(id, lane);
    }

    /// Removes the id and returns the lane it was pressing, if any.
    pub fn release(&mut self, id: u64) -> Option<usize> {
        self.active.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
