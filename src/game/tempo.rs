use std::cmp::Ordering;

/// BPM used when a chart supplies no usable tempo information.
pub const FALLBACK_BPM: f32 = 150.0;

/// One tempo change. A `bpm` of zero marks a full stop lasting until the
/// next event; the final event extends forever.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TempoEvent {
    pub time_s: f32,
    pub bpm: f32,
    /// Scroll distance accumulated by all earlier events, in beat-scaled
    /// units (seconds * BPM).
    pub cumulative_distance: f32,
}

/// Time-sorted tempo events with precomputed cumulative scroll distance,
/// so time-to-distance lookups stay O(log n) per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TempoMap {
    events: Vec<TempoEvent>,
}

impl TempoMap {
    /// Builds a map from `(time, bpm)` pairs. Construction never fails:
    /// an empty or unusable list degrades to a single fallback event at
    /// time zero.
    pub fn from_events(pairs: &[(f32, f32)], fallback_bpm: f32) -> Self {
        let mut sorted: Vec<(f32, f32)> = pairs
            .iter()
            .copied()
            .filter(|(t, b)| t.is_finite() && b.is_finite())
            .collect();
        if sorted.is_empty() {
            return Self::fallback(fallback_bpm);
        }
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut events = Vec::with_capacity(sorted.len());
        let mut cumulative = 0.0f32;
        let mut prev: Option<(f32, f32)> = None;
        for (time_s, bpm) in sorted {
            if let Some((prev_time, prev_bpm)) = prev {
                cumulative += (time_s - prev_time) * prev_bpm;
            }
            events.push(TempoEvent {
                time_s,
                bpm,
                cumulative_distance: cumulative,
            });
            prev = Some((time_s, bpm));
        }
        Self { events }
    }

    /// Single-event map at the given BPM (or `FALLBACK_BPM` when that is
    /// not usable either).
    pub fn fallback(bpm: f32) -> Self {
        let bpm = if bpm.is_finite() && bpm > 0.0 {
            bpm
        } else {
            FALLBACK_BPM
        };
        Self {
            events: vec![TempoEvent {
                time_s: 0.0,
                bpm,
                cumulative_distance: 0.0,
            }],
        }
    }

    #[inline(always)]
    pub fn events(&self) -> &[TempoEvent] {
        &self.events
    }

    /// Scroll distance reached at `time_s`: the governing event's cumulative
    /// distance plus linear progress at its BPM. Frozen during stops, zero
    /// before the first event.
    #[inline(always)]
    pub fn distance_at(&self, time_s: f32) -> f32 {
        let idx = self.events.partition_point(|e| e.time_s <= time_s);
        if idx == 0 {
            return 0.0;
        }
        let e = &self.events[idx - 1];
        e.cumulative_distance + (time_s - e.time_s) * e.bpm
    }

    /// The timing offset gameplay perceives between `now_s` and a note at
    /// `target_s`: the raw difference minus every stop overlapping the
    /// interval. Past targets return the raw difference unmodified, since
    /// elapsed time is real even through a stop.
    pub fn effective_offset(&self, now_s: f32, target_s: f32) -> f32 {
        let raw = target_s - now_s;
        if raw <= 0.0 {
            return raw;
        }
        let mut stopped = 0.0f32;
        for (i, e) in self.events.iter().enumerate() {
            if e.time_s >= target_s {
                break;
            }
            if e.bpm != 0.0 {
                continue;
            }
            let stop_end = self.events.get(i + 1).map_or(f32::INFINITY, |n| n.time_s);
            let overlap = stop_end.min(target_s) - e.time_s.max(now_s);
            if overlap > 0.0 {
                stopped += overlap;
            }
        }
        raw - stopped
    }

    /// Largest BPM in the map; the scroll-rate preference scales by it.
    pub fn max_bpm(&self) -> f32 {
        self.events.iter().map(|e| e.bpm).fold(0.0f32, f32::max)
    }
}

/// Converts a green-number scroll preference into a distance-to-pixels
/// multiplier: with the chart's fastest BPM, a note spends `green_number`
/// milliseconds crossing `field_length` pixels.
pub fn scroll_multiplier(green_number: u32, max_bpm: f32, field_length: f32) -> f32 {
    let gn = green_number.max(1) as f32;
    (field_length * 1000.0) / (gn * max_bpm.max(1.0) * 4.0)
}

#[cfg(test)]
mod tests {
    use super::{FALLBACK_BPM, TempoMap, scroll_multiplier};

    #[test]
    fn distance_interpolates_within_a_segment() {
        let map = TempoMap::from_events(&[(0.0, 120.0)], FALLBACK_BPM);
        assert!((map.distance_at(0.0)).abs() < 1e-6);
        assert!(
            (map.distance_at(2.5) - 300.0).abs() < 1e-3,
            "2.5s at 120 BPM should travel 300 units, got {}",
            map.distance_at(2.5)
        );
    }

    #[test]
    fn distance_is_zero_before_the_first_event() {
        let map = TempoMap::from_events(&[(1.0, 120.0)], FALLBACK_BPM);
        assert!(map.distance_at(0.5).abs() < 1e-6);
    }

    #[test]
    fn distance_freezes_during_a_stop_and_resumes_after() {
        let map = TempoMap::from_events(&[(0.0, 120.0), (2.0, 0.0), (3.0, 120.0)], FALLBACK_BPM);
        let at_stop = map.distance_at(2.0);
        assert!((at_stop - 240.0).abs() < 1e-3);
        assert!(
            (map.distance_at(2.5) - at_stop).abs() < 1e-6,
            "distance must not advance inside the stop"
        );
        assert!(
            (map.distance_at(3.5) - (at_stop + 60.0)).abs() < 1e-3,
            "distance resumes at 120 BPM once the stop ends"
        );
    }

    #[test]
    fn a_final_stop_freezes_distance_forever() {
        let map = TempoMap::from_events(&[(0.0, 100.0), (5.0, 0.0)], FALLBACK_BPM);
        assert!((map.distance_at(10.0) - 500.0).abs() < 1e-3);
        assert!((map.distance_at(100.0) - 500.0).abs() < 1e-3);
    }

    #[test]
    fn effective_offset_excludes_a_stop_between_now_and_target() {
        let map = TempoMap::from_events(&[(0.0, 150.0), (2.0, 0.0), (3.0, 150.0)], FALLBACK_BPM);
        let offset = map.effective_offset(1.5, 3.5);
        assert!(
            (offset - 1.0).abs() < 1e-6,
            "a full 1s stop inside the interval must be subtracted, got {offset}"
        );
    }

    #[test]
    fn effective_offset_handles_a_target_inside_the_stop() {
        let map = TempoMap::from_events(&[(0.0, 100.0), (2.0, 0.0), (3.0, 100.0)], FALLBACK_BPM);
        let offset = map.effective_offset(1.0, 2.5);
        assert!(
            (offset - 1.0).abs() < 1e-6,
            "only the elapsed part of the stop counts, got {offset}"
        );
    }

    #[test]
    fn effective_offset_sums_multiple_stops() {
        let map = TempoMap::from_events(
            &[
                (0.0, 100.0),
                (1.0, 0.0),
                (1.5, 100.0),
                (2.0, 0.0),
                (2.5, 100.0),
            ],
            FALLBACK_BPM,
        );
        let offset = map.effective_offset(0.5, 3.0);
        assert!(
            (offset - 1.5).abs() < 1e-6,
            "both half-second stops should be removed from 2.5s raw, got {offset}"
        );
    }

    #[test]
    fn past_targets_keep_the_raw_offset_even_through_stops() {
        let map = TempoMap::from_events(&[(0.0, 150.0), (2.0, 0.0), (3.0, 150.0)], FALLBACK_BPM);
        let offset = map.effective_offset(3.5, 3.0);
        assert!(
            (offset + 0.5).abs() < 1e-6,
            "elapsed time is real; expected -0.5, got {offset}"
        );
    }

    #[test]
    fn an_open_ended_stop_can_swallow_the_whole_interval() {
        let map = TempoMap::from_events(&[(0.0, 100.0), (5.0, 0.0)], FALLBACK_BPM);
        let offset = map.effective_offset(6.0, 8.0);
        assert!(
            offset.abs() < 1e-6,
            "an interval fully inside a stop has zero effective offset, got {offset}"
        );
    }

    #[test]
    fn empty_event_lists_fall_back_to_a_single_default_event() {
        let map = TempoMap::from_events(&[], 0.0);
        assert_eq!(map.events().len(), 1);
        assert!((map.events()[0].bpm - FALLBACK_BPM).abs() < f32::EPSILON);
        assert!((map.distance_at(2.0) - 300.0).abs() < 1e-3);
    }

    #[test]
    fn chart_bpm_seeds_the_fallback_event_when_positive() {
        let map = TempoMap::from_events(&[], 174.0);
        assert!((map.events()[0].bpm - 174.0).abs() < f32::EPSILON);
    }

    #[test]
    fn max_bpm_spans_all_events() {
        let map = TempoMap::from_events(&[(0.0, 150.0), (2.0, 0.0), (3.0, 200.0)], FALLBACK_BPM);
        assert!((map.max_bpm() - 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn scroll_multiplier_matches_the_green_number_formula() {
        let m = scroll_multiplier(500, 150.0, 900.0);
        assert!(
            (m - 3.0).abs() < 1e-6,
            "900px over 500ms at 150 BPM should give 3.0, got {m}"
        );
    }
}
