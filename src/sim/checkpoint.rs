//! Checkpoint gates and lap progression
//!
//! Gates must be crossed strictly in order. Each tick only the current gate is
//! tested against the vehicle's displacement since the previous tick, so at
//! most one gate can be registered per tick. A vehicle that moves far enough
//! in one tick to pass a gate without its displacement segment touching it
//! simply misses that gate; there is no sub-stepping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A gate line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub start: Vec2,
    pub end: Vec2,
}

impl Gate {
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// True when the segment `prev -> curr` crosses this gate
    #[inline]
    pub fn crossed_by(&self, prev: Vec2, curr: Vec2) -> bool {
        segments_intersect(self.start, self.end, prev, curr)
    }
}

/// Non-empty, ordered gate sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Gate>", into = "Vec<Gate>")]
pub struct Gates(Vec<Gate>);

impl TryFrom<Vec<Gate>> for Gates {
    type Error = ConfigError;

    fn try_from(gates: Vec<Gate>) -> Result<Self, Self::Error> {
        Gates::new(gates)
    }
}

impl From<Gates> for Vec<Gate> {
    fn from(gates: Gates) -> Self {
        gates.0
    }
}

impl Gates {
    /// Validate a gate list. Zero-length gates are rejected since the
    /// orientation test is undefined for them.
    pub fn new(gates: Vec<Gate>) -> Result<Self, ConfigError> {
        if gates.is_empty() {
            return Err(ConfigError::EmptyGates);
        }
        if let Some(i) = gates.iter().position(|g| g.start == g.end) {
            return Err(ConfigError::DegenerateGate(i));
        }
        Ok(Self(gates))
    }

    fn from_pairs(pairs: &[((f32, f32), (f32, f32))]) -> Self {
        Self(
            pairs
                .iter()
                .map(|&((ax, ay), (bx, by))| Gate::new(Vec2::new(ax, ay), Vec2::new(bx, by)))
                .collect(),
        )
    }

    /// Ten gates used by the training environment (first gate just past the start)
    pub fn training() -> Self {
        Self::from_pairs(&[
            ((440.0, 180.0), (490.0, 180.0)),
            ((580.0, 125.0), (580.0, 185.0)),
            ((660.0, 140.0), (660.0, 200.0)),
            ((730.0, 270.0), (780.0, 270.0)),
            ((760.0, 350.0), (710.0, 350.0)),
            ((660.0, 420.0), (620.0, 470.0)),
            ((500.0, 450.0), (500.0, 490.0)),
            ((370.0, 390.0), (420.0, 430.0)),
            ((340.0, 270.0), (390.0, 310.0)),
            ((420.0, 150.0), (470.0, 190.0)),
        ])
    }

    /// Nine gates aligned for the rule-based demo lap
    pub fn demo() -> Self {
        Self::from_pairs(&[
            ((580.0, 125.0), (580.0, 185.0)),
            ((660.0, 140.0), (660.0, 200.0)),
            ((730.0, 270.0), (780.0, 270.0)),
            ((760.0, 350.0), (710.0, 350.0)),
            ((660.0, 420.0), (620.0, 470.0)),
            ((500.0, 420.0), (500.0, 470.0)),
            ((370.0, 350.0), (350.0, 420.0)),
            ((310.0, 270.0), (370.0, 310.0)),
            ((420.0, 150.0), (470.0, 190.0)),
        ])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the sequence has no gates
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Gate> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Gate> {
        self.0.iter()
    }
}

impl Default for Gates {
    fn default() -> Self {
        Self::training()
    }
}

/// Counter-clockwise orientation predicate
#[inline]
pub fn ccw(a: Vec2, b: Vec2, c: Vec2) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Proper intersection of segments `ab` and `cd`.
///
/// Collinear and touching configurations are not reliably reported.
#[inline]
pub fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

/// What happened at the checkpoint this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointEvent {
    None,
    /// Passed a gate; `index` is the new current gate
    Gate { index: usize },
    /// Passed the last gate, completing lap number `laps`
    Lap { laps: u32 },
}

impl CheckpointEvent {
    /// True for any registered gate crossing, including the lap-closing one
    #[inline]
    pub fn advanced(self) -> bool {
        !matches!(self, CheckpointEvent::None)
    }
}

/// Current gate and lap count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointProgress {
    /// Index of the next gate to cross, always in [0, gate count)
    pub gate_index: usize,
    pub laps: u32,
}

impl CheckpointProgress {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Test the displacement `prev -> curr` against the current gate.
    ///
    /// No-op when crashed or on the first tick (no previous position).
    pub fn advance(
        &mut self,
        prev: Option<Vec2>,
        curr: Vec2,
        gates: &Gates,
        crashed: bool,
    ) -> CheckpointEvent {
        let Some(prev) = prev else {
            return CheckpointEvent::None;
        };
        if crashed {
            return CheckpointEvent::None;
        }
        let Some(gate) = gates.get(self.gate_index) else {
            return CheckpointEvent::None;
        };
        if !gate.crossed_by(prev, curr) {
            return CheckpointEvent::None;
        }

        self.gate_index += 1;
        if self.gate_index >= gates.len() {
            self.gate_index = 0;
            self.laps += 1;
            CheckpointEvent::Lap { laps: self.laps }
        } else {
            CheckpointEvent::Gate {
                index: self.gate_index,
            }
        }
    }
}

/// Counts ticks per lap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapTimer {
    /// Ticks elapsed in the current lap
    pub current_ticks: u64,
    /// Duration of the most recently finished lap
    pub last_lap_ticks: Option<u64>,
    /// Fastest finished lap
    pub best_lap_ticks: Option<u64>,
}

impl LapTimer {
    pub fn tick(&mut self) {
        self.current_ticks += 1;
    }

    /// Close the current lap and return its duration
    pub fn finish_lap(&mut self) -> u64 {
        let ticks = self.current_ticks;
        self.last_lap_ticks = Some(ticks);
        self.best_lap_ticks = Some(self.best_lap_ticks.map_or(ticks, |b| b.min(ticks)));
        self.current_ticks = 0;
        ticks
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Displacement segment straddling a gate at its midpoint
    fn straddle(gate: &Gate) -> (Vec2, Vec2) {
        let mid = (gate.start + gate.end) / 2.0;
        let normal = (gate.end - gate.start).perp().normalize() * 3.0;
        (mid - normal, mid + normal)
    }

    #[test]
    fn test_ccw_and_intersection() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(ccw(a, b, Vec2::new(5.0, 5.0)));
        assert!(!ccw(a, b, Vec2::new(5.0, -5.0)));

        assert!(segments_intersect(a, b, Vec2::new(5.0, -1.0), Vec2::new(5.0, 1.0)));
        assert!(!segments_intersect(a, b, Vec2::new(5.0, 1.0), Vec2::new(5.0, 2.0)));
        assert!(!segments_intersect(a, b, Vec2::new(11.0, -1.0), Vec2::new(11.0, 1.0)));
    }

    #[test]
    fn test_gates_validation() {
        assert_eq!(Gates::new(Vec::new()), Err(ConfigError::EmptyGates));
        let p = Vec2::new(1.0, 1.0);
        let gates = vec![Gate::new(Vec2::ZERO, p), Gate::new(p, p)];
        assert_eq!(Gates::new(gates), Err(ConfigError::DegenerateGate(1)));
        assert_eq!(Gates::training().len(), 10);
        assert_eq!(Gates::demo().len(), 9);
    }

    #[test]
    fn test_gates_json_rejects_empty() {
        assert!(serde_json::from_str::<Gates>("[]").is_err());
        let json = serde_json::to_string(&Gates::demo()).unwrap();
        let back: Gates = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Gates::demo());
    }

    #[test]
    fn test_advance_first_gate() {
        let gates = Gates::training();
        let mut progress = CheckpointProgress::default();
        let (prev, curr) = straddle(gates.get(0).unwrap());
        let event = progress.advance(Some(prev), curr, &gates, false);
        assert_eq!(event, CheckpointEvent::Gate { index: 1 });
        assert_eq!(progress.gate_index, 1);
        assert_eq!(progress.laps, 0);
    }

    #[test]
    fn test_only_current_gate_counts() {
        let gates = Gates::training();
        let mut progress = CheckpointProgress::default();
        // Crossing gate 3 while gate 0 is current does nothing
        let (prev, curr) = straddle(gates.get(3).unwrap());
        assert_eq!(progress.advance(Some(prev), curr, &gates, false), CheckpointEvent::None);
        assert_eq!(progress.gate_index, 0);
    }

    #[test]
    fn test_noop_without_prev_or_when_crashed() {
        let gates = Gates::training();
        let mut progress = CheckpointProgress::default();
        let (prev, curr) = straddle(gates.get(0).unwrap());
        assert_eq!(progress.advance(None, curr, &gates, false), CheckpointEvent::None);
        assert_eq!(progress.advance(Some(prev), curr, &gates, true), CheckpointEvent::None);
        assert_eq!(progress, CheckpointProgress::default());
    }

    #[test]
    fn test_full_lap_wraps() {
        let gates = Gates::training();
        let mut progress = CheckpointProgress::default();
        for i in 0..gates.len() {
            let (prev, curr) = straddle(gates.get(i).unwrap());
            let event = progress.advance(Some(prev), curr, &gates, false);
            if i + 1 < gates.len() {
                assert_eq!(event, CheckpointEvent::Gate { index: i + 1 });
            } else {
                assert_eq!(event, CheckpointEvent::Lap { laps: 1 });
            }
        }
        assert_eq!(progress.gate_index, 0);
        assert_eq!(progress.laps, 1);
    }

    #[test]
    fn test_fast_displacement_can_skip_gate() {
        let gates = Gates::new(vec![Gate::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0))]).unwrap();
        let mut progress = CheckpointProgress::default();
        // Jumped from before the gate to well past it, but beside its end
        let event = progress.advance(Some(Vec2::new(0.0, 12.0)), Vec2::new(30.0, 11.0), &gates, false);
        assert_eq!(event, CheckpointEvent::None);
    }

    #[test]
    fn test_lap_timer() {
        let mut timer = LapTimer::default();
        for _ in 0..120 {
            timer.tick();
        }
        assert_eq!(timer.finish_lap(), 120);
        for _ in 0..100 {
            timer.tick();
        }
        timer.finish_lap();
        for _ in 0..150 {
            timer.tick();
        }
        timer.finish_lap();
        assert_eq!(timer.last_lap_ticks, Some(150));
        assert_eq!(timer.best_lap_ticks, Some(100));
        assert_eq!(timer.current_ticks, 0);
    }

    proptest! {
        #[test]
        fn prop_index_steps_by_one(crossings in prop::collection::vec(any::<bool>(), 0..60)) {
            let gates = Gates::training();
            let n = gates.len();
            let mut progress = CheckpointProgress::default();
            let mut passed = 0usize;
            for cross in crossings {
                let before = progress;
                let gate = *gates.get(progress.gate_index).unwrap();
                let (prev, curr) = if cross {
                    straddle(&gate)
                } else {
                    (Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0))
                };
                let event = progress.advance(Some(prev), curr, &gates, false);
                prop_assert!(progress.gate_index < n);
                if event.advanced() {
                    passed += 1;
                    prop_assert_eq!(progress.gate_index, (before.gate_index + 1) % n);
                } else {
                    prop_assert_eq!(progress, before);
                }
            }
            prop_assert_eq!(progress.laps as usize, passed / n);
            prop_assert_eq!(progress.gate_index, passed % n);
        }
    }
}
