use std::fmt;

use serde::{Deserialize, Serialize};

/// What a lane looks like. Kinds pick the texture slot with the matching road markings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaneKind {
    Shoulder,
    Slow,
    Middle,
    Fast,
    NoMarking,
    TwoWay,
    OneWay,
    SingleLine,
    /// Only exists at the end of a segment; tapers in from zero width.
    TransitionAdd,
    /// Only exists at the start of a segment; tapers out to zero width.
    TransitionRem,
}

impl LaneKind {
    /// Transition lanes are made up while matching two endpoints, never specified directly.
    pub fn is_transition(self) -> bool {
        matches!(self, LaneKind::TransitionAdd | LaneKind::TransitionRem)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaneDirection {
    /// Travels from the start endpoint to the end
    Forward,
    /// Travels from the end endpoint back to the start
    Reverse,
}

/// One entry in the lane list shared by both ends of a segment. Lists are ordered left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchedLane {
    pub kind: LaneKind,
    pub dir: LaneDirection,
}

impl MatchedLane {
    pub fn new(kind: LaneKind, dir: LaneDirection) -> MatchedLane {
        MatchedLane { kind, dir }
    }
}

impl fmt::Display for MatchedLane {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.kind, self.dir)
    }
}
