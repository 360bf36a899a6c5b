//! Reconciles the lane layouts at both ends of a segment into one list, inventing transition
//! lanes where the number of lanes changes.

use std::collections::VecDeque;

use thiserror::Error;

use crate::{DirectionClass, LaneDirection, LaneKind, MatchedLane, RoadEndpoint};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("an endpoint has no lanes")]
    NoLanes,
    #[error("{lanes} lanes, but {directions} traffic directions")]
    MisalignedDirections { lanes: usize, directions: usize },
    #[error("lane {idx} is Reverse, but comes after a Forward lane")]
    ReverseAfterForward { idx: usize },
    #[error("one endpoint is forward-only and the other is reverse-only")]
    OpposingDirections,
    #[error("{start:?} at the start can't connect to {end:?} at the end")]
    IncompatibleDirections {
        start: DirectionClass,
        end: DirectionClass,
    },
}

/// Produces the ordered (left to right) list of lanes spanning a segment. Never returns a
/// partial list.
///
/// Lanes are paired up from the side where the direction flips, so a lane that only exists at
/// one endpoint always lands on the outside. A lane missing at the start becomes
/// `TransitionAdd`; one missing at the end becomes `TransitionRem`.
pub fn match_lanes(
    start: &RoadEndpoint,
    end: &RoadEndpoint,
) -> Result<Vec<MatchedLane>, MatchError> {
    let (start_class, start_flip) = start.direction_class()?;
    let (end_class, end_flip) = end.direction_class()?;

    match (start_class, end_class) {
        (DirectionClass::ForwardOnly, DirectionClass::ForwardOnly) => Ok(match_forward_only(
            &start.lanes,
            end.lanes.len(),
        )),
        (DirectionClass::ReverseOnly, DirectionClass::ReverseOnly) => Ok(match_reverse_only(
            &start.lanes,
            end.lanes.len(),
        )),
        (DirectionClass::Both, DirectionClass::Both) => Ok(match_both(
            &start.lanes,
            start_flip,
            end.lanes.len(),
            end_flip,
        )),
        (DirectionClass::ForwardOnly, DirectionClass::ReverseOnly)
        | (DirectionClass::ReverseOnly, DirectionClass::ForwardOnly) => {
            Err(MatchError::OpposingDirections)
        }
        (start, end) => Err(MatchError::IncompatibleDirections { start, end }),
    }
}

/// Like `match_lanes`, but logs the problem and returns nothing on failure. Callers build an empty
/// mesh instead of crashing.
pub fn match_lanes_or_warn(start: &RoadEndpoint, end: &RoadEndpoint) -> Vec<MatchedLane> {
    match match_lanes(start, end) {
        Ok(lanes) => lanes,
        Err(err) => {
            warn!("Can't match lanes between endpoints: {}", err);
            Vec::new()
        }
    }
}

fn match_forward_only(start_lanes: &[LaneKind], num_end: usize) -> Vec<MatchedLane> {
    let num_start = start_lanes.len();
    (0..num_start.max(num_end))
        .map(|i| {
            let kind = if i < num_start && i < num_end {
                start_lanes[i]
            } else if i >= num_start {
                LaneKind::TransitionAdd
            } else {
                LaneKind::TransitionRem
            };
            MatchedLane::new(kind, LaneDirection::Forward)
        })
        .collect()
}

// The flip side is on the right, so walk from the rightmost lane outwards and prepend.
fn match_reverse_only(start_lanes: &[LaneKind], num_end: usize) -> Vec<MatchedLane> {
    let num_start = start_lanes.len();
    let mut result = VecDeque::new();
    for i in 0..num_start.max(num_end) {
        let kind = if i < num_start && i < num_end {
            start_lanes[num_start - 1 - i]
        } else if i >= num_start {
            LaneKind::TransitionAdd
        } else {
            LaneKind::TransitionRem
        };
        result.push_front(MatchedLane::new(kind, LaneDirection::Reverse));
    }
    result.into()
}

// Indices are in the start endpoint's terms. `diff` shifts them into the end endpoint's terms.
fn match_both(
    start_lanes: &[LaneKind],
    start_flip: usize,
    num_end: usize,
    end_flip: usize,
) -> Vec<MatchedLane> {
    let num_start = start_lanes.len() as isize;
    let start_flip = start_flip as isize;
    let num_end = num_end as isize;
    let diff = start_flip - end_flip as isize;
    let mut result = VecDeque::new();

    // Reverse lanes, from the flip outwards to the left. Cover every reverse lane on either side.
    let mut i = start_flip - 1;
    while i >= diff.min(0) {
        let kind = if i < 0 {
            LaneKind::TransitionAdd
        } else if i - diff < 0 {
            LaneKind::TransitionRem
        } else {
            start_lanes[i as usize]
        };
        result.push_front(MatchedLane::new(kind, LaneDirection::Reverse));
        i -= 1;
    }

    // Forward lanes, from the flip outwards to the right
    for i in start_flip..num_start.max(num_end + diff) {
        let kind = if i >= num_start {
            LaneKind::TransitionAdd
        } else if i - diff > num_end - 1 {
            LaneKind::TransitionRem
        } else {
            start_lanes[i as usize]
        };
        result.push_back(MatchedLane::new(kind, LaneDirection::Forward));
    }

    result.into()
}
