use serde::{Deserialize, Serialize};

use geom::{Angle, ControlPoint, Distance, Pt3D, Spline};

use crate::make::geometry::lane_edge_offsets;
use crate::{LaneDirection, MatchedLane, RoadEndpoint};

/// The centerline of one lane, oriented in the lane's direction of travel. Meant for vehicles to
/// follow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanePath {
    /// Position in the matched lane list, from the left
    pub index: usize,
    pub lane: MatchedLane,
    /// Relative to the segment's origin, like the road's own curve
    pub curve: Spline,
}

/// One path per matched lane. Each one's handles match the road's own curve, so paths stay
/// parallel to the road surface. Transition lanes start or end on the edge where they vanish.
pub fn make_lane_paths(
    lanes: &[MatchedLane],
    start: &RoadEndpoint,
    end: &RoadEndpoint,
    origin: Pt3D,
    bake_interval: Distance,
) -> Vec<LanePath> {
    let start_edges = lane_edge_offsets(lanes, start, end, 0.0);
    let end_edges = lane_edge_offsets(lanes, start, end, 1.0);
    let start_local = start.placement.relative_to(origin);
    let end_local = end.placement.relative_to(origin);
    let start_bank = start.placement.basis.bank();
    let end_bank = end.placement.basis.bank();

    lanes
        .iter()
        .enumerate()
        .map(|(index, lane)| {
            let start_pt =
                start_local.lateral_offset((start_edges[index] + start_edges[index + 1]) / 2.0);
            let end_pt = end_local.lateral_offset((end_edges[index] + end_edges[index + 1]) / 2.0);

            let curve = match lane.dir {
                LaneDirection::Forward => Spline::new(
                    ControlPoint::mirrored(start_pt, start.tangent_out(), start_bank),
                    ControlPoint::mirrored(end_pt, end.tangent_in(), end_bank),
                    bake_interval,
                ),
                // Seen from the other direction, the bank flips
                LaneDirection::Reverse => Spline::new(
                    ControlPoint::mirrored(
                        end_pt,
                        -end.tangent_in(),
                        Angle::radians(-end_bank.inner_radians()),
                    ),
                    ControlPoint::mirrored(
                        start_pt,
                        -start.tangent_out(),
                        Angle::radians(-start_bank.inner_radians()),
                    ),
                    bake_interval,
                ),
            };
            LanePath {
                index,
                lane: *lane,
                curve,
            }
        })
        .collect()
}
