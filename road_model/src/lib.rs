//! A road segment spans two endpoints. Each endpoint describes its own lanes; the segment matches
//! lanes across its length, bends a spline between the two, and sweeps a triangle mesh along it.
//! Segments are rebuilt lazily, after something marks them dirty.

#[macro_use]
extern crate log;

pub use crate::endpoint::{DirectionClass, GutterProfile, RoadEndpoint};
pub use crate::lane::{LaneDirection, LaneKind, MatchedLane};
pub use crate::lane_paths::{make_lane_paths, LanePath};
pub use crate::make::geometry::{build_road_mesh, loop_count, BuildOptions, LOW_POLY_FACTOR};
pub use crate::make::lanes::{match_lanes, match_lanes_or_warn, MatchError};
pub use crate::make::{road_control_points, road_curve};
pub use crate::network::{EndpointLookup, NetworkConfig, RebuildQueue, RebuildSink};
pub use crate::segment::{EndpointID, RebuildOutcome, RebuildState, RoadSegment, SegmentID};

mod endpoint;
mod lane;
mod lane_paths;
pub mod make;
mod network;
mod segment;
