pub mod geometry;
pub mod lanes;

use geom::{ControlPoint, Distance, Pt3D, Spline};

use crate::RoadEndpoint;

/// The centerline of a segment, relative to `origin`. Handles are mirrored through each endpoint
/// along its forward axis, and each endpoint's bank becomes the tilt.
pub fn road_curve(
    start: &RoadEndpoint,
    end: &RoadEndpoint,
    origin: Pt3D,
    bake_interval: Distance,
) -> Spline {
    let (p0, p1) = road_control_points(start, end, origin);
    Spline::new(p0, p1, bake_interval)
}

/// The two control points of `road_curve`, without baking anything.
pub fn road_control_points(
    start: &RoadEndpoint,
    end: &RoadEndpoint,
    origin: Pt3D,
) -> (ControlPoint, ControlPoint) {
    (
        ControlPoint::mirrored(
            start.placement.pos - origin,
            start.tangent_out(),
            start.placement.basis.bank(),
        ),
        ControlPoint::mirrored(
            end.placement.pos - origin,
            end.tangent_in(),
            end.placement.basis.bank(),
        ),
    )
}
