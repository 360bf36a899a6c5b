//! Walks the spline and emits quads for every lane, shoulder and gutter, one cross-section
//! ("loop") at a time.

use geom::{Distance, MaterialRef, MeshBuilder, Placement, Pt3D, Quad, Spline, TriangleMesh, UV};

use crate::{GutterProfile, LaneDirection, LaneKind, MatchedLane, RoadEndpoint};

/// Low-poly mode keeps one of every this many loops.
pub const LOW_POLY_FACTOR: usize = 3;
/// Each lane kind owns a vertical strip of the texture this wide.
const UV_SLOT_WIDTH: f64 = 1.0 / 8.0;
/// Where the flat shoulder ends and the gutter begins in the shoulder texture
const SHOULDER_GUTTER_U: f64 = 0.8;
// Absorbs floating point drift in the baked length, so 19.9999999m at 2m density is 10 loops.
const LOOP_EPSILON: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct BuildOptions {
    /// Distance between loops along the curve
    pub density: Distance,
    pub low_poly: bool,
    pub material: Option<MaterialRef>,
}

/// How many cross-sections a curve of some length is cut into. Always at least 1.
pub fn loop_count(length: Distance, density: Distance, low_poly: bool) -> usize {
    let loops = (length / density + LOOP_EPSILON).floor() as usize;
    if low_poly {
        (loops / LOW_POLY_FACTOR).max(1)
    } else {
        loops.max(1)
    }
}

/// The width of a lane some percent of the way along the segment. Transition lanes only take
/// the width from the endpoint that actually has them.
pub fn lane_width_at(
    lane: &MatchedLane,
    start: &RoadEndpoint,
    end: &RoadEndpoint,
    pct: f64,
) -> Distance {
    let (from, to) = match lane.kind {
        LaneKind::TransitionAdd => (Distance::ZERO, end.lane_width),
        LaneKind::TransitionRem => (start.lane_width, Distance::ZERO),
        _ => (start.lane_width, end.lane_width),
    };
    Distance::lerp(from, to, pct)
}

/// Offsets of every lane edge from the centerline, left to right. Positive is to the left. The
/// lane row is centred, so the first edge is half the total width.
pub fn lane_edge_offsets(
    lanes: &[MatchedLane],
    start: &RoadEndpoint,
    end: &RoadEndpoint,
    pct: f64,
) -> Vec<Distance> {
    let widths: Vec<Distance> = lanes
        .iter()
        .map(|lane| lane_width_at(lane, start, end, pct))
        .collect();
    let mut edge = widths.iter().copied().sum::<Distance>() / 2.0;
    let mut edges = vec![edge];
    for width in widths {
        edge -= width;
        edges.push(edge);
    }
    edges
}

/// The U coordinates for the (left, right) edges of a lane.
fn lane_uv_u(lane: &MatchedLane) -> (f64, f64) {
    let slot = match lane.kind {
        LaneKind::Shoulder => 0,
        LaneKind::Slow => 1,
        LaneKind::Middle => 2,
        LaneKind::Fast => 3,
        LaneKind::TwoWay => 4,
        LaneKind::OneWay => 5,
        LaneKind::SingleLine => 6,
        LaneKind::NoMarking | LaneKind::TransitionAdd | LaneKind::TransitionRem => 7,
    };
    let mut uv = (
        UV_SLOT_WIDTH * (slot as f64),
        UV_SLOT_WIDTH * ((slot + 1) as f64),
    );
    // The center markings for these are authored facing the other way
    if matches!(lane.kind, LaneKind::TwoWay | LaneKind::OneWay) {
        uv = (uv.1, uv.0);
    }
    // Keep markings oriented for traffic driving the other way
    if lane.dir == LaneDirection::Reverse {
        uv = (uv.1, uv.0);
    }
    uv
}

// Where a cross-section sits and how it's oriented
#[derive(Clone, Copy)]
struct Frame {
    center: Pt3D,
    lateral: Pt3D,
    up: Pt3D,
    pct: f64,
}

impl Frame {
    fn from_placement(placement: &Placement, pct: f64) -> Frame {
        Frame {
            center: placement.pos,
            lateral: placement.basis.x,
            up: placement.basis.y,
            pct,
        }
    }

    fn at(&self, offset: Distance, drop: Distance) -> Pt3D {
        self.center + self.lateral * offset.inner_meters() - self.up * drop.inner_meters()
    }
}

// The full cross-section profile at one frame
struct Profile {
    frame: Frame,
    edges: Vec<Distance>,
    shoulder_l: Distance,
    shoulder_r: Distance,
    gutter: GutterProfile,
}

struct Loops<'a> {
    curve: &'a Spline,
    lanes: &'a [MatchedLane],
    start: &'a RoadEndpoint,
    end: &'a RoadEndpoint,
    start_local: Placement,
    end_local: Placement,
    num_loops: usize,
}

impl<'a> Loops<'a> {
    // The first and last frames come straight from the endpoints, so the mesh lines up exactly
    // with whatever is attached there.
    fn frame(&self, idx: usize) -> Frame {
        let pct = (idx as f64) / (self.num_loops as f64);
        if idx == 0 {
            return Frame::from_placement(&self.start_local, 0.0);
        }
        if idx == self.num_loops {
            return Frame::from_placement(&self.end_local, 1.0);
        }
        let dist = self.curve.length() * pct;
        Frame {
            center: self.curve.sample(dist),
            lateral: self.curve.sample_lateral(dist),
            up: self.curve.sample_up(dist),
            pct,
        }
    }

    fn profile(&self, idx: usize) -> Profile {
        let frame = self.frame(idx);
        let pct = frame.pct;
        Profile {
            frame,
            edges: lane_edge_offsets(self.lanes, self.start, self.end, pct),
            shoulder_l: Distance::lerp(
                self.start.shoulder_width_l,
                self.end.shoulder_width_l,
                pct,
            ),
            shoulder_r: Distance::lerp(
                self.start.shoulder_width_r,
                self.end.shoulder_width_r,
                pct,
            ),
            gutter: GutterProfile::lerp(self.start.gutter_profile, self.end.gutter_profile, pct),
        }
    }
}

// Per-strip V coordinates, so tiling stays continuous along each strip
struct TextureTracker {
    lanes: Vec<f64>,
    shoulder_l: f64,
    shoulder_r: f64,
    per_loop: f64,
}

impl TextureTracker {
    fn advance(v: &mut f64, per_loop: f64) -> (f64, f64) {
        let near = *v;
        *v += per_loop;
        (near, *v)
    }
}

/// Builds the road surface between two endpoints. `curve` and the returned mesh are both relative
/// to `origin`; the endpoints are in world-space.
pub fn build_road_mesh(
    curve: &Spline,
    lanes: &[MatchedLane],
    start: &RoadEndpoint,
    end: &RoadEndpoint,
    origin: Pt3D,
    opts: &BuildOptions,
) -> TriangleMesh {
    if lanes.is_empty() {
        return TriangleMesh::empty(opts.material.clone());
    }

    let length = curve.length();
    let num_loops = loop_count(length, opts.density, opts.low_poly);

    // Textures have a 2:1 real-world aspect ratio, doubled since each lane is a half-width slot
    let tile_height = start.lane_width.min(end.lane_width) * 4.0;
    // Segments shorter than one tile still stretch a whole tile, so V never stays at 0
    let num_tiles = (length / tile_height).floor().max(1.0);
    let mut tex = TextureTracker {
        lanes: vec![0.0; lanes.len()],
        shoulder_l: 0.0,
        shoulder_r: 0.0,
        per_loop: num_tiles / (num_loops as f64),
    };

    let loops = Loops {
        curve,
        lanes,
        start,
        end,
        start_local: start.placement.relative_to(origin),
        end_local: end.placement.relative_to(origin),
        num_loops,
    };

    let mut builder = MeshBuilder::new();
    let mut near = loops.profile(0);
    for idx in 0..num_loops {
        let far = loops.profile(idx + 1);
        add_lanes(&mut builder, lanes, &near, &far, &mut tex);
        add_shoulders(&mut builder, &near, &far, &mut tex);
        near = far;
    }

    debug!(
        "Built {} loops over {} with {} lanes: {} triangles",
        num_loops,
        length,
        lanes.len(),
        builder.num_triangles()
    );
    builder.build(opts.material.clone())
}

fn add_lanes(
    builder: &mut MeshBuilder,
    lanes: &[MatchedLane],
    near: &Profile,
    far: &Profile,
    tex: &mut TextureTracker,
) {
    for (idx, lane) in lanes.iter().enumerate() {
        let (u_left, u_right) = lane_uv_u(lane);
        let (v_near, v_far) = TextureTracker::advance(&mut tex.lanes[idx], tex.per_loop);
        builder.add_quad(
            Quad {
                near_left: near.frame.at(near.edges[idx], Distance::ZERO),
                near_right: near.frame.at(near.edges[idx + 1], Distance::ZERO),
                far_left: far.frame.at(far.edges[idx], Distance::ZERO),
                far_right: far.frame.at(far.edges[idx + 1], Distance::ZERO),
            },
            Quad {
                near_left: UV::new(u_left, v_near),
                near_right: UV::new(u_right, v_near),
                far_left: UV::new(u_left, v_far),
                far_right: UV::new(u_right, v_far),
            },
        );
    }
}

// The texture runs from U=0 at the lane edge, to SHOULDER_GUTTER_U at the end of the flat
// shoulder, to 1 at the outside of the gutter. The left side is mirrored.
fn add_shoulders(
    builder: &mut MeshBuilder,
    near: &Profile,
    far: &Profile,
    tex: &mut TextureTracker,
) {
    // Offsets (lane edge, shoulder edge, gutter edge) for one side
    let outwards = |profile: &Profile, left: bool| {
        let (edge, shoulder, sign) = if left {
            (profile.edges[0], profile.shoulder_l, 1.0)
        } else {
            (profile.edges[profile.edges.len() - 1], profile.shoulder_r, -1.0)
        };
        let shoulder_edge = edge + shoulder * sign;
        let gutter_edge = shoulder_edge + profile.gutter.horizontal * sign;
        (
            profile.frame.at(edge, Distance::ZERO),
            profile.frame.at(shoulder_edge, Distance::ZERO),
            profile.frame.at(gutter_edge, profile.gutter.drop),
        )
    };

    let (v_near, v_far) = TextureTracker::advance(&mut tex.shoulder_l, tex.per_loop);
    let (near_lane, near_shoulder, near_gutter) = outwards(near, true);
    let (far_lane, far_shoulder, far_gutter) = outwards(far, true);
    builder.add_quad(
        Quad {
            near_left: near_shoulder,
            near_right: near_lane,
            far_left: far_shoulder,
            far_right: far_lane,
        },
        Quad {
            near_left: UV::new(SHOULDER_GUTTER_U, v_near),
            near_right: UV::new(0.0, v_near),
            far_left: UV::new(SHOULDER_GUTTER_U, v_far),
            far_right: UV::new(0.0, v_far),
        },
    );
    builder.add_quad(
        Quad {
            near_left: near_gutter,
            near_right: near_shoulder,
            far_left: far_gutter,
            far_right: far_shoulder,
        },
        Quad {
            near_left: UV::new(1.0, v_near),
            near_right: UV::new(SHOULDER_GUTTER_U, v_near),
            far_left: UV::new(1.0, v_far),
            far_right: UV::new(SHOULDER_GUTTER_U, v_far),
        },
    );

    let (v_near, v_far) = TextureTracker::advance(&mut tex.shoulder_r, tex.per_loop);
    let (near_lane, near_shoulder, near_gutter) = outwards(near, false);
    let (far_lane, far_shoulder, far_gutter) = outwards(far, false);
    builder.add_quad(
        Quad {
            near_left: near_lane,
            near_right: near_shoulder,
            far_left: far_lane,
            far_right: far_shoulder,
        },
        Quad {
            near_left: UV::new(0.0, v_near),
            near_right: UV::new(SHOULDER_GUTTER_U, v_near),
            far_left: UV::new(0.0, v_far),
            far_right: UV::new(SHOULDER_GUTTER_U, v_far),
        },
    );
    builder.add_quad(
        Quad {
            near_left: near_shoulder,
            near_right: near_gutter,
            far_left: far_shoulder,
            far_right: far_gutter,
        },
        Quad {
            near_left: UV::new(SHOULDER_GUTTER_U, v_near),
            near_right: UV::new(1.0, v_near),
            far_left: UV::new(SHOULDER_GUTTER_U, v_far),
            far_right: UV::new(1.0, v_far),
        },
    );
}

#[cfg(test)]
mod tests {
    use geom::{Angle, Basis, Placement, Triangle, EPSILON_DIST};

    use super::*;
    use crate::make::road_curve;
    use LaneDirection::{Forward, Reverse};

    // Triangles per loop: two per lane, plus two for each of the four shoulder/gutter strips
    fn tris_per_loop(num_lanes: usize) -> usize {
        2 * (num_lanes + 4)
    }

    fn straight_pair(
        length: f64,
        start_lanes: usize,
        end_lanes: usize,
    ) -> (RoadEndpoint, RoadEndpoint) {
        let mut start = RoadEndpoint::new(Placement::at(Pt3D::ZERO))
            .with_lanes(vec![(LaneKind::Slow, Forward); start_lanes]);
        let mut end = RoadEndpoint::new(Placement::at(Pt3D::new(0.0, 0.0, length)))
            .with_lanes(vec![(LaneKind::Slow, Forward); end_lanes]);
        for ep in [&mut start, &mut end] {
            ep.lane_width = Distance::meters(3.5);
            ep.next_tangent_mag = length / 3.0;
            ep.prior_tangent_mag = length / 3.0;
        }
        (start, end)
    }

    fn build(
        start: &RoadEndpoint,
        end: &RoadEndpoint,
        lanes: &[MatchedLane],
        low_poly: bool,
    ) -> TriangleMesh {
        let density = Distance::meters(2.0);
        let origin = start.placement.pos.midpoint(end.placement.pos);
        let curve = road_curve(start, end, origin, density);
        build_road_mesh(
            &curve,
            lanes,
            start,
            end,
            origin,
            &BuildOptions {
                density,
                low_poly,
                material: Some(MaterialRef("asphalt".to_string())),
            },
        )
    }

    #[test]
    fn counting_loops() {
        let d = Distance::meters(2.0);
        assert_eq!(loop_count(Distance::meters(20.0), d, false), 10);
        assert_eq!(loop_count(Distance::meters(19.9999999999), d, false), 10);
        assert_eq!(loop_count(Distance::meters(20.0), d, true), 3);
        assert_eq!(loop_count(Distance::meters(0.5), d, false), 1);
        assert_eq!(loop_count(Distance::ZERO, d, true), 1);
        for meters in [0.0, 3.0, 7.9, 20.0, 123.4] {
            let normal = loop_count(Distance::meters(meters), d, false);
            let low = loop_count(Distance::meters(meters), d, true);
            assert!(low <= normal);
            assert_eq!(low, (normal / LOW_POLY_FACTOR).max(1));
        }
    }

    #[test]
    fn single_lane_twenty_meters() {
        let (start, end) = straight_pair(20.0, 1, 1);
        let lanes = vec![MatchedLane::new(LaneKind::Slow, Forward)];
        let mesh = build(&start, &end, &lanes, false);
        // 10 loops, each with one lane quad and four shoulder/gutter quads
        assert_eq!(mesh.num_triangles(), 10 * tris_per_loop(1));
        assert_eq!(mesh.uvs().len(), mesh.positions().len());
        assert_eq!(mesh.normals().len(), mesh.positions().len());
        assert_eq!(mesh.material(), Some(&MaterialRef("asphalt".to_string())));
        for n in mesh.normals() {
            assert!(n.y() > 0.0);
        }

        let low = build(&start, &end, &lanes, true);
        assert_eq!(low.num_triangles(), 3 * tris_per_loop(1));
    }

    #[test]
    fn no_lanes_no_mesh() {
        let (start, end) = straight_pair(20.0, 1, 1);
        let mesh = build(&start, &end, &[], false);
        assert!(mesh.is_empty());
        assert_eq!(mesh.material(), Some(&MaterialRef("asphalt".to_string())));
    }

    #[test]
    fn degenerate_segment() {
        let (start, end) = straight_pair(0.0, 1, 1);
        let lanes = vec![MatchedLane::new(LaneKind::Slow, Forward)];
        let mesh = build(&start, &end, &lanes, false);
        assert_eq!(mesh.num_triangles(), tris_per_loop(1));
        // Still stretches one whole texture tile
        assert_eq!(mesh.triangles()[0].uvs[2].v, 1.0);

        // Same for anything shorter than a 14m tile
        let (start, end) = straight_pair(5.0, 1, 1);
        let tris = build(&start, &end, &lanes, false).triangles();
        let last = tris.len() - tris_per_loop(1);
        assert!((tris[last].uvs[2].v - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ends_line_up_with_endpoints() {
        let (mut start, mut end) = straight_pair(30.0, 2, 2);
        start.placement.basis = Basis::from_heading_and_bank(Angle::ZERO, Angle::degrees(5.0));
        end.placement.basis = Basis::from_heading_and_bank(Angle::ZERO, Angle::degrees(-5.0));
        let lanes = vec![MatchedLane::new(LaneKind::Slow, Forward); 2];
        let origin = start.placement.pos.midpoint(end.placement.pos);
        let mesh = build(&start, &end, &lanes, false);

        let tris = mesh.triangles();
        let first = &tris[0];
        let expected = start.placement.pos - origin + start.placement.basis.x * 3.5;
        assert!(first.pts[0].approx_eq(expected, EPSILON_DIST));

        // The last loop's first lane quad: far-right is the first triangle's 3rd point
        let last_loop = tris.len() - tris_per_loop(2);
        let far_right = tris[last_loop].pts[2];
        let expected = end.placement.pos - origin;
        assert!(far_right.approx_eq(expected, EPSILON_DIST));
    }

    // The first triangle of a strip holds (NL, NR, FR), the second (NL, FR, FL)
    fn strip(
        tris: &[Triangle],
        loop_idx: usize,
        num_lanes: usize,
        strip_idx: usize,
    ) -> (Triangle, Triangle) {
        let idx = loop_idx * tris_per_loop(num_lanes) + 2 * num_lanes + 2 * strip_idx;
        (tris[idx], tris[idx + 1])
    }

    fn assert_pt(actual: Pt3D, x: f64, y: f64, z: f64) {
        assert!(
            actual.approx_eq(Pt3D::new(x, y, z), EPSILON_DIST),
            "{} isn't ({}, {}, {})",
            actual,
            x,
            y,
            z
        );
    }

    #[test]
    fn shoulders_and_gutters() {
        let (mut start, mut end) = straight_pair(20.0, 1, 1);
        start.shoulder_width_l = Distance::meters(1.0);
        start.shoulder_width_r = Distance::meters(2.5);
        end.shoulder_width_l = Distance::meters(3.0);
        end.shoulder_width_r = Distance::meters(0.5);
        for ep in [&mut start, &mut end] {
            ep.gutter_profile = GutterProfile {
                horizontal: Distance::meters(1.5),
                drop: Distance::meters(0.4),
            };
        }
        let lanes = vec![MatchedLane::new(LaneKind::Slow, Forward)];
        let tris = build(&start, &end, &lanes, false).triangles();
        assert_eq!(tris.len(), 10 * tris_per_loop(1));

        // Strips are left flat, left gutter, right flat, right gutter. The lane spans x = +/-1.75.
        let (left_flat, _) = strip(&tris, 0, 1, 0);
        assert_pt(left_flat.pts[0], 2.75, 0.0, -10.0);
        assert_pt(left_flat.pts[1], 1.75, 0.0, -10.0);
        assert_eq!(left_flat.uvs[0].u, SHOULDER_GUTTER_U);
        assert_eq!(left_flat.uvs[1].u, 0.0);

        let (left_gutter, _) = strip(&tris, 0, 1, 1);
        assert_pt(left_gutter.pts[0], 4.25, -0.4, -10.0);
        assert_pt(left_gutter.pts[1], 2.75, 0.0, -10.0);
        assert_eq!(left_gutter.uvs[0].u, 1.0);
        assert_eq!(left_gutter.uvs[1].u, SHOULDER_GUTTER_U);

        let (right_flat, _) = strip(&tris, 0, 1, 2);
        assert_pt(right_flat.pts[0], -1.75, 0.0, -10.0);
        assert_pt(right_flat.pts[1], -4.25, 0.0, -10.0);
        assert_eq!(right_flat.uvs[0].u, 0.0);
        assert_eq!(right_flat.uvs[1].u, SHOULDER_GUTTER_U);

        let (right_gutter, _) = strip(&tris, 0, 1, 3);
        assert_pt(right_gutter.pts[0], -4.25, 0.0, -10.0);
        assert_pt(right_gutter.pts[1], -5.75, -0.4, -10.0);
        assert_eq!(right_gutter.uvs[0].u, SHOULDER_GUTTER_U);
        assert_eq!(right_gutter.uvs[1].u, 1.0);

        // The far side of the last loop uses the end's widths
        let (_, left_flat) = strip(&tris, 9, 1, 0);
        assert_pt(left_flat.pts[1], 1.75, 0.0, 10.0);
        assert_pt(left_flat.pts[2], 4.75, 0.0, 10.0);
        let (_, left_gutter) = strip(&tris, 9, 1, 1);
        assert_pt(left_gutter.pts[1], 4.75, 0.0, 10.0);
        assert_pt(left_gutter.pts[2], 6.25, -0.4, 10.0);
        let (_, right_flat) = strip(&tris, 9, 1, 2);
        assert_pt(right_flat.pts[1], -2.25, 0.0, 10.0);
        assert_pt(right_flat.pts[2], -1.75, 0.0, 10.0);
        let (_, right_gutter) = strip(&tris, 9, 1, 3);
        assert_pt(right_gutter.pts[1], -3.75, -0.4, 10.0);
        assert_pt(right_gutter.pts[2], -2.25, 0.0, 10.0);

        // Halfway along, both shoulders are interpolated
        let (left_flat, _) = strip(&tris, 5, 1, 0);
        assert!((left_flat.pts[0].x() - 3.75).abs() < 1e-6);
        let (right_flat, _) = strip(&tris, 5, 1, 2);
        assert!((right_flat.pts[1].x() + 3.25).abs() < 1e-6);
    }

    #[test]
    fn banked_gutter_drops_along_banked_up() {
        let (mut start, end) = straight_pair(20.0, 1, 1);
        start.placement.basis = Basis::from_heading_and_bank(Angle::ZERO, Angle::degrees(10.0));
        let lanes = vec![MatchedLane::new(LaneKind::Slow, Forward)];
        let origin = start.placement.pos.midpoint(end.placement.pos);
        let tris = build(&start, &end, &lanes, false).triangles();

        let basis = start.placement.basis;
        let (left_gutter, _) = strip(&tris, 0, 1, 1);
        let gutter = left_gutter.pts[0];
        let shoulder = left_gutter.pts[1];
        let expected = start.placement.pos - origin + basis.x * (1.75 + 2.0 + 2.0) - basis.y * 0.5;
        assert_pt(gutter, expected.x(), expected.y(), expected.z());
        assert!(((shoulder - gutter).dot(basis.y) - 0.5).abs() < 1e-9);
        // Not straight down in world space
        assert!((shoulder.y() - gutter.y() - 0.5).abs() > 1e-3);
    }

    #[test]
    fn removed_lane_tapers_to_nothing() {
        let (start, end) = straight_pair(20.0, 2, 1);
        let lanes = crate::match_lanes(&start, &end).unwrap();
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[1], MatchedLane::new(LaneKind::TransitionRem, Forward));

        let mesh = build(&start, &end, &lanes, false);
        let tris = mesh.triangles();
        let num_loops = 10;
        for i in 0..num_loops {
            // The removed lane's first triangle is (near-left, near-right, far-right)
            let tri = &tris[i * tris_per_loop(2) + 2];
            let near_width = tri.pts[0].dist_to(tri.pts[1]);
            let expected = 3.5 * (1.0 - (i as f64) / (num_loops as f64));
            assert!((near_width.inner_meters() - expected).abs() < 1e-6);
        }
        let last = &tris[(num_loops - 1) * tris_per_loop(2) + 3];
        // Second triangle is (near-left, far-right, far-left); the far edge collapses
        assert!(last.pts[1].approx_eq(last.pts[2], EPSILON_DIST));
    }

    #[test]
    fn texture_v_is_continuous() {
        let (start, end) = straight_pair(37.0, 2, 3);
        let lanes = crate::match_lanes(&start, &end).unwrap();
        let mesh = build(&start, &end, &lanes, false);
        let tris = mesh.triangles();
        let per_loop = tris_per_loop(lanes.len());
        let num_loops = tris.len() / per_loop;
        assert_eq!(num_loops, 18);

        // Each lane, then each of the shoulder and gutter strips
        for strip in 0..(lanes.len() + 4) {
            let mut prev_far = 0.0;
            for i in 0..num_loops {
                let tri = &tris[i * per_loop + 2 * strip];
                let (v_near, v_far) = (tri.uvs[0].v, tri.uvs[2].v);
                assert_eq!(v_near, prev_far);
                assert!(v_far >= v_near);
                prev_far = v_far;
            }
            // 37m with 14m tiles is 2 tiles
            assert!((prev_far - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn texture_slots() {
        let slow = MatchedLane::new(LaneKind::Slow, Forward);
        assert_eq!(lane_uv_u(&slow), (0.125, 0.25));
        let slow_back = MatchedLane::new(LaneKind::Slow, Reverse);
        assert_eq!(lane_uv_u(&slow_back), (0.25, 0.125));

        let two_way = MatchedLane::new(LaneKind::TwoWay, Forward);
        assert_eq!(lane_uv_u(&two_way), (0.625, 0.5));
        let two_way_back = MatchedLane::new(LaneKind::TwoWay, Reverse);
        assert_eq!(lane_uv_u(&two_way_back), (0.5, 0.625));

        for kind in [LaneKind::NoMarking, LaneKind::TransitionAdd, LaneKind::TransitionRem] {
            assert_eq!(lane_uv_u(&MatchedLane::new(kind, Forward)), (0.875, 1.0));
        }
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let (start, end) = straight_pair(25.0, 1, 3);
        let lanes = crate::match_lanes(&start, &end).unwrap();
        assert_eq!(
            build(&start, &end, &lanes, false),
            build(&start, &end, &lanes, false)
        );
    }
}
