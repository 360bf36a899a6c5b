use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, Pt3D, EPSILON_DIST};

// How many dense samples to take per bake interval when measuring arc length.
const SAMPLES_PER_INTERVAL: usize = 16;
const MIN_DENSE_SAMPLES: usize = 32;
// Never measure a curve with more samples than this, no matter how small the interval.
const MAX_DENSE_SAMPLES: usize = 100_000;

/// One end of a `Spline`. The handles are offsets relative to `pos`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub pos: Pt3D,
    pub handle_in: Pt3D,
    pub handle_out: Pt3D,
    pub tilt: Angle,
}

impl ControlPoint {
    /// Mirrors the tangent through the point, so the curve stays smooth if another segment
    /// continues from here.
    pub fn mirrored(pos: Pt3D, tangent: Pt3D, tilt: Angle) -> ControlPoint {
        ControlPoint {
            pos,
            handle_in: -tangent,
            handle_out: tangent,
            tilt,
        }
    }
}

/// A point on the baked polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BakedPt {
    pub dist: Distance,
    pub pos: Pt3D,
    /// Unit tangent
    pub forward: Pt3D,
    /// Unit vector perpendicular to `forward`, after applying tilt
    pub up: Pt3D,
}

/// A cubic Bézier curve between exactly two control points. It's always kept baked into a
/// polyline with points spaced `bake_interval` apart, so all sampling is by arc length.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "SplineDef", into = "SplineDef")]
pub struct Spline {
    points: [ControlPoint; 2],
    bake_interval: Distance,
    length: Distance,
    baked: Vec<BakedPt>,
}

#[derive(Serialize, Deserialize)]
struct SplineDef {
    points: [ControlPoint; 2],
    bake_interval: Distance,
}

impl TryFrom<SplineDef> for Spline {
    type Error = String;

    fn try_from(def: SplineDef) -> Result<Spline, String> {
        if !def.bake_interval.is_positive() {
            return Err(format!("Can't bake a spline every {}", def.bake_interval));
        }
        Ok(Spline::new(def.points[0], def.points[1], def.bake_interval))
    }
}

impl From<Spline> for SplineDef {
    fn from(spline: Spline) -> SplineDef {
        SplineDef {
            points: spline.points,
            bake_interval: spline.bake_interval,
        }
    }
}

impl PartialEq for Spline {
    fn eq(&self, other: &Spline) -> bool {
        self.points == other.points && self.bake_interval == other.bake_interval
    }
}

impl Spline {
    /// `bake_interval` must be positive.
    pub fn new(start: ControlPoint, end: ControlPoint, bake_interval: Distance) -> Spline {
        if !bake_interval.is_positive() {
            panic!("Can't bake a spline every {}", bake_interval);
        }
        let mut spline = Spline {
            points: [start, end],
            bake_interval,
            length: Distance::ZERO,
            baked: Vec::new(),
        };
        spline.bake();
        spline
    }

    pub fn start(&self) -> &ControlPoint {
        &self.points[0]
    }

    pub fn end(&self) -> &ControlPoint {
        &self.points[1]
    }

    /// Replaces both control points, re-baking only if something changed.
    pub fn set_points(&mut self, start: ControlPoint, end: ControlPoint) {
        if self.points != [start, end] {
            self.points = [start, end];
            self.bake();
        }
    }

    pub fn bake_interval(&self) -> Distance {
        self.bake_interval
    }

    pub fn set_bake_interval(&mut self, interval: Distance) {
        if !interval.is_positive() {
            panic!("Can't bake a spline every {}", interval);
        }
        if self.bake_interval != interval {
            self.bake_interval = interval;
            self.bake();
        }
    }

    /// The baked arc length
    pub fn length(&self) -> Distance {
        self.length
    }

    pub fn baked_points(&self) -> &Vec<BakedPt> {
        &self.baked
    }

    /// Position at some distance along the curve. Out-of-range distances are clamped.
    pub fn sample(&self, dist: Distance) -> Pt3D {
        let (a, b, pct) = self.bracket(dist);
        a.pos.lerp(b.pos, pct)
    }

    pub fn sample_forward(&self, dist: Distance) -> Pt3D {
        let (a, b, pct) = self.bracket(dist);
        a.forward.lerp(b.forward, pct).normalized()
    }

    pub fn sample_up(&self, dist: Distance) -> Pt3D {
        let (a, b, pct) = self.bracket(dist);
        a.up.lerp(b.up, pct).normalized()
    }

    /// The unit vector pointing to the left of the curve, `up × forward`.
    pub fn sample_lateral(&self, dist: Distance) -> Pt3D {
        self.sample_up(dist)
            .cross(self.sample_forward(dist))
            .normalized()
    }

    // Returns the two baked points surrounding dist, and how far between them dist is.
    fn bracket(&self, dist: Distance) -> (&BakedPt, &BakedPt, f64) {
        let last = self.baked.len() - 1;
        if dist <= self.baked[0].dist {
            return (&self.baked[0], &self.baked[0], 0.0);
        }
        if dist >= self.baked[last].dist {
            return (&self.baked[last], &self.baked[last], 0.0);
        }
        // The first point strictly after dist
        let idx = self.baked.partition_point(|pt| pt.dist <= dist);
        let a = &self.baked[idx - 1];
        let b = &self.baked[idx];
        let pct = (dist - a.dist).safe_percent(b.dist - a.dist);
        (a, b, pct)
    }

    fn position_at(&self, t: f64) -> Pt3D {
        let [p0, c0, c1, p1] = self.bezier_pts();
        let u = 1.0 - t;
        p0 * (u * u * u) + c0 * (3.0 * u * u * t) + c1 * (3.0 * u * t * t) + p1 * (t * t * t)
    }

    fn derivative_at(&self, t: f64) -> Pt3D {
        let [p0, c0, c1, p1] = self.bezier_pts();
        let u = 1.0 - t;
        (c0 - p0) * (3.0 * u * u) + (c1 - c0) * (6.0 * u * t) + (p1 - c1) * (3.0 * t * t)
    }

    fn bezier_pts(&self) -> [Pt3D; 4] {
        let [start, end] = &self.points;
        [
            start.pos,
            start.pos + start.handle_out,
            end.pos + end.handle_in,
            end.pos,
        ]
    }

    fn forward_at(&self, t: f64) -> Pt3D {
        let forward = self.derivative_at(t).normalized();
        if forward != Pt3D::ZERO {
            return forward;
        }
        // Handles collapsed onto the points. Fall back to the chord, then to +z.
        let chord = (self.points[1].pos - self.points[0].pos).normalized();
        if chord != Pt3D::ZERO {
            chord
        } else {
            Pt3D::new(0.0, 0.0, 1.0)
        }
    }

    fn up_at(&self, t: f64, forward: Pt3D) -> Pt3D {
        let mut up = (Pt3D::UP - forward * Pt3D::UP.dot(forward)).normalized();
        if up == Pt3D::ZERO {
            // A vertical curve; pick any perpendicular
            let z = Pt3D::new(0.0, 0.0, 1.0);
            up = (z - forward * z.dot(forward)).normalized();
        }
        let tilt = self.points[0].tilt.inner_radians()
            + (self.points[1].tilt.inner_radians() - self.points[0].tilt.inner_radians()) * t;
        up.rotate_around(forward, tilt)
    }

    fn bake(&mut self) {
        let [p0, c0, c1, p1] = self.bezier_pts();
        let hull_length = p0.dist_to(c0) + c0.dist_to(c1) + c1.dist_to(p1);
        let num_samples = ((hull_length / self.bake_interval).ceil() as usize)
            .saturating_mul(SAMPLES_PER_INTERVAL)
            .clamp(MIN_DENSE_SAMPLES, MAX_DENSE_SAMPLES);

        // (t, arc length so far)
        let mut dense: Vec<(f64, Distance)> = Vec::with_capacity(num_samples + 1);
        let mut prev = self.position_at(0.0);
        let mut so_far = Distance::ZERO;
        dense.push((0.0, so_far));
        for i in 1..=num_samples {
            let t = (i as f64) / (num_samples as f64);
            let pt = self.position_at(t);
            so_far += prev.dist_to(pt);
            dense.push((t, so_far));
            prev = pt;
        }
        self.length = so_far;

        let mut dists = Vec::new();
        let mut dist = Distance::ZERO;
        // Don't emit a sliver right before the end
        while self.length - dist > EPSILON_DIST {
            dists.push(dist);
            dist += self.bake_interval;
        }
        // Always end exactly on the last control point. A degenerate curve still gets two points.
        if dists.is_empty() {
            dists.push(Distance::ZERO);
        }
        dists.push(self.length);

        self.baked = dists
            .into_iter()
            .map(|dist| {
                let t = t_at_dist(&dense, dist);
                let pos = if dist == self.length {
                    p1
                } else {
                    self.position_at(t)
                };
                let forward = self.forward_at(t);
                BakedPt {
                    dist,
                    pos,
                    forward,
                    up: self.up_at(t, forward),
                }
            })
            .collect();
    }
}

fn t_at_dist(dense: &[(f64, Distance)], dist: Distance) -> f64 {
    let idx = dense.partition_point(|(_, d)| *d < dist);
    if idx == 0 {
        return 0.0;
    }
    if idx == dense.len() {
        return 1.0;
    }
    let (t1, d1) = dense[idx - 1];
    let (t2, d2) = dense[idx];
    t1 + (t2 - t1) * (dist - d1).safe_percent(d2 - d1)
}
