use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use geom::{Distance, Placement, Pt3D};

use crate::{LaneDirection, LaneKind, MatchError};

/// The drainage channel past a shoulder: how far out it reaches and how far down it drops.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GutterProfile {
    pub horizontal: Distance,
    pub drop: Distance,
}

impl GutterProfile {
    pub fn lerp(a: GutterProfile, b: GutterProfile, pct: f64) -> GutterProfile {
        GutterProfile {
            horizontal: Distance::lerp(a.horizontal, b.horizontal, pct),
            drop: Distance::lerp(a.drop, b.drop, pct),
        }
    }
}

impl Default for GutterProfile {
    fn default() -> GutterProfile {
        GutterProfile {
            horizontal: Distance::meters(2.0),
            drop: Distance::meters(0.5),
        }
    }
}

/// Which directions of travel an endpoint carries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionClass {
    ForwardOnly,
    ReverseOnly,
    Both,
}

/// A cross-section at one end of a road segment. Segments only ever read these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadEndpoint {
    /// Ordered from left to right, index-aligned with `traffic_dir`
    pub lanes: Vec<LaneKind>,
    /// All Reverse lanes come before all Forward lanes.
    pub traffic_dir: Vec<LaneDirection>,
    pub lane_width: Distance,
    pub shoulder_width_l: Distance,
    pub shoulder_width_r: Distance,
    pub gutter_profile: GutterProfile,
    /// `basis.x` is lateral, `basis.z` is the direction the road leaves in, and the tilt around
    /// `z` banks the road.
    pub placement: Placement,
    /// Length of the curve handle towards the next endpoint
    pub next_tangent_mag: f64,
    /// Length of the curve handle towards the previous endpoint
    pub prior_tangent_mag: f64,
}

impl RoadEndpoint {
    /// A two-lane road, one lane in each direction.
    pub fn new(placement: Placement) -> RoadEndpoint {
        RoadEndpoint {
            lanes: vec![LaneKind::Slow, LaneKind::Slow],
            traffic_dir: vec![LaneDirection::Reverse, LaneDirection::Forward],
            lane_width: Distance::meters(4.0),
            shoulder_width_l: Distance::meters(2.0),
            shoulder_width_r: Distance::meters(2.0),
            gutter_profile: GutterProfile::default(),
            placement,
            next_tangent_mag: 10.0,
            prior_tangent_mag: 10.0,
        }
    }

    /// Replaces the lane layout. `lanes` is a list of (kind, direction) from left to right.
    pub fn with_lanes(mut self, lanes: Vec<(LaneKind, LaneDirection)>) -> RoadEndpoint {
        let (kinds, dirs): (Vec<LaneKind>, Vec<LaneDirection>) = lanes.into_iter().unzip();
        self.lanes = kinds;
        self.traffic_dir = dirs;
        self
    }

    /// Checks everything except the direction ordering, which lane matching reports on its own.
    pub fn validate(&self) -> Result<()> {
        if self.lanes.len() != self.traffic_dir.len() {
            bail!(
                "{} lanes, but {} traffic directions",
                self.lanes.len(),
                self.traffic_dir.len()
            );
        }
        if let Some(kind) = self.lanes.iter().find(|kind| kind.is_transition()) {
            bail!("{:?} lanes can't be specified directly", kind);
        }
        if !self.lane_width.is_positive() {
            bail!("Lane width {} must be positive", self.lane_width);
        }
        for (name, dist) in [
            ("Left shoulder", self.shoulder_width_l),
            ("Right shoulder", self.shoulder_width_r),
            ("Gutter offset", self.gutter_profile.horizontal),
            ("Gutter drop", self.gutter_profile.drop),
        ] {
            if dist.is_negative() {
                bail!("{} {} can't be negative", name, dist);
            }
        }
        if !self.next_tangent_mag.is_finite() || !self.prior_tangent_mag.is_finite() {
            bail!("Tangent magnitudes must be finite");
        }
        Ok(())
    }

    /// Classifies the directions of travel, and finds the flip offset: the index of the first
    /// Forward lane when there are both directions, or the last index otherwise.
    pub fn direction_class(&self) -> Result<(DirectionClass, usize), MatchError> {
        if self.lanes.is_empty() {
            return Err(MatchError::NoLanes);
        }
        if self.lanes.len() != self.traffic_dir.len() {
            return Err(MatchError::MisalignedDirections {
                lanes: self.lanes.len(),
                directions: self.traffic_dir.len(),
            });
        }

        let mut first_forward = None;
        for (idx, dir) in self.traffic_dir.iter().enumerate() {
            match dir {
                LaneDirection::Forward => {
                    if first_forward.is_none() {
                        first_forward = Some(idx);
                    }
                }
                LaneDirection::Reverse => {
                    if first_forward.is_some() {
                        return Err(MatchError::ReverseAfterForward { idx });
                    }
                }
            }
        }

        let last = self.traffic_dir.len() - 1;
        Ok(match first_forward {
            None => (DirectionClass::ReverseOnly, last),
            Some(0) => (DirectionClass::ForwardOnly, last),
            Some(idx) => (DirectionClass::Both, idx),
        })
    }

    pub fn num_forward(&self) -> usize {
        self.traffic_dir
            .iter()
            .filter(|dir| **dir == LaneDirection::Forward)
            .count()
    }

    pub fn num_reverse(&self) -> usize {
        self.traffic_dir.len() - self.num_forward()
    }

    /// The outgoing curve handle
    pub fn tangent_out(&self) -> Pt3D {
        self.placement.basis.z * self.next_tangent_mag
    }

    /// The incoming curve handle, pointing the same way as `tangent_out`
    pub fn tangent_in(&self) -> Pt3D {
        self.placement.basis.z * self.prior_tangent_mag
    }

    /// Total width of all lanes, not counting shoulders
    pub fn road_width(&self) -> Distance {
        self.lane_width * (self.lanes.len() as f64)
    }
}
