use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use geom::{CollisionMesh, Distance, MaterialRef, Pt3D, Spline, TriangleMesh};

use crate::lane_paths::{make_lane_paths, LanePath};
use crate::make::geometry::{build_road_mesh, BuildOptions};
use crate::make::lanes::match_lanes_or_warn;
use crate::make::road_control_points;
use crate::{EndpointLookup, MatchedLane, NetworkConfig, RebuildSink, RoadEndpoint};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentID(pub usize);

impl fmt::Display for SegmentID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Segment #{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointID(pub usize);

impl fmt::Display for EndpointID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Endpoint #{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebuildState {
    /// The mesh matches the endpoints
    Clean,
    /// Something changed; the next `check_rebuild` will rebuild
    Dirty,
    /// A rebuild was skipped because an endpoint wasn't ready. Waits for the next change instead
    /// of retrying every time it's checked.
    PendingRetry,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RebuildOutcome {
    NotDirty,
    /// One of the endpoints was never assigned. Nothing changes.
    MissingEndpoint,
    Skipped {
        waiting_on: EndpointID,
    },
    Rebuilt {
        lanes: usize,
        triangles: usize,
    },
}

// Only allocated on the first rebuild
struct SegmentMesh {
    mesh: TriangleMesh,
    collision: CollisionMesh,
}

/// The road surface between two endpoints. Endpoints are only borrowed at rebuild time.
pub struct RoadSegment {
    id: SegmentID,
    start: Option<EndpointID>,
    end: Option<EndpointID>,
    /// Midpoint of the two endpoints. The curve, mesh and lane paths are all relative to this.
    origin: Pt3D,
    density: Distance,
    low_poly: bool,
    material: Option<MaterialRef>,
    state: RebuildState,

    curve: Option<Spline>,
    lanes: Vec<MatchedLane>,
    mesh: Option<SegmentMesh>,
    lane_paths: Vec<LanePath>,
}

impl RoadSegment {
    /// Starts out dirty, and tells the sink it needs a first build. Fails if the network's config
    /// is unusable.
    pub fn new(
        id: SegmentID,
        start: EndpointID,
        end: EndpointID,
        cfg: &NetworkConfig,
        sink: &mut dyn RebuildSink,
    ) -> Result<RoadSegment> {
        cfg.validate()
            .with_context(|| format!("Can't create {}", id))?;
        sink.rebuild_needed(id);
        Ok(RoadSegment {
            id,
            start: Some(start),
            end: Some(end),
            origin: Pt3D::ZERO,
            density: cfg.default_density,
            low_poly: cfg.low_poly,
            material: cfg.material_ref(),
            state: RebuildState::Dirty,

            curve: None,
            lanes: Vec::new(),
            mesh: None,
            lane_paths: Vec::new(),
        })
    }

    pub fn id(&self) -> SegmentID {
        self.id
    }

    pub fn endpoints(&self) -> (Option<EndpointID>, Option<EndpointID>) {
        (self.start, self.end)
    }

    pub fn state(&self) -> RebuildState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == RebuildState::Dirty
    }

    pub fn density(&self) -> Distance {
        self.density
    }

    pub fn low_poly(&self) -> bool {
        self.low_poly
    }

    pub fn origin(&self) -> Pt3D {
        self.origin
    }

    /// None until the first successful rebuild
    pub fn curve(&self) -> Option<&Spline> {
        self.curve.as_ref()
    }

    /// Empty if lane matching failed
    pub fn lanes(&self) -> &Vec<MatchedLane> {
        &self.lanes
    }

    pub fn mesh(&self) -> Option<&TriangleMesh> {
        self.mesh.as_ref().map(|m| &m.mesh)
    }

    pub fn collision_mesh(&self) -> Option<&CollisionMesh> {
        self.mesh.as_ref().map(|m| &m.collision)
    }

    pub fn lane_paths(&self) -> &Vec<LanePath> {
        &self.lane_paths
    }

    /// Notifies the sink only when the segment wasn't already dirty.
    pub fn mark_dirty(&mut self, sink: &mut dyn RebuildSink) {
        if self.state != RebuildState::Dirty {
            self.state = RebuildState::Dirty;
            sink.rebuild_needed(self.id);
        }
    }

    /// Call when an endpoint's geometry or lanes change. Returns true if this segment uses it.
    pub fn endpoint_changed(&mut self, id: EndpointID, sink: &mut dyn RebuildSink) -> bool {
        if self.start == Some(id) || self.end == Some(id) {
            self.mark_dirty(sink);
            true
        } else {
            false
        }
    }

    pub fn set_endpoints(
        &mut self,
        start: Option<EndpointID>,
        end: Option<EndpointID>,
        sink: &mut dyn RebuildSink,
    ) {
        if (self.start, self.end) != (start, end) {
            self.start = start;
            self.end = end;
            self.mark_dirty(sink);
        }
    }

    /// A positive density replaces this segment's current one. Anything else keeps it.
    pub fn set_density_override(&mut self, density: f64, sink: &mut dyn RebuildSink) {
        if !density.is_finite() || density <= 0.0 {
            debug!("{} ignoring density override {}", self.id, density);
            return;
        }
        let density = Distance::meters(density);
        if density != self.density {
            self.density = density;
            self.mark_dirty(sink);
        }
    }

    pub fn set_low_poly(&mut self, low_poly: bool, sink: &mut dyn RebuildSink) {
        if self.low_poly != low_poly {
            self.low_poly = low_poly;
            self.mark_dirty(sink);
        }
    }

    /// Applies to the existing mesh immediately; no rebuild needed.
    pub fn set_material(&mut self, material: Option<MaterialRef>) {
        if let Some(m) = &mut self.mesh {
            m.mesh.set_material(material.clone());
        }
        self.material = material;
    }

    /// Rebuilds if dirty and both endpoints are ready. Never fails: bad lane configurations
    /// produce an empty mesh, and unready endpoints postpone the rebuild.
    pub fn check_rebuild(&mut self, endpoints: &impl EndpointLookup) -> RebuildOutcome {
        if self.state != RebuildState::Dirty {
            return RebuildOutcome::NotDirty;
        }
        let (start_id, end_id) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                warn!("{} is missing an endpoint, not rebuilding", self.id);
                return RebuildOutcome::MissingEndpoint;
            }
        };

        let start = match ready_endpoint(endpoints, start_id) {
            Some(ep) => ep,
            None => return self.skip(start_id),
        };
        let end = match ready_endpoint(endpoints, end_id) {
            Some(ep) => ep,
            None => return self.skip(end_id),
        };

        self.rebuild(start, end)
    }

    fn skip(&mut self, waiting_on: EndpointID) -> RebuildOutcome {
        warn!(
            "{} skipping rebuild, {} isn't ready yet",
            self.id, waiting_on
        );
        self.state = RebuildState::PendingRetry;
        RebuildOutcome::Skipped { waiting_on }
    }

    fn rebuild(&mut self, start: &RoadEndpoint, end: &RoadEndpoint) -> RebuildOutcome {
        self.origin = start.placement.pos.midpoint(end.placement.pos);
        let (p0, p1) = road_control_points(start, end, self.origin);
        let curve = match self.curve.take() {
            // Only re-bakes if the control points or density moved
            Some(mut curve) => {
                curve.set_bake_interval(self.density);
                curve.set_points(p0, p1);
                curve
            }
            None => Spline::new(p0, p1, self.density),
        };
        self.lanes = match_lanes_or_warn(start, end);
        self.lane_paths.clear();

        let mesh = build_road_mesh(
            &curve,
            &self.lanes,
            start,
            end,
            self.origin,
            &BuildOptions {
                density: self.density,
                low_poly: self.low_poly,
                material: self.material.clone(),
            },
        );
        let triangles = mesh.num_triangles();
        let collision = mesh.collision_mesh();
        self.mesh = Some(SegmentMesh { mesh, collision });
        self.curve = Some(curve);
        self.state = RebuildState::Clean;

        debug!(
            "Rebuilt {} with {} lanes and {} triangles",
            self.id,
            self.lanes.len(),
            triangles
        );
        RebuildOutcome::Rebuilt {
            lanes: self.lanes.len(),
            triangles,
        }
    }

    /// Creates a path for every matched lane, replacing any made before. Does nothing and returns
    /// false if the segment isn't freshly built or has no lanes.
    pub fn generate_lane_paths(&mut self, endpoints: &impl EndpointLookup) -> bool {
        self.lane_paths.clear();
        if self.state != RebuildState::Clean || self.lanes.is_empty() {
            return false;
        }
        let (start, end) = match (
            self.start.and_then(|id| ready_endpoint(endpoints, id)),
            self.end.and_then(|id| ready_endpoint(endpoints, id)),
        ) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                warn!("{} can't make lane paths, endpoints aren't ready", self.id);
                return false;
            }
        };
        self.lane_paths = make_lane_paths(&self.lanes, start, end, self.origin, self.density);
        true
    }
}

fn ready_endpoint(endpoints: &impl EndpointLookup, id: EndpointID) -> Option<&RoadEndpoint> {
    if endpoints.is_ready(id) {
        endpoints.endpoint(id)
    } else {
        None
    }
}
