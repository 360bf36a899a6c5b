use std::collections::{BTreeMap, BTreeSet, VecDeque};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use geom::{Distance, MaterialRef};

use crate::{EndpointID, RoadEndpoint, SegmentID};

/// Defaults shared by every segment in a network. Segments copy these at creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Distance between cross-sections along each segment's curve
    pub default_density: Distance,
    pub low_poly: bool,
    pub material: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> NetworkConfig {
        NetworkConfig {
            default_density: Distance::meters(4.0),
            low_poly: false,
            material: Some("road".to_string()),
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.default_density.is_positive() {
            bail!("Density {} must be positive", self.default_density);
        }
        Ok(())
    }

    pub fn material_ref(&self) -> Option<MaterialRef> {
        self.material.clone().map(MaterialRef)
    }
}

/// Whoever schedules rebuilds. Segments call this when they become dirty.
pub trait RebuildSink {
    fn rebuild_needed(&mut self, id: SegmentID);
}

/// For callers that poll `RoadSegment::is_dirty` instead.
impl RebuildSink for () {
    fn rebuild_needed(&mut self, _: SegmentID) {}
}

/// Segments waiting for a rebuild, in the order they asked. Asking twice doesn't queue twice.
#[derive(Default, Debug)]
pub struct RebuildQueue {
    queue: VecDeque<SegmentID>,
    queued: BTreeSet<SegmentID>,
}

impl RebuildQueue {
    pub fn new() -> RebuildQueue {
        RebuildQueue::default()
    }

    pub fn pop(&mut self) -> Option<SegmentID> {
        let id = self.queue.pop_front()?;
        self.queued.remove(&id);
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl RebuildSink for RebuildQueue {
    fn rebuild_needed(&mut self, id: SegmentID) {
        if self.queued.insert(id) {
            self.queue.push_back(id);
        }
    }
}

/// Where segments find their endpoints at rebuild time. Nothing is cached between rebuilds.
pub trait EndpointLookup {
    fn endpoint(&self, id: EndpointID) -> Option<&RoadEndpoint>;

    /// Endpoints may still be initializing. By default, an endpoint is ready once it exists and
    /// is valid.
    fn is_ready(&self, id: EndpointID) -> bool {
        self.endpoint(id)
            .map(|ep| ep.validate().is_ok())
            .unwrap_or(false)
    }
}

impl EndpointLookup for BTreeMap<EndpointID, RoadEndpoint> {
    fn endpoint(&self, id: EndpointID) -> Option<&RoadEndpoint> {
        self.get(&id)
    }
}
