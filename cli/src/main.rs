//! Command-line tools for inspecting road segments without an engine around them.

#[macro_use]
extern crate log;

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use structopt::StructOpt;

use geom::{Distance, TriangleMesh};
use road_model::{
    loop_count, EndpointID, NetworkConfig, RebuildOutcome, RoadEndpoint, RoadSegment, SegmentID,
};

#[derive(StructOpt)]
#[structopt(name = "roadcli", about = "Tools for procedural road segments")]
enum Command {
    /// Print how the lanes at the start of a segment turn into the lanes at the end
    MatchLanes {
        /// The path to a JSON scenario file
        #[structopt(long)]
        input: String,
        /// Also write the matched lanes to this JSON file
        #[structopt(long)]
        output: Option<String>,
    },
    /// Build the mesh for one segment and write it as a Wavefront OBJ file
    BuildMesh {
        /// The path to a JSON scenario file
        #[structopt(long)]
        input: String,
        /// The OBJ file to write
        #[structopt(long)]
        output: String,
        /// Use a third as many cross-sections
        #[structopt(long)]
        low_poly: bool,
        /// Meters between cross-sections, replacing the scenario's default
        #[structopt(long)]
        density: Option<f64>,
    },
}

/// One segment and its two endpoints
#[derive(Serialize, Deserialize)]
struct Scenario {
    #[serde(default)]
    config: NetworkConfig,
    start: RoadEndpoint,
    end: RoadEndpoint,
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    match Command::from_args() {
        Command::MatchLanes { input, output } => match_lanes(abstutil::read_json(&input)?, output)?,
        Command::BuildMesh {
            input,
            output,
            low_poly,
            density,
        } => {
            let mesh = build_mesh(abstutil::read_json(&input)?, low_poly, density)?;
            abstutil::write_file(&output, &mesh.to_obj())?;
        }
    }
    Ok(())
}

fn match_lanes(scenario: Scenario, output: Option<String>) -> Result<()> {
    match road_model::match_lanes(&scenario.start, &scenario.end) {
        Ok(lanes) => {
            for (idx, lane) in lanes.iter().enumerate() {
                println!("{}: {}", idx, lane);
            }
            if let Some(path) = output {
                abstutil::write_json(&path, &lanes)?;
            }
        }
        Err(err) => println!("Lanes don't match: {}", err),
    }
    Ok(())
}

fn build_mesh(scenario: Scenario, low_poly: bool, density: Option<f64>) -> Result<TriangleMesh> {
    let mut cfg = scenario.config;
    if let Some(density) = density {
        if !density.is_finite() || density <= 0.0 {
            bail!("--density must be positive, not {}", density);
        }
        cfg.default_density = Distance::meters(density);
    }
    cfg.low_poly |= low_poly;

    let mut endpoints = BTreeMap::new();
    endpoints.insert(EndpointID(0), scenario.start);
    endpoints.insert(EndpointID(1), scenario.end);

    let mut segment =
        RoadSegment::new(SegmentID(0), EndpointID(0), EndpointID(1), &cfg, &mut ())?;
    match segment.check_rebuild(&endpoints) {
        RebuildOutcome::Rebuilt { lanes, triangles } => {
            if let Some(curve) = segment.curve() {
                info!(
                    "{} lanes along {}, {} loops, {} triangles",
                    lanes,
                    curve.length(),
                    loop_count(curve.length(), cfg.default_density, cfg.low_poly),
                    triangles
                );
            }
        }
        RebuildOutcome::Skipped { waiting_on } => {
            if let Some(Err(err)) = endpoints.get(&waiting_on).map(|ep| ep.validate()) {
                bail!("{} is invalid: {}", waiting_on, err);
            }
            bail!("{} isn't ready", waiting_on);
        }
        x => bail!("Couldn't build the segment: {:?}", x),
    }

    match segment.mesh() {
        Some(mesh) => Ok(mesh.clone()),
        None => bail!("Nothing was built"),
    }
}

#[cfg(test)]
mod tests {
    use geom::{Placement, Pt3D};
    use road_model::{LaneDirection, LaneKind, MatchedLane};

    use super::*;

    fn scenario() -> Scenario {
        let lanes = vec![(LaneKind::Slow, LaneDirection::Forward)];
        Scenario {
            config: NetworkConfig::default(),
            start: RoadEndpoint::new(Placement::at(Pt3D::ZERO)).with_lanes(lanes.clone()),
            end: RoadEndpoint::new(Placement::at(Pt3D::new(0.0, 0.0, 20.0))).with_lanes(lanes),
        }
    }

    #[test]
    fn scenario_json_uses_default_config() {
        let mut json: serde_json::Value = serde_json::to_value(scenario()).unwrap();
        json.as_object_mut().unwrap().remove("config");
        let loaded: Scenario = serde_json::from_value(json).unwrap();
        assert_eq!(loaded.config, NetworkConfig::default());
    }

    #[test]
    fn flags_override_config() {
        let mesh = build_mesh(scenario(), false, Some(2.0)).unwrap();
        assert_eq!(mesh.num_triangles(), 100);
        let mesh = build_mesh(scenario(), true, Some(2.0)).unwrap();
        assert_eq!(mesh.num_triangles(), 30);
        assert!(build_mesh(scenario(), false, Some(0.0)).is_err());
    }

    #[test]
    fn matched_lanes_written_as_json() {
        let dir = std::env::temp_dir().join(format!("roadcli_match_{}", std::process::id()));
        let path = dir.join("lanes.json").to_str().unwrap().to_string();

        let mut s = scenario();
        s.end = s
            .end
            .with_lanes(vec![(LaneKind::Slow, LaneDirection::Forward); 2]);
        match_lanes(s, Some(path.clone())).unwrap();
        let lanes: Vec<MatchedLane> = abstutil::read_json(&path).unwrap();
        assert_eq!(
            lanes,
            vec![
                MatchedLane::new(LaneKind::Slow, LaneDirection::Forward),
                MatchedLane::new(LaneKind::TransitionAdd, LaneDirection::Forward),
            ]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn invalid_endpoint_is_an_error() {
        let mut s = scenario();
        s.end.lane_width = Distance::ZERO;
        let err = build_mesh(s, false, None).unwrap_err();
        assert!(err.to_string().contains("Endpoint #1"));
    }
}
