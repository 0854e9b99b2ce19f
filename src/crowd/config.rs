use std::path::Path;

use bevy::log::{error, info};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::crowd::avoidance::AgentState;
use crate::crowd::error::{CrowdError, Result};
use crate::crowd::fixed_math::{FixedNum, FixedVec2};
use crate::crowd::pool::FieldTemplate;

/// Navigation settings, loaded once from a RON file.
///
/// Values are plain floats for readable config files and are converted to
/// fixed-point once, at the boundary, through the `fixed_*` helpers.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CrowdConfig {
    // Flow field grid
    pub grid_width: usize,
    pub grid_height: usize,
    pub cell_size: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    /// Window radius for obstacle repairs; `None` repairs the whole grid.
    pub repair_radius: Option<usize>,

    // Spatial index
    pub bucket_size: f32,

    // Avoidance
    pub neighbor_distance: f32,
    pub time_horizon: f32,
    pub agent_radius: f32,
    pub max_speed: f32,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            grid_width: 100,
            grid_height: 100,
            cell_size: 1.0,
            origin_x: 0.0,
            origin_y: 0.0,
            repair_radius: Some(8),
            bucket_size: 4.0,
            neighbor_distance: 3.0,
            time_horizon: 2.0,
            agent_radius: 0.5,
            max_speed: 4.0,
        }
    }
}

impl CrowdConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self> {
        Ok(ron::from_str::<CrowdConfig>(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CrowdError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&contents)?;
        info!("Loaded crowd config from {}", path.display());
        Ok(config)
    }

    /// Load `path`, falling back to defaults (with an error logged) when the
    /// file is missing or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                error!("Using default CrowdConfig");
                Self::default()
            }
        }
    }

    pub fn fixed_bucket_size(&self) -> FixedNum {
        FixedNum::from_num(self.bucket_size)
    }

    pub fn fixed_neighbor_distance(&self) -> FixedNum {
        FixedNum::from_num(self.neighbor_distance)
    }

    pub fn field_template(&self) -> FieldTemplate {
        FieldTemplate {
            width: self.grid_width,
            height: self.grid_height,
            cell_size: FixedNum::from_num(self.cell_size),
            origin: FixedVec2::from_f32(self.origin_x, self.origin_y),
        }
    }

    /// Fresh agent at `position` using the configured radius, speed and horizon.
    pub fn agent_state(&self, position: FixedVec2) -> AgentState {
        AgentState::new(
            position,
            FixedNum::from_num(self.agent_radius),
            FixedNum::from_num(self.max_speed),
            FixedNum::from_num(self.time_horizon),
        )
    }
}
