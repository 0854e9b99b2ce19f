//! Flow-field navigation and local crowd avoidance.
//!
//! Built bottom-up: a [`FlowField`] grid solves per-cell directions toward a
//! target, a [`SpatialHash`] buckets agents for neighbour lookup, the
//! [`avoidance`] step turns a sampled direction plus nearby agents into a
//! velocity, and a [`FieldPool`] owns many independently targeted fields.

pub mod avoidance;
pub mod config;
pub mod error;
pub mod fixed_math;
pub mod flow_field;
pub mod pool;
pub mod profiling;
pub mod spatial_hash;

pub use avoidance::{compute_velocity, AgentState, Crowd};
pub use config::CrowdConfig;
pub use error::{CrowdError, Result};
pub use fixed_math::{FixedNum, FixedVec2};
pub use flow_field::{FlowDir, FlowField, UNREACHED};
pub use pool::{FieldId, FieldPool, FieldTemplate};
pub use spatial_hash::SpatialHash;
