//! A pool of independently targeted flow fields sharing one obstacle layout.

use bevy::log::{debug, warn};
use bevy::prelude::Resource;
use fixedbitset::FixedBitSet;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::crowd::error::{CrowdError, Result};
use crate::crowd::fixed_math::{FixedNum, FixedVec2};
use crate::crowd::flow_field::FlowField;
use crate::crowd::profiling::profile;

/// Dimensions every field created by a pool shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldTemplate {
    pub width: usize,
    pub height: usize,
    pub cell_size: FixedNum,
    pub origin: FixedVec2,
}

/// Index of a field inside its [`FieldPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub usize);

/// Owns many flow fields, one per active destination.
///
/// The pool is constructed and passed around explicitly; there is no global
/// instance. Obstacle edits made through [`set_obstacle_all`](Self::set_obstacle_all)
/// reach every member and are remembered, so fields created later start from
/// the same layout.
///
/// Fields never share state, which lets [`rebuild_all_parallel`](Self::rebuild_all_parallel)
/// solve them on separate threads. Each individual solve stays sequential.
#[derive(Resource, Debug)]
pub struct FieldPool {
    template: FieldTemplate,
    obstacles: FixedBitSet,
    fields: Vec<FlowField>,
    by_target: FxHashMap<(usize, usize), FieldId>,
}

impl FieldPool {
    pub fn new(template: FieldTemplate) -> Result<Self> {
        // Validate the template once up front.
        FlowField::try_new(template.width, template.height, template.cell_size, template.origin)?;
        Ok(Self {
            template,
            obstacles: FixedBitSet::with_capacity(template.width * template.height),
            fields: Vec::new(),
            by_target: FxHashMap::default(),
        })
    }

    pub fn template(&self) -> FieldTemplate { self.template }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read access to every member, in insertion order.
    pub fn fields(&self) -> &[FlowField] {
        &self.fields
    }

    pub fn get(&self, id: FieldId) -> Option<&FlowField> {
        self.fields.get(id.0)
    }

    /// Mutable access to one field. Retargeting it through `solve` is allowed;
    /// [`field_for_target`](Self::field_for_target) notices the change.
    pub fn get_mut(&mut self, id: FieldId) -> Option<&mut FlowField> {
        self.fields.get_mut(id.0)
    }

    /// Add an externally built field as-is.
    pub fn push(&mut self, field: FlowField) -> FieldId {
        let id = FieldId(self.fields.len());
        if let Some(target) = field.target() {
            self.by_target.entry(target).or_insert(id);
        }
        self.fields.push(field);
        id
    }

    /// Field solved toward `target`, creating and solving one from the
    /// template (with the pool's obstacle layout) if none exists yet.
    pub fn field_for_target(&mut self, target: (usize, usize)) -> Result<FieldId> {
        if let Some(&id) = self.by_target.get(&target) {
            if self.fields[id.0].target() == Some(target) {
                return Ok(id);
            }
            self.by_target.remove(&target);
        }

        if let Some(pos) = self.fields.iter().position(|f| f.target() == Some(target)) {
            let id = FieldId(pos);
            self.by_target.insert(target, id);
            return Ok(id);
        }

        let FieldTemplate { width, height, cell_size, origin } = self.template;
        if target.0 >= width || target.1 >= height {
            return Err(CrowdError::TargetOutOfBounds {
                x: target.0,
                y: target.1,
                width,
                height,
            });
        }

        let mut field = FlowField::try_new(width, height, cell_size, origin)?;
        field.load_obstacles(&self.obstacles);
        field.solve(target)?;

        let id = FieldId(self.fields.len());
        self.fields.push(field);
        self.by_target.insert(target, id);
        debug!("[FIELD_POOL] Created field {:?} for target {:?}", id, target);
        Ok(id)
    }

    /// Apply an obstacle edit to every member (see [`FlowField::set_obstacle`])
    /// and remember it for fields created later. Out-of-range cells are ignored.
    pub fn set_obstacle_all(&mut self, x: usize, y: usize, is_obstacle: bool, radius: Option<usize>) {
        if x >= self.template.width || y >= self.template.height {
            return;
        }
        self.obstacles.set(y * self.template.width + x, is_obstacle);
        for field in &mut self.fields {
            field.set_obstacle(x, y, is_obstacle, radius);
        }
    }

    /// Full re-solve of every field toward its existing target, one after
    /// another. Fields without a target are skipped. Returns how many were
    /// solved.
    #[profile(16)]
    pub fn rebuild_all(&mut self) -> usize {
        let solved = self.fields.iter_mut().map(Self::rebuild_one).filter(|&ok| ok).count();
        debug!("[FIELD_POOL] Rebuilt {}/{} fields", solved, self.fields.len());
        solved
    }

    /// Same as [`rebuild_all`](Self::rebuild_all) but solves fields in
    /// parallel on the rayon thread pool.
    #[profile(16)]
    pub fn rebuild_all_parallel(&mut self) -> usize {
        let solved = self.fields.par_iter_mut().map(Self::rebuild_one).filter(|&ok| ok).count();
        debug!("[FIELD_POOL] Rebuilt {}/{} fields in parallel", solved, self.fields.len());
        solved
    }

    fn rebuild_one(field: &mut FlowField) -> bool {
        let Some(target) = field.target() else {
            return false;
        };
        match field.solve(target) {
            Ok(()) => true,
            Err(e) => {
                warn!("[FIELD_POOL] Rebuild failed: {}", e);
                false
            }
        }
    }
}
