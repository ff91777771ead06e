//! Hierarchical Pose Resolution
//!
//! Walks the object hierarchy parent-before-children and composes each
//! object's evaluated channel values with what it inherits from its parent:
//!
//! - **Anchor position**: a child's position is
//!   `PARENT_ANCHOR + parent.origin_offset + child.target_position`; a root
//!   object's position is its own `target_position`.
//! - **Effective alpha**: multiplicative down the ancestor chain.
//! - **Rotation / scale**: local values only. Matrix nesting is left to the
//!   renderer.
//!
//! Resolution is not incremental: every call re-evaluates every object.
//!
//! A malformed hierarchy (self-parenting, cycles, dangling child ids) is
//! detected with a visited set and a depth cap. The affected subtree is
//! skipped and reported; its siblings still resolve.

use glam::Vec3;
use reel_core::{ObjectId, ReelError};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::object::{LocalPose, SceneObject};
use crate::registry::SceneRegistry;

/// Offset from a parent's visual anchor to the pivot-at-base convention.
pub const PARENT_ANCHOR: Vec3 = Vec3::new(0.0, -0.5, 0.0);

/// Where local values come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseSource {
    /// Evaluate tracks at this (possibly fractional) frame.
    Animated(f32),
    /// Use base values only.
    Static,
}

/// Final per-object values handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPose {
    /// Anchor position in the parent's space.
    pub position: Vec3,
    /// Euler angles in degrees, local.
    pub rotation: Vec3,
    pub scale: Vec3,
    /// The object's own alpha.
    pub alpha: f32,
    /// Own alpha multiplied by every ancestor's alpha.
    pub effective_alpha: f32,
    pub visible: bool,
}

/// Output of one resolve pass.
#[derive(Debug, Default)]
pub struct Resolution {
    pub poses: FxHashMap<ObjectId, ResolvedPose>,
    /// Structural problems found on the way; the affected subtrees are
    /// missing from `poses`.
    pub errors: Vec<ReelError>,
}

impl Resolution {
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&ResolvedPose> {
        self.poses.get(&id)
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// What a child inherits from its parent.
#[derive(Debug, Clone, Copy)]
struct Inherited {
    origin_offset: Option<Vec3>,
    effective_alpha: f32,
}

impl Inherited {
    const ROOT: Self = Self {
        origin_offset: None,
        effective_alpha: 1.0,
    };
}

/// Reusable resolver. Keeps its traversal buffers between frames.
#[derive(Debug)]
pub struct PoseResolver {
    max_depth: usize,
    stack: Vec<(ObjectId, Inherited, usize)>,
    visited: FxHashSet<ObjectId>,
}

impl Default for PoseResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(SceneRegistry::MAX_DEPTH)
    }

    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            stack: Vec::with_capacity(64),
            visited: FxHashSet::default(),
        }
    }

    /// Resolves every object reachable from the registry's roots.
    pub fn resolve(&mut self, registry: &SceneRegistry, source: PoseSource) -> Resolution {
        let mut out = Resolution::default();
        self.visited.clear();
        self.stack.clear();
        for &root in registry.roots().iter().rev() {
            self.stack.push((root, Inherited::ROOT, 0));
        }
        self.run(registry, source, &mut out);
        out
    }

    /// Resolves `root` and its descendants. If `root` has a parent, what it
    /// inherits from its ancestors is taken into account.
    pub fn resolve_subtree(
        &mut self,
        registry: &SceneRegistry,
        root: ObjectId,
        source: PoseSource,
    ) -> Resolution {
        let mut out = Resolution::default();
        self.visited.clear();
        self.stack.clear();

        match self.inherited_for(registry, root, source) {
            Ok(inherited) => {
                self.stack.push((root, inherited, 0));
                self.run(registry, source, &mut out);
            }
            Err(err) => report(&mut out, err),
        }
        out
    }

    fn run(&mut self, registry: &SceneRegistry, source: PoseSource, out: &mut Resolution) {
        while let Some((id, inherited, depth)) = self.stack.pop() {
            if depth > self.max_depth {
                report(
                    out,
                    ReelError::StructuralError {
                        object: id,
                        reason: format!("hierarchy deeper than {} levels", self.max_depth),
                    },
                );
                continue;
            }
            if !self.visited.insert(id) {
                report(
                    out,
                    ReelError::StructuralError {
                        object: id,
                        reason: "object reached twice; hierarchy contains a cycle".to_owned(),
                    },
                );
                continue;
            }
            let Some(obj) = registry.get(id) else {
                report(
                    out,
                    ReelError::StructuralError {
                        object: id,
                        reason: "child id does not exist".to_owned(),
                    },
                );
                continue;
            };

            let pose = compose(obj, local_pose(obj, source), inherited);
            out.poses.insert(id, pose);

            let passed_down = Inherited {
                origin_offset: Some(obj.origin_offset),
                effective_alpha: pose.effective_alpha,
            };
            for &child in obj.children().iter().rev() {
                self.stack.push((child, passed_down, depth + 1));
            }
        }
    }

    /// Walks up from `id` to compute what it inherits.
    fn inherited_for(
        &self,
        registry: &SceneRegistry,
        id: ObjectId,
        source: PoseSource,
    ) -> Result<Inherited, ReelError> {
        let obj = registry.object(id)?;
        let Some(parent_id) = obj.parent() else {
            return Ok(Inherited::ROOT);
        };

        let parent = registry.get(parent_id).ok_or_else(|| ReelError::StructuralError {
            object: id,
            reason: format!("parent {parent_id} does not exist"),
        })?;

        let mut alpha = 1.0;
        let mut current = Some(parent_id);
        let mut seen = FxHashSet::default();
        while let Some(a) = current {
            if !seen.insert(a) || seen.len() > self.max_depth {
                return Err(ReelError::StructuralError {
                    object: id,
                    reason: "ancestor chain contains a cycle".to_owned(),
                });
            }
            let ancestor = registry.get(a).ok_or_else(|| ReelError::StructuralError {
                object: id,
                reason: format!("ancestor {a} does not exist"),
            })?;
            alpha *= local_pose(ancestor, source).alpha;
            current = ancestor.parent();
        }

        Ok(Inherited {
            origin_offset: Some(parent.origin_offset),
            effective_alpha: alpha,
        })
    }
}

fn local_pose(obj: &SceneObject, source: PoseSource) -> LocalPose {
    match source {
        PoseSource::Animated(frame) => obj.sample_local(frame),
        PoseSource::Static => obj.base_pose(),
    }
}

fn compose(obj: &SceneObject, local: LocalPose, inherited: Inherited) -> ResolvedPose {
    let position = match inherited.origin_offset {
        Some(parent_offset) => PARENT_ANCHOR + parent_offset + local.position,
        None => local.position,
    };
    ResolvedPose {
        position,
        rotation: local.rotation,
        scale: local.scale,
        alpha: local.alpha,
        effective_alpha: local.alpha * inherited.effective_alpha,
        visible: obj.visible,
    }
}

fn report(out: &mut Resolution, err: ReelError) {
    log::error!("Pose resolution skipped a subtree: {err}");
    out.errors.push(err);
}
