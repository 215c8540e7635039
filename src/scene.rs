//! Scene state owned by the host and the immutable per-frame snapshot the
//! renderer reads.

use crate::ocean::Ocean;
use crate::sky::Sky;

/// Everything the kernel shades: one ocean and one sky.
///
/// Plain `Copy` data so a frame can hold its own snapshot while the host
/// keeps editing the live state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scene {
    /// Wave field and its bounding volume
    pub ocean: Ocean,
    /// Background and reflected radiance
    pub sky: Sky,
}

/// Live, editable scene.
///
/// Edits go through setters so the ocean's bounding volume always matches its
/// depth. Take a [`SceneState::snapshot`] before each render call; edits made
/// afterwards only show up in the next snapshot.
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    scene: Scene,
    revision: u64,
}

impl SceneState {
    /// Take ownership of `scene`, fixing its box floor if needed.
    pub fn new(scene: Scene) -> Self {
        let mut state = Self { scene, revision: 0 };
        // re-establish the floor invariant for hand-built oceans
        let depth = state.scene.ocean.depth;
        state.scene.ocean.set_depth(depth);
        state
    }

    /// Immutable copy for one render call.
    pub fn snapshot(&self) -> Scene {
        self.scene
    }

    /// Number of edits applied so far. A render session compares it between
    /// frames to restart accumulation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Set the ocean depth; the box floor follows.
    pub fn set_depth(&mut self, depth: f32) {
        self.scene.ocean.set_depth(depth);
        self.revision += 1;
    }

    /// Set the base wave frequency.
    pub fn set_phase(&mut self, phase: f32) {
        self.scene.ocean.phase = phase;
        self.revision += 1;
    }

    /// Set the base wave speed.
    pub fn set_speed(&mut self, speed: f32) {
        self.scene.ocean.speed = speed;
        self.revision += 1;
    }

    /// Set the domain warp strength.
    pub fn set_drag(&mut self, drag: f32) {
        self.scene.ocean.drag = drag;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_isolated_from_later_edits() {
        let mut state = SceneState::new(Scene::default());
        let before = state.snapshot();
        state.set_depth(4.0);
        state.set_speed(9.0);

        assert_eq!(before.ocean.depth, 2.0);
        assert_eq!(before.ocean.bbox.min.y, -2.0);

        let after = state.snapshot();
        assert_eq!(after.ocean.depth, 4.0);
        assert_eq!(after.ocean.bbox.min.y, -4.0);
        assert_eq!(after.ocean.speed, 9.0);
        assert_eq!(state.revision(), 2);
    }

    #[test]
    fn new_repairs_out_of_sync_floor() {
        let mut scene = Scene::default();
        scene.ocean.depth = 3.0;
        let state = SceneState::new(scene);
        assert_eq!(state.snapshot().ocean.bbox.min.y, -3.0);
    }
}
