//! Replication View
//!
//! Per-connection interest filter. A connection's view is replaced wholesale
//! by the session layer whenever its observer moves; prioritization and
//! relevancy checks read it each tick. A connection may have several view
//! targets at once (split screen, spectator cameras).

use serde::{Deserialize, Serialize};

/// One observer position contributing to a connection's interest set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTarget {
    /// World position of the observer.
    pub pos: [f32; 3],
    /// Facing direction, used for priority scaling.
    pub dir: [f32; 3],
    /// Radius inside which objects are always relevant.
    pub view_radius: f32,
    /// Field of view in radians.
    pub fov_radians: f32,
}

impl Default for ViewTarget {
    fn default() -> Self {
        Self {
            pos: [0.0; 3],
            dir: [0.0, 0.0, 1.0],
            view_radius: 0.0,
            fov_radians: std::f32::consts::FRAC_PI_2,
        }
    }
}

/// Interest filter for one connection. The default view is empty: nothing is
/// prioritized by distance and everything falls back to global relevancy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationView {
    pub targets: Vec<ViewTarget>,
}

impl ReplicationView {
    /// A view with a single target.
    pub fn single(target: ViewTarget) -> Self {
        Self {
            targets: vec![target],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
