// src/actuator.rs
//
// Discrete action vocabulary and the actuator state machine.
//
// Yaw and pitch live in [0, 360) and wrap modularly: a rotation that would
// reach or exceed 360 lands at `step` past zero, and one that would reach or
// go below 0 lands at `360 - step`. Zoom saturates at its configured bounds
// instead of wrapping. Movement carries a fixed energy cost regardless of
// outcome, so the reward signal is driven primarily by the MI feedback
// metric rather than by idle thrashing.

use serde::{Deserialize, Serialize};

use crate::config::ActuatorConfig;
use crate::types::Observation;

/// The closed command vocabulary exposed to the agent.
///
/// The discrete action space is the integer range 0..=6 in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// No state change, no cost.
    Noop,
    /// Rotate yaw by `+rot_step_deg` (wrapping).
    RotateCw,
    /// Rotate yaw by `-rot_step_deg` (wrapping).
    RotateCcw,
    /// Move zoom toward `zoom_min` by `zoom_step` (clamped).
    ZoomIn,
    /// Move zoom toward `zoom_max` by `zoom_step` (clamped).
    ZoomOut,
    /// Rotate pitch by `+rot_step_deg` (wrapping).
    PitchN,
    /// Rotate pitch by `-rot_step_deg` (wrapping).
    PitchS,
}

/// All actions, in discrete-index order.
pub const ACTIONS: [Action; 7] = [
    Action::Noop,
    Action::RotateCw,
    Action::RotateCcw,
    Action::ZoomIn,
    Action::ZoomOut,
    Action::PitchN,
    Action::PitchS,
];

impl Action {
    /// Map a discrete agent action index (0..=6) to an action.
    pub fn from_index(index: usize) -> Option<Action> {
        ACTIONS.get(index).copied()
    }

    /// The discrete index of this action.
    pub fn index(self) -> usize {
        match self {
            Action::Noop => 0,
            Action::RotateCw => 1,
            Action::RotateCcw => 2,
            Action::ZoomIn => 3,
            Action::ZoomOut => 4,
            Action::PitchN => 5,
            Action::PitchS => 6,
        }
    }

    /// Fixed energy cost, in reward units, charged for applying this action.
    pub fn cost(self) -> f64 {
        match self {
            Action::Noop => 0.0,
            Action::RotateCw | Action::RotateCcw | Action::PitchN | Action::PitchS => 1.0,
            Action::ZoomIn | Action::ZoomOut => 2.0,
        }
    }

    /// Stable lowercase name for logs and run summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Noop => "noop",
            Action::RotateCw => "rotate_cw",
            Action::RotateCcw => "rotate_ccw",
            Action::ZoomIn => "zoom_in",
            Action::ZoomOut => "zoom_out",
            Action::PitchN => "pitch_n",
            Action::PitchS => "pitch_s",
        }
    }
}

/// The controllable yaw / pitch / zoom triple.
///
/// Mutated only by [`ActuatorState::apply`] and by baseline seeding from the
/// first observation of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorState {
    /// Yaw in degrees, kept in `[0, 360)`.
    pub yaw: f32,
    /// Pitch in degrees, kept in `[0, 360)`.
    pub pitch: f32,
    /// Zoom, kept in `[zoom_min, zoom_max]`.
    pub zoom: f32,
}

impl ActuatorState {
    /// Initial pose from configuration.
    pub fn from_config(cfg: &ActuatorConfig) -> Self {
        Self {
            yaw: cfg.initial_yaw,
            pitch: cfg.initial_pitch,
            zoom: cfg.initial_zoom,
        }
    }

    /// Pose reported by the simulator in an observation.
    pub fn from_observation(obs: &Observation) -> Self {
        Self {
            yaw: obs.yaw,
            pitch: obs.pitch,
            zoom: obs.zoom,
        }
    }

    /// The command frame payload, `[yaw, pitch, zoom]`.
    pub fn as_command(&self) -> [f32; 3] {
        [self.yaw, self.pitch, self.zoom]
    }

    /// Apply one discrete action, mutating the pose per the wrap/clamp
    /// rules. Cost accounting lives with the episode state, not here.
    pub fn apply(&mut self, action: Action, cfg: &ActuatorConfig) {
        match action {
            Action::Noop => {}
            Action::RotateCw => self.yaw = wrap_up(self.yaw, cfg.rot_step_deg),
            Action::RotateCcw => self.yaw = wrap_down(self.yaw, cfg.rot_step_deg),
            Action::PitchN => self.pitch = wrap_up(self.pitch, cfg.rot_step_deg),
            Action::PitchS => self.pitch = wrap_down(self.pitch, cfg.rot_step_deg),
            Action::ZoomIn => {
                self.zoom = clamp_down(self.zoom, cfg.zoom_step, cfg.zoom_min)
            }
            Action::ZoomOut => {
                self.zoom = clamp_up(self.zoom, cfg.zoom_step, cfg.zoom_max)
            }
        }
    }
}

/// Wrap `v + step` into `[0, 360)`: reaching or exceeding 360 lands at
/// `step` past zero.
fn wrap_up(v: f32, step: f32) -> f32 {
    if v + step >= 360.0 {
        step
    } else {
        v + step
    }
}

/// Wrap `v - step` into `[0, 360)`: reaching or going below 0 lands at
/// `360 - step`.
fn wrap_down(v: f32, step: f32) -> f32 {
    if v - step <= 0.0 {
        360.0 - step
    } else {
        v - step
    }
}

/// Saturating decrement: never goes below `min`.
fn clamp_down(v: f32, step: f32, min: f32) -> f32 {
    if v - step <= min {
        min
    } else {
        v - step
    }
}

/// Saturating increment: never goes above `max`.
fn clamp_up(v: f32, step: f32, max: f32) -> f32 {
    if v + step >= max {
        max
    } else {
        v + step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ActuatorConfig {
        ActuatorConfig::default()
    }

    fn pose(yaw: f32, pitch: f32, zoom: f32) -> ActuatorState {
        ActuatorState { yaw, pitch, zoom }
    }

    #[test]
    fn test_action_index_round_trip() {
        for (i, action) in ACTIONS.iter().enumerate() {
            assert_eq!(Action::from_index(i), Some(*action));
            assert_eq!(action.index(), i);
        }
        assert_eq!(Action::from_index(7), None);
    }

    #[test]
    fn test_action_costs() {
        assert_eq!(Action::Noop.cost(), 0.0);
        assert_eq!(Action::RotateCw.cost(), 1.0);
        assert_eq!(Action::RotateCcw.cost(), 1.0);
        assert_eq!(Action::PitchN.cost(), 1.0);
        assert_eq!(Action::PitchS.cost(), 1.0);
        assert_eq!(Action::ZoomIn.cost(), 2.0);
        assert_eq!(Action::ZoomOut.cost(), 2.0);
    }

    #[test]
    fn test_rotate_cw_wraps_at_360() {
        let mut s = pose(359.0, 0.0, -7.0);
        s.apply(Action::RotateCw, &cfg());
        assert_eq!(s.yaw, 1.0);
    }

    #[test]
    fn test_rotate_ccw_wraps_at_zero() {
        let mut s = pose(0.5, 0.0, -7.0);
        s.apply(Action::RotateCcw, &cfg());
        assert_eq!(s.yaw, 359.0);
    }

    #[test]
    fn test_pitch_wraps_like_yaw() {
        let mut s = pose(0.0, 359.0, -7.0);
        s.apply(Action::PitchN, &cfg());
        assert_eq!(s.pitch, 1.0);
        s.apply(Action::PitchS, &cfg());
        assert_eq!(s.pitch, 359.0, "inverse rotation restores the pitch");
    }

    #[test]
    fn test_rotation_stays_in_range_over_full_sweep() {
        let c = cfg();
        let mut s = pose(0.25, 0.0, -7.0);
        for _ in 0..1000 {
            s.apply(Action::RotateCw, &c);
            assert!(s.yaw >= 0.0 && s.yaw < 360.0, "yaw left [0,360): {}", s.yaw);
        }
        for _ in 0..1000 {
            s.apply(Action::RotateCcw, &c);
            assert!(s.yaw >= 0.0 && s.yaw < 360.0, "yaw left [0,360): {}", s.yaw);
        }
    }

    #[test]
    fn test_rotate_cw_then_ccw_restores_yaw_exactly() {
        let c = cfg();
        for start in [0.5_f32, 10.0, 180.0, 359.0] {
            let mut s = pose(start, 0.0, -7.0);
            s.apply(Action::RotateCw, &c);
            s.apply(Action::RotateCcw, &c);
            assert_eq!(s.yaw, start, "start {}", start);
        }
    }

    #[test]
    fn test_zoom_in_clamps_at_lower_bound() {
        let mut s = pose(0.0, 0.0, -9.95);
        s.apply(Action::ZoomIn, &cfg());
        assert_eq!(s.zoom, -10.0);
    }

    #[test]
    fn test_repeated_zoom_in_converges_and_stays_at_min() {
        let c = cfg();
        let mut s = pose(0.0, 0.0, -5.0);
        for _ in 0..200 {
            s.apply(Action::ZoomIn, &c);
            assert!(
                s.zoom >= c.zoom_min && s.zoom <= c.zoom_max,
                "zoom left bounds: {}",
                s.zoom
            );
        }
        assert_eq!(s.zoom, c.zoom_min);
        s.apply(Action::ZoomIn, &c);
        assert_eq!(s.zoom, c.zoom_min, "saturated zoom must not move");
    }

    #[test]
    fn test_zoom_out_clamps_at_upper_bound() {
        let c = cfg();
        let mut s = pose(0.0, 0.0, -5.05);
        s.apply(Action::ZoomOut, &c);
        assert_eq!(s.zoom, c.zoom_max);
        s.apply(Action::ZoomOut, &c);
        assert_eq!(s.zoom, c.zoom_max);
    }

    #[test]
    fn test_noop_leaves_pose_untouched() {
        let mut s = pose(42.0, 17.0, -7.5);
        let before = s;
        s.apply(Action::Noop, &cfg());
        assert_eq!(s, before);
    }

    #[test]
    fn test_step_sizes_come_from_config() {
        let c = ActuatorConfig {
            rot_step_deg: 15.0,
            zoom_step: 1.0,
            ..ActuatorConfig::default()
        };
        let mut s = pose(350.0, 0.0, -7.0);
        s.apply(Action::RotateCw, &c);
        assert_eq!(s.yaw, 15.0, "wrap lands at the configured step");
        s.apply(Action::ZoomIn, &c);
        assert_eq!(s.zoom, -8.0);
    }
}
