// src/config.rs
//
// Central configuration for the viewlink control channel.
// This is the single source of truth for the externally tunable surface:
// listen address and timeouts, actuator step sizes and bounds, and the MI
// reward scale. Nothing in the state machines hardcodes these values.

use crate::session::ReconnectPolicy;

/// Environment variable consulted for the listen address when the CLI does
/// not provide one.
pub const LISTEN_ADDR_ENV: &str = "VIEWLINK_LISTEN_ADDR";

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Transport / session parameters.
    pub transport: TransportConfig,
    /// Actuator step sizes, bounds, and initial pose.
    pub actuator: ActuatorConfig,
    /// Reward shaping parameters.
    pub reward: RewardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            actuator: ActuatorConfig::default(),
            reward: RewardConfig::default(),
        }
    }
}

/// Transport and session parameters.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Address the listener binds to. Exactly one simulator peer is
    /// expected; the listener backlog is 1.
    pub listen_addr: String,
    /// Deadline for accepting a peer connection, in milliseconds.
    /// `None` blocks indefinitely.
    pub accept_timeout_ms: Option<u64>,
    /// Deadline for receiving an observation frame, in milliseconds.
    /// `None` blocks indefinitely (the original behaviour, which can hang
    /// forever on a silent peer).
    pub read_timeout_ms: Option<u64>,
    /// Whether the active connection persists across steps or is
    /// re-accepted on every step.
    pub reconnect: ReconnectPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8888".to_string(),
            accept_timeout_ms: Some(30_000),
            read_timeout_ms: Some(30_000),
            reconnect: ReconnectPolicy::Persistent,
        }
    }
}

/// Actuator step sizes, bounds, and initial pose.
///
/// Yaw and pitch wrap modulo 360; zoom clamps to `[zoom_min, zoom_max]`
/// inclusive. Step sizes are configuration, not constants, so the reward
/// shaping can be retuned without touching the state machine.
#[derive(Debug, Clone)]
pub struct ActuatorConfig {
    /// Rotation step in degrees for yaw and pitch actions.
    pub rot_step_deg: f32,
    /// Zoom step per zoom action.
    pub zoom_step: f32,
    /// Inclusive lower zoom bound. ZoomIn moves toward this bound.
    pub zoom_min: f32,
    /// Inclusive upper zoom bound. ZoomOut moves toward this bound.
    pub zoom_max: f32,
    /// Initial yaw in degrees.
    pub initial_yaw: f32,
    /// Initial pitch in degrees.
    pub initial_pitch: f32,
    /// Initial zoom. The first observation of an episode overwrites the
    /// pose, so this may sit outside the zoom bounds.
    pub initial_zoom: f32,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            rot_step_deg: 1.0,
            zoom_step: 0.1,
            zoom_min: -10.0,
            zoom_max: -5.0,
            initial_yaw: 0.0,
            initial_pitch: 0.0,
            initial_zoom: 0.0,
        }
    }
}

/// Reward shaping parameters.
#[derive(Debug, Clone)]
pub struct RewardConfig {
    /// Multiplier applied to the step-to-step MI delta.
    pub mi_scale: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self { mi_scale: 20.0 }
    }
}

/// Errors from configuration validation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A field holds a value the state machines cannot operate on.
    InvalidField { field: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidField { field, message } => {
                write!(f, "invalid config field '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Validate the tunable surface.
    ///
    /// The initial pose is deliberately unchecked: the first observation of
    /// an episode always overwrites it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
            ConfigError::InvalidField {
                field: field.to_string(),
                message: message.into(),
            }
        }

        if self.transport.listen_addr.is_empty() {
            return Err(invalid("transport.listen_addr", "must not be empty"));
        }
        if self.transport.accept_timeout_ms == Some(0) {
            return Err(invalid("transport.accept_timeout_ms", "use None to block, not 0"));
        }
        if self.transport.read_timeout_ms == Some(0) {
            return Err(invalid("transport.read_timeout_ms", "use None to block, not 0"));
        }
        if !(self.actuator.rot_step_deg > 0.0 && self.actuator.rot_step_deg < 360.0) {
            return Err(invalid("actuator.rot_step_deg", "must be in (0, 360)"));
        }
        if !(self.actuator.zoom_step > 0.0) {
            return Err(invalid("actuator.zoom_step", "must be positive"));
        }
        if !(self.actuator.zoom_min < self.actuator.zoom_max) {
            return Err(invalid("actuator.zoom_min", "must be below actuator.zoom_max"));
        }
        if !self.reward.mi_scale.is_finite() {
            return Err(invalid("reward.mi_scale", "must be finite"));
        }
        Ok(())
    }
}

/// Resolve the effective listen address.
///
/// Precedence: explicit CLI value, then `VIEWLINK_LISTEN_ADDR`, then the
/// built-in default.
pub fn resolve_listen_addr(cli: Option<&str>) -> String {
    if let Some(addr) = cli {
        return addr.to_string();
    }
    if let Ok(addr) = std::env::var(LISTEN_ADDR_ENV) {
        if !addr.trim().is_empty() {
            return addr;
        }
    }
    TransportConfig::default().listen_addr
}
