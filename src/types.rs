// src/types.rs
//
// Core data types shared across the protocol modules.

use serde::{Deserialize, Serialize};

use crate::codec::OBS_ARITY;

/// One decoded observation frame from the simulator.
///
/// Wire order is `[tag, yaw, pitch, zoom, mi]`. The tag slot is reserved:
/// the original protocol sketched a message-vs-data discriminator there that
/// can never fire on binary float frames, so it is carried through to the
/// telemetry log untouched and otherwise ignored by the state machine.
/// Immutable once decoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Reserved status/tag slot (wire index 0).
    pub tag: f32,
    /// Simulator-reported yaw in degrees (wire index 1).
    pub yaw: f32,
    /// Simulator-reported pitch in degrees (wire index 2).
    pub pitch: f32,
    /// Simulator-reported zoom (wire index 3).
    pub zoom: f32,
    /// Mutual-information feedback metric (wire index 4).
    pub mi: f32,
}

impl Observation {
    /// Build an observation from a decoded frame in wire order.
    pub fn from_values(values: [f32; OBS_ARITY]) -> Self {
        Self {
            tag: values[0],
            yaw: values[1],
            pitch: values[2],
            zoom: values[3],
            mi: values[4],
        }
    }

    /// The frame payload in wire order. Used by tests and scripted peers.
    pub fn to_values(&self) -> [f32; OBS_ARITY] {
        [self.tag, self.yaw, self.pitch, self.zoom, self.mi]
    }
}
