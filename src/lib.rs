//! Viewlink core library.
//!
//! Viewlink is the control channel between a reinforcement-learning agent
//! process and an external view simulator. The agent issues discrete
//! actuator commands (yaw / pitch / zoom), the simulator answers with an
//! observation vector carrying a mutual-information (MI) feedback metric,
//! and the channel turns the exchange into a per-step reward.
//!
//! # Architecture
//!
//! The codebase keeps a clean separation between the protocol state machine
//! and I/O:
//!
//! - **Codec** (`codec`): pure encode/decode of fixed-arity f32 frames.
//!   No I/O, no state.
//!
//! - **Actuator** (`actuator`): the closed `Action` vocabulary and the
//!   wrap/clamp rules for the yaw/pitch/zoom triple, with per-action cost.
//!
//! - **Reward** (`reward`): `EpisodeState` accounting — action cost plus the
//!   scaled step-to-step MI delta, with an explicit baseline flag for the
//!   first observation of an episode.
//!
//! - **Session** (`session`): the single listener + single peer connection
//!   and the strictly half-duplex exchange (send one command frame, block
//!   for one observation frame).
//!
//! - **Env** (`env`): gym-style `reset` / `step(Action)` orchestrator that
//!   sequences actuator, session, and reward, and never commits state on a
//!   failed exchange.
//!
//! - **Telemetry** (`telemetry`): append-only observation log side channel
//!   behind an `ObservationSink` trait. Swappable for noop/CSV.
//!
//! The binary (`src/main.rs`) is just a thin research harness around these
//! components.

pub mod actuator;
pub mod codec;
pub mod config;
pub mod env;
pub mod reward;
pub mod session;
pub mod telemetry;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use actuator::{Action, ActuatorState, ACTIONS};
pub use codec::{decode_frame, encode_frame, FrameError, CMD_ARITY, OBS_ARITY};
pub use config::{ActuatorConfig, Config, ConfigError, RewardConfig, TransportConfig};
pub use env::{ControlEnv, StepResult};
pub use reward::EpisodeState;
pub use session::{ControlSession, ReconnectPolicy, SessionError, SessionState};
pub use telemetry::{CsvSink, NoopSink, ObservationSink};
pub use types::Observation;
