// src/env.rs
//
// Gym-style step orchestrator on top of the control session.
//
// One step = one half-duplex exchange: send the pre-action command frame,
// apply the action, receive the new observation, score it. The command
// deliberately reflects actuator state *before* the new action lands —
// callers of the wire protocol must account for the one-step lag.
//
// State commits only on a successful exchange: a transport or framing
// failure surfaces as an error and leaves actuator pose, MI baseline, and
// step index exactly as they were before the call.

use serde::{Deserialize, Serialize};

use crate::actuator::{Action, ActuatorState};
use crate::config::Config;
use crate::reward::EpisodeState;
use crate::session::{ControlSession, SessionError};
use crate::telemetry::{NoopSink, ObservationSink};
use crate::types::Observation;

/// Result of a single environment step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepResult {
    /// The reward for this step: −action cost, plus the scaled MI delta on
    /// steps with an established baseline.
    pub reward: f64,
    /// The observation received from the peer.
    pub observation: Observation,
    /// Terminal flag. Always false from this component; termination is an
    /// external policy decision layered on top.
    pub done: bool,
}

/// The environment-style control loop consumed by the agent.
pub struct ControlEnv {
    cfg: Config,
    session: ControlSession,
    actuator: ActuatorState,
    episode: EpisodeState,
    sink: Box<dyn ObservationSink>,
}

impl ControlEnv {
    /// Bind the listener and set up a fresh episode.
    ///
    /// A bind failure is fatal; everything after this point is recoverable
    /// per step.
    pub fn bind(cfg: Config) -> Result<Self, SessionError> {
        let session = ControlSession::bind(&cfg.transport)?;
        let actuator = ActuatorState::from_config(&cfg.actuator);
        Ok(Self {
            cfg,
            session,
            actuator,
            episode: EpisodeState::new(),
            sink: Box::new(NoopSink),
        })
    }

    /// Replace the observation log sink.
    pub fn with_sink(mut self, sink: Box<dyn ObservationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Start a new episode: clear the MI baseline, step index, and reward,
    /// and reset the pose to its configured initial values. The transport
    /// is left untouched; the next `step` re-seeds from the peer.
    pub fn reset(&mut self) {
        self.episode = EpisodeState::new();
        self.actuator = ActuatorState::from_config(&self.cfg.actuator);
    }

    /// Perform one control step with the given action.
    ///
    /// Sequence: send the pre-action command frame, apply the action to a
    /// candidate pose, block for the observation, then commit. On the
    /// episode's first exchange the observation seeds the pose and the MI
    /// baseline instead of contributing a reward delta (the candidate pose
    /// is discarded; the action's cost still counts).
    pub fn step(&mut self, action: Action) -> Result<StepResult, SessionError> {
        self.session.ensure_peer()?;
        self.session.send_command(&self.actuator.as_command())?;

        let mut candidate = self.actuator;
        candidate.apply(action, &self.cfg.actuator);

        let obs = self.session.recv_observation()?;

        // Exchange succeeded: commit pose and scoring atomically.
        self.episode.begin_step(action.cost());
        let seeded = self.episode.observe(obs.mi, self.cfg.reward.mi_scale);
        self.actuator = if seeded {
            ActuatorState::from_observation(&obs)
        } else {
            candidate
        };

        self.sink.record(self.episode.step_index, &obs);

        Ok(StepResult {
            reward: self.episode.reward,
            observation: obs,
            done: self.episode.done,
        })
    }

    /// Current actuator pose.
    pub fn actuator(&self) -> &ActuatorState {
        &self.actuator
    }

    /// Current episode accounting state.
    pub fn episode(&self) -> &EpisodeState {
        &self.episode
    }

    /// The underlying session (state inspection, explicit recovery).
    pub fn session(&self) -> &ControlSession {
        &self.session
    }

    /// Mutable session access for explicit recovery actions such as
    /// dropping a wedged peer.
    pub fn session_mut(&mut self) -> &mut ControlSession {
        &mut self.session
    }

    /// The bound listen address (useful when configured with port 0).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.session.local_addr()
    }
}
