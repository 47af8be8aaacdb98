// src/reward.rs
//
// Reward accounting for one episode.
//
// Reward is a pure function of (action cost, MI delta): each step starts
// from zero, pays the action's fixed cost, and — once an MI baseline
// exists — earns the scaled step-to-step MI delta. The very first
// observation of an episode only establishes the baseline; no delta is
// computed for it because there is no prior MI to compare against.

/// Per-episode accounting state.
///
/// `has_baseline` replaces a positional step counter: the first-exchange
/// path is an explicit flag, not an index comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeState {
    /// Reward of the current step. Reset every step.
    pub reward: f64,
    /// Last observed MI value. Persists across steps within an episode.
    pub mi: f32,
    /// Number of completed exchanges this episode.
    pub step_index: u64,
    /// Whether an MI baseline has been seeded from an observation.
    pub has_baseline: bool,
    /// Terminal flag. Never set true by the protocol itself; termination is
    /// a caller-driven policy decision.
    pub done: bool,
}

impl EpisodeState {
    /// Fresh episode: no baseline, zero reward.
    pub fn new() -> Self {
        Self {
            reward: 0.0,
            mi: 0.0,
            step_index: 0,
            has_baseline: false,
            done: false,
        }
    }

    /// Start a step: reset the accumulator and charge the action's cost.
    pub fn begin_step(&mut self, cost: f64) {
        self.reward = -cost;
    }

    /// Account for the step's observation.
    ///
    /// Adds `(mi - previous_mi) * mi_scale` when a baseline exists, then
    /// records `mi` as the new baseline. Returns `true` when this call
    /// seeded the baseline (the caller seeds actuator state from the same
    /// observation in that case).
    pub fn observe(&mut self, mi: f32, mi_scale: f64) -> bool {
        let seeded = !self.has_baseline;
        if self.has_baseline {
            self.reward += f64::from(mi - self.mi) * mi_scale;
        } else {
            self.has_baseline = true;
        }
        self.mi = mi;
        self.step_index += 1;
        seeded
    }
}

impl Default for EpisodeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-5;

    #[test]
    fn test_first_step_reward_is_exactly_the_cost() {
        let mut ep = EpisodeState::new();
        ep.begin_step(1.0);
        let seeded = ep.observe(0.4, 20.0);
        assert!(seeded, "first observation must seed the baseline");
        assert_eq!(ep.reward, -1.0, "no MI term on the seeding step");
        assert_eq!(ep.mi, 0.4);
        assert_eq!(ep.step_index, 1);
    }

    #[test]
    fn test_second_step_adds_scaled_mi_delta() {
        let mut ep = EpisodeState::new();
        ep.begin_step(0.0);
        ep.observe(0.4, 20.0);

        ep.begin_step(0.0);
        let seeded = ep.observe(0.5, 20.0);
        assert!(!seeded);
        // 0 + (0.5 - 0.4) * 20 = 2.0
        assert!((ep.reward - 2.0).abs() < EPS, "reward {}", ep.reward);
        assert_eq!(ep.mi, 0.5);
        assert_eq!(ep.step_index, 2);
    }

    #[test]
    fn test_cost_and_mi_delta_combine() {
        let mut ep = EpisodeState::new();
        ep.begin_step(0.0);
        ep.observe(0.4, 20.0);

        ep.begin_step(2.0);
        ep.observe(0.45, 20.0);
        // -2 + (0.45 - 0.40) * 20 = -1.0
        assert!((ep.reward + 1.0).abs() < EPS, "reward {}", ep.reward);
    }

    #[test]
    fn test_negative_mi_delta_penalises() {
        let mut ep = EpisodeState::new();
        ep.begin_step(0.0);
        ep.observe(0.5, 20.0);

        ep.begin_step(1.0);
        ep.observe(0.4, 20.0);
        // -1 + (0.4 - 0.5) * 20 = -3.0
        assert!((ep.reward + 3.0).abs() < EPS, "reward {}", ep.reward);
    }

    #[test]
    fn test_reward_resets_every_step() {
        let mut ep = EpisodeState::new();
        ep.begin_step(0.0);
        ep.observe(0.4, 20.0);
        ep.begin_step(0.0);
        ep.observe(0.9, 20.0);
        assert!(ep.reward > 0.0);

        // The accumulator does not carry the previous step's reward over.
        ep.begin_step(1.0);
        ep.observe(ep.mi, 20.0);
        assert!((ep.reward + 1.0).abs() < EPS, "reward {}", ep.reward);
    }

    #[test]
    fn test_scale_factor_is_configurable() {
        let mut ep = EpisodeState::new();
        ep.begin_step(0.0);
        ep.observe(0.0, 5.0);
        ep.begin_step(0.0);
        ep.observe(1.0, 5.0);
        assert!((ep.reward - 5.0).abs() < EPS, "reward {}", ep.reward);
    }

    #[test]
    fn test_done_is_never_set_internally() {
        let mut ep = EpisodeState::new();
        for i in 0..50 {
            ep.begin_step(1.0);
            ep.observe(i as f32 * 0.01, 20.0);
        }
        assert!(!ep.done);
    }
}
