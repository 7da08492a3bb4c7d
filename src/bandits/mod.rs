//! Multi-armed bandits: agents that estimate action values from sampled
//! rewards, and the Gaussian reward sources they are run against. The
//! interaction loop is owned by the caller, once per timestep:
//! `select` → `reward` → `observe` → `update`.

pub mod agents;
pub mod envs;

use crate::common::defs::Continous;

/// Selects arms and folds observed rewards into internal estimates.
pub trait BanditAgent {
    fn n_arms(&self) -> usize;

    /// Choose the arm for this timestep and record it in the history.
    fn select(&mut self) -> usize;

    /// Record the reward for the most recent selection.
    fn observe(&mut self, reward: Continous);

    /// Fold the most recent reward into the estimates.
    fn update(&mut self);

    /// Every arm chosen so far, in order.
    fn actions(&self) -> &[usize];

    /// Every reward observed so far, in order.
    fn rewards(&self) -> &[Continous];
}

/// Produces a scalar reward for a chosen arm.
pub trait BanditEnvironment {
    fn n_arms(&self) -> usize;

    fn reward(&mut self, action: usize) -> Continous;

    /// The arm with the highest expected reward right now, for
    /// optimal-action-rate analysis against the ground truth.
    fn optimal_action(&self) -> usize;
}
