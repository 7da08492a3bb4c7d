use serde::Serialize;
use std::collections::HashMap;

pub type Discrete = i32;
pub type Continous = f64;

/// One stochastic outcome of taking an action in a state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub next_state: Discrete,
    pub probability: Continous,
    pub reward: f64,
    pub done: bool,
}

/// Explicit next-state/reward model keyed by (state, action). For a fixed
/// key the outcome probabilities sum to 1; actions that are structurally
/// invalid in a state have no entry at all.
pub type Transitions = HashMap<(Discrete, Discrete), Vec<Transition>>;
