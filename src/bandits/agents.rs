//! The bandit agent family - Sutton & Barto 2018, chapter 2. Action
//! selection differs per algorithm; the estimate update is the single
//! incremental rule `Q[At] += step * (Rt - Q[At])` parameterized only by
//! the step size.

use super::BanditAgent;
use crate::common::defs::Continous;
use crate::error::{Result, RlError};
use crate::math;
use rand::distributions::WeightedIndex;
use rand::prelude::*;

/// Step-size rule for the incremental estimate update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepSize {
    /// `1 / count[a]` - the unbiased sample average.
    SampleAverage,
    /// A fixed `alpha` in (0, 1], which weights recent rewards more and
    /// suits non-stationary reward processes.
    Constant(Continous),
}

impl StepSize {
    fn validate(self) -> Result<Self> {
        if let Self::Constant(alpha) = self {
            if !(alpha > 0. && alpha <= 1.) {
                return Err(RlError::InvalidParameter {
                    message: format!("step size alpha must be in (0, 1], got {alpha}"),
                });
            }
        }
        Ok(self)
    }
}

/// Estimates, counters and history shared by the action-value methods.
#[derive(Debug)]
struct ActionValueCore {
    q: Vec<Continous>,
    action_cnt: Vec<usize>,
    timestep: usize,
    at: Option<usize>,
    rt: Continous,
    actions: Vec<usize>,
    rewards: Vec<Continous>,
    rng: StdRng,
}

impl ActionValueCore {
    fn new(q0: Vec<Continous>, seed: u64) -> Result<Self> {
        if q0.is_empty() {
            return Err(RlError::EmptyCollection {
                message: "an agent needs at least one arm".to_string(),
            });
        }

        let n_arms = q0.len();
        Ok(Self {
            q: q0,
            action_cnt: vec![0; n_arms],
            timestep: 0,
            at: None,
            rt: 0.,
            actions: vec![],
            rewards: vec![],
            rng: StdRng::seed_from_u64(seed),
        })
    }

    // Counts increment at selection time, so the sample-average step size
    // always sees count >= 1 for the selected arm.
    fn record_selection(&mut self, at: usize) {
        self.at = Some(at);
        self.actions.push(at);
        self.action_cnt[at] += 1;
    }

    fn observe(&mut self, reward: Continous) {
        self.rt = reward;
        self.rewards.push(reward);
    }

    fn update(&mut self, step: StepSize) {
        let at = self.at.expect("update() called before the first select()");
        let step = match step {
            StepSize::SampleAverage => 1. / self.action_cnt[at] as Continous,
            StepSize::Constant(alpha) => alpha,
        };
        self.q[at] += step * (self.rt - self.q[at]);
        self.timestep += 1;
    }
}

/// Epsilon-greedy: with probability `1 - eps` exploit the maximum estimate
/// (ties broken uniformly at random), otherwise explore uniformly over
/// every arm, the current best included.
#[derive(Debug)]
pub struct EpsGreedy {
    core: ActionValueCore,
    eps: Continous,
    step: StepSize,
}

impl EpsGreedy {
    /// Sample-average variant. `q0` is the initial estimate per arm; an
    /// optimistic `q0` biases early exploration.
    pub fn new(eps: Continous, q0: Vec<Continous>, seed: u64) -> Result<Self> {
        Self::with_step(eps, q0, StepSize::SampleAverage, seed)
    }

    /// Constant-step variant, for non-stationary reward processes.
    pub fn with_const_step(
        eps: Continous,
        q0: Vec<Continous>,
        alpha: Continous,
        seed: u64,
    ) -> Result<Self> {
        Self::with_step(eps, q0, StepSize::Constant(alpha), seed)
    }

    fn with_step(eps: Continous, q0: Vec<Continous>, step: StepSize, seed: u64) -> Result<Self> {
        if !(0. ..=1.).contains(&eps) {
            return Err(RlError::InvalidParameter {
                message: format!("eps must be in [0, 1], got {eps}"),
            });
        }

        Ok(Self {
            core: ActionValueCore::new(q0, seed)?,
            eps,
            step: step.validate()?,
        })
    }

    pub fn q(&self) -> &[Continous] {
        &self.core.q
    }

    pub fn action_cnt(&self) -> &[usize] {
        &self.core.action_cnt
    }

    pub fn timestep(&self) -> usize {
        self.core.timestep
    }
}

impl BanditAgent for EpsGreedy {
    fn n_arms(&self) -> usize {
        self.core.q.len()
    }

    fn select(&mut self) -> usize {
        let ActionValueCore { q, rng, .. } = &mut self.core;
        let at = if rng.gen::<Continous>() >= self.eps {
            math::argmax_random(q, rng).expect("agent has at least one arm")
        } else {
            rng.gen_range(0..q.len())
        };
        self.core.record_selection(at);
        at
    }

    fn observe(&mut self, reward: Continous) {
        self.core.observe(reward);
    }

    fn update(&mut self) {
        self.core.update(self.step);
    }

    fn actions(&self) -> &[usize] {
        &self.core.actions
    }

    fn rewards(&self) -> &[Continous] {
        &self.core.rewards
    }
}

/// Upper-confidence-bound selection. Zero-count arms are forced first
/// (uniformly at random among them), so `ln(t)` is only ever taken once
/// every arm has been selected at least once and `t >= n_arms`.
#[derive(Debug)]
pub struct Ucb {
    core: ActionValueCore,
    c: Continous,
    step: StepSize,
}

impl Ucb {
    /// `alpha` - constant step size; `c` - exploration-confidence
    /// coefficient.
    pub fn new(alpha: Continous, c: Continous, q0: Vec<Continous>, seed: u64) -> Result<Self> {
        if !(c >= 0.) {
            return Err(RlError::InvalidParameter {
                message: format!("confidence coefficient c must be non-negative, got {c}"),
            });
        }

        Ok(Self {
            core: ActionValueCore::new(q0, seed)?,
            c,
            step: StepSize::Constant(alpha).validate()?,
        })
    }

    pub fn q(&self) -> &[Continous] {
        &self.core.q
    }

    pub fn action_cnt(&self) -> &[usize] {
        &self.core.action_cnt
    }

    pub fn timestep(&self) -> usize {
        self.core.timestep
    }
}

impl BanditAgent for Ucb {
    fn n_arms(&self) -> usize {
        self.core.q.len()
    }

    fn select(&mut self) -> usize {
        let c = self.c;
        let ActionValueCore {
            q,
            action_cnt,
            timestep,
            rng,
            ..
        } = &mut self.core;

        let zero = action_cnt
            .iter()
            .enumerate()
            .filter(|(_, &cnt)| cnt == 0)
            .map(|(a, _)| a)
            .collect::<Vec<_>>();

        let at = if !zero.is_empty() {
            zero[rng.gen_range(0..zero.len())]
        } else {
            let t = *timestep as Continous;
            let scores = q
                .iter()
                .zip(action_cnt.iter())
                .map(|(&q, &cnt)| q + c * (t.ln() / cnt as Continous).sqrt())
                .collect::<Vec<_>>();
            math::argmax_random(&scores, rng).expect("agent has at least one arm")
        };
        self.core.record_selection(at);
        at
    }

    fn observe(&mut self, reward: Continous) {
        self.core.observe(reward);
    }

    fn update(&mut self) {
        self.core.update(self.step);
    }

    fn actions(&self) -> &[usize] {
        &self.core.actions
    }

    fn rewards(&self) -> &[Continous] {
        &self.core.rewards
    }
}

/// Gradient bandit: a preference per arm, converted to a categorical
/// selection distribution by softmax. The update nudges every preference
/// by `alpha * (Rt - baseline) * (1[a == At] - pi[a])`, where the baseline
/// is the running mean of all observed rewards when enabled.
#[derive(Debug)]
pub struct GradientBandit {
    h: Vec<Continous>,
    prob: Vec<Continous>,
    alpha: Continous,
    use_baseline: bool,
    timestep: usize,
    at: Option<usize>,
    rt: Continous,
    actions: Vec<usize>,
    rewards: Vec<Continous>,
    rng: StdRng,
}

impl GradientBandit {
    pub fn new(h0: Vec<Continous>, alpha: Continous, baseline: bool, seed: u64) -> Result<Self> {
        if h0.is_empty() {
            return Err(RlError::EmptyCollection {
                message: "an agent needs at least one arm".to_string(),
            });
        }
        StepSize::Constant(alpha).validate()?;

        let prob = math::softmax(&h0);
        Ok(Self {
            h: h0,
            prob,
            alpha,
            use_baseline: baseline,
            timestep: 0,
            at: None,
            rt: 0.,
            actions: vec![],
            rewards: vec![],
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn preferences(&self) -> &[Continous] {
        &self.h
    }

    /// The current softmax selection distribution.
    pub fn distribution(&self) -> &[Continous] {
        &self.prob
    }

    pub fn timestep(&self) -> usize {
        self.timestep
    }
}

impl BanditAgent for GradientBandit {
    fn n_arms(&self) -> usize {
        self.h.len()
    }

    fn select(&mut self) -> usize {
        // sample from the softmax distribution, not argmax
        let dist = WeightedIndex::new(&self.prob).expect("softmax weights are positive");
        let at = dist.sample(&mut self.rng);
        self.at = Some(at);
        self.actions.push(at);
        at
    }

    fn observe(&mut self, reward: Continous) {
        self.rt = reward;
        self.rewards.push(reward);
    }

    fn update(&mut self) {
        let at = self.at.expect("update() called before the first select()");
        let baseline = if self.use_baseline && !self.rewards.is_empty() {
            self.rewards.iter().sum::<Continous>() / self.rewards.len() as Continous
        } else {
            0.
        };

        for (a, h) in self.h.iter_mut().enumerate() {
            let indicator = if a == at { 1. } else { 0. };
            *h += self.alpha * (self.rt - baseline) * (indicator - self.prob[a]);
        }
        self.prob = math::softmax(&self.h);
        self.timestep += 1;
    }

    fn actions(&self) -> &[usize] {
        &self.actions
    }

    fn rewards(&self) -> &[Continous] {
        &self.rewards
    }
}
