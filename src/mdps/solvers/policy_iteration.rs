//! Iterative policy evaluation and greedy policy improvement over an
//! explicit transition model - Sutton & Barto 2018, §4.1-§4.3.

use crate::common::defs::*;
use crate::error::{Result, RlError};
use crate::math;
use crate::mdps::{Mdp, MdpSolver};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;

/// How policy improvement distributes probability over tied greedy
/// actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Uniform over every maximizing action.
    Uniform,
    /// All probability on the first maximizing action.
    First,
}

/// Outcome of a policy-evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvalStats {
    pub sweeps: usize,
    pub delta: Continous,
}

pub struct PolicyIteration {
    mdp: Rc<dyn Mdp>,
    theta: Continous,
    max_sweeps: usize,
    pub tie_break: TieBreak,
    valid_actions: Vec<Vec<Discrete>>,
    v: Vec<Continous>,
    policy: Vec<BTreeMap<Discrete, Continous>>,
}

impl PolicyIteration {
    /// `theta` - convergence threshold on the largest value change per
    /// sweep. `max_sweeps` - bound on evaluation sweeps before reporting
    /// non-convergence. The policy starts uniform over each state's valid
    /// actions and `V` starts at zero.
    pub fn new(mdp: Rc<dyn Mdp>, theta: Continous, max_sweeps: usize) -> Result<Self> {
        if !(theta > 0.) {
            return Err(RlError::InvalidParameter {
                message: format!("theta must be positive, got {theta}"),
            });
        }
        if max_sweeps == 0 {
            return Err(RlError::InvalidParameter {
                message: "max_sweeps must be at least 1".to_string(),
            });
        }

        let n_s = mdp.n_s();
        let transitions = mdp.transitions();
        let mut valid_actions = vec![vec![]; n_s];
        for &(s, a) in transitions.keys() {
            valid_actions[s as usize].push(a);
        }
        for actions in &mut valid_actions {
            actions.sort_unstable();
        }

        let policy = valid_actions
            .iter()
            .map(|actions| {
                let p = 1. / actions.len().max(1) as Continous;
                actions.iter().map(|&a| (a, p)).collect()
            })
            .collect();

        Ok(Self {
            mdp,
            theta,
            max_sweeps,
            tie_break: TieBreak::Uniform,
            valid_actions,
            v: vec![0.; n_s],
            policy,
        })
    }

    /// The current value function, indexed by state.
    pub fn v(&self) -> &[Continous] {
        &self.v
    }

    /// Per-state action distributions, indexed by state.
    pub fn policy(&self) -> &[BTreeMap<Discrete, Continous>] {
        &self.policy
    }

    /// In-place iterative policy evaluation: each sweep rewrites `V`
    /// entry by entry, so later states read values already refreshed in
    /// the same sweep. Sweeps repeat until the largest change drops below
    /// `theta`, or exactly once when `single_sweep` is set; exceeding the
    /// sweep bound is a `DidNotConverge` error.
    pub fn policy_eval(&mut self, single_sweep: bool) -> Result<EvalStats> {
        let transitions = self.mdp.transitions();
        let gamma = self.mdp.gamma();
        let mut sweeps = 0;
        loop {
            let mut delta: Continous = 0.;
            for s in 0..self.mdp.n_s() {
                let old_v = self.v[s];
                let new_v = self.policy[s]
                    .iter()
                    .map(|(&a, &p)| p * self.expected_return(s as Discrete, a, &transitions, gamma))
                    .sum();
                self.v[s] = new_v;
                delta = delta.max((old_v - new_v).abs());
            }
            sweeps += 1;
            debug!("policy evaluation sweep {sweeps}: delta = {delta:.6}");

            if delta < self.theta || single_sweep {
                return Ok(EvalStats { sweeps, delta });
            }
            if sweeps >= self.max_sweeps {
                return Err(RlError::DidNotConverge { sweeps, delta });
            }
        }
    }

    /// Greedy policy improvement: rebuild each state's distribution over
    /// its maximizing actions per the configured [`TieBreak`]. Callers
    /// detect convergence by comparing the policy before and after.
    pub fn policy_improve(&mut self) {
        let transitions = self.mdp.transitions();
        let gamma = self.mdp.gamma();
        for s in 0..self.mdp.n_s() {
            let actions = &self.valid_actions[s];
            if actions.is_empty() {
                continue;
            }

            let q = actions
                .iter()
                .map(|&a| self.expected_return(s as Discrete, a, &transitions, gamma))
                .collect::<Vec<_>>();
            let maximizers = math::argmax_all(&q).expect("state has at least one valid action");

            let mut dist = BTreeMap::new();
            match self.tie_break {
                TieBreak::Uniform => {
                    let p = 1. / maximizers.len() as Continous;
                    for (i, &a) in actions.iter().enumerate() {
                        dist.insert(a, if maximizers.contains(&i) { p } else { 0. });
                    }
                }
                TieBreak::First => {
                    for (i, &a) in actions.iter().enumerate() {
                        dist.insert(a, if i == maximizers[0] { 1. } else { 0. });
                    }
                }
            }
            self.policy[s] = dist;
        }
    }

    /// One-step expected return `sum_{s',r} p(s',r|s,a) (r + gamma V(s'))`,
    /// with the bootstrap term dropped on terminal outcomes.
    fn expected_return(
        &self,
        s: Discrete,
        a: Discrete,
        transitions: &Transitions,
        gamma: Continous,
    ) -> Continous {
        let Some(ts) = transitions.get(&(s, a)) else {
            return 0.;
        };
        ts.iter()
            .map(|t| {
                let bootstrap = if t.done {
                    0.
                } else {
                    gamma * self.v[t.next_state as usize]
                };
                t.probability * (t.reward + bootstrap)
            })
            .sum()
    }
}

impl MdpSolver<bool> for PolicyIteration {
    fn v_star(&self, s: Discrete) -> Continous {
        self.v[s as usize]
    }

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous> {
        let transitions = self.mdp.transitions();
        transitions
            .contains_key(&(s, a))
            .then(|| self.expected_return(s, a, &transitions, self.mdp.gamma()))
    }

    fn pi_star(&self, s: Discrete) -> Option<Discrete> {
        let dist = self.policy.get(s as usize)?;
        dist.iter()
            .max_by(|x, y| x.1.total_cmp(y.1))
            .map(|(&a, _)| a)
    }

    /// Alternate evaluation and improvement until a full improvement pass
    /// leaves the policy unchanged, or until the iteration cap. Returns
    /// whether the policy went stable and the number of iterations run.
    fn exec(&mut self, num_iterations: Option<usize>) -> Result<(bool, usize)> {
        let mut iterations = 0;
        loop {
            self.policy_eval(false)?;
            let before = self.policy.clone();
            self.policy_improve();
            iterations += 1;

            if before == self.policy {
                info!("policy stable after {iterations} iterations");
                return Ok((true, iterations));
            }
            if let Some(cap) = num_iterations {
                if iterations >= cap {
                    return Ok((false, iterations));
                }
            }
        }
    }
}
