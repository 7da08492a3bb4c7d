//! Gaussian bandit environments - the k-armed testbed.

use super::BanditEnvironment;
use crate::common::defs::Continous;
use crate::error::{Result, RlError};
use crate::math;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

/// Stationary k-armed bandit: arm `a` pays `Gaussian(means[a], stds[a])`.
#[derive(Debug)]
pub struct MultiArmedBandit {
    means: Vec<Continous>,
    stds: Vec<Continous>,
    rng: StdRng,
}

impl MultiArmedBandit {
    pub fn new(k: usize, means: Vec<Continous>, stds: Vec<Continous>, seed: u64) -> Result<Self> {
        if k == 0 {
            return Err(RlError::EmptyCollection {
                message: "a bandit needs at least one arm".to_string(),
            });
        }
        if means.len() != k {
            return Err(RlError::DimensionMismatch {
                expected: k,
                got: means.len(),
            });
        }
        if stds.len() != k {
            return Err(RlError::DimensionMismatch {
                expected: k,
                got: stds.len(),
            });
        }
        if let Some(&bad) = stds.iter().find(|&&s| !(s >= 0.)) {
            return Err(RlError::InvalidParameter {
                message: format!("standard deviations must be non-negative, got {bad}"),
            });
        }

        Ok(Self {
            means,
            stds,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn means(&self) -> &[Continous] {
        &self.means
    }
}

impl BanditEnvironment for MultiArmedBandit {
    fn n_arms(&self) -> usize {
        self.means.len()
    }

    fn reward(&mut self, action: usize) -> Continous {
        let dist = Normal::new(self.means[action], self.stds[action])
            .expect("stds validated at construction");
        dist.sample(&mut self.rng)
    }

    fn optimal_action(&self) -> usize {
        math::argmax_all(&self.means).expect("at least one arm")[0]
    }
}

const DRIFT_STD: Continous = 0.01;

/// Non-stationary variant: every reward draw first moves each arm's mean
/// by an independent `Gaussian(0, 0.01)` step. The drift is a side effect
/// of sampling, not of caller intent.
#[derive(Debug)]
pub struct NonStationaryMultiArmedBandit {
    inner: MultiArmedBandit,
}

impl NonStationaryMultiArmedBandit {
    pub fn new(k: usize, means: Vec<Continous>, stds: Vec<Continous>, seed: u64) -> Result<Self> {
        Ok(Self {
            inner: MultiArmedBandit::new(k, means, stds, seed)?,
        })
    }

    pub fn means(&self) -> &[Continous] {
        self.inner.means()
    }

    fn drift(&mut self) {
        let dist = Normal::new(0., DRIFT_STD).expect("constant drift std");
        for mean in &mut self.inner.means {
            *mean += dist.sample(&mut self.inner.rng);
        }
    }
}

impl BanditEnvironment for NonStationaryMultiArmedBandit {
    fn n_arms(&self) -> usize {
        self.inner.n_arms()
    }

    fn reward(&mut self, action: usize) -> Continous {
        self.drift();
        self.inner.reward(action)
    }

    fn optimal_action(&self) -> usize {
        self.inner.optimal_action()
    }
}
