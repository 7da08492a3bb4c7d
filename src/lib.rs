//! Tabular reinforcement learning: seeded multi-armed bandit agents and
//! environments driven by an external select/reward/observe/update loop,
//! and dynamic-programming policy iteration over explicit finite-MDP
//! transition models. Sutton & Barto 2018, chapters 2 and 4.

pub mod bandits;
pub mod common;
pub mod envs;
pub mod error;
pub mod math;
pub mod mdps;

pub use common::defs::*;
pub use error::{Result, RlError};
