pub mod solvers;

use crate::common::defs::*;
use crate::error::Result;
use std::rc::Rc;

/// Markov Decision Process - Sutton & Barto 2018.
pub trait Mdp {
    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    fn transitions(&self) -> Rc<Transitions>;

    fn gamma(&self) -> Continous;
}

/// Read access to a solver's value function and greedy policy, plus the
/// driver that runs it to a fixed point.
pub trait MdpSolver<T> {
    fn v_star(&self, s: Discrete) -> Continous;

    /// Action value of `a` in `s`, or `None` when `a` is not valid there.
    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous>;

    fn pi_star(&self, s: Discrete) -> Option<Discrete>;

    fn exec(&mut self, num_iterations: Option<usize>) -> Result<(T, usize)>;
}
