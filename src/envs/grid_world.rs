//! Rectangular grid world: every step costs -1 until a terminal cell is
//! reached, and moves off the edge leave the agent in place. All
//! transitions are point masses.

use crate::common::defs::*;
use crate::error::{Result, RlError};
use crate::mdps::Mdp;
use std::rc::Rc;

pub const UP: Discrete = 0;
pub const DOWN: Discrete = 1;
pub const LEFT: Discrete = 2;
pub const RIGHT: Discrete = 3;

// (dy, dx) per action id
const OFFSETS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

pub struct GridWorld {
    width: usize,
    length: usize,
    terminals: Vec<(usize, usize)>,
    gamma: Continous,
    transitions: Rc<Transitions>,
}

impl GridWorld {
    /// `width` - vertical cell count; `length` - horizontal cell count;
    /// `terminals` - coordinates of the absorbing cells. Cell `(y, x)`
    /// flattens to state `y * length + x`.
    pub fn new(
        width: usize,
        length: usize,
        terminals: &[(usize, usize)],
        gamma: Continous,
    ) -> Result<Self> {
        if width == 0 || length == 0 {
            return Err(RlError::InvalidParameter {
                message: format!("grid must be at least 1x1, got {width}x{length}"),
            });
        }
        if !(gamma > 0. && gamma <= 1.) {
            return Err(RlError::InvalidParameter {
                message: format!("gamma must be in (0, 1], got {gamma}"),
            });
        }
        if let Some(&(y, x)) = terminals.iter().find(|&&(y, x)| y >= width || x >= length) {
            return Err(RlError::InvalidParameter {
                message: format!("terminal ({y}, {x}) outside the {width}x{length} grid"),
            });
        }

        let mut transitions = Transitions::new();
        for y in 0..width {
            for x in 0..length {
                let s = (y * length + x) as Discrete;
                let terminal_here = terminals.contains(&(y, x));
                for (a, &(dy, dx)) in OFFSETS.iter().enumerate() {
                    let t = if terminal_here {
                        Transition {
                            next_state: s,
                            probability: 1.,
                            reward: 0.,
                            done: true,
                        }
                    } else {
                        let y_ = (y as i64 + dy).clamp(0, width as i64 - 1) as usize;
                        let x_ = (x as i64 + dx).clamp(0, length as i64 - 1) as usize;
                        let done = terminals.contains(&(y_, x_));
                        Transition {
                            next_state: (y_ * length + x_) as Discrete,
                            probability: 1.,
                            reward: if done { 0. } else { -1. },
                            done,
                        }
                    };
                    transitions.insert((s, a as Discrete), vec![t]);
                }
            }
        }

        Ok(Self {
            width,
            length,
            terminals: terminals.to_vec(),
            gamma,
            transitions: Rc::new(transitions),
        })
    }

    pub fn state_index(&self, y: usize, x: usize) -> Discrete {
        (y * self.length + x) as Discrete
    }

    pub fn is_terminal(&self, y: usize, x: usize) -> bool {
        self.terminals.contains(&(y, x))
    }
}

impl Mdp for GridWorld {
    fn n_s(&self) -> usize {
        self.width * self.length
    }

    fn n_a(&self) -> usize {
        OFFSETS.len()
    }

    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }

    fn gamma(&self) -> Continous {
        self.gamma
    }
}
