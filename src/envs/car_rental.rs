//! Two-location rental fleet - Jack's car rental, Sutton & Barto 2018,
//! §4.3. Demand and restock at each location are independent truncated
//! Poisson processes; the full joint distribution over the four of them is
//! enumerated once at construction and aggregated by outcome.

use crate::common::defs::*;
use crate::error::{Result, RlError};
use crate::math::PoissonPmf;
use crate::mdps::Mdp;
use itertools::iproduct;
use log::info;
use std::collections::HashMap;
use std::rc::Rc;

/// Revenue per satisfied rental request.
const RENTAL_REVENUE: Continous = 10.;
/// Cost per car moved overnight.
const MOVE_COST: Continous = 2.;

/// State is the pair of inventories, flattened to `i * (max_cars + 1) + j`;
/// action index `k` moves `k - max_move` cars from location 0 to
/// location 1 (negative moves go the other way).
pub struct CarRental {
    max_cars: usize,
    max_move: usize,
    gamma: Continous,
    transitions: Rc<Transitions>,
}

impl CarRental {
    /// `rental_lams`/`return_lams` - Poisson rates for demand and restock
    /// at the two locations. Moves that would push either inventory
    /// outside `0..=max_cars` get no transition entry at all.
    pub fn new(
        max_cars: usize,
        max_move: usize,
        rental_lams: [Continous; 2],
        return_lams: [Continous; 2],
        gamma: Continous,
    ) -> Result<Self> {
        if max_cars == 0 {
            return Err(RlError::InvalidParameter {
                message: "max_cars must be at least 1".to_string(),
            });
        }
        if !(gamma > 0. && gamma <= 1.) {
            return Err(RlError::InvalidParameter {
                message: format!("gamma must be in (0, 1], got {gamma}"),
            });
        }
        for &lam in rental_lams.iter().chain(return_lams.iter()) {
            if !(lam > 0. && lam.is_finite()) {
                return Err(RlError::InvalidParameter {
                    message: format!("Poisson rates must be positive and finite, got {lam}"),
                });
            }
        }

        let pois = &mut PoissonPmf::new();
        let n = max_cars as i64;
        let mut transitions = Transitions::new();
        for (i, j) in iproduct!(0..=n, 0..=n) {
            for mv in -(max_move as i64)..=max_move as i64 {
                // inventories after the overnight move
                let (n0, n1) = (i - mv, j + mv);
                if n0 < 0 || n0 > n || n1 < 0 || n1 > n {
                    continue;
                }

                let mut outcomes: HashMap<(Discrete, i64), Continous> = HashMap::new();
                for (r0, r1) in iproduct!(0..=n0, 0..=n1) {
                    let p_rent = pois.prob(r0 as usize, rental_lams[0], Some(n0 as usize))
                        * pois.prob(r1 as usize, rental_lams[1], Some(n1 as usize));

                    // remaining capacity bounds the restock that can be kept
                    let cap0 = n - (n0 - r0);
                    let cap1 = n - (n1 - r1);
                    for (q0, q1) in iproduct!(0..=cap0, 0..=cap1) {
                        let p = p_rent
                            * pois.prob(q0 as usize, return_lams[0], Some(cap0 as usize))
                            * pois.prob(q1 as usize, return_lams[1], Some(cap1 as usize));

                        let next = ((n0 - r0 + q0) * (n + 1) + (n1 - r1 + q1)) as Discrete;
                        *outcomes.entry((next, r0 + r1)).or_insert(0.) += p;
                    }
                }

                let mut ts = outcomes
                    .into_iter()
                    .map(|((next_state, satisfied), probability)| Transition {
                        next_state,
                        probability,
                        reward: RENTAL_REVENUE * satisfied as Continous
                            - MOVE_COST * mv.abs() as Continous,
                        done: false,
                    })
                    .collect::<Vec<_>>();
                ts.sort_by(|a, b| {
                    a.next_state
                        .cmp(&b.next_state)
                        .then(a.reward.total_cmp(&b.reward))
                });

                let s = (i * (n + 1) + j) as Discrete;
                let a = (mv + max_move as i64) as Discrete;
                transitions.insert((s, a), ts);
            }
        }
        info!(
            "rental transition model built: {} (state, action) rows",
            transitions.len()
        );

        Ok(Self {
            max_cars,
            max_move,
            gamma,
            transitions: Rc::new(transitions),
        })
    }

    pub fn state_index(&self, n_cars0: usize, n_cars1: usize) -> Discrete {
        (n_cars0 * (self.max_cars + 1) + n_cars1) as Discrete
    }

    /// Action index for a net move of `moved` cars from location 0 to 1.
    pub fn action_index(&self, moved: i64) -> Discrete {
        (moved + self.max_move as i64) as Discrete
    }
}

impl Mdp for CarRental {
    fn n_s(&self) -> usize {
        (self.max_cars + 1) * (self.max_cars + 1)
    }

    fn n_a(&self) -> usize {
        2 * self.max_move + 1
    }

    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }

    fn gamma(&self) -> Continous {
        self.gamma
    }
}
