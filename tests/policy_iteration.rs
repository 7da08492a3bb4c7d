//! End-to-end dynamic-programming runs on the two transition-model
//! environments.

use float_eq::*;
use std::rc::Rc;
use tabular_rl::envs::car_rental::CarRental;
use tabular_rl::envs::grid_world::GridWorld;
use tabular_rl::mdps::solvers::policy_iteration::{PolicyIteration, TieBreak};
use tabular_rl::mdps::{Mdp, MdpSolver};
use tabular_rl::Continous;

#[test]
fn grid_world_values_fall_with_distance_from_the_terminal() {
    let gw = GridWorld::new(4, 4, &[(0, 0)], 0.9).unwrap();
    let index = |y: usize, x: usize| (y * 4 + x) as usize;
    let mdp = Rc::new(gw) as Rc<dyn Mdp>;
    let pi = &mut PolicyIteration::new(Rc::clone(&mdp), 1e-6, 10_000).unwrap();

    let (stable, iterations) = pi.exec(None).unwrap();
    assert!(stable);
    assert!(iterations >= 1);

    // the terminal's value is exactly 0 and never touched
    assert_float_eq!(pi.v()[index(0, 0)], 0., abs <= 0.);

    // group by Manhattan distance to (0, 0): value strictly decreases as
    // the distance grows
    let mut by_distance = vec![vec![]; 7];
    for y in 0..4 {
        for x in 0..4 {
            by_distance[y + x].push(pi.v()[index(y, x)]);
        }
    }
    for d in 1..6 {
        let nearest = by_distance[d]
            .iter()
            .cloned()
            .fold(Continous::INFINITY, Continous::min);
        let farthest = by_distance[d + 1]
            .iter()
            .cloned()
            .fold(Continous::NEG_INFINITY, Continous::max);
        assert!(
            farthest < nearest,
            "distance {} values must sit below distance {} values",
            d + 1,
            d
        );
    }
}

#[test]
fn grid_world_ties_split_uniformly_or_go_to_the_first_action() {
    let gw = GridWorld::new(3, 3, &[(0, 0)], 0.9).unwrap();
    let center = 4; // state (1, 1)
    let mdp = Rc::new(gw) as Rc<dyn Mdp>;

    // up and left are equally good from the center cell
    let pi = &mut PolicyIteration::new(Rc::clone(&mdp), 1e-6, 10_000).unwrap();
    pi.exec(None).unwrap();
    let dist = &pi.policy()[center];
    assert_float_eq!(dist[&tabular_rl::envs::grid_world::UP], 0.5, abs <= 1e-12);
    assert_float_eq!(dist[&tabular_rl::envs::grid_world::LEFT], 0.5, abs <= 1e-12);

    let first = &mut PolicyIteration::new(Rc::clone(&mdp), 1e-6, 10_000).unwrap();
    first.tie_break = TieBreak::First;
    first.exec(None).unwrap();
    let dist = &first.policy()[center];
    assert_float_eq!(dist[&tabular_rl::envs::grid_world::UP], 1., abs <= 1e-12);
    assert_float_eq!(dist[&tabular_rl::envs::grid_world::LEFT], 0., abs <= 1e-12);
}

#[test]
fn grid_world_policy_points_into_the_terminal() {
    let gw = GridWorld::new(3, 3, &[(0, 0)], 0.9).unwrap();
    let next_to_terminal = 1; // state (0, 1)
    let mdp = Rc::new(gw) as Rc<dyn Mdp>;
    let pi = &mut PolicyIteration::new(mdp, 1e-6, 10_000).unwrap();
    pi.exec(None).unwrap();

    assert_eq!(
        pi.pi_star(next_to_terminal),
        Some(tabular_rl::envs::grid_world::LEFT)
    );
}

#[test]
fn exec_honors_its_iteration_cap() {
    let gw = GridWorld::new(4, 4, &[(0, 0)], 0.9).unwrap();
    let mdp = Rc::new(gw) as Rc<dyn Mdp>;
    let pi = &mut PolicyIteration::new(mdp, 1e-6, 10_000).unwrap();

    // the first improvement always replaces the uniform start policy
    let (stable, iterations) = pi.exec(Some(1)).unwrap();
    assert!(!stable);
    assert_eq!(iterations, 1);
}

#[test]
fn car_rental_policy_iteration_goes_stable() {
    let env = CarRental::new(4, 2, [1.5, 1.], [1., 0.5], 0.9).unwrap();
    let state = |i: usize, j: usize| (i * 5 + j) as usize;
    let mdp = Rc::new(env) as Rc<dyn Mdp>;
    let pi = &mut PolicyIteration::new(Rc::clone(&mdp), 1e-6, 10_000).unwrap();

    let (stable, _) = pi.exec(Some(100)).unwrap();
    assert!(stable);

    // rewards are non-negative, so converged values are too; holding stock
    // must beat an empty system
    assert!(pi.v().iter().all(|v| v.is_finite() && *v >= 0.));
    assert!(pi.v()[state(4, 4)] > pi.v()[state(0, 0)]);

    // improvement always leaves a distribution summing to 1 over the
    // state's valid actions
    let transitions = mdp.transitions();
    for (s, dist) in pi.policy().iter().enumerate() {
        let total = dist.values().sum::<Continous>();
        assert_float_eq!(total, 1., abs <= 1e-9);
        for &a in dist.keys() {
            assert!(transitions.contains_key(&(s as i32, a)));
        }
    }
}
