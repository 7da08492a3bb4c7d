//! Shared numerics: tie-aware argmax, softmax and the memoized
//! truncated-Poisson pmf.

use crate::common::defs::Continous;
use crate::error::{Result, RlError};
use rand::prelude::*;
use std::collections::HashMap;

/// All indices attaining the maximum value, in ascending order. Ties are
/// kept, never broken arbitrarily.
pub fn argmax_all(scores: &[Continous]) -> Result<Vec<usize>> {
    if scores.is_empty() {
        return Err(RlError::EmptyCollection {
            message: "argmax of an empty score sequence".to_string(),
        });
    }

    let mut best = scores[0];
    let mut maximizers = vec![0];
    for (i, &v) in scores.iter().enumerate().skip(1) {
        if v > best {
            best = v;
            maximizers.clear();
            maximizers.push(i);
        } else if v == best {
            maximizers.push(i);
        }
    }

    Ok(maximizers)
}

/// A single maximizing index, drawn uniformly among the tied maximizers.
pub fn argmax_random(scores: &[Continous], rng: &mut StdRng) -> Result<usize> {
    let maximizers = argmax_all(scores)?;
    Ok(maximizers[rng.gen_range(0..maximizers.len())])
}

/// Softmax distribution over a preference vector. The maximum is
/// subtracted before exponentiation, so the result is shift-invariant.
pub fn softmax(h: &[Continous]) -> Vec<Continous> {
    if h.is_empty() {
        return vec![];
    }

    let max = h.iter().cloned().fold(Continous::NEG_INFINITY, Continous::max);
    let exps = h.iter().map(|&x| (x - max).exp()).collect::<Vec<_>>();
    let z = exps.iter().sum::<Continous>();

    exps.iter().map(|&e| e / z).collect()
}

/// Memoized Poisson pmf with optional upper-tail truncation: all mass at
/// and above the cutoff is folded into the boundary bucket, so the
/// truncated probabilities sum to 1 over `0..=cutoff`.
#[derive(Debug, Default)]
pub struct PoissonPmf {
    pmf: HashMap<(usize, u64), Continous>,
    boundary: HashMap<(usize, u64), Continous>,
    factorials: Vec<Continous>,
}

impl PoissonPmf {
    pub fn new() -> Self {
        Self::default()
    }

    /// `P(X = n)` for `X ~ Poisson(rate)`, truncated at `truncate` when
    /// given: below the cutoff the plain pmf, at the cutoff the whole
    /// upper tail, above it zero.
    pub fn prob(&mut self, n: usize, rate: Continous, truncate: Option<usize>) -> Continous {
        match truncate {
            None => self.pmf(n, rate),
            Some(t) if n < t => self.pmf(n, rate),
            Some(t) if n == t => self.boundary(t, rate),
            Some(_) => 0.,
        }
    }

    fn pmf(&mut self, n: usize, rate: Continous) -> Continous {
        let key = (n, rate.to_bits());
        if let Some(&p) = self.pmf.get(&key) {
            return p;
        }

        let p = rate.powi(n as i32) * (-rate).exp() / self.factorial(n);
        self.pmf.insert(key, p);
        p
    }

    fn boundary(&mut self, t: usize, rate: Continous) -> Continous {
        let key = (t, rate.to_bits());
        if let Some(&p) = self.boundary.get(&key) {
            return p;
        }

        let below = (0..t).map(|k| self.pmf(k, rate)).sum::<Continous>();
        let p = 1. - below;
        self.boundary.insert(key, p);
        p
    }

    fn factorial(&mut self, n: usize) -> Continous {
        if self.factorials.is_empty() {
            self.factorials.push(1.);
        }
        while self.factorials.len() <= n {
            let k = self.factorials.len();
            let next = self.factorials[k - 1] * k as Continous;
            self.factorials.push(next);
        }
        self.factorials[n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;
    use rstest::rstest;

    #[test]
    fn argmax_all_keeps_every_tie() {
        let maximizers = argmax_all(&[3., 5., 5.]).unwrap();
        assert_eq!(maximizers, vec![1, 2]);
    }

    #[test]
    fn argmax_all_single_winner() {
        let maximizers = argmax_all(&[1., 4., 2., 4.5]).unwrap();
        assert_eq!(maximizers, vec![3]);
    }

    #[test]
    fn argmax_all_empty_is_an_error() {
        let err = argmax_all(&[]).unwrap_err();
        assert!(matches!(err, RlError::EmptyCollection { .. }));
    }

    #[test]
    fn argmax_random_draws_only_maximizers() {
        let rng = &mut StdRng::seed_from_u64(42);
        let mut counts = [0usize; 3];
        for _ in 0..2000 {
            let i = argmax_random(&[1., 1., 0.], rng).unwrap();
            counts[i] += 1;
        }

        assert_eq!(counts[2], 0);
        // both tied arms get roughly half the draws
        assert!(counts[0] > 800 && counts[1] > 800);
    }

    #[rstest]
    #[case(vec![0., 0., 0.])]
    #[case(vec![1., 2., 3., 4.])]
    #[case(vec![-100., 0., 100.])]
    fn softmax_sums_to_one(#[case] h: Vec<Continous>) {
        let p = softmax(&h);
        assert_float_eq!(p.iter().sum::<Continous>(), 1., abs <= 1e-12);
        assert!(p.iter().all(|&x| x > 0.));
    }

    #[test]
    fn softmax_is_shift_invariant() {
        let h = [0.5, -1., 2.];
        let shifted = h.map(|x| x + 123.);
        let p = softmax(&h);
        let q = softmax(&shifted);
        assert_float_eq!(p, q, abs_all <= 1e-12);
    }

    #[rstest]
    #[case(0.5)]
    #[case(3.)]
    #[case(10.)]
    fn truncated_poisson_sums_to_one(#[case] rate: Continous) {
        let pois = &mut PoissonPmf::new();
        let total = (0..=5).map(|n| pois.prob(n, rate, Some(5))).sum::<Continous>();
        assert_float_eq!(total, 1., abs <= 1e-12);
    }

    #[test]
    fn truncation_folds_the_tail_into_the_boundary() {
        let pois = &mut PoissonPmf::new();
        let below = (0..4).map(|n| pois.prob(n, 2., None)).sum::<Continous>();
        assert_float_eq!(pois.prob(4, 2., Some(4)), 1. - below, abs <= 1e-12);
        assert_float_eq!(pois.prob(5, 2., Some(4)), 0., abs <= 0.);
    }

    #[test]
    fn untruncated_pmf_matches_the_closed_form() {
        let pois = &mut PoissonPmf::new();
        // 3^2 e^-3 / 2!
        assert_float_eq!(pois.prob(2, 3., None), 9. * (-3f64).exp() / 2., abs <= 1e-12);
        assert_float_eq!(pois.prob(0, 3., None), (-3f64).exp(), abs <= 1e-12);
    }
}
