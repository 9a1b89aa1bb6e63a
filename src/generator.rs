use rand::Rng;

use crate::cnf::{Clause, Literal};
use crate::dimacs::Formula;

#[derive(Debug, Clone, Copy)]
pub struct GeneratorParams {
    pub num_vars: usize,
    pub num_clauses: usize,
    pub min_len: usize,
    pub max_len: usize,
}

impl GeneratorParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.num_vars == 0 {
            return Err("num_vars must be at least 1".to_string());
        }
        if self.min_len == 0 {
            return Err("min_len must be at least 1".to_string());
        }
        if self.min_len > self.max_len {
            return Err(format!(
                "min_len {} exceeds max_len {}",
                self.min_len, self.max_len
            ));
        }
        if self.max_len > self.num_vars {
            return Err(format!(
                "max_len {} exceeds num_vars {} (variables are sampled without replacement)",
                self.max_len, self.num_vars
            ));
        }
        Ok(())
    }
}

/// Samples a random formula: each clause draws `len` in
/// `min_len..=max_len`, then `len` distinct variables, each with a uniform
/// sign. Deterministic for a given RNG state.
pub fn random_formula(params: &GeneratorParams, rng: &mut impl Rng) -> Formula {
    debug_assert!(params.validate().is_ok());

    let mut clauses = Vec::with_capacity(params.num_clauses);
    for _ in 0..params.num_clauses {
        let len = rng.gen_range(params.min_len..=params.max_len);
        let vars = rand::seq::index::sample(rng, params.num_vars, len);
        let literals = vars
            .iter()
            .map(|var| Literal::from_value(var + 1, rng.gen_bool(0.5)))
            .collect::<Vec<_>>();
        clauses.push(Clause::from(literals));
    }

    Formula {
        num_vars: params.num_vars,
        clauses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    const PARAMS: GeneratorParams = GeneratorParams {
        num_vars: 10,
        num_clauses: 30,
        min_len: 2,
        max_len: 4,
    };

    #[test]
    fn test_clause_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let formula = random_formula(&PARAMS, &mut rng);
        assert_eq!(formula.num_vars, 10);
        assert_eq!(formula.clauses.len(), 30);
        for clause in &formula.clauses {
            assert!((2..=4).contains(&clause.literals.len()));
            let vars: HashSet<_> = clause.literals.iter().map(|lit| lit.id()).collect();
            assert_eq!(vars.len(), clause.literals.len(), "variables repeat in {clause}");
            assert!(vars.iter().all(|&var| (1..=10).contains(&var)));
        }
    }

    #[test]
    fn test_same_seed_same_formula() {
        let first = random_formula(&PARAMS, &mut StdRng::seed_from_u64(99));
        let second = random_formula(&PARAMS, &mut StdRng::seed_from_u64(99));
        let render = |formula: &Formula| {
            formula
                .clauses
                .iter()
                .map(|clause| clause.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(render(&first), render(&second));
    }

    #[test]
    fn test_validation() {
        let mut params = PARAMS;
        params.max_len = 11;
        assert!(params.validate().is_err());
        params.max_len = 4;
        params.min_len = 5;
        assert!(params.validate().is_err());
        assert!(PARAMS.validate().is_ok());
    }
}
