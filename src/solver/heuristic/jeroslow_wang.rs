use crate::cnf::VarId;
use crate::solver::heuristic::Heuristic;
use crate::solver::state::State;
use itertools::Itertools;

/// Static one-sided Jeroslow-Wang: every literal scores the sum of
/// 2^-|C| over the original clauses containing it, and a variable ranks by
/// its better polarity. Scores are not refreshed during search.
pub struct HeuristicJeroslowWang {
    order: Vec<VarId>,
}

impl Heuristic for HeuristicJeroslowWang {
    fn init(state: &State) -> Self {
        let mut scores = vec![0.0_f64; 2 * (state.num_vars + 1)];
        for clause in state.clause_database.original_clauses() {
            let weight = 2.0_f64.powi(-(clause.literals.len() as i32));
            for lit in &clause.literals {
                let polarity = usize::from(lit.positive());
                scores[2 * lit.id() + polarity] += weight;
            }
        }

        let order = (1..=state.num_vars)
            .map(|var| (var, scores[2 * var].max(scores[2 * var + 1])))
            .sorted_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap())
            .map(|(var, _)| var)
            .collect_vec();

        HeuristicJeroslowWang { order }
    }

    fn conflict(&mut self, _bumped_vars: &[VarId]) {}

    fn unassign(&mut self, _var: VarId) {}

    fn next(&mut self, vars: &[Option<bool>]) -> VarId {
        for var in &self.order {
            if vars[*var].is_none() {
                return *var;
            }
        }
        panic!("no unassigned variable left");
    }
}
