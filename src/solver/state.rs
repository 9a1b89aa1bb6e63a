use crate::cnf::{Clause, ClauseId, Literal, VarId};
use crate::solver::clause_database::ClauseDatabase;
use crate::solver::literal_watching::{LiteralWatcher, WatchUpdate};
use crate::solver::statistics::SolverStatistics;
use crate::solver::unit_propagation::UnitPropagator;
use itertools::Itertools;
use std::collections::HashMap;

/// Everything the search mutates: the assignment array, saved phases, the
/// clause database with its watch lists, and the conflict latch.
#[derive(Debug, Clone)]
pub struct State {
    pub conflict_clause_id: Option<ClauseId>,
    pub vars: Vec<Option<bool>>,
    pub var_phases: Vec<bool>,
    pub clause_database: ClauseDatabase,
    pub literal_watcher: LiteralWatcher,
    pub num_vars: usize,
    pub stats: SolverStatistics,
}

impl State {
    pub fn init(clauses: Vec<Clause>, num_vars: usize) -> Self {
        // tautologies never constrain anything
        let relevant_clauses = clauses
            .into_iter()
            .filter(|clause| !clause.is_tautology())
            .collect_vec();

        State {
            conflict_clause_id: None,
            vars: vec![None; num_vars + 1],
            var_phases: vec![false; num_vars + 1],
            literal_watcher: LiteralWatcher::new(&relevant_clauses, num_vars),
            stats: SolverStatistics::new(relevant_clauses.len(), num_vars),
            clause_database: ClauseDatabase::init(relevant_clauses),
            num_vars,
        }
    }

    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.vars[lit.id()].map(|value| value == lit.positive())
    }

    /// Makes `lit` true and walks the watch lists of its complement,
    /// enqueueing fresh units and latching the first conflict.
    pub fn assign(&mut self, lit: Literal, unit_propagator: &mut UnitPropagator) {
        self.stats.num_assignments += 1;

        let (var_id, value) = lit.id_val();
        if self.vars[var_id].is_some() {
            panic!("variable {} is assigned twice", var_id);
        }
        self.vars[var_id] = Some(value);

        let affected_clauses = std::mem::take(self.literal_watcher.affected_clauses(lit));
        for clause_id in affected_clauses {
            // after a conflict the remaining watches are left untouched
            if self.conflict_clause_id.is_some() {
                self.literal_watcher.add_watch(-lit, clause_id);
                continue;
            }

            let clause = &mut self.clause_database[clause_id];
            if clause.check_blocking_literal(&self.vars) {
                self.literal_watcher.add_watch(-lit, clause_id);
                continue;
            }

            let watch_update =
                self.literal_watcher
                    .update_clause(clause, clause_id, -lit, &self.vars);
            match watch_update {
                WatchUpdate::FoundNewWatch => {}
                WatchUpdate::Satisfied => {
                    self.literal_watcher.add_watch(-lit, clause_id);
                }
                WatchUpdate::Unit(unit) => {
                    self.literal_watcher.add_watch(-lit, clause_id);
                    unit_propagator.enqueue(unit, clause_id);
                }
                WatchUpdate::Conflict => {
                    self.literal_watcher.add_watch(-lit, clause_id);
                    self.conflict_clause_id = Some(clause_id);
                    self.stats.num_conflicts += 1;
                }
            }
        }
    }

    /// Clears the variable; its value at this moment becomes the preferred
    /// phase for future decisions.
    pub fn unassign(&mut self, lit: Literal) {
        self.stats.num_unassignments += 1;
        if let Some(value) = self.vars[lit.id()] {
            self.var_phases[lit.id()] = value;
        }
        self.vars[lit.id()] = None;
    }

    /// True when every original clause has a true literal. Learned clauses
    /// are consequences of the originals, so any completion of a satisfying
    /// partial assignment satisfies them as well.
    pub fn formula_satisfied(&mut self) -> bool {
        self.clause_database.originals_satisfied(&self.vars)
    }

    pub fn assignment(&self) -> HashMap<VarId, bool> {
        let mut result = HashMap::new();
        for (id, value) in self.vars.iter().enumerate().skip(1) {
            if let Some(value) = value {
                result.insert(id as VarId, *value);
            }
        }
        result
    }

    /// Checks the watch invariants: every unsatisfied long clause keeps at
    /// least one non-false watch (unless a conflict is latched), and both
    /// watched literals appear in their watch lists.
    pub fn verify_watches(&mut self) {
        for clause_id in self.clause_database.iter().collect_vec() {
            let clause = &self.clause_database[clause_id];
            if clause.literals.len() < 2 || clause.is_satisfied(&self.vars) {
                continue;
            }
            let [first, second] = clause.watches();
            assert!(
                first.non_false(&self.vars)
                    || second.non_false(&self.vars)
                    || self.conflict_clause_id.is_some(),
                "both watches of clause {} are false",
                clause_id
            );
        }

        for clause_id in self.clause_database.iter().collect_vec() {
            if self.clause_database[clause_id].literals.len() < 2 {
                continue;
            }
            for lit in self.clause_database[clause_id].watches() {
                assert!(
                    self.literal_watcher
                        .affected_clauses(-lit)
                        .contains(&clause_id),
                    "clause {} is not watched by {}",
                    clause_id,
                    lit
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_init() {
        let clauses = vec![
            Clause::from("1 2 3"),
            Clause::from("1 -2 3"),
            Clause::from("-1 -2 3"),
        ];
        let state = State::init(clauses, 3);
        assert_eq!(state.num_vars, 3);
        assert_eq!(state.vars, vec![None, None, None, None]);
        assert_eq!(state.var_phases, vec![false; 4]);
    }

    #[test]
    fn test_assign_detects_unit_and_conflict() {
        let clauses = vec![Clause::from("1 2 3"), Clause::from("-1 -2 3")];
        let mut state = State::init(clauses, 3);
        let mut unit_prop = UnitPropagator::default();

        state.assign(Literal::from(1), &mut unit_prop);
        assert_eq!(state.vars[1], Some(true));
        state.assign(Literal::from(2), &mut unit_prop);
        assert_eq!(unit_prop.unit_queue[0], (Literal::from(3), 1));
        state.assign(Literal::from(-3), &mut unit_prop);
        assert_eq!(state.conflict_clause_id, Some(1));
    }

    #[test]
    fn test_unassign_saves_phase() {
        let clauses = vec![Clause::from("1 2")];
        let mut state = State::init(clauses, 2);
        let mut unit_prop = UnitPropagator::default();

        state.assign(Literal::from(1), &mut unit_prop);
        state.unassign(Literal::from(1));
        assert_eq!(state.vars[1], None);
        assert!(state.var_phases[1]);
    }

    #[test]
    fn test_formula_satisfied_ignores_free_variables() {
        let clauses = vec![Clause::from("1 2 3")];
        let mut state = State::init(clauses, 3);
        let mut unit_prop = UnitPropagator::default();
        assert!(!state.formula_satisfied());
        state.assign(Literal::from(2), &mut unit_prop);
        assert!(state.formula_satisfied());
    }
}
