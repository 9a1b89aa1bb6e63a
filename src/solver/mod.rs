pub mod clause_database;
mod clause_learning;
pub mod config;
mod ema_policy;
pub mod heuristic;
pub mod literal_watching;
pub mod restarts;
pub mod state;
pub mod statistics;
pub mod trail;
pub mod unit_propagation;

use crate::cnf::{Clause, Literal, SolutionAssignment, VarId};
use crate::dimacs::Formula;
use crate::solver::clause_learning::ClauseLearner;
use crate::solver::config::Config;
use crate::solver::restarts::Restarter;
use crate::solver::state::State;
use crate::solver::statistics::SolverStatistics;
use crate::solver::trail::{AssignmentReason, Trail};
use crate::solver::unit_propagation::UnitPropagator;
use itertools::Itertools;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Sat(SolutionAssignment),
    Unsat,
    /// The conflict budget ran out before the search finished.
    Unknown,
}

impl Outcome {
    pub fn is_sat(&self) -> bool {
        matches!(self, Outcome::Sat(_))
    }

    pub fn unwrap_sat(self) -> SolutionAssignment {
        match self {
            Outcome::Sat(assignment) => assignment,
            other => panic!("expected Sat, got {:?}", other),
        }
    }
}

pub struct Solver {
    config: Config,
    state: State,
    clause_learner: ClauseLearner,
}

impl Solver {
    pub fn new(clauses: Vec<Clause>, num_vars: usize, config: Config) -> Self {
        Solver {
            state: State::init(clauses, num_vars),
            clause_learner: ClauseLearner::default(),
            config,
        }
    }

    pub fn from_formula(formula: Formula, config: Config) -> Self {
        Solver::new(formula.clauses, formula.num_vars, config)
    }

    pub fn solve(&mut self) -> Outcome {
        self.state.stats.start_timing();

        if self.is_trivially_unsat() {
            self.state.stats.stop_timing();
            return Outcome::Unsat;
        }

        let mut heuristic = self.config.heuristic.create(&self.state);
        let mut restarter = Restarter::init(self.config.restart_policy);
        let mut unit_propagator = UnitPropagator::default();
        let mut trail = Trail::new(self.state.num_vars);

        self.enqueue_initial_units(&mut unit_propagator);

        loop {
            unit_propagator.propagate(&mut self.state, &mut trail);

            if let Some(conflict_clause_id) = self.state.conflict_clause_id {
                if trail.decision_level == 0 {
                    self.state.stats.stop_timing();
                    return Outcome::Unsat;
                }

                let (learned_clause, assertion_level, bumped_vars) = self
                    .clause_learner
                    .analyse_conflict(&trail, &self.state.clause_database, conflict_clause_id);

                restarter.conflict(
                    learned_clause.lbd.unwrap_or(1),
                    trail.assignment_stack.len(),
                );
                heuristic.conflict(&bumped_vars);

                self.state
                    .clause_database
                    .delete_clauses_if_necessary(&mut self.state.literal_watcher, &trail);

                // position 0 of the learned clause is the UIP; after the
                // backjump it is the only unassigned literal and propagates
                let asserting_literal = learned_clause.literals[0];
                let learned_clause_id = self
                    .state
                    .clause_database
                    .add_clause(learned_clause, &mut self.state.literal_watcher);
                self.state.stats.num_learned_clauses += 1;

                trail.backtrack(&mut self.state, heuristic.as_mut(), assertion_level);
                unit_propagator.enqueue(asserting_literal, learned_clause_id);
            } else if self.state.formula_satisfied() {
                self.state.stats.stop_timing();
                return Outcome::Sat(self.complete_assignment());
            } else if self.budget_exhausted() {
                self.state.stats.stop_timing();
                return Outcome::Unknown;
            } else if restarter.check_if_restart_necessary() {
                self.state.stats.num_restarts += 1;
                trail.restart(&mut self.state, heuristic.as_mut());
            } else {
                let next_var = heuristic.next(&self.state.vars);
                let next_literal = Literal::from_value(next_var, self.state.var_phases[next_var]);
                trail.assign(
                    &mut self.state,
                    &mut unit_propagator,
                    next_literal,
                    AssignmentReason::Decision,
                );
            }
        }
    }

    /// Screens for an empty clause or a complementary pair of unit clauses
    /// before any search machinery runs.
    fn is_trivially_unsat(&self) -> bool {
        let originals = self.state.clause_database.original_clauses();
        if originals.iter().any(|clause| clause.literals.is_empty()) {
            return true;
        }

        let units = originals
            .iter()
            .filter(|clause| clause.literals.len() == 1)
            .map(|clause| clause.literals[0])
            .collect_vec();
        let positives: HashSet<VarId> = units
            .iter()
            .filter(|lit| lit.positive())
            .map(|lit| lit.id())
            .collect();
        let negatives: HashSet<VarId> = units
            .iter()
            .filter(|lit| lit.negative())
            .map(|lit| lit.id())
            .collect();

        positives.intersection(&negatives).count() > 0
    }

    fn enqueue_initial_units(&self, unit_propagator: &mut UnitPropagator) {
        for (clause_id, clause) in self
            .state
            .clause_database
            .original_clauses()
            .iter()
            .enumerate()
        {
            if clause.literals.len() == 1 {
                unit_propagator.enqueue(clause.literals[0], clause_id);
            }
        }
    }

    /// The model: assigned variables keep their value, free variables take
    /// their saved phase.
    fn complete_assignment(&self) -> SolutionAssignment {
        let mut assignment = self.state.assignment();
        for var in 1..=self.state.num_vars {
            assignment
                .entry(var)
                .or_insert(self.state.var_phases[var]);
        }
        assignment
    }

    fn budget_exhausted(&self) -> bool {
        let exhausted = self
            .config
            .max_conflicts
            .is_some_and(|budget| self.state.stats.num_conflicts >= budget);
        if exhausted {
            log::info!(
                "conflict budget of {} exhausted, giving up",
                self.config.max_conflicts.unwrap_or(0)
            );
        }
        exhausted
    }

    pub fn stats(&self) -> &SolverStatistics {
        &self.state.stats
    }
}
