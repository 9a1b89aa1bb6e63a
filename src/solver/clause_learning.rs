use crate::cnf::{Clause, ClauseId, Literal, VarId};
use crate::solver::clause_database::ClauseDatabase;
use crate::solver::trail::{AssignmentReason, Trail};
use fnv::FnvHashSet;
use itertools::Itertools;

#[derive(Debug, Default, Clone)]
pub struct ClauseLearner {}

impl ClauseLearner {
    /// First-UIP conflict analysis. Expects a latched conflict at decision
    /// level >= 1. Returns the learned clause (UIP literal in position 0,
    /// an assertion-level literal in position 1), the assertion level, and
    /// every variable that took part in a resolution step.
    pub fn analyse_conflict(
        &mut self,
        trail: &Trail,
        clause_database: &ClauseDatabase,
        conflict_clause_id: ClauseId,
    ) -> (Clause, usize, Vec<VarId>) {
        debug_assert!(trail.decision_level >= 1);

        let mut learned_clause: Vec<Literal> = vec![];
        let mut bumped_vars: Vec<VarId> = vec![];
        let mut seen: FnvHashSet<VarId> = FnvHashSet::default();

        // literals of the current level still to be resolved away
        let mut unresolved_on_level = 0;
        let mut current_literal: Option<Literal> = None;
        let mut current_reason_clause_id = conflict_clause_id;
        let mut trail_position = trail.assignment_stack.len() - 1;

        loop {
            for lit in &clause_database[current_reason_clause_id].literals {
                if current_literal.is_some_and(|current| lit.id() == current.id()) {
                    continue; // the literal being resolved on
                }
                // level-0 literals are false outright and drop from the resolvent
                if seen.contains(&lit.id()) || trail.level_of(lit.id()) == 0 {
                    continue;
                }
                seen.insert(lit.id());
                bumped_vars.push(lit.id());

                debug_assert!(trail.level_of(lit.id()) <= trail.decision_level);
                if trail.level_of(lit.id()) == trail.decision_level {
                    unresolved_on_level += 1;
                } else {
                    learned_clause.push(*lit);
                }
            }

            // walk back to the next resolvent literal on the trail
            while !seen.contains(&trail.assignment_stack[trail_position].literal.id()) {
                trail_position -= 1;
            }
            let literal = trail.assignment_stack[trail_position].literal;
            seen.remove(&literal.id());
            current_literal = Some(literal);

            unresolved_on_level -= 1;
            if unresolved_on_level == 0 {
                break; // only the UIP remains on the conflict level
            }

            current_reason_clause_id = match trail.assignment_stack[trail_position].reason {
                AssignmentReason::Forced(reason) => reason,
                AssignmentReason::Decision => {
                    panic!("ran past the first UIP onto the decision itself")
                }
            };
        }

        learned_clause.push(-current_literal.unwrap());

        // The learned clause is watched at positions 0 and 1. Position 0
        // must be the UIP (unassigned after backjump) and position 1 a
        // literal of the assertion level (false until then).
        let last = learned_clause.len() - 1;
        learned_clause.swap(0, last);

        debug_assert_eq!(trail.level_of(learned_clause[0].id()), trail.decision_level);
        debug_assert_eq!(
            learned_clause
                .iter()
                .filter(|lit| trail.level_of(lit.id()) == trail.decision_level)
                .count(),
            1
        );

        let assertion_level = learned_clause
            .iter()
            .map(|lit| trail.level_of(lit.id()))
            .sorted()
            .rev()
            .nth(1)
            .unwrap_or(0);

        if let Some(assert_lit_idx) = learned_clause
            .iter()
            .position(|lit| trail.level_of(lit.id()) == assertion_level)
        {
            learned_clause.swap(1, assert_lit_idx);
        }
        debug_assert!(assertion_level < trail.decision_level);

        let lbd = learned_clause
            .iter()
            .map(|lit| trail.level_of(lit.id()))
            .unique()
            .count();

        (
            Clause::from_literals_and_lbd(learned_clause, lbd),
            assertion_level,
            bumped_vars,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::Clause;
    use crate::solver::state::State;
    use crate::solver::trail::Trail;
    use crate::solver::unit_propagation::UnitPropagator;

    fn run_to_conflict(
        cnf: Vec<Clause>,
        num_vars: usize,
        decisions: &[i32],
    ) -> (State, Trail) {
        let mut state = State::init(cnf, num_vars);
        let mut trail = Trail::new(num_vars);
        let mut unit_propagator = UnitPropagator::default();
        for decision in decisions {
            trail.assign(
                &mut state,
                &mut unit_propagator,
                (*decision).into(),
                AssignmentReason::Decision,
            );
            unit_propagator.propagate(&mut state, &mut trail);
            if state.conflict_clause_id.is_some() {
                break;
            }
        }
        (state, trail)
    }

    #[test]
    fn test_learned_clause_is_asserting() {
        let cnf = vec![
            Clause::from("-1 2"),      // 0
            Clause::from("-1 3 9"),    // 1
            Clause::from("-2 -3 4"),   // 2
            Clause::from("-4 5 10"),   // 3
            Clause::from("-4 6 11"),   // 4
            Clause::from("-5 -6"),     // 5
            Clause::from("1 7 -12"),   // 6
            Clause::from("1 8"),       // 7
            Clause::from("-7 -8 -13"), // 8
            Clause::from("10 -11"),    // 9
            Clause::from("-12 13"),    // 10
        ];
        let (state, trail) = run_to_conflict(cnf, 13, &[-9, -10, 12, 1]);
        assert!(state.conflict_clause_id.is_some());

        let (learned, assertion_level, bumped) = ClauseLearner::default().analyse_conflict(
            &trail,
            &state.clause_database,
            state.conflict_clause_id.unwrap(),
        );

        // exactly one literal from the conflict level, sitting in slot 0
        assert_eq!(trail.level_of(learned.literals[0].id()), trail.decision_level);
        assert_eq!(
            learned
                .literals
                .iter()
                .filter(|lit| trail.level_of(lit.id()) == trail.decision_level)
                .count(),
            1
        );
        // every other literal sits at or below the assertion level
        assert!(learned
            .literals
            .iter()
            .skip(1)
            .all(|lit| trail.level_of(lit.id()) <= assertion_level));
        assert!(assertion_level < trail.decision_level);
        assert!(!bumped.is_empty());
        assert!(learned.lbd.unwrap() >= 1);
    }

    #[test]
    fn test_uip_of_textbook_conflict() {
        // diamond: decision 4 at level 2 forces 5, which forces the clashing
        // 6 and -6; every path to the conflict runs through 5
        let cnf = vec![
            Clause::from("1 2"),      // 0
            Clause::from("2 3"),      // 1
            Clause::from("-1 -4 5"),  // 2
            Clause::from("-1 -5 6"),  // 3
            Clause::from("-1 -5 -6"), // 4
        ];
        let (state, trail) = run_to_conflict(cnf, 6, &[1, 4]);
        assert!(state.conflict_clause_id.is_some());

        let (learned, assertion_level, _) = ClauseLearner::default().analyse_conflict(
            &trail,
            &state.clause_database,
            state.conflict_clause_id.unwrap(),
        );
        assert_eq!(learned.literals[0], Literal::from(-5));
        assert_eq!(assertion_level, 1);
        assert_eq!(learned.literals[1], Literal::from(-1));
    }

    #[test]
    fn test_unit_learned_clause_asserts_at_level_zero() {
        let cnf = vec![
            Clause::from("-1 2"), // 0
            Clause::from("-1 3"), // 1
            Clause::from("-2 -3"), // 2
        ];
        let (state, trail) = run_to_conflict(cnf, 3, &[1]);
        assert!(state.conflict_clause_id.is_some());

        let (learned, assertion_level, _) = ClauseLearner::default().analyse_conflict(
            &trail,
            &state.clause_database,
            state.conflict_clause_id.unwrap(),
        );
        assert_eq!(learned.literals, vec![Literal::from(-1)]);
        assert_eq!(assertion_level, 0);
        println!("{}", trail.implication_graph(&state));
    }
}
