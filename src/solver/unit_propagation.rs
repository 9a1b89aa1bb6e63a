use crate::cnf::{ClauseId, Literal};
use crate::solver::state::State;
use crate::solver::trail::{AssignmentReason, Trail};
use std::collections::VecDeque;

/// Pending forced assignments, each paired with its reason clause. The
/// queue head separates propagated assignments from those still pending.
#[derive(Debug, Default)]
pub struct UnitPropagator {
    pub unit_queue: VecDeque<(Literal, ClauseId)>,
    enqueued: Vec<Literal>,
}

impl UnitPropagator {
    pub fn enqueue(&mut self, lit: Literal, reason: ClauseId) {
        if self.enqueued.contains(&lit) {
            return;
        }
        self.unit_queue.push_back((lit, reason));
        self.enqueued.push(lit);
    }

    /// Drains the queue to fixpoint. Afterwards either every forced
    /// assignment is on the trail or `state.conflict_clause_id` names a
    /// clause with all literals false.
    pub fn propagate(&mut self, state: &mut State, trail: &mut Trail) {
        while let Some((lit, reason)) = self.unit_queue.pop_front() {
            match state.literal_value(lit) {
                Some(true) => continue,
                Some(false) => {
                    // the complement was enqueued first; the reason clause
                    // is now falsified in full
                    state.conflict_clause_id = Some(reason);
                    state.stats.num_conflicts += 1;
                }
                None => {
                    state.stats.num_propagations += 1;
                    trail.assign(state, self, lit, AssignmentReason::Forced(reason));
                }
            }
            if state.conflict_clause_id.is_some() {
                self.unit_queue.clear();
                self.enqueued.clear();
                return;
            }
        }
        self.enqueued.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::Clause;

    #[test]
    fn test_propagation_chain() {
        let clauses = vec![
            Clause::from("-1 2"),
            Clause::from("-2 3"),
            Clause::from("-3 4"),
        ];
        let mut state = State::init(clauses, 4);
        let mut trail = Trail::new(4);
        let mut unit_prop = UnitPropagator::default();

        trail.assign(&mut state, &mut unit_prop, Literal::from(1), AssignmentReason::Decision);
        unit_prop.propagate(&mut state, &mut trail);

        assert!(state.conflict_clause_id.is_none());
        for var in 1..=4 {
            assert_eq!(state.vars[var], Some(true));
            assert_eq!(trail.var_decision_level[var], 1);
        }
        // no clause is left unit-but-unassigned once propagation settles
        state.verify_watches();
    }

    #[test]
    fn test_complementary_units_conflict() {
        let clauses = vec![Clause::from("1 2"), Clause::from("-1 2"), Clause::from("-2")];
        let mut state = State::init(clauses, 2);
        let mut trail = Trail::new(2);
        let mut unit_prop = UnitPropagator::default();

        unit_prop.enqueue(Literal::from(-2), 2);
        unit_prop.propagate(&mut state, &mut trail);
        // -2 forces 1 via clause 0 and -1 via clause 1
        assert!(state.conflict_clause_id.is_some());
        assert!(unit_prop.unit_queue.is_empty());
    }

    #[test]
    fn test_duplicate_enqueue_is_ignored() {
        let mut unit_prop = UnitPropagator::default();
        unit_prop.enqueue(Literal::from(3), 0);
        unit_prop.enqueue(Literal::from(3), 1);
        assert_eq!(unit_prop.unit_queue.len(), 1);
    }
}
