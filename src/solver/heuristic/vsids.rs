use ordered_float::NotNan;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;

use crate::cnf::VarId;
use crate::solver::heuristic::Heuristic;
use crate::solver::state::State;

const DECAY: f64 = 0.95;
const RESCALE_THRESHOLD: f64 = 1e100;
const RESCALE_FACTOR: f64 = 1e-100;

/// Priority key: activity first, then the lower variable index on ties.
type Priority = (NotNan<f64>, Reverse<VarId>);

/// Activity-based selection. Conflicts bump the variables resolved during
/// analysis by `inc`; dividing `inc` by the decay after each conflict is
/// equivalent to decaying every activity multiplicatively. Activities and
/// `inc` are rescaled together once `inc` grows past the threshold.
pub struct HeuristicVsids {
    order: PriorityQueue<VarId, Priority>,
    activities: Vec<f64>,
    inc: f64,
}

impl HeuristicVsids {
    fn priority(&self, var: VarId) -> Priority {
        (NotNan::new(self.activities[var]).unwrap(), Reverse(var))
    }

    fn rescale(&mut self) {
        for activity in &mut self.activities {
            *activity *= RESCALE_FACTOR;
        }
        self.inc *= RESCALE_FACTOR;

        let rescaled = self
            .order
            .iter()
            .map(|(var, _)| *var)
            .collect::<Vec<_>>()
            .into_iter()
            .map(|var| (var, self.priority(var)))
            .collect();
        self.order = rescaled;
    }
}

impl Heuristic for HeuristicVsids {
    fn init(state: &State) -> Self {
        let activities = vec![0.0; state.num_vars + 1];
        HeuristicVsids {
            order: (1..=state.num_vars)
                .map(|var| (var, (NotNan::new(0.0).unwrap(), Reverse(var))))
                .collect(),
            activities,
            inc: 1.0,
        }
    }

    fn conflict(&mut self, bumped_vars: &[VarId]) {
        for var in bumped_vars {
            self.activities[*var] += self.inc;
            if self.activities[*var] > RESCALE_THRESHOLD {
                self.rescale();
            }
            let priority = self.priority(*var);
            self.order.change_priority(var, priority);
        }
        self.inc /= DECAY;
        if self.inc > RESCALE_THRESHOLD {
            self.rescale();
        }
    }

    fn unassign(&mut self, var: VarId) {
        let priority = self.priority(var);
        self.order.push(var, priority);
    }

    fn next(&mut self, vars: &[Option<bool>]) -> VarId {
        loop {
            let (var, _) = self.order.pop().expect("no unassigned variable left");
            if vars[var].is_none() {
                return var;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::Clause;

    fn state(num_vars: usize) -> State {
        State::init(vec![Clause::from("1 2")], num_vars)
    }

    #[test]
    fn test_bumped_variable_is_preferred() {
        let state = state(4);
        let mut heuristic = HeuristicVsids::init(&state);
        heuristic.conflict(&[3]);
        assert_eq!(heuristic.next(&state.vars), 3);
    }

    #[test]
    fn test_ties_break_towards_lowest_index() {
        let state = state(4);
        let mut heuristic = HeuristicVsids::init(&state);
        assert_eq!(heuristic.next(&state.vars), 1);
        heuristic.conflict(&[2, 4]);
        assert_eq!(heuristic.next(&state.vars), 2);
    }

    #[test]
    fn test_later_bumps_outweigh_earlier_ones() {
        let state = state(3);
        let mut heuristic = HeuristicVsids::init(&state);
        // var 1 bumped once early, var 2 once late; the growing increment
        // makes the late bump larger
        heuristic.conflict(&[1]);
        heuristic.conflict(&[]);
        heuristic.conflict(&[2]);
        assert_eq!(heuristic.next(&state.vars), 2);
    }

    #[test]
    fn test_assigned_variables_are_skipped() {
        let mut state = state(3);
        let mut heuristic = HeuristicVsids::init(&state);
        heuristic.conflict(&[1]);
        state.vars[1] = Some(true);
        assert_eq!(heuristic.next(&state.vars), 2);
        // unassigning returns the variable to the queue
        state.vars[1] = None;
        heuristic.unassign(1);
        assert_eq!(heuristic.next(&state.vars), 1);
    }

    #[test]
    fn test_rescale_keeps_relative_order() {
        let state = state(3);
        let mut heuristic = HeuristicVsids::init(&state);
        heuristic.conflict(&[2]);
        heuristic.conflict(&[2]);
        heuristic.conflict(&[3]);
        heuristic.rescale();
        assert!(heuristic.activities[2] > heuristic.activities[3]);
        assert_eq!(heuristic.next(&state.vars), 2);
    }
}
