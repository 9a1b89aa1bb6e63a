// Glucose-style restarts as described in
// A. Biere and A. Fröhlich, "Evaluating CDCL Restart Schemes".
// A restart is forced when the short-term LBD average runs above the
// long-term one, and blocked while the trail is unusually deep.

const LBD_EMA_SHORT_TERM_ALPHA: f64 = 2.0 / 51.0; // window size of 50
const LBD_EMA_LONG_TERM_ALPHA: f64 = 2e-6;
const ASSIGNMENT_EMA_SHORT_TERM_ALPHA: f64 = 2.0 / 51.0;
const ASSIGNMENT_EMA_LONG_TERM_ALPHA: f64 = 2e-6;

const MARGIN_RATIO_FORCING_RESTART: f64 = 1.15;
const MARGIN_RATIO_BLOCKING_RESTART: f64 = 1.4;

const MIN_CONFLICTS_BETWEEN_RESTARTS: usize = 50;

#[derive(Debug, Clone)]
pub struct EmaPolicy {
    lbd_short_term: ExponentialMovingAverage,
    lbd_long_term: ExponentialMovingAverage,
    assignments_short_term: ExponentialMovingAverage,
    assignments_long_term: ExponentialMovingAverage,
}

impl EmaPolicy {
    pub fn init() -> Self {
        EmaPolicy {
            lbd_short_term: ExponentialMovingAverage::init(LBD_EMA_SHORT_TERM_ALPHA),
            lbd_long_term: ExponentialMovingAverage::init(LBD_EMA_LONG_TERM_ALPHA),
            assignments_short_term: ExponentialMovingAverage::init(ASSIGNMENT_EMA_SHORT_TERM_ALPHA),
            assignments_long_term: ExponentialMovingAverage::init(ASSIGNMENT_EMA_LONG_TERM_ALPHA),
        }
    }

    pub fn conflict(&mut self, learned_clause_lbd: usize, num_current_assignments: usize) {
        let lbd = learned_clause_lbd as f64;
        self.lbd_long_term.update(lbd);
        self.lbd_short_term.update(lbd);

        let assignments = num_current_assignments as f64;
        self.assignments_long_term.update(assignments);
        self.assignments_short_term.update(assignments);
    }

    pub fn check_if_restart_necessary(&self, conflicts_since_last_restart: usize) -> bool {
        conflicts_since_last_restart >= MIN_CONFLICTS_BETWEEN_RESTARTS
            && self.restart_necessary()
            && !self.restart_blocked()
    }

    fn restart_necessary(&self) -> bool {
        self.lbd_short_term.value > MARGIN_RATIO_FORCING_RESTART * self.lbd_long_term.value
    }

    fn restart_blocked(&self) -> bool {
        self.assignments_short_term.value
            > MARGIN_RATIO_BLOCKING_RESTART * self.assignments_long_term.value
    }
}

/// Starts with a larger alpha that decays towards the target, so the
/// average is meaningful from the first few samples on.
#[derive(Debug, Clone)]
struct ExponentialMovingAverage {
    value: f64,
    alpha: f64,
    target_alpha: f64,
}

impl ExponentialMovingAverage {
    fn init(target_alpha: f64) -> Self {
        assert!(0.0 < target_alpha && target_alpha < 1.0);
        ExponentialMovingAverage {
            value: 1.0,
            alpha: 1.0,
            target_alpha,
        }
    }

    fn update(&mut self, new_value: f64) -> f64 {
        if self.alpha != self.target_alpha {
            self.alpha /= 1.02;
            if self.alpha < self.target_alpha {
                self.alpha = self.target_alpha;
            }
        }

        // EMA(n, α) := α · t(n) + (1 − α) · EMA(n − 1, α)
        self.value = self.alpha * new_value + (1.0 - self.alpha) * self.value;
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_converges_to_constant_input() {
        let mut ema = ExponentialMovingAverage::init(0.1);
        for _ in 0..200 {
            ema.update(4.0);
        }
        assert!((ema.value - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_degrading_lbd_forces_restart() {
        let mut policy = EmaPolicy::init();
        // healthy phase: low LBDs
        for _ in 0..500 {
            policy.conflict(2, 10);
        }
        assert!(!policy.check_if_restart_necessary(100));
        // the learned clauses suddenly get much worse
        for _ in 0..100 {
            policy.conflict(20, 10);
        }
        assert!(policy.check_if_restart_necessary(100));
    }

    #[test]
    fn test_minimum_distance_between_restarts() {
        let mut policy = EmaPolicy::init();
        for _ in 0..100 {
            policy.conflict(20, 10);
        }
        assert!(!policy.check_if_restart_necessary(10));
    }
}
