use crate::solver::ema_policy::EmaPolicy;
use clap::ValueEnum;

const FIXED_INTERVAL_SIZE: usize = 700;
const GEOMETRIC_INTERVAL_SIZE: usize = 100;
const GEOMETRIC_MAGNIFICATION_FACTOR: f64 = 1.5;
const LUBY_UNIT: usize = 32;

#[derive(Debug, Copy, Clone, ValueEnum)]
#[clap(rename_all = "kebab_case")]
pub enum RestartPolicy {
    #[clap(name = "fixed")]
    Fixed,
    #[clap(name = "geometric")]
    Geometric,
    #[clap(name = "luby")]
    Luby,
    #[clap(name = "glucose")]
    Glucose,
    #[clap(name = "off")]
    Off,
}

/// Counts conflicts since the last restart and decides when to erase the
/// decisions. Learned clauses, activities and phases are untouched by a
/// restart; only the trail above level 0 goes.
#[derive(Debug, Clone)]
pub struct Restarter {
    num_restarts: usize,
    conflicts_since_last_restart: usize,
    restart_policy: RestartPolicy,
    ema: EmaPolicy,
}

impl Restarter {
    pub fn init(restart_policy: RestartPolicy) -> Self {
        Restarter {
            num_restarts: 0,
            conflicts_since_last_restart: 0,
            restart_policy,
            ema: EmaPolicy::init(),
        }
    }

    pub fn conflict(&mut self, learned_clause_lbd: usize, num_assignments: usize) {
        self.conflicts_since_last_restart += 1;
        self.ema.conflict(learned_clause_lbd, num_assignments);
    }

    pub fn check_if_restart_necessary(&mut self) -> bool {
        let restart_necessary = match self.restart_policy {
            RestartPolicy::Fixed => self.conflicts_since_last_restart >= FIXED_INTERVAL_SIZE,
            RestartPolicy::Geometric => self.geometric_check_necessary(),
            RestartPolicy::Luby => self.luby_check_necessary(),
            RestartPolicy::Glucose => self
                .ema
                .check_if_restart_necessary(self.conflicts_since_last_restart),
            RestartPolicy::Off => false,
        };

        if restart_necessary {
            log::debug!(
                "restart {} after {} conflicts",
                self.num_restarts + 1,
                self.conflicts_since_last_restart
            );
            self.conflicts_since_last_restart = 0;
            self.num_restarts += 1;
        }
        restart_necessary
    }

    fn geometric_check_necessary(&self) -> bool {
        (self.conflicts_since_last_restart as f64)
            >= GEOMETRIC_INTERVAL_SIZE as f64
                * GEOMETRIC_MAGNIFICATION_FACTOR.powi(self.num_restarts as i32)
    }

    fn luby_check_necessary(&self) -> bool {
        // the luby sequence is defined from i = 1
        self.conflicts_since_last_restart >= LUBY_UNIT * Restarter::luby(self.num_restarts + 1)
    }

    /// The sequence 1 1 2 1 1 2 4 1 1 2 1 1 2 4 8 ..., computed by locating
    /// the smallest complete block containing position `i` and descending
    /// into its sub-blocks. A block of 2^k - 1 entries ends with 2^(k-1).
    fn luby(i: usize) -> usize {
        let mut index = i - 1;
        let mut exponent = 0;
        let mut block = 1;
        while block < index + 1 {
            exponent += 1;
            block = 2 * block + 1;
        }
        while block - 1 != index {
            block = (block - 1) / 2;
            exponent -= 1;
            index %= block;
        }
        1 << exponent
    }
}
