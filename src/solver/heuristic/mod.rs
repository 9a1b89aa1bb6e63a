pub mod jeroslow_wang;
pub mod vsids;

use crate::cnf::VarId;
use crate::solver::state::State;
use clap::ValueEnum;

/// Decision variable selection. The driver picks the polarity from the
/// saved phases, so implementations only rank variables.
pub trait Heuristic {
    fn init(state: &State) -> Self
    where
        Self: Sized;

    /// Called once per conflict with the variables that took part in the
    /// resolution steps of the analysis.
    fn conflict(&mut self, bumped_vars: &[VarId]);

    /// Called for every assignment undone by backjumping or restarts.
    fn unassign(&mut self, var: VarId);

    /// The next decision variable; only called while some variable is
    /// unassigned.
    fn next(&mut self, vars: &[Option<bool>]) -> VarId;
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[clap(rename_all = "kebab_case")]
pub enum HeuristicType {
    #[clap(name = "vsids")]
    Vsids,
    #[clap(name = "jeroslow-wang")]
    JeroslowWang,
}

impl HeuristicType {
    pub fn create(&self, state: &State) -> Box<dyn Heuristic> {
        match self {
            HeuristicType::Vsids => Box::new(vsids::HeuristicVsids::init(state)),
            HeuristicType::JeroslowWang => {
                Box::new(jeroslow_wang::HeuristicJeroslowWang::init(state))
            }
        }
    }
}
