use crate::solver::heuristic::HeuristicType;
use crate::solver::restarts::RestartPolicy;

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub heuristic: HeuristicType,
    pub restart_policy: RestartPolicy,
    /// Conflict budget; exceeding it ends the search with `Unknown`.
    pub max_conflicts: Option<usize>,
}

impl Config {
    pub fn new(
        heuristic: HeuristicType,
        restart_policy: RestartPolicy,
        max_conflicts: Option<usize>,
    ) -> Self {
        Config {
            heuristic,
            restart_policy,
            max_conflicts,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            heuristic: HeuristicType::Vsids,
            restart_policy: RestartPolicy::Luby,
            max_conflicts: None,
        }
    }
}
