use crate::cnf::{Clause, ClauseId, Literal};

/// Watch lists per variable, split by polarity. Clauses are referenced by
/// their database id so the clause store may reallocate freely.
#[derive(Debug, Default, Clone)]
pub struct VarWatch {
    pub pos: Vec<ClauseId>,
    pub neg: Vec<ClauseId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WatchUpdate {
    FoundNewWatch,
    Satisfied,
    Unit(Literal),
    Conflict,
}

#[derive(Debug, Clone)]
pub struct LiteralWatcher {
    pub var_watches: Vec<VarWatch>,
}

impl LiteralWatcher {
    pub fn new(clauses: &[Clause], num_vars: usize) -> Self {
        let mut watcher = LiteralWatcher {
            var_watches: vec![VarWatch::default(); num_vars + 1],
        };
        for (clause_id, clause) in clauses.iter().enumerate() {
            // unit clauses are enqueued at level 0 and never watched
            if clause.literals.len() >= 2 {
                watcher.add_clause(clause, clause_id);
            }
        }
        watcher
    }

    pub fn add_clause(&mut self, clause: &Clause, clause_id: ClauseId) {
        debug_assert!(clause.literals.len() >= 2);
        for lit in clause.watches() {
            self.add_watch(lit, clause_id);
        }
    }

    pub fn delete_clause(&mut self, clause: &Clause, clause_id: ClauseId) {
        for lit in clause.watches() {
            self.watch_list(lit).retain(|id| *id != clause_id);
        }
    }

    /// Clauses watching the complement of `lit`, i.e. those whose watched
    /// literal just became false.
    pub fn affected_clauses(&mut self, lit: Literal) -> &mut Vec<ClauseId> {
        self.watch_list(-lit)
    }

    pub fn add_watch(&mut self, lit: Literal, clause_id: ClauseId) {
        self.watch_list(lit).push(clause_id);
    }

    fn watch_list(&mut self, lit: Literal) -> &mut Vec<ClauseId> {
        if lit.positive() {
            &mut self.var_watches[lit.id()].pos
        } else {
            &mut self.var_watches[lit.id()].neg
        }
    }

    /// Restores the watch invariant of `clause` after `falsified` became
    /// false. Slot 0 is normalized to the falsified watch; the caller keeps
    /// the old watch-list entry for every outcome except `FoundNewWatch`.
    pub fn update_clause(
        &mut self,
        clause: &mut Clause,
        clause_id: ClauseId,
        falsified: Literal,
        vars: &[Option<bool>],
    ) -> WatchUpdate {
        let mut watched = clause.watches();
        if watched[0].id() != falsified.id() {
            clause.watches.swap(0, 1);
            watched.swap(0, 1);
        }
        debug_assert_eq!(watched[0], falsified);
        debug_assert!(watched[0].is_false(vars));

        if watched[1].is_true(vars) {
            clause.blocking = clause.watches[1];
            return WatchUpdate::Satisfied;
        }
        // The other watch being false means every literal beyond the watches
        // was already false when that watch fell; the clause is conflicting.
        if watched[1].is_false(vars) {
            return WatchUpdate::Conflict;
        }

        for idx in 0..clause.literals.len() {
            if idx == clause.watches[0] || idx == clause.watches[1] {
                continue;
            }
            if clause.literals[idx].non_false(vars) {
                clause.watches[0] = idx;
                self.add_watch(clause.literals[idx], clause_id);
                return WatchUpdate::FoundNewWatch;
            }
        }

        WatchUpdate::Unit(watched[1])
    }
}
