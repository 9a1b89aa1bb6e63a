use crate::cnf::{Clause, ClauseId};
use crate::solver::literal_watching::LiteralWatcher;
use crate::solver::trail::Trail;
use itertools::Itertools;
use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut};

const DELETION_BASE_INTERVAL: usize = 2000;
const DELETION_INTERVAL_GROWTH: usize = 300;
const GLUE_LBD: usize = 2;

/// Owns all clause storage. Ids below `first_learned_clause_id` are the
/// original formula and immutable for the solver's lifetime; everything
/// above is learned. Freed learned ids are recycled, so a `ClauseId` is
/// stable exactly for the clause's lifetime.
#[derive(Clone)]
pub struct ClauseDatabase {
    clauses: Vec<Clause>,
    first_learned_clause_id: ClauseId,
    free_clause_ids: Vec<ClauseId>,
    num_deletions: usize,
    conflicts_since_last_deletion: usize,
}

impl Debug for ClauseDatabase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ClauseDatabase:")?;
        for clause_id in self.iter() {
            let clause = &self.clauses[clause_id];
            writeln!(f, "{}: lbd {:?} {:?}", clause_id, clause.lbd, clause.literals)?;
        }
        Ok(())
    }
}

pub struct Iter<'a> {
    pos: usize,
    length: usize,
    free_clause_ids: &'a [ClauseId],
}

impl<'a> Iterator for Iter<'a> {
    type Item = ClauseId;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.length {
            let id = self.pos;
            self.pos += 1;
            if self.free_clause_ids.binary_search(&id).is_err() {
                return Some(id);
            }
        }
        None
    }
}

impl ClauseDatabase {
    pub fn init(clauses: Vec<Clause>) -> Self {
        ClauseDatabase {
            first_learned_clause_id: clauses.len(),
            clauses,
            free_clause_ids: vec![],
            num_deletions: 0,
            conflicts_since_last_deletion: 0,
        }
    }

    pub fn original_clauses(&self) -> &[Clause] {
        &self.clauses[..self.first_learned_clause_id]
    }

    pub fn num_learned(&self) -> usize {
        self.clauses.len() - self.first_learned_clause_id - self.free_clause_ids.len()
    }

    pub fn add_clause(&mut self, clause: Clause, literal_watcher: &mut LiteralWatcher) -> ClauseId {
        let id = if let Some(id) = self.free_clause_ids.pop() {
            self.clauses[id] = clause;
            id
        } else {
            self.clauses.push(clause);
            self.clauses.len() - 1
        };

        if self.clauses[id].literals.len() >= 2 {
            literal_watcher.add_clause(&self.clauses[id], id);
        }
        id
    }

    /// Live clause ids, originals and learned.
    pub fn iter(&self) -> Iter {
        Iter {
            pos: 0,
            length: self.clauses.len(),
            free_clause_ids: &self.free_clause_ids,
        }
    }

    fn is_free(&self, clause_id: ClauseId) -> bool {
        self.free_clause_ids.binary_search(&clause_id).is_ok()
    }

    /// True when every original clause currently has a true literal. Each
    /// satisfied clause remembers that literal as its blocking literal.
    pub fn originals_satisfied(&mut self, vars: &[Option<bool>]) -> bool {
        for clause in self.clauses[..self.first_learned_clause_id].iter_mut() {
            if clause.literals.is_empty() {
                return false;
            }
            if clause.check_blocking_literal(vars) {
                continue;
            }
            match clause.literals.iter().position(|lit| lit.is_true(vars)) {
                Some(idx) => clause.blocking = idx,
                None => return false,
            }
        }
        true
    }

    fn delete_clause_if_allowed(
        &mut self,
        clause_id: ClauseId,
        literal_watcher: &mut LiteralWatcher,
        trail: &Trail,
    ) {
        // reason clauses must outlive the assignments they force
        if trail.is_reason(clause_id) {
            return;
        }
        if self.is_free(clause_id) || self.clauses[clause_id].literals.len() < 2 {
            return;
        }

        literal_watcher.delete_clause(&self.clauses[clause_id], clause_id);
        self.free_clause_ids.push(clause_id);
        self.free_clause_ids.sort_unstable();
    }

    /// Periodically drops learned clauses whose LBD is above the median.
    /// Glue clauses, reason clauses and the original formula are kept.
    pub fn delete_clauses_if_necessary(
        &mut self,
        literal_watcher: &mut LiteralWatcher,
        trail: &Trail,
    ) {
        if self.conflicts_since_last_deletion
            < DELETION_BASE_INTERVAL + DELETION_INTERVAL_GROWTH * self.num_deletions
        {
            self.conflicts_since_last_deletion += 1;
            return;
        }
        self.conflicts_since_last_deletion = 0;
        self.num_deletions += 1;

        let lbds = (self.first_learned_clause_id..self.clauses.len())
            .filter(|clause_id| !self.is_free(*clause_id))
            .filter_map(|clause_id| self.clauses[clause_id].lbd)
            .sorted()
            .collect_vec();
        if lbds.is_empty() {
            return;
        }
        let threshold = lbds[lbds.len() / 2];

        let before = self.num_learned();
        for clause_id in self.first_learned_clause_id..self.clauses.len() {
            if let Some(lbd) = self.clauses[clause_id].lbd {
                if lbd <= threshold || lbd <= GLUE_LBD {
                    continue;
                }
                self.delete_clause_if_allowed(clause_id, literal_watcher, trail);
            }
        }
        log::debug!(
            "clause deletion: {} -> {} learned clauses (lbd threshold {})",
            before,
            self.num_learned(),
            threshold
        );
    }
}

impl Index<ClauseId> for ClauseDatabase {
    type Output = Clause;

    fn index(&self, index: ClauseId) -> &Self::Output {
        &self.clauses[index]
    }
}

impl IndexMut<ClauseId> for ClauseDatabase {
    fn index_mut(&mut self, index: ClauseId) -> &mut Self::Output {
        &mut self.clauses[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::Literal;

    #[test]
    fn test_partition_and_id_reuse() {
        let mut watcher = LiteralWatcher::new(&[], 4);
        let mut db = ClauseDatabase::init(vec![Clause::from("1 2"), Clause::from("-1 3")]);
        assert_eq!(db.original_clauses().len(), 2);

        let learned = Clause::from_literals_and_lbd(vec![(-2).into(), 4.into()], 2);
        let id = db.add_clause(learned, &mut watcher);
        assert_eq!(id, 2);
        assert_eq!(db.num_learned(), 1);
        assert!(db[id].is_learned());

        let trail = Trail::new(4);
        db.delete_clause_if_allowed(id, &mut watcher, &trail);
        assert_eq!(db.num_learned(), 0);
        assert_eq!(db.iter().collect_vec(), vec![0, 1]);

        // the freed id is recycled
        let learned = Clause::from_literals_and_lbd(vec![2.into(), (-4).into()], 2);
        assert_eq!(db.add_clause(learned, &mut watcher), 2);
    }

    #[test]
    fn test_reason_clauses_survive_deletion() {
        let mut watcher = LiteralWatcher::new(&[], 2);
        let mut db = ClauseDatabase::init(vec![]);
        let id = db.add_clause(
            Clause::from_literals_and_lbd(vec![1.into(), 2.into()], 3),
            &mut watcher,
        );

        let mut trail = Trail::new(2);
        trail.assignment_stack.push(
            crate::solver::trail::Assignment::forced(Literal::from(2), 1, id),
        );
        db.delete_clause_if_allowed(id, &mut watcher, &trail);
        assert_eq!(db.num_learned(), 1);
    }

    #[test]
    fn test_originals_satisfied_updates_blocking() {
        let mut db = ClauseDatabase::init(vec![Clause::from("1 2"), Clause::from("-1 3")]);
        let vars = vec![None, Some(true), None, Some(true)];
        assert!(db.originals_satisfied(&vars));
        assert_eq!(db[0].blocking, 0);
        assert_eq!(db[1].blocking, 1);

        let vars = vec![None, Some(true), None, Some(false)];
        assert!(!db.originals_satisfied(&vars));
    }
}
