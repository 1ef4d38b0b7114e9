/*!
The literal mate index: a positive/negative pair of discrimination trees
over the literal atoms of indexed clauses.

The resolution family asks it one question: which indexed literals of the
opposite sign might unify with this atom?
Payloads are (clause handle, 1-based literal number).
*/

use crate::index::discrim::DiscrimTree;
use crate::structures::clause::{ClauseArena, ClauseId};
use crate::structures::term::TermArena;

/// One payload: where the literal lives.
pub type LitEntry = (ClauseId, usize);

#[derive(Default)]
pub struct Lindex {
    pub pos: DiscrimTree<LitEntry>,
    pub neg: DiscrimTree<LitEntry>,
}

impl Lindex {
    pub fn insert_clause(&mut self, arena: &TermArena, clauses: &ClauseArena, id: ClauseId) {
        for (i, lit) in clauses[id].literals.iter().enumerate() {
            let tree = if lit.sign { &mut self.pos } else { &mut self.neg };
            tree.insert(arena, lit.atom, (id, i + 1));
        }
    }

    pub fn remove_clause(&mut self, arena: &TermArena, clauses: &ClauseArena, id: ClauseId) {
        for (i, lit) in clauses[id].literals.iter().enumerate() {
            let tree = if lit.sign { &mut self.pos } else { &mut self.neg };
            tree.remove(arena, lit.atom, &(id, i + 1));
        }
    }

    /// The tree holding literals of the given sign.
    pub fn tree(&self, sign: bool) -> &DiscrimTree<LitEntry> {
        if sign {
            &self.pos
        } else {
            &self.neg
        }
    }
}
