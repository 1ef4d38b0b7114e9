/*!
The undo trail of the model search.

Every speculative mutation --- a cell assignment, a possible-value
cross-off, a clause-slot rewrite, an occurrence-list or negprop-index
insertion --- pushes a typed (target, old value) record.
Checkpoints are plain vector lengths, so taking one and unwinding to one
are O(1) and O(undone work).
The trail is strictly LIFO and there is exactly one per search.
*/

use crate::mace::cells::Space;
use crate::structures::term::{TermArena, TermId};

/// One undoable mutation.
#[derive(Clone, Debug)]
pub enum Undo {
    /// The cell had no value.
    CellValue { id: usize },

    /// The value was possible; re-set its bit.
    Possible { id: usize, value: usize },

    /// The active count was one higher.
    Active { clause: usize },

    /// The clause was not subsumed.
    Subsumed { clause: usize },

    /// An argument slot was rewritten.
    Arg { parent: TermId, pos: usize, old: TermId },

    /// A literal slot was rewritten.
    Lit { clause: usize, pos: usize, old: TermId },

    /// An occurrence was pushed onto the cell's list.
    Occurrence { id: usize },

    /// An atom was pushed onto a negprop leaf.
    NegIndex { sign: usize, sym: usize, val: usize, path: Vec<usize> },
}

/// The trail: a record vector plus checkpoint marks.
#[derive(Default)]
pub struct MaceTrail {
    entries: Vec<Undo>,
}

impl MaceTrail {
    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self, undo: Undo) {
        self.entries.push(undo);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Space {
    // Mutation helpers; each records its own undo.

    pub fn set_cell_value(&mut self, id: usize, value: usize) {
        debug_assert!(self.cells[id].value.is_none());
        self.cells[id].value = Some(value);
        self.trail.push(Undo::CellValue { id });
    }

    pub fn cross_off(&mut self, id: usize, value: usize) {
        debug_assert!(self.cells[id].possible.contains(value));
        self.cells[id].possible.remove(value);
        self.trail.push(Undo::Possible { id, value });
    }

    pub fn decrement_active(&mut self, clause: usize) {
        self.mclauses[clause].active -= 1;
        self.trail.push(Undo::Active { clause });
    }

    pub fn set_subsumed(&mut self, clause: usize) {
        debug_assert!(!self.mclauses[clause].subsumed);
        self.mclauses[clause].subsumed = true;
        self.trail.push(Undo::Subsumed { clause });
    }

    pub fn rewrite_arg(&mut self, terms: &mut TermArena, parent: TermId, pos: usize, new: TermId) {
        let old = terms.arg(parent, pos);
        terms.set_arg(parent, pos, new);
        self.trail.push(Undo::Arg { parent, pos, old });
    }

    pub fn rewrite_lit(&mut self, clause: usize, pos: usize, new: TermId) {
        let old = self.mclauses[clause].lits[pos];
        self.mclauses[clause].lits[pos] = new;
        self.trail.push(Undo::Lit { clause, pos, old });
    }

    pub fn push_occurrence(&mut self, id: usize, t: TermId) {
        self.cells[id].occurrences.push(t);
        self.trail.push(Undo::Occurrence { id });
    }

    pub fn push_negindex(&mut self, sign: usize, sym: usize, val: usize, path: Vec<usize>, atom: TermId) {
        self.negindex.push_leaf(sign, sym, val, &path, atom);
        self.trail.push(Undo::NegIndex { sign, sym, val, path });
    }

    /// Unwinds the trail to a checkpoint, newest record first.
    pub fn restore_to(&mut self, terms: &mut TermArena, mark: usize) {
        while self.trail.entries.len() > mark {
            let undo = self.trail.entries.pop().expect("! Mace trail underflow");
            match undo {
                Undo::CellValue { id } => self.cells[id].value = None,
                Undo::Possible { id, value } => self.cells[id].possible.insert(value),
                Undo::Active { clause } => self.mclauses[clause].active += 1,
                Undo::Subsumed { clause } => self.mclauses[clause].subsumed = false,
                Undo::Arg { parent, pos, old } => terms.set_arg(parent, pos, old),
                Undo::Lit { clause, pos, old } => self.mclauses[clause].lits[pos] = old,
                Undo::Occurrence { id } => {
                    self.cells[id].occurrences.pop();
                }
                Undo::NegIndex { sign, sym, val, path } => {
                    self.negindex.pop_leaf(sign, sym, val, &path);
                }
            }
        }
    }
}
