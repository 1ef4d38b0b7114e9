/*!
Literals: a sign paired with an atom.

The atom is always a compound term whose root symbol is a relation.
Literals own their atoms; a clause owns its literals in order.
*/

use crate::structures::term::{TermArena, TermId};
use crate::symbols::SymbolTable;

/// A signed atom.
#[derive(Clone, Copy, Debug)]
pub struct Literal {
    pub sign: bool,

    pub atom: TermId,

    /// Set by the selection policy; resolution restricts itself to selected
    /// negative literals when any literal of the clause is selected.
    pub selected: bool,
}

impl Literal {
    pub fn new(sign: bool, atom: TermId) -> Self {
        Literal {
            sign,
            atom,
            selected: false,
        }
    }
}

/// Is the literal a positive equality?
pub fn pos_eq(arena: &TermArena, symbols: &SymbolTable, lit: &Literal) -> bool {
    lit.sign && is_eq_atom(arena, symbols, lit.atom)
}

/// Is the literal a negative equality?
pub fn neg_eq(arena: &TermArena, symbols: &SymbolTable, lit: &Literal) -> bool {
    !lit.sign && is_eq_atom(arena, symbols, lit.atom)
}

/// Is the term an equality atom (the binary equality symbol at the root)?
pub fn is_eq_atom(arena: &TermArena, symbols: &SymbolTable, atom: TermId) -> bool {
    match arena.sym(atom) {
        Some(sn) => symbols.is_eq_symbol(sn) && arena.arity(atom) == 2,
        None => false,
    }
}

/// A fresh equality atom with its arguments swapped.
///
/// Only the root node is fresh; the arguments are shared with the original,
/// so free the result with [zap_top_flip] rather than a deep zap.
pub fn top_flip(arena: &mut TermArena, atom: TermId) -> TermId {
    let sym = arena.sym(atom).expect("! top_flip of a variable");
    let a = arena.arg(atom, 0);
    let b = arena.arg(atom, 1);
    arena.binary(sym, b, a)
}

/// Frees a [top_flip] result without touching the shared arguments.
pub fn zap_top_flip(arena: &mut TermArena, flip: TermId) {
    arena.free_node(flip);
}
