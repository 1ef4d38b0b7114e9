/*!
The term and literal ordering.

A lexicographic path ordering over terms, with symbol precedence given by
(lex value, symbol number) --- both user-visible and deterministic, so runs
are reproducible (ties in the lex values fall back to interning order).

The ordering decides:
- which side of an equality is the *heavy* side ([oriented_eq]), which in turn
  decides the directions paramodulation runs in,
- which literals of a clause are *maximal* ([maximal_literal] and friends),
  the gate the ordered inference policies put on resolvable literals.
*/

use crate::structures::clause::Clause;
use crate::structures::term::{TermArena, TermId};
use crate::symbols::{SymbolTable, SymNum};

/// The outcome of a term comparison.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TermOrder {
    Greater,
    Less,
    Same,
    NotComparable,
}

fn precedence_greater(symbols: &SymbolTable, f: SymNum, g: SymNum) -> bool {
    let fk = (symbols.lex_val(f), f);
    let gk = (symbols.lex_val(g), g);
    fk > gk
}

fn occurs_in(arena: &TermArena, var: usize, t: TermId) -> bool {
    match arena.varnum(t) {
        Some(n) => n == var,
        None => arena.args(t).iter().any(|&a| occurs_in(arena, var, a)),
    }
}

/// s >_lpo t.
pub fn lpo_greater(arena: &TermArena, symbols: &SymbolTable, s: TermId, t: TermId) -> bool {
    if arena.is_variable(s) {
        return false;
    }
    if let Some(var) = arena.varnum(t) {
        return occurs_in(arena, var, s);
    }

    let s_args = arena.args(s);
    let t_args = arena.args(t);

    // (a) some argument of s dominates t.
    if s_args
        .iter()
        .any(|&si| arena.term_ident(si, t) || lpo_greater(arena, symbols, si, t))
    {
        return true;
    }

    let f = arena.sym(s).expect("! lpo: variable slipped through");
    let g = arena.sym(t).expect("! lpo: variable slipped through");

    if f == g && s_args.len() == t_args.len() {
        // (c) lexicographic descent on the first differing argument.
        for (i, (&si, &ti)) in s_args.iter().zip(t_args).enumerate() {
            if arena.term_ident(si, ti) {
                continue;
            }
            return lpo_greater(arena, symbols, si, ti)
                && t_args[i + 1..]
                    .iter()
                    .all(|&tj| lpo_greater(arena, symbols, s, tj));
        }
        false // identical
    } else if precedence_greater(symbols, f, g) {
        // (b) head precedence decides, s must still dominate every argument.
        t_args.iter().all(|&tj| lpo_greater(arena, symbols, s, tj))
    } else {
        false
    }
}

pub fn term_compare(arena: &TermArena, symbols: &SymbolTable, s: TermId, t: TermId) -> TermOrder {
    if arena.term_ident(s, t) {
        TermOrder::Same
    } else if lpo_greater(arena, symbols, s, t) {
        TermOrder::Greater
    } else if lpo_greater(arena, symbols, t, s) {
        TermOrder::Less
    } else {
        TermOrder::NotComparable
    }
}

/// Is the equality atom oriented (left side greater)?
pub fn oriented_eq(arena: &TermArena, symbols: &SymbolTable, atom: TermId) -> bool {
    arena.arity(atom) == 2 && lpo_greater(arena, symbols, arena.arg(atom, 0), arena.arg(atom, 1))
}

/// Are the two terms identical up to a renaming of variables?
pub fn variant(arena: &TermArena, t1: TermId, t2: TermId) -> bool {
    let mut forward: Vec<(usize, usize)> = Vec::new();
    let mut backward: Vec<(usize, usize)> = Vec::new();
    variant_map(arena, t1, t2, &mut forward, &mut backward)
}

fn variant_map(
    arena: &TermArena,
    t1: TermId,
    t2: TermId,
    forward: &mut Vec<(usize, usize)>,
    backward: &mut Vec<(usize, usize)>,
) -> bool {
    match (arena.varnum(t1), arena.varnum(t2)) {
        (Some(v1), Some(v2)) => {
            let f_ok = match forward.iter().find(|(a, _)| *a == v1) {
                Some((_, b)) => *b == v2,
                None => {
                    forward.push((v1, v2));
                    true
                }
            };
            let b_ok = match backward.iter().find(|(a, _)| *a == v2) {
                Some((_, b)) => *b == v1,
                None => {
                    backward.push((v2, v1));
                    true
                }
            };
            f_ok && b_ok
        }
        (None, None) => {
            arena.sym(t1) == arena.sym(t2)
                && arena.arity(t1) == arena.arity(t2)
                && (0..arena.arity(t1))
                    .all(|i| variant_map(arena, arena.arg(t1, i), arena.arg(t2, i), forward, backward))
        }
        _ => false,
    }
}

/// Is `a = b` such that `b = a` is a renaming variant of it?
pub fn renamable_flip_eq(arena: &TermArena, atom: TermId) -> bool {
    if arena.arity(atom) != 2 {
        return false;
    }
    let a = arena.arg(atom, 0);
    let b = arena.arg(atom, 1);
    // Compare a=b against b=a by walking the pair (a,b) vs (b,a).
    let mut forward: Vec<(usize, usize)> = Vec::new();
    let mut backward: Vec<(usize, usize)> = Vec::new();
    variant_map(arena, a, b, &mut forward, &mut backward)
        && variant_map(arena, b, a, &mut forward, &mut backward)
}

/// No other literal's atom is greater.
pub fn maximal_literal(
    arena: &TermArena,
    symbols: &SymbolTable,
    clause: &Clause,
    n: usize,
) -> bool {
    let atom = clause.literals[n].atom;
    !clause.literals.iter().enumerate().any(|(j, lit)| {
        j != n && lpo_greater(arena, symbols, lit.atom, atom)
    })
}

/// No other literal *of the same sign* has a greater atom.
pub fn maximal_signed_literal(
    arena: &TermArena,
    symbols: &SymbolTable,
    clause: &Clause,
    n: usize,
) -> bool {
    let sign = clause.literals[n].sign;
    let atom = clause.literals[n].atom;
    !clause.literals.iter().enumerate().any(|(j, lit)| {
        j != n && lit.sign == sign && lpo_greater(arena, symbols, lit.atom, atom)
    })
}

pub fn number_of_maximal_literals(
    arena: &TermArena,
    symbols: &SymbolTable,
    clause: &Clause,
) -> usize {
    (0..clause.literals.len())
        .filter(|&n| maximal_literal(arena, symbols, clause, n))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lpo_orients_by_structure() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let f = symbols.intern("f", 1);
        let a = symbols.intern("a", 0);

        // f(a) > a.
        let ca = arena.constant(a);
        let fa = {
            let inner = arena.constant(a);
            arena.unary(f, inner)
        };
        assert!(lpo_greater(&arena, &symbols, fa, ca));
        assert!(!lpo_greater(&arena, &symbols, ca, fa));

        // f(x) > x, but f(x) and y are not comparable.
        let x = arena.variable(0);
        let fx = {
            let inner = arena.variable(0);
            arena.unary(f, inner)
        };
        let y = arena.variable(1);
        assert!(lpo_greater(&arena, &symbols, fx, x));
        assert_eq!(term_compare(&arena, &symbols, fx, y), TermOrder::NotComparable);
    }

    #[test]
    fn orientation_of_equalities() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let eq = symbols.eq_sym();
        let f = symbols.intern("f", 1);

        // f(x) = x is oriented; x = y is not; x = y is a renamable flip.
        let oriented = {
            let x = arena.variable(0);
            let fx = arena.unary(f, x);
            let x2 = arena.variable(0);
            arena.binary(eq, fx, x2)
        };
        assert!(oriented_eq(&arena, &symbols, oriented));

        let xy = {
            let x = arena.variable(0);
            let y = arena.variable(1);
            arena.binary(eq, x, y)
        };
        assert!(!oriented_eq(&arena, &symbols, xy));
        assert!(renamable_flip_eq(&arena, xy));

        // f(x) = x flipped is not a variant of itself.
        assert!(!renamable_flip_eq(&arena, oriented));
    }
}
