/*!
Clause subsumption.

`c` subsumes `d` when one substitution over `c`'s variables sends every
literal of `c` to a literal of `d` with the same sign.
The test is a straight backtracking search over literal pairings, with a
trail mark per level; two literals of `c` may map to the same literal of
`d`.
*/

use crate::structures::clause::Clause;
use crate::structures::term::TermArena;
use crate::unify::{match_term, undo_subst, undo_to, ContextBank, Trail};

/// Does `c` subsume `d`?
pub fn subsumes(arena: &TermArena, bank: &mut ContextBank, c: &Clause, d: &Clause) -> bool {
    let ctx = bank.get_context();
    let mut trail = Trail::new();
    let ok = subsume_rec(arena, bank, c, 0, d, ctx, &mut trail);
    undo_subst(bank, &mut trail);
    bank.free_context(ctx);
    ok
}

fn subsume_rec(
    arena: &TermArena,
    bank: &mut ContextBank,
    c: &Clause,
    i: usize,
    d: &Clause,
    ctx: usize,
    trail: &mut Trail,
) -> bool {
    let lit = match c.literals.get(i) {
        Some(lit) => lit,
        None => return true,
    };
    for dl in &d.literals {
        if dl.sign != lit.sign {
            continue;
        }
        let mark = trail.mark();
        if match_term(arena, bank, lit.atom, ctx, dl.atom, trail)
            && subsume_rec(arena, bank, c, i + 1, d, ctx, trail)
        {
            return true;
        }
        undo_to(bank, trail, mark);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::Kernel;

    #[test]
    fn general_subsumes_specific() {
        let mut k = Kernel::new();
        let general = k.parse_clause("p(x) | q(y).").unwrap();
        let specific = k.parse_clause("p(a) | q(b) | r(c).").unwrap();

        assert!(subsumes(
            &k.terms,
            &mut k.contexts,
            &k.clauses[general],
            &k.clauses[specific],
        ));
        assert!(!subsumes(
            &k.terms,
            &mut k.contexts,
            &k.clauses[specific],
            &k.clauses[general],
        ));
    }

    #[test]
    fn shared_variables_constrain_the_map() {
        let mut k = Kernel::new();
        let linked = k.parse_clause("p(x) | q(x).").unwrap();
        let apart = k.parse_clause("p(a) | q(b).").unwrap();

        assert!(!subsumes(
            &k.terms,
            &mut k.contexts,
            &k.clauses[linked],
            &k.clauses[apart],
        ));
    }

    #[test]
    fn collapsing_maps_are_allowed() {
        let mut k = Kernel::new();
        let two = k.parse_clause("p(x) | p(y).").unwrap();
        let one = k.parse_clause("p(a).").unwrap();

        assert!(subsumes(
            &k.terms,
            &mut k.contexts,
            &k.clauses[two],
            &k.clauses[one],
        ));
    }
}
