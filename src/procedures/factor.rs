/*!
Factoring and merging.

[binary_factors] unifies every same-sign literal pair of one clause; each
success drops the second literal of the pair under the unifier.
[merge_literals] removes, in place, literals identical to an earlier one,
appending Merge modifiers to the clause's justification.
*/

use crate::kernel::Kernel;
use crate::procedures::apply_lit;
use crate::structures::clause::{inherit_attributes, Clause, ClauseId};
use crate::structures::justification::{CopyMod, JustStep, Justification};
use crate::unify::{undo_subst, unify, Trail};

/// All binary factors of the clause.
pub fn binary_factors(k: &mut Kernel, c: ClauseId, out: &mut Vec<ClauseId>) {
    let subst = k.contexts.get_context();
    let n = k.clauses[c].literals.len();

    for i in 0..n {
        for j in i + 1..n {
            let l1 = k.clauses[c].literals[i];
            let l2 = k.clauses[c].literals[j];
            if l1.sign != l2.sign {
                continue;
            }
            let mut trail = Trail::new();
            if unify(&k.terms, &mut k.contexts, l1.atom, subst, l2.atom, subst, &mut trail) {
                let parent = k.clauses[c].id.expect("! Factor of an unnumbered clause");
                let lits = k.clauses[c].literals.clone();
                let mut child = Clause::new();
                for (m, lit) in lits.iter().enumerate() {
                    if m != j {
                        let applied = apply_lit(k, *lit, Some(subst));
                        child.append_literal(applied);
                    }
                }
                child.justification = Justification::new(JustStep::Factor {
                    parent,
                    l1: i + 1,
                    l2: j + 1,
                });
                inherit_attributes(
                    &mut k.terms,
                    &k.contexts,
                    &k.symbols,
                    &k.clauses[c],
                    Some(subst),
                    None,
                    None,
                    &mut child,
                );
                let cid = k.install_clause(child);
                out.push(cid);
            }
            undo_subst(&mut k.contexts, &mut trail);
        }
    }

    k.contexts.free_context(subst);
}

/// Removes duplicate literals in place; each removal appends a Merge
/// modifier carrying the removed literal's original 1-based position.
pub fn merge_literals(k: &mut Kernel, c: ClauseId) {
    let n = k.clauses[c].literals.len();
    let mut keep = vec![true; n];
    let mut merged = Vec::new();

    for i in 0..n {
        for j in 0..i {
            if !keep[j] || !keep[i] {
                continue;
            }
            let li = k.clauses[c].literals[i];
            let lj = k.clauses[c].literals[j];
            if li.sign == lj.sign && k.terms.term_ident(li.atom, lj.atom) {
                keep[i] = false;
                merged.push(i);
                break;
            }
        }
    }

    if merged.is_empty() {
        return;
    }
    for &i in &merged {
        let atom = k.clauses[c].literals[i].atom;
        k.terms.zap_term(atom);
        k.clauses[c].justification.mods.push(CopyMod::Merge(i + 1));
    }
    let mut index = 0;
    k.clauses[c].literals.retain(|_| {
        let kept = keep[index];
        index += 1;
        kept
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factoring_collapses_unifiable_literals() {
        let mut k = Kernel::new();
        let c = k.parse_clause("p(x) | p(a).").unwrap();
        k.clauses.assign_id(c);

        let mut out = Vec::new();
        binary_factors(&mut k, c, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(k.clause_to_string(out[0]), "p(a)");
        assert!(matches!(
            k.clauses[out[0]].justification.primary,
            JustStep::Factor { l1: 1, l2: 2, .. }
        ));
    }

    #[test]
    fn merging_removes_duplicates_in_place() {
        let mut k = Kernel::new();
        let c = k.parse_clause("p(a) | q(a) | p(a).").unwrap();

        merge_literals(&mut k, c);
        assert_eq!(k.clause_to_string(c), "p(a) | q(a)");
        assert_eq!(k.clauses[c].justification.mods, vec![CopyMod::Merge(3)]);
    }
}
