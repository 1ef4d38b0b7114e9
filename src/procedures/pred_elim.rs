/*!
Predicate elimination.

A non-equality relation symbol is *eliminable* when no clause holds two
occurrences of it and --- if equality is present in the problem --- every
negative occurrence has pairwise-distinct variables as arguments.
Elimination saturates resolution on the symbol with a naive given-clause
loop, discards resolvents subsumed by what is already kept, and moves the
clauses still mentioning the symbol to a disabled list; the clauses that
remain are equisatisfiable with the input.
*/

use crate::kernel::Kernel;
use crate::misc::log::targets;
use crate::procedures::resolve::resolve2;
use crate::procedures::subsume::subsumes;
use crate::structures::clause::{contains_eq, tautology, ClauseId};
use crate::symbols::SymNum;
use crate::types::err::ErrorKind;

/// Number of literals of the clause with the given relation symbol.
fn rsym_occurrences(k: &Kernel, symbol: SymNum, c: ClauseId) -> usize {
    k.clauses[c]
        .literals
        .iter()
        .filter(|lit| k.terms.sym(lit.atom) == Some(symbol))
        .count()
}

/// Are the atom's arguments pairwise-distinct variables?
fn args_distinct_vars(k: &Kernel, atom: crate::structures::term::TermId) -> bool {
    let mut seen = Vec::new();
    for &arg in k.terms.args(atom) {
        match k.terms.varnum(arg) {
            None => return false,
            Some(v) => {
                if seen.contains(&v) {
                    return false;
                }
                seen.push(v);
            }
        }
    }
    true
}

fn arg_check(k: &Kernel, symbol: SymNum, c: ClauseId) -> bool {
    k.clauses[c].literals.iter().all(|lit| {
        lit.sign || k.terms.sym(lit.atom) != Some(symbol) || args_distinct_vars(k, lit.atom)
    })
}

fn eliminable_relation(k: &Kernel, symbol: SymNum, clauses: &[ClauseId], equality: bool) -> bool {
    clauses.iter().all(|&c| {
        rsym_occurrences(k, symbol, c) <= 1 && (!equality || arg_check(k, symbol, c))
    })
}

fn eliminable_relations(k: &Kernel, clauses: &[ClauseId], equality: bool) -> Vec<SymNum> {
    let mut rsyms: Vec<SymNum> = Vec::new();
    for &c in clauses {
        for lit in &k.clauses[c].literals {
            if let Some(sn) = k.terms.sym(lit.atom) {
                if !rsyms.contains(&sn) {
                    rsyms.push(sn);
                }
            }
        }
    }
    rsyms
        .into_iter()
        .filter(|&sn| {
            !k.symbols.is_eq_symbol(sn)
                && k.symbols.arity(sn) != 0
                && eliminable_relation(k, sn, clauses, equality)
        })
        .collect()
}

/// All resolvents of the two clauses on the symbol, tautologies dropped.
fn resolve_on_symbol(
    k: &mut Kernel,
    symbol: SymNum,
    c1: ClauseId,
    c2: ClauseId,
    echo: bool,
) -> Result<Vec<ClauseId>, ErrorKind> {
    let mut resolvents = Vec::new();
    let n1 = k.clauses[c1].literals.len();
    let n2 = k.clauses[c2].literals.len();
    for i in 0..n1 {
        for j in 0..n2 {
            let l1 = k.clauses[c1].literals[i];
            let l2 = k.clauses[c2].literals[j];
            if l1.sign == l2.sign
                || k.terms.sym(l1.atom) != Some(symbol)
                || k.terms.sym(l2.atom) != Some(symbol)
            {
                continue;
            }
            // Parents get ids on first use.
            for parent in [c1, c2] {
                if k.clauses[parent].id.is_none() {
                    k.clauses.assign_id(parent);
                    if echo {
                        println!("{}.", k.clause_to_string(parent));
                    }
                }
            }
            if let Some(res) = resolve2(k, c1, i + 1, c2, (j + 1) as i32, true)? {
                if tautology(&k.terms, &k.clauses[res]) {
                    k.clauses.delete(res, &mut k.terms);
                } else {
                    resolvents.push(res);
                }
            }
        }
    }
    Ok(resolvents)
}

fn elim_relation(
    k: &mut Kernel,
    symbol: SymNum,
    clauses: Vec<ClauseId>,
    disabled: &mut Vec<ClauseId>,
    echo: bool,
) -> Result<Vec<ClauseId>, ErrorKind> {
    // A naive given-clause loop, saturating resolution on the symbol.
    let mut sos: Vec<ClauseId> = clauses;
    let mut usable: Vec<ClauseId> = Vec::new();

    while !sos.is_empty() {
        let given = sos.remove(0);
        usable.push(given);

        let mut new = Vec::new();
        for m in 0..usable.len() {
            let partner = usable[m];
            new.extend(resolve_on_symbol(k, symbol, given, partner, echo)?);
        }

        for resolvent in new {
            let kept = !sos.iter().any(|&s| {
                subsumes(&k.terms, &mut k.contexts, &k.clauses[s], &k.clauses[resolvent])
            });
            if kept {
                if echo {
                    println!("Derived: {}.", k.clause_to_string(resolvent));
                }
                sos.push(resolvent);
            } else {
                k.clauses.delete(resolvent, &mut k.terms);
            }
        }
    }

    // Partition: clauses still carrying the symbol are disabled.
    let mut without = Vec::new();
    for c in usable {
        if rsym_occurrences(k, symbol, c) > 0 {
            disabled.push(c);
        } else {
            without.push(c);
        }
    }
    Ok(without)
}

/// Eliminates every eliminable relation symbol in turn.
///
/// Returns the surviving clauses; eliminated clauses go to `disabled`.
pub fn predicate_elimination(
    k: &mut Kernel,
    clauses: Vec<ClauseId>,
    disabled: &mut Vec<ClauseId>,
    echo: bool,
) -> Result<Vec<ClauseId>, ErrorKind> {
    let equality = clauses
        .iter()
        .any(|&c| contains_eq(&k.terms, &k.symbols, &k.clauses[c]));

    let mut current = clauses;
    loop {
        let syms = eliminable_relations(k, &current, equality);
        let symbol = match syms.first() {
            Some(&s) => s,
            None => break,
        };
        log::info!(
            target: targets::PRED_ELIM,
            "Eliminating {}/{}",
            k.symbols.name(symbol),
            k.symbols.arity(symbol)
        );
        if echo {
            println!(
                "\nEliminating {}/{}",
                k.symbols.name(symbol),
                k.symbols.arity(symbol)
            );
        }
        current = elim_relation(k, symbol, current, disabled, echo)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eliminates_a_single_occurrence_symbol() {
        let mut k = Kernel::new();
        // q appears at most once per clause; p appears twice in some clause,
        // so only q is eliminable.
        let c1 = k.parse_clause("p(x) | -p(f(x)) | q(x).").unwrap();
        let c2 = k.parse_clause("-q(a) | p(a) | -p(b).").unwrap();
        let c3 = k.parse_clause("p(c) | -p(d).").unwrap();

        let mut disabled = Vec::new();
        let kept = predicate_elimination(&mut k, vec![c1, c2, c3], &mut disabled, false).unwrap();

        // No kept clause mentions q; the q-resolvent of c1 and c2 survives.
        let q = k.symbols.lookup("q", 1).unwrap();
        assert!(kept.iter().all(|&c| rsym_occurrences(&k, q, c) == 0));
        assert_eq!(kept.len(), 2);
        assert!(kept
            .iter()
            .any(|&c| k.clauses[c].literals.len() == 4));
        assert_eq!(disabled.len(), 2);
    }

    #[test]
    fn repeated_occurrences_block_elimination() {
        let mut k = Kernel::new();
        let c1 = k.parse_clause("q(x) | q(f(x)).").unwrap();
        let c2 = k.parse_clause("-q(a).").unwrap();

        let mut disabled = Vec::new();
        let kept = predicate_elimination(&mut k, vec![c1, c2], &mut disabled, false).unwrap();

        // q is not eliminable; everything stays.
        assert_eq!(kept.len(), 2);
        assert!(disabled.is_empty());
    }
}
