/*!
The binary resolution family.

[binary_resolution] resolves a clause against the indexed literals of the
opposite sign, under the configured policy:
- if a parent has *selected* literals, only its selected negative literals
  may be resolved upon;
- otherwise, with ordered resolution on, only *maximal* literals may;
- with check-instances on, maximality is recomputed on the instantiated
  parent whenever the parent has several maximal literals and the unifier
  does more than rename.

Equality literals are additionally tried flipped, recorded as a negative
literal index in the justification, and a negative equality `a != b` whose
sides unify resolves against the built-in `x=x` ([xx_res]).

[resolve2] and [xx_resolve2] are the positional variants used by predicate
elimination and proof expansion; [instantiate_clause] and [copy_inference]
are the small clause-producing helpers everything shares.
*/

use crate::config::ProverConfig;
use crate::index::lindex::Lindex;
use crate::kernel::Kernel;
use crate::misc::log::targets;
use crate::order::{maximal_literal, maximal_signed_literal, number_of_maximal_literals};
use crate::procedures::apply_lit;
use crate::structures::clause::{
    exists_selected_literal, inherit_attributes, negative_clause, positive_clause,
    renumber_variables, upward_clause_links, Clause, ClauseId,
};
use crate::structures::justification::{JustStep, Justification};
use crate::structures::literal::{is_eq_atom, neg_eq, top_flip, zap_top_flip, Literal};
use crate::types::err::ErrorKind;
use crate::unify::{undo_subst, unify, ContextRef, Trail, MAX_VARS};

/// Which resolution discipline is in force.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResType {
    /// One parent must be a positive clause.
    Pos,

    /// One parent must be a negative clause.
    Neg,

    /// No sign constraint beyond literal complementarity.
    Any,
}

/// Is the literal eligible to be resolved upon?
pub fn binary_parent_test(
    k: &Kernel,
    cfg: &ProverConfig,
    cid: ClauseId,
    n: usize,
    res_type: ResType,
) -> bool {
    let c = &k.clauses[cid];
    let lit = c.literals[n];

    match res_type {
        ResType::Pos => {
            if positive_clause(c) {
                !cfg.ordered_res || maximal_literal(&k.terms, &k.symbols, c, n)
            } else if lit.sign {
                false // cannot resolve on a positive literal of a nonpositive clause
            } else if exists_selected_literal(c) {
                lit.selected
            } else {
                !cfg.ordered_res || maximal_signed_literal(&k.terms, &k.symbols, c, n)
            }
        }

        ResType::Neg => {
            if negative_clause(c) {
                !cfg.ordered_res || maximal_literal(&k.terms, &k.symbols, c, n)
            } else if !lit.sign {
                false
            } else {
                // Selection is ignored for negative resolution.
                !cfg.ordered_res || maximal_signed_literal(&k.terms, &k.symbols, c, n)
            }
        }

        ResType::Any => {
            if exists_selected_literal(c) {
                !lit.sign && lit.selected
            } else {
                !cfg.ordered_res || maximal_literal(&k.terms, &k.symbols, c, n)
            }
        }
    }
}

/// A fresh clause whose literals are the instance of `cid`'s under `subst`.
/// The caller owns the justification.
pub fn instantiate_clause(k: &mut Kernel, cid: ClauseId, subst: ContextRef) -> ClauseId {
    let lits = k.clauses[cid].literals.clone();
    let mut child = Clause::new();
    for lit in lits {
        let applied = apply_lit(k, lit, Some(subst));
        child.append_literal(applied);
    }
    k.install_clause(child)
}

/// A syntactically equal clause with a Copy justification and all
/// inheritable attributes carried over. No id is assigned.
pub fn copy_inference(k: &mut Kernel, cid: ClauseId) -> ClauseId {
    let lits = k.clauses[cid].literals.clone();
    let parent_num = k.clauses[cid].id.expect("! Copy of an unnumbered clause");
    let mut child = Clause::new();
    for lit in lits {
        let atom = k.terms.copy_term(lit.atom);
        let mut new_lit = Literal::new(lit.sign, atom);
        new_lit.selected = lit.selected;
        child.append_literal(new_lit);
    }
    child.justification = Justification::new(JustStep::Copy { parent: parent_num });
    inherit_attributes(
        &mut k.terms,
        &k.contexts,
        &k.symbols,
        &k.clauses[cid],
        None,
        None,
        None,
        &mut child,
    );
    k.install_clause(child)
}

fn check_instance(
    k: &mut Kernel,
    cfg: &ProverConfig,
    cid: ClauseId,
    n: usize,
    subst: ContextRef,
    res_type: ResType,
) -> bool {
    if number_of_maximal_literals(&k.terms, &k.symbols, &k.clauses[cid]) == 1
        || k.contexts.variable_substitution(&k.terms, subst)
    {
        return true;
    }
    let marks: Vec<bool> = k.clauses[cid].literals.iter().map(|l| l.selected).collect();
    let d = instantiate_clause(k, cid, subst);
    for (i, mark) in marks.into_iter().enumerate() {
        k.clauses[d].literals[i].selected = mark;
    }
    let ok = binary_parent_test(k, cfg, d, n, res_type);
    k.clauses.delete(d, &mut k.terms);
    if !ok {
        log::trace!(target: targets::RESOLVE, "Instance check pruned a resolvent.");
    }
    ok
}

fn check_instances(
    k: &mut Kernel,
    cfg: &ProverConfig,
    c1: ClauseId,
    n1: usize,
    s1: ContextRef,
    c2: ClauseId,
    n2: usize,
    s2: ContextRef,
    res_type: ResType,
) -> bool {
    if !cfg.check_res_instances {
        true
    } else {
        check_instance(k, cfg, c1, n1, s1, res_type) && check_instance(k, cfg, c2, n2, s2, res_type)
    }
}

/// Builds a binary resolvent; both parents must carry ids.
fn binary_resolvent(
    k: &mut Kernel,
    flipped: bool,
    nuc: ClauseId,
    n1: usize,
    s1: ContextRef,
    sat: ClauseId,
    n2: usize,
    s2: ContextRef,
    out: &mut Vec<ClauseId>,
) {
    let nuc_lits = k.clauses[nuc].literals.clone();
    let sat_lits = k.clauses[sat].literals.clone();
    let p1 = k.clauses[nuc].id.expect("! Resolution on an unnumbered clause");
    let p2 = k.clauses[sat].id.expect("! Resolution on an unnumbered clause");

    let mut child = Clause::new();
    for (i, lit) in nuc_lits.iter().enumerate() {
        if i != n1 {
            let applied = apply_lit(k, *lit, Some(s1));
            child.append_literal(applied);
        }
    }
    for (i, lit) in sat_lits.iter().enumerate() {
        if i != n2 {
            let applied = apply_lit(k, *lit, Some(s2));
            child.append_literal(applied);
        }
    }

    let l2 = (n2 + 1) as i32;
    child.justification = Justification::new(JustStep::BinaryRes {
        p1,
        l1: (n1 + 1) as i32,
        p2,
        l2: if flipped { -l2 } else { l2 },
    });
    inherit_attributes(
        &mut k.terms,
        &k.contexts,
        &k.symbols,
        &k.clauses[nuc],
        Some(s1),
        Some(&k.clauses[sat]),
        Some(s2),
        &mut child,
    );
    let cid = k.install_clause(child);
    out.push(cid);
}

/// Resolution of a negative equality with the built-in `x=x`.
fn xx_res(k: &mut Kernel, given: ClauseId, n: usize, out: &mut Vec<ClauseId>) {
    let atom = k.clauses[given].literals[n].atom;
    let alpha = k.terms.arg(atom, 0);
    let beta = k.terms.arg(atom, 1);
    let subst = k.contexts.get_context();
    let mut trail = Trail::new();

    if unify(&k.terms, &mut k.contexts, alpha, subst, beta, subst, &mut trail) {
        let parent_num = k.clauses[given].id.expect("! XX on an unnumbered clause");
        let lits = k.clauses[given].literals.clone();
        let mut child = Clause::new();
        for (i, lit) in lits.iter().enumerate() {
            if i != n {
                let applied = apply_lit(k, *lit, Some(subst));
                child.append_literal(applied);
            }
        }
        child.justification = Justification::new(JustStep::XxRes {
            parent: parent_num,
            lit: n + 1,
        });
        inherit_attributes(
            &mut k.terms,
            &k.contexts,
            &k.symbols,
            &k.clauses[given],
            Some(subst),
            None,
            None,
            &mut child,
        );
        let cid = k.install_clause(child);
        out.push(cid);
    }
    undo_subst(&mut k.contexts, &mut trail);
    k.contexts.free_context(subst);
}

/// Resolves one literal (or its flip) of the given clause against the index.
fn bin_res_lit(
    k: &mut Kernel,
    cfg: &ProverConfig,
    given: ClauseId,
    n: usize,
    atom: TermIdOrFlip,
    res_type: ResType,
    idx: &Lindex,
    out: &mut Vec<ClauseId>,
) {
    let (query, flipped) = match atom {
        TermIdOrFlip::Plain(t) => (t, false),
        TermIdOrFlip::Flipped(t) => (t, true),
    };
    let sign = k.clauses[given].literals[n].sign;
    let candidates = idx.tree(!sign).retrieve_unifiable(&k.terms, query);

    let nuc_subst = k.contexts.get_context();
    let sat_subst = k.contexts.get_context();
    let mut trail = Trail::new();

    for (sat, sat_n) in candidates {
        let sat_n = sat_n - 1;
        let sat_atom = k.clauses[sat].literals[sat_n].atom;
        let mark = trail.mark();
        if unify(
            &k.terms,
            &mut k.contexts,
            query,
            nuc_subst,
            sat_atom,
            sat_subst,
            &mut trail,
        ) {
            if binary_parent_test(k, cfg, sat, sat_n, res_type)
                && check_instances(
                    k, cfg, given, n, nuc_subst, sat, sat_n, sat_subst, res_type,
                )
            {
                binary_resolvent(
                    k, flipped, given, n, nuc_subst, sat, sat_n, sat_subst, out,
                );
            }
        }
        crate::unify::undo_to(&mut k.contexts, &mut trail, mark);
    }

    undo_subst(&mut k.contexts, &mut trail);
    k.contexts.free_context(nuc_subst);
    k.contexts.free_context(sat_subst);
}

enum TermIdOrFlip {
    Plain(crate::structures::term::TermId),
    Flipped(crate::structures::term::TermId),
}

/// Binary resolution of the given clause against the index.
pub fn binary_resolution(
    k: &mut Kernel,
    cfg: &ProverConfig,
    res_type: ResType,
    given: ClauseId,
    idx: &Lindex,
    out: &mut Vec<ClauseId>,
) {
    for n in 0..k.clauses[given].literals.len() {
        if binary_parent_test(k, cfg, given, n, res_type) {
            let lit = k.clauses[given].literals[n];
            bin_res_lit(k, cfg, given, n, TermIdOrFlip::Plain(lit.atom), res_type, idx, out);

            // If equality, also try the flip.
            if is_eq_atom(&k.terms, &k.symbols, lit.atom) {
                let flip = top_flip(&mut k.terms, lit.atom);
                bin_res_lit(k, cfg, given, n, TermIdOrFlip::Flipped(flip), res_type, idx, out);
                zap_top_flip(&mut k.terms, flip);
            }

            // Built-in resolution with x=x.
            if neg_eq(&k.terms, &k.symbols, &lit) {
                xx_res(k, given, n, out);
            }
        }
    }
}

/// Resolves two clauses on the given 1-based literal numbers, if possible.
///
/// A negative `n2` selects `|n2|` with the equality flipped.
/// Includes the justification and inherited attributes; renumbering of
/// variables is optional; no id is assigned.
pub fn resolve2(
    k: &mut Kernel,
    c1: ClauseId,
    n1: usize,
    c2: ClauseId,
    n2: i32,
    renumber: bool,
) -> Result<Option<ClauseId>, ErrorKind> {
    let l1 = k.clauses[c1].literals[n1 - 1];
    let l2 = k.clauses[c2].literals[n2.unsigned_abs() as usize - 1];

    if l1.sign == l2.sign {
        return Ok(None);
    }

    let a2x = if n2 < 0 {
        top_flip(&mut k.terms, l2.atom)
    } else {
        l2.atom
    };

    let s1 = k.contexts.get_context();
    let s2 = k.contexts.get_context();
    let mut trail = Trail::new();

    let result = if unify(&k.terms, &mut k.contexts, l1.atom, s1, a2x, s2, &mut trail) {
        let mut child = Clause::new();
        let lits1 = k.clauses[c1].literals.clone();
        let lits2 = k.clauses[c2].literals.clone();
        for (i, lit) in lits1.iter().enumerate() {
            if i != n1 - 1 {
                let applied = apply_lit(k, *lit, Some(s1));
                child.append_literal(applied);
            }
        }
        for (i, lit) in lits2.iter().enumerate() {
            if i != n2.unsigned_abs() as usize - 1 {
                let applied = apply_lit(k, *lit, Some(s2));
                child.append_literal(applied);
            }
        }
        let p1 = k.clauses[c1].id.expect("! resolve2 on an unnumbered clause");
        let p2 = k.clauses[c2].id.expect("! resolve2 on an unnumbered clause");
        child.justification = Justification::new(JustStep::BinaryRes {
            p1,
            l1: n1 as i32,
            p2,
            l2: n2,
        });
        inherit_attributes(
            &mut k.terms,
            &k.contexts,
            &k.symbols,
            &k.clauses[c1],
            Some(s1),
            Some(&k.clauses[c2]),
            Some(s2),
            &mut child,
        );
        let cid = k.install_clause(child);
        if renumber {
            renumber_variables(&mut k.terms, &k.clauses[cid], MAX_VARS)?;
        }
        Some(cid)
    } else {
        None
    };

    undo_subst(&mut k.contexts, &mut trail);
    if n2 < 0 {
        zap_top_flip(&mut k.terms, a2x);
    }
    k.contexts.free_context(s1);
    k.contexts.free_context(s2);
    Ok(result)
}

/// Resolves literal `n` of the clause with `x=x`, if it is a negative
/// equality with unifiable sides.
pub fn xx_resolve2(
    k: &mut Kernel,
    c: ClauseId,
    n: usize,
    renumber: bool,
) -> Result<Option<ClauseId>, ErrorKind> {
    let lit = k.clauses[c].literals[n - 1];
    if !neg_eq(&k.terms, &k.symbols, &lit) {
        return Ok(None);
    }
    let alpha = k.terms.arg(lit.atom, 0);
    let beta = k.terms.arg(lit.atom, 1);
    let s = k.contexts.get_context();
    let mut trail = Trail::new();

    let result = if unify(&k.terms, &mut k.contexts, alpha, s, beta, s, &mut trail) {
        let lits = k.clauses[c].literals.clone();
        let mut child = Clause::new();
        for (i, l) in lits.iter().enumerate() {
            if i != n - 1 {
                let applied = apply_lit(k, *l, Some(s));
                child.append_literal(applied);
            }
        }
        let parent = k.clauses[c].id.expect("! xx_resolve2 on an unnumbered clause");
        child.justification = Justification::new(JustStep::XxRes { parent, lit: n });
        inherit_attributes(
            &mut k.terms,
            &k.contexts,
            &k.symbols,
            &k.clauses[c],
            Some(s),
            None,
            None,
            &mut child,
        );
        let cid = k.install_clause(child);
        if renumber {
            renumber_variables(&mut k.terms, &k.clauses[cid], MAX_VARS)?;
        }
        Some(cid)
    } else {
        None
    };

    undo_subst(&mut k.contexts, &mut trail);
    k.contexts.free_context(s);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::lindex::Lindex;

    #[test]
    fn complementary_units_give_the_empty_clause() {
        let mut k = Kernel::new();
        let cfg = ProverConfig::default();

        let pos = k.parse_clause("p(a).").unwrap();
        let neg = k.parse_clause("-p(a).").unwrap();
        k.clauses.assign_id(pos);
        k.clauses.assign_id(neg);

        let mut idx = Lindex::default();
        idx.insert_clause(&k.terms, &k.clauses, pos);

        let mut out = Vec::new();
        binary_resolution(&mut k, &cfg, ResType::Any, neg, &idx, &mut out);
        assert_eq!(out.len(), 1);
        assert!(k.clauses[out[0]].is_empty());

        match k.clauses[out[0]].justification.primary {
            JustStep::BinaryRes { l1, l2, .. } => {
                assert_eq!(l1, 1);
                assert_eq!(l2, 1);
            }
            _ => panic!("expected a binary resolution justification"),
        }
    }

    #[test]
    fn xx_resolution_closes_a_reflexivity_denial() {
        let mut k = Kernel::new();
        let c = k.parse_clause("a != a.").unwrap();
        k.clauses.assign_id(c);

        let resolvent = xx_resolve2(&mut k, c, 1, true).unwrap();
        let resolvent = resolvent.expect("a != a resolves with x=x");
        assert!(k.clauses[resolvent].is_empty());
    }

    #[test]
    fn flipped_equality_is_recorded_negative() {
        let mut k = Kernel::new();
        let cfg = ProverConfig {
            ordered_res: false,
            ..ProverConfig::default()
        };

        let eq = k.parse_clause("f(a) = b.").unwrap();
        let neq = k.parse_clause("b != f(a).").unwrap();
        k.clauses.assign_id(eq);
        k.clauses.assign_id(neq);

        let mut idx = Lindex::default();
        idx.insert_clause(&k.terms, &k.clauses, neq);

        let mut out = Vec::new();
        binary_resolution(&mut k, &cfg, ResType::Any, eq, &idx, &mut out);

        // The plain orientation does not unify, the flipped one does.
        assert!(out.iter().any(|&cid| {
            matches!(
                k.clauses[cid].justification.primary,
                JustStep::BinaryRes { l2, .. } if l2 < 0
            ) || matches!(
                k.clauses[cid].justification.primary,
                JustStep::BinaryRes { l1, .. } if l1 < 0
            )
        }));
    }

    #[test]
    fn resolve2_positional() {
        let mut k = Kernel::new();
        let c1 = k.parse_clause("p(x) | q(x).").unwrap();
        let c2 = k.parse_clause("-p(a).").unwrap();
        k.clauses.assign_id(c1);
        k.clauses.assign_id(c2);

        let r = resolve2(&mut k, c1, 1, c2, 1, true).unwrap().unwrap();
        assert_eq!(k.clauses[r].literals.len(), 1);
        assert_eq!(k.clause_to_string(r), "q(a)");
    }
}
