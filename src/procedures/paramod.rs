/*!
Paramodulation.

From a positive equality literal `α = β`, rewrite a unifiable subterm of
another literal to `β` under the unifier.
Directions: always from the left side; from the right side only when the
equality is not oriented (and not a unit renamable flip), or unconditionally
under `para_from_small`.
Into-positions: every subterm of every eligible literal, except variables
(unless `para_into_vars`) and, for top-level positions of a positive into-
equality, the sides the ordering already covers.

*Basic* paramodulation additionally refuses to rewrite inside subterms
marked nonbasic --- subterms that arose from an earlier substitution ---
which prunes the search while preserving completeness on Horn-equational
problems.
The marks are maintained by
[apply_basic](crate::unify::apply_basic)/[apply_basic_substitute2](crate::unify::apply_basic_substitute2).
*/

use crate::config::ProverConfig;
use crate::kernel::Kernel;
use crate::misc::log::targets;
use crate::order::{maximal_literal, maximal_signed_literal, number_of_maximal_literals, oriented_eq, renamable_flip_eq};
use crate::procedures::apply_lit_para;
use crate::procedures::resolve::instantiate_clause;
use crate::structures::clause::{
    exists_selected_literal, inherit_attributes, positive_clause, renumber_variables, unit_clause,
    Clause, ClauseId,
};
use crate::structures::justification::{JustStep, Justification};
use crate::structures::literal::{pos_eq, Literal};
use crate::structures::term::TermId;
use crate::types::err::{fatal, ErrorKind};
use crate::unify::{
    apply_basic_substitute2, apply_substitute2, undo_subst, undo_to, unify, ContextRef, Trail,
    MAX_VARS,
};

/// Should we also paramodulate from the right side of this equality?
fn para_from_right(k: &Kernel, cfg: &ProverConfig, from: ClauseId, atom: TermId) -> bool {
    if cfg.para_from_small {
        true
    } else if oriented_eq(&k.terms, &k.symbols, atom) {
        false
    } else if renamable_flip_eq(&k.terms, atom) && unit_clause(&k.clauses[from]) {
        false
    } else {
        true
    }
}

fn from_parent_test(k: &Kernel, cfg: &ProverConfig, cid: ClauseId, n: usize) -> bool {
    let c = &k.clauses[cid];
    let lit = c.literals[n];
    if !pos_eq(&k.terms, &k.symbols, &lit) {
        return false;
    }
    if cfg.positive_para {
        positive_clause(c) && (!cfg.ordered_para || maximal_literal(&k.terms, &k.symbols, c, n))
    } else {
        !exists_selected_literal(c)
            && (!cfg.ordered_para || maximal_literal(&k.terms, &k.symbols, c, n))
    }
}

fn into_parent_test(k: &Kernel, cfg: &ProverConfig, cid: ClauseId, n: usize) -> bool {
    let c = &k.clauses[cid];
    let lit = c.literals[n];
    if lit.sign {
        if cfg.positive_para {
            positive_clause(c)
                && (!cfg.ordered_para || maximal_literal(&k.terms, &k.symbols, c, n))
        } else {
            !exists_selected_literal(c)
                && (!cfg.ordered_para || maximal_literal(&k.terms, &k.symbols, c, n))
        }
    } else {
        if exists_selected_literal(c) {
            lit.selected
        } else if cfg.positive_para {
            !cfg.ordered_para || maximal_signed_literal(&k.terms, &k.symbols, c, n)
        } else {
            !cfg.ordered_para || maximal_literal(&k.terms, &k.symbols, c, n)
        }
    }
}

fn check_instance(
    k: &mut Kernel,
    cfg: &ProverConfig,
    cid: ClauseId,
    n: usize,
    subst: ContextRef,
    is_from_parent: bool,
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
    let ok = if is_from_parent {
        from_parent_test(k, cfg, d, n)
    } else {
        into_parent_test(k, cfg, d, n)
    };
    k.clauses.delete(d, &mut k.terms);
    if !ok {
        log::trace!(target: targets::PARAMOD, "Instance check pruned a paramodulant.");
    }
    ok
}

fn check_instances(
    k: &mut Kernel,
    cfg: &ProverConfig,
    from: ClauseId,
    from_lit: usize,
    cf: ContextRef,
    into: ClauseId,
    into_lit: usize,
    ci: ContextRef,
) -> bool {
    if !cfg.check_para_instances {
        true
    } else {
        check_instance(k, cfg, from, from_lit, cf, true)
            && check_instance(k, cfg, into, into_lit, ci, false)
    }
}

/// Constructs a paramodulant. `into_pos` is the 1-based literal number
/// followed by the path to the replaced subterm; the justification is the
/// caller's concern.
pub fn paramodulate(
    k: &mut Kernel,
    basic: bool,
    from: ClauseId,
    from_lit: usize,
    from_side: usize,
    from_subst: Option<ContextRef>,
    into: ClauseId,
    into_pos: &[usize],
    into_subst: Option<ContextRef>,
) -> ClauseId {
    let from_lits = k.clauses[from].literals.clone();
    let into_lits = k.clauses[into].literals.clone();
    let into_lit = into_pos[0] - 1;
    let beta = k.terms.arg(from_lits[from_lit].atom, 1 - from_side);

    let mut child = Clause::new();
    for (i, lit) in from_lits.iter().enumerate() {
        if i != from_lit {
            let applied = apply_lit_para(k, basic, *lit, from_subst);
            child.append_literal(applied);
        }
    }
    for (i, lit) in into_lits.iter().enumerate() {
        if i != into_lit {
            let applied = apply_lit_para(k, basic, *lit, into_subst);
            child.append_literal(applied);
        } else {
            let atom = if basic {
                let nonbasic = k.nonbasic;
                apply_basic_substitute2(
                    &mut k.terms,
                    &k.contexts,
                    lit.atom,
                    beta,
                    from_subst,
                    &into_pos[1..],
                    into_subst,
                    nonbasic,
                )
            } else {
                apply_substitute2(
                    &mut k.terms,
                    &k.contexts,
                    lit.atom,
                    beta,
                    from_subst,
                    &into_pos[1..],
                    into_subst,
                )
            };
            child.append_literal(Literal::new(lit.sign, atom));
        }
    }

    inherit_attributes(
        &mut k.terms,
        &k.contexts,
        &k.symbols,
        &k.clauses[from],
        from_subst,
        Some(&k.clauses[into]),
        into_subst,
        &mut child,
    );
    k.install_clause(child)
}

/// The recursive descent into a subterm of the into-literal.
fn para_into(
    k: &mut Kernel,
    cfg: &ProverConfig,
    from: ClauseId,
    from_lit: usize,
    from_side: usize,
    cf: ContextRef,
    into: ClauseId,
    into_lit: usize,
    into_term: TermId,
    ci: ContextRef,
    into_path: &mut Vec<usize>,
    skip_top: bool,
    out: &mut Vec<ClauseId>,
) {
    if k.terms.is_variable(into_term) && !cfg.para_into_vars {
        return;
    }
    // Basic restriction: nothing under a nonbasic term is an into-position.
    if cfg.basic_paramodulation && k.terms.flag(into_term, k.nonbasic) {
        return;
    }

    if k.terms.is_complex(into_term) {
        let args = k.terms.args(into_term).to_vec();
        for (i, arg) in args.into_iter().enumerate() {
            into_path.push(i + 1);
            para_into(
                k, cfg, from, from_lit, from_side, cf, into, into_lit, arg, ci, into_path, false,
                out,
            );
            into_path.pop();
        }
    }

    if !skip_top {
        let alpha = k.terms.arg(k.clauses[from].literals[from_lit].atom, from_side);
        let mut trail = Trail::new();
        if unify(&k.terms, &mut k.contexts, alpha, cf, into_term, ci, &mut trail) {
            if check_instances(k, cfg, from, from_lit, cf, into, into_lit, ci) {
                let from_num = k.clauses[from].id.expect("! Paramod from an unnumbered clause");
                let into_num = k.clauses[into].id.expect("! Paramod into an unnumbered clause");
                let mut into_pos = vec![into_lit + 1];
                into_pos.extend_from_slice(into_path);
                let p = paramodulate(
                    k,
                    cfg.basic_paramodulation,
                    from,
                    from_lit,
                    from_side,
                    Some(cf),
                    into,
                    &into_pos,
                    Some(ci),
                );
                k.clauses[p].justification = Justification::new(JustStep::Paramod {
                    from: from_num,
                    from_pos: vec![from_lit + 1, from_side + 1],
                    into: into_num,
                    into_pos,
                });
                out.push(p);
            }
        }
        undo_subst(&mut k.contexts, &mut trail);
    }
}

fn para_into_lit(
    k: &mut Kernel,
    cfg: &ProverConfig,
    from: ClauseId,
    from_lit: usize,
    from_side: usize,
    cf: ContextRef,
    into: ClauseId,
    into_lit: usize,
    ci: ContextRef,
    check_top: bool,
    out: &mut Vec<ClauseId>,
) {
    let from_atom = k.clauses[from].literals[from_lit].atom;
    let alpha = k.terms.arg(from_atom, from_side);
    if k.terms.is_variable(alpha) && !cfg.para_from_vars {
        return;
    }

    let into_literal = k.clauses[into].literals[into_lit];
    let into_atom = into_literal.atom;
    let positive_equality = pos_eq(&k.terms, &k.symbols, &into_literal);
    let args = k.terms.args(into_atom).to_vec();

    let mut into_path = Vec::new();
    for (i, arg) in args.into_iter().enumerate() {
        let skip_top = check_top
            && positive_equality
            && (i == 0 || (i == 1 && para_from_right(k, cfg, into, into_atom)));
        into_path.push(i + 1);
        para_into(
            k, cfg, from, from_lit, from_side, cf, into, into_lit, arg, ci, &mut into_path,
            skip_top, out,
        );
        into_path.pop();
    }
}

/// Paramodulates from one clause into another, all eligible positions.
///
/// With `check_top` on, the top-level sides of positive into-equalities
/// already covered by the ordering are skipped.
pub fn para_from_into(
    k: &mut Kernel,
    cfg: &ProverConfig,
    from: ClauseId,
    into: ClauseId,
    check_top: bool,
    out: &mut Vec<ClauseId>,
) {
    if exists_selected_literal(&k.clauses[from]) {
        return; // cannot paramodulate from a clause with selected literals
    }
    let cf = k.contexts.get_context();
    let ci = k.contexts.get_context();

    for from_lit in 0..k.clauses[from].literals.len() {
        if !from_parent_test(k, cfg, from, from_lit) {
            continue;
        }
        for into_lit in 0..k.clauses[into].literals.len() {
            if !into_parent_test(k, cfg, into, into_lit) {
                continue;
            }
            para_into_lit(
                k, cfg, from, from_lit, 0, cf, into, into_lit, ci, check_top, out,
            );
            let from_atom = k.clauses[from].literals[from_lit].atom;
            if para_from_right(k, cfg, from, from_atom) {
                para_into_lit(
                    k, cfg, from, from_lit, 1, cf, into, into_lit, ci, check_top, out,
                );
            }
        }
    }

    k.contexts.free_context(cf);
    k.contexts.free_context(ci);
}

/// Reconstructs the paramodulant at the given positions.
/// Fails when the positions do not name unifiable terms.
pub fn para_pos(
    k: &mut Kernel,
    from: ClauseId,
    from_pos: &[usize],
    into: ClauseId,
    into_pos: &[usize],
) -> Result<ClauseId, ErrorKind> {
    let from_lit = from_pos[0] - 1;
    let from_side = from_pos[1] - 1;
    let into_lit = into_pos[0] - 1;

    let alpha = k.terms.arg(k.clauses[from].literals[from_lit].atom, from_side);
    let into_atom = k.clauses[into].literals[into_lit].atom;
    let into_term = k
        .terms
        .term_at_pos(into_atom, &into_pos[1..])
        .ok_or_else(|| fatal("para_pos: term does not exist"))?;

    let cf = k.contexts.get_context();
    let ci = k.contexts.get_context();
    let mut trail = Trail::new();

    let result = if unify(&k.terms, &mut k.contexts, alpha, cf, into_term, ci, &mut trail) {
        let from_num = k.clauses[from].id.expect("! para_pos on an unnumbered clause");
        let into_num = k.clauses[into].id.expect("! para_pos on an unnumbered clause");
        let p = paramodulate(
            k, false, from, from_lit, from_side, Some(cf), into, into_pos, Some(ci),
        );
        k.clauses[p].justification = Justification::new(JustStep::Paramod {
            from: from_num,
            from_pos: from_pos.to_vec(),
            into: into_num,
            into_pos: into_pos.to_vec(),
        });
        renumber_variables(&mut k.terms, &k.clauses[p], MAX_VARS)?;
        Ok(p)
    } else {
        Err(fatal("para_pos: terms do not unify"))
    };

    undo_to(&mut k.contexts, &mut trail, 0);
    k.contexts.free_context(cf);
    k.contexts.free_context(ci);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_at_an_inner_position() {
        let mut k = Kernel::new();
        let cfg = ProverConfig {
            ordered_para: false,
            ..ProverConfig::default()
        };

        let from = k.parse_clause("f(x) = x.").unwrap();
        let into = k.parse_clause("p(g(f(a))).").unwrap();
        k.clauses.assign_id(from);
        k.clauses.assign_id(into);

        let mut out = Vec::new();
        para_from_into(&mut k, &cfg, from, into, false, &mut out);

        assert!(out.iter().any(|&c| k.clause_to_string(c) == "p(g(a))"));
        let p = out
            .iter()
            .find(|&&c| k.clause_to_string(c) == "p(g(a))")
            .copied()
            .unwrap();
        match &k.clauses[p].justification.primary {
            JustStep::Paramod { from_pos, into_pos, .. } => {
                assert_eq!(from_pos, &vec![1, 1]);
                assert_eq!(into_pos, &vec![1, 1, 1]);
            }
            _ => panic!("expected a paramod justification"),
        }
    }

    #[test]
    fn round_trip_restores_the_clause() {
        let mut k = Kernel::new();
        let cfg = ProverConfig {
            ordered_para: false,
            ..ProverConfig::default()
        };

        // a = b into p(a) gives p(b); b = a back into p(b) gives p(a).
        let eq = k.parse_clause("f(a) = a.").unwrap();
        let c = k.parse_clause("p(f(a)).").unwrap();
        k.clauses.assign_id(eq);
        k.clauses.assign_id(c);

        let mut out = Vec::new();
        para_from_into(&mut k, &cfg, eq, c, false, &mut out);
        let forward = out
            .iter()
            .find(|&&p| k.clause_to_string(p) == "p(a)")
            .copied()
            .expect("forward paramodulant");
        k.clauses.assign_id(forward);

        // Back: from the right side of the same equality.
        let cfg_small = ProverConfig {
            ordered_para: false,
            para_from_small: true,
            ..ProverConfig::default()
        };
        let mut back = Vec::new();
        para_from_into(&mut k, &cfg_small, eq, forward, false, &mut back);
        assert!(back.iter().any(|&p| k.clause_to_string(p) == "p(f(a))"));
    }

    #[test]
    fn basic_restriction_blocks_nonbasic_positions() {
        let mut k = Kernel::new();
        let cfg = ProverConfig {
            ordered_para: false,
            basic_paramodulation: true,
            ..ProverConfig::default()
        };

        let from = k.parse_clause("f(x) = x.").unwrap();
        let into = k.parse_clause("p(f(a)).").unwrap();
        k.clauses.assign_id(from);
        k.clauses.assign_id(into);

        // Mark the into-subterm nonbasic; paramodulation must refuse it.
        let atom = k.clauses[into].literals[0].atom;
        let fa = k.terms.arg(atom, 0);
        let nonbasic = k.nonbasic;
        k.terms.set_flag(fa, nonbasic);

        let mut out = Vec::new();
        para_from_into(&mut k, &cfg, from, into, false, &mut out);
        assert!(out.is_empty());
    }
}
