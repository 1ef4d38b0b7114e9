/*!
Hyperresolution and UR-resolution, driven by a *clash list*.

A clash list has one slot per nucleus literal.
Clashable slots must each resolve against a satellite literal from the mate
index; kept slots survive into the resolvent.
Enumerating all satellite assignments is done with an explicit stack over
the slots (rather than recursion through them): each slot holds its
candidate mates and a trail mark, and the engine walks forward on success
and back on exhaustion.
Per slot the engine tries, in order: every indexed mate of the literal,
every indexed mate of its flip (when the literal is an equality), and the
built-in `x=x` mate (when the literal is a negative equality).

For *positive* (negative) hyperresolution every satellite must be a positive
(negative) clause and, under the ordered policy, the clashed satellite
literal must be maximal in it.
UR-resolution instead requires every satellite to be a unit and keeps
exactly one slot, the *target*, optionally sign-constrained.
*/

use crate::config::ProverConfig;
use crate::index::lindex::Lindex;
use crate::kernel::Kernel;
use crate::misc::log::targets;
use crate::order::maximal_literal;
use crate::procedures::apply_lit;
use crate::structures::clause::{
    inherit_attributes, negative_clause, number_of_literals, positive_clause, unit_clause, Clause,
    ClauseId,
};
use crate::structures::justification::{ClashLink, JustStep, Justification};
use crate::structures::literal::{is_eq_atom, neg_eq, pos_eq, top_flip, zap_top_flip};
use crate::unify::{undo_subst, undo_to, unify, ContextRef, Trail};

/// Which justification the emitted resolvents carry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ClashRule {
    Hyper,
    Ur,
}

/// The satellite admission test.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SatTest {
    PosHyper,
    NegHyper,
    Unit,
}

/// Sign constraint on the UR target literal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UrTarget {
    Any,
    Pos,
    Neg,
}

#[derive(Clone, Copy, Debug)]
enum Mate {
    /// An indexed satellite literal; `flipped` when an equality was turned
    /// around to make the atoms unify.
    Sat {
        cid: ClauseId,
        lit: usize,
        flipped: bool,
    },

    /// The built-in `x=x`.
    Xx,
}

struct ClashSlot {
    /// Index of the nucleus literal this slot stands for.
    nuc_lit: usize,

    clashable: bool,

    /// Tree to search for mates (the sign opposite the nucleus literal's).
    mate_sign: bool,

    /// The satellite binding environment (clashable slots only).
    sat_subst: Option<ContextRef>,

    /// A satellite fixed by the driver (the given clause's own literal).
    preassigned: Option<(ClauseId, usize, bool)>,

    // Engine state.
    candidates: Vec<Mate>,
    next: usize,
    mate: Option<Mate>,
    trail_mark: usize,
    fresh: bool,
}

impl ClashSlot {
    fn new(nuc_lit: usize, clashable: bool, mate_sign: bool) -> Self {
        ClashSlot {
            nuc_lit,
            clashable,
            mate_sign,
            sat_subst: None,
            preassigned: None,
            candidates: Vec::new(),
            next: 0,
            mate: None,
            trail_mark: 0,
            fresh: true,
        }
    }

    fn clashed(&self) -> bool {
        self.preassigned.is_some() || self.mate.is_some()
    }
}

fn sat_test(k: &Kernel, cfg: &ProverConfig, test: SatTest, cid: ClauseId, lit: usize) -> bool {
    let c = &k.clauses[cid];
    match test {
        SatTest::PosHyper => {
            positive_clause(c)
                && (!cfg.ordered_res || maximal_literal(&k.terms, &k.symbols, c, lit))
        }
        SatTest::NegHyper => {
            negative_clause(c)
                && (!cfg.ordered_res || maximal_literal(&k.terms, &k.symbols, c, lit))
        }
        SatTest::Unit => unit_clause(c),
    }
}

fn gather_candidates(
    k: &mut Kernel,
    nucleus: ClauseId,
    slot: &ClashSlot,
    idx: &Lindex,
) -> Vec<Mate> {
    let lit = k.clauses[nucleus].literals[slot.nuc_lit];
    let mut mates: Vec<Mate> = idx
        .tree(slot.mate_sign)
        .retrieve_unifiable(&k.terms, lit.atom)
        .into_iter()
        .map(|(cid, n)| Mate::Sat {
            cid,
            lit: n - 1,
            flipped: false,
        })
        .collect();

    if is_eq_atom(&k.terms, &k.symbols, lit.atom) {
        let flip = top_flip(&mut k.terms, lit.atom);
        mates.extend(
            idx.tree(slot.mate_sign)
                .retrieve_unifiable(&k.terms, flip)
                .into_iter()
                .map(|(cid, n)| Mate::Sat {
                    cid,
                    lit: n - 1,
                    flipped: true,
                }),
        );
        zap_top_flip(&mut k.terms, flip);
    }

    if neg_eq(&k.terms, &k.symbols, &lit) {
        mates.push(Mate::Xx);
    }

    mates
}

fn try_mate(
    k: &mut Kernel,
    cfg: &ProverConfig,
    test: SatTest,
    nucleus: ClauseId,
    nuc_subst: ContextRef,
    slot: &ClashSlot,
    mate: Mate,
    trail: &mut Trail,
) -> bool {
    let nuc_atom = k.clauses[nucleus].literals[slot.nuc_lit].atom;
    match mate {
        Mate::Sat { cid, lit, flipped } => {
            let sat_subst = slot.sat_subst.expect("! Clashable slot without context");
            let sat_atom = k.clauses[cid].literals[lit].atom;
            let unified = if flipped {
                let tmp = top_flip(&mut k.terms, nuc_atom);
                let r = unify(&k.terms, &mut k.contexts, tmp, nuc_subst, sat_atom, sat_subst, trail);
                zap_top_flip(&mut k.terms, tmp);
                r
            } else {
                unify(
                    &k.terms,
                    &mut k.contexts,
                    nuc_atom,
                    nuc_subst,
                    sat_atom,
                    sat_subst,
                    trail,
                )
            };
            unified && sat_test(k, cfg, test, cid, lit)
        }

        Mate::Xx => {
            let alpha = k.terms.arg(nuc_atom, 0);
            let beta = k.terms.arg(nuc_atom, 1);
            unify(&k.terms, &mut k.contexts, alpha, nuc_subst, beta, nuc_subst, trail)
        }
    }
}

/// Builds the resolvent for a fully clashed list.
fn emit_resolvent(
    k: &mut Kernel,
    rule: ClashRule,
    nucleus: ClauseId,
    nuc_subst: ContextRef,
    slots: &[ClashSlot],
    out: &mut Vec<ClauseId>,
) {
    let nuc_lits = k.clauses[nucleus].literals.clone();
    let nucleus_num = k.clauses[nucleus].id.expect("! Clash on an unnumbered clause");
    let mut child = Clause::new();

    // Kept nucleus literals first.
    for slot in slots {
        if !slot.clashed() {
            let applied = apply_lit(k, nuc_lits[slot.nuc_lit], Some(nuc_subst));
            child.append_literal(applied);
        }
    }
    inherit_attributes(
        &mut k.terms,
        &k.contexts,
        &k.symbols,
        &k.clauses[nucleus],
        Some(nuc_subst),
        None,
        None,
        &mut child,
    );

    // Then satellite leftovers, in nucleus-literal order.
    let mut links = Vec::new();
    for slot in slots {
        if !slot.clashed() {
            continue;
        }
        let fixed = slot.preassigned.map(|(cid, lit, flipped)| Mate::Sat { cid, lit, flipped });
        let mate = fixed.or(slot.mate).expect("! Clashed slot without mate");
        match mate {
            Mate::Xx => links.push(ClashLink {
                nuc_lit: slot.nuc_lit + 1,
                sat: 0,
                sat_lit: 0,
            }),
            Mate::Sat { cid, lit, flipped } => {
                let sat_num = k.clauses[cid].id.expect("! Clash with an unnumbered satellite");
                let sat_pos = (lit + 1) as i32;
                links.push(ClashLink {
                    nuc_lit: slot.nuc_lit + 1,
                    sat: sat_num,
                    sat_lit: if flipped { -sat_pos } else { sat_pos },
                });
                let sat_subst = slot.sat_subst;
                let sat_lits = k.clauses[cid].literals.clone();
                for (i, l) in sat_lits.iter().enumerate() {
                    if i != lit {
                        let applied = apply_lit(k, *l, sat_subst);
                        child.append_literal(applied);
                    }
                }
                inherit_attributes(
                    &mut k.terms,
                    &k.contexts,
                    &k.symbols,
                    &k.clauses[cid],
                    sat_subst,
                    None,
                    None,
                    &mut child,
                );
            }
        }
    }

    child.justification = Justification::new(match rule {
        ClashRule::Hyper => JustStep::HyperRes {
            nucleus: nucleus_num,
            links,
        },
        ClashRule::Ur => JustStep::UrRes {
            nucleus: nucleus_num,
            links,
        },
    });

    let cid = k.install_clause(child);
    log::trace!(target: targets::RESOLVE, "Clash resolvent installed.");
    out.push(cid);
}

/// The slot-stack enumeration.
fn run_clash(
    k: &mut Kernel,
    cfg: &ProverConfig,
    rule: ClashRule,
    test: SatTest,
    nucleus: ClauseId,
    nuc_subst: ContextRef,
    slots: &mut [ClashSlot],
    idx: &Lindex,
    trail: &mut Trail,
    out: &mut Vec<ClauseId>,
) {
    let order: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.clashable && s.preassigned.is_none())
        .map(|(i, _)| i)
        .collect();

    let mut pos = 0;
    loop {
        if pos == order.len() {
            emit_resolvent(k, rule, nucleus, nuc_subst, slots, out);
            if order.is_empty() {
                break;
            }
            pos -= 1;
            continue;
        }

        let si = order[pos];
        if slots[si].fresh {
            let mates = gather_candidates(k, nucleus, &slots[si], idx);
            slots[si].candidates = mates;
            slots[si].next = 0;
            slots[si].trail_mark = trail.mark();
            slots[si].fresh = false;
        }
        undo_to(&mut k.contexts, trail, slots[si].trail_mark);

        let mut advanced = false;
        while slots[si].next < slots[si].candidates.len() {
            let mate = slots[si].candidates[slots[si].next];
            slots[si].next += 1;
            if try_mate(k, cfg, test, nucleus, nuc_subst, &slots[si], mate, trail) {
                slots[si].mate = Some(mate);
                advanced = true;
                break;
            }
            undo_to(&mut k.contexts, trail, slots[si].trail_mark);
        }

        if advanced {
            pos += 1;
        } else {
            slots[si].fresh = true;
            slots[si].mate = None;
            if pos == 0 {
                break;
            }
            pos -= 1;
        }
    }
}

/// Builds the slot list for a nucleus; clashable slots get fresh contexts.
fn build_slots(k: &mut Kernel, nucleus: ClauseId, clashable: impl Fn(usize, bool) -> bool) -> Vec<ClashSlot> {
    let signs: Vec<bool> = k.clauses[nucleus].literals.iter().map(|l| l.sign).collect();
    let mut slots = Vec::with_capacity(signs.len());
    for (i, sign) in signs.into_iter().enumerate() {
        let mut slot = ClashSlot::new(i, clashable(i, sign), !sign);
        if slot.clashable {
            slot.sat_subst = Some(k.contexts.get_context());
        }
        slots.push(slot);
    }
    slots
}

fn free_slots(k: &mut Kernel, slots: Vec<ClashSlot>) {
    for slot in slots {
        if let Some(ctx) = slot.sat_subst {
            k.contexts.free_context(ctx);
        }
    }
}

// Hyperresolution drivers.

/// Positive or negative hyperresolution of the given clause against the index.
pub fn hyper_resolution(
    k: &mut Kernel,
    cfg: &ProverConfig,
    positive: bool,
    given: ClauseId,
    idx: &Lindex,
    out: &mut Vec<ClauseId>,
) {
    let is_satellite = if positive {
        positive_clause(&k.clauses[given])
    } else {
        negative_clause(&k.clauses[given])
    };
    if is_satellite {
        hyper_satellite(k, cfg, positive, given, idx, out);
    } else {
        hyper_nucleus(k, cfg, positive, given, idx, out);
    }
}

fn hyper_nucleus(
    k: &mut Kernel,
    cfg: &ProverConfig,
    positive: bool,
    given: ClauseId,
    idx: &Lindex,
    out: &mut Vec<ClauseId>,
) {
    let test = if positive { SatTest::PosHyper } else { SatTest::NegHyper };
    let nuc_subst = k.contexts.get_context();
    let mut slots = build_slots(k, given, |_, sign| if positive { !sign } else { sign });
    let mut trail = Trail::new();
    run_clash(
        k, cfg, ClashRule::Hyper, test, given, nuc_subst, &mut slots, idx, &mut trail, out,
    );
    undo_subst(&mut k.contexts, &mut trail);
    free_slots(k, slots);
    k.contexts.free_context(nuc_subst);
}

fn hyper_satellite(
    k: &mut Kernel,
    cfg: &ProverConfig,
    positive: bool,
    given: ClauseId,
    idx: &Lindex,
    out: &mut Vec<ClauseId>,
) {
    let test = if positive { SatTest::PosHyper } else { SatTest::NegHyper };
    for n in 0..k.clauses[given].literals.len() {
        if cfg.ordered_res && !maximal_literal(&k.terms, &k.symbols, &k.clauses[given], n) {
            continue;
        }
        let lit = k.clauses[given].literals[n];
        hyper_sat_atom(k, cfg, test, positive, given, n, lit.atom, false, idx, out);
        if pos_eq(&k.terms, &k.symbols, &lit) {
            let flip = top_flip(&mut k.terms, lit.atom);
            hyper_sat_atom(k, cfg, test, positive, given, n, flip, true, idx, out);
            zap_top_flip(&mut k.terms, flip);
        }
    }
}

/// Clash every nucleus whose literal unifies with the satellite's atom.
fn hyper_sat_atom(
    k: &mut Kernel,
    cfg: &ProverConfig,
    test: SatTest,
    positive: bool,
    given: ClauseId,
    given_lit: usize,
    query: crate::structures::term::TermId,
    flipped: bool,
    idx: &Lindex,
    out: &mut Vec<ClauseId>,
) {
    let nuclei = idx.tree(!positive).retrieve_unifiable(&k.terms, query);
    for (nuc, nuc_lit_n) in nuclei {
        let nuc_lit = nuc_lit_n - 1;
        let nuc_subst = k.contexts.get_context();
        let sat_subst = k.contexts.get_context();
        let mut trail = Trail::new();

        let nuc_atom = k.clauses[nuc].literals[nuc_lit].atom;
        if unify(&k.terms, &mut k.contexts, query, sat_subst, nuc_atom, nuc_subst, &mut trail) {
            let mut slots =
                build_slots(k, nuc, |_, sign| if positive { !sign } else { sign });
            // The found slot uses the caller's context, not a fresh one.
            if let Some(ctx) = slots[nuc_lit].sat_subst.take() {
                k.contexts.free_context(ctx);
            }
            slots[nuc_lit].preassigned = Some((given, given_lit, flipped));
            slots[nuc_lit].sat_subst = Some(sat_subst);
            run_clash(
                k, cfg, ClashRule::Hyper, test, nuc, nuc_subst, &mut slots, idx, &mut trail, out,
            );
            slots[nuc_lit].sat_subst = None;
            free_slots(k, slots);
        }

        undo_subst(&mut k.contexts, &mut trail);
        k.contexts.free_context(sat_subst);
        k.contexts.free_context(nuc_subst);
    }
}

// UR-resolution drivers.

fn target_check(sign: bool, target: UrTarget) -> bool {
    match target {
        UrTarget::Any => true,
        UrTarget::Pos => sign,
        UrTarget::Neg => !sign,
    }
}

/// Unit-resulting resolution of the given clause against the index.
pub fn ur_resolution(
    k: &mut Kernel,
    cfg: &ProverConfig,
    target: UrTarget,
    given: ClauseId,
    idx: &Lindex,
    out: &mut Vec<ClauseId>,
) {
    if unit_clause(&k.clauses[given]) {
        ur_satellite(k, cfg, target, given, idx, out);
    } else {
        ur_nucleus(k, cfg, target, given, idx, out);
    }
}

fn nucleus_admissible(k: &Kernel, cfg: &ProverConfig, nuc: ClauseId) -> bool {
    let c = &k.clauses[nuc];
    let n = number_of_literals(c);
    n > 1
        && cfg.ur_nucleus_limit.map_or(true, |limit| n <= limit)
        && (!cfg.initial_nuclei || c.initial)
}

fn ur_satellite(
    k: &mut Kernel,
    cfg: &ProverConfig,
    target: UrTarget,
    given: ClauseId,
    idx: &Lindex,
    out: &mut Vec<ClauseId>,
) {
    let lit = k.clauses[given].literals[0];
    ur_sat_atom(k, cfg, target, given, lit.atom, false, idx, out);
    if is_eq_atom(&k.terms, &k.symbols, lit.atom) {
        let flip = top_flip(&mut k.terms, lit.atom);
        ur_sat_atom(k, cfg, target, given, flip, true, idx, out);
        zap_top_flip(&mut k.terms, flip);
    }
}

fn ur_sat_atom(
    k: &mut Kernel,
    cfg: &ProverConfig,
    target: UrTarget,
    given: ClauseId,
    query: crate::structures::term::TermId,
    flipped: bool,
    idx: &Lindex,
    out: &mut Vec<ClauseId>,
) {
    let sign = k.clauses[given].literals[0].sign;
    let nuclei = idx.tree(!sign).retrieve_unifiable(&k.terms, query);
    for (nuc, fnd_n) in nuclei {
        let fnd = fnd_n - 1;
        if !nucleus_admissible(k, cfg, nuc) {
            continue;
        }
        let signs: Vec<bool> = k.clauses[nuc].literals.iter().map(|l| l.sign).collect();
        for (target_idx, &target_sign) in signs.iter().enumerate() {
            if target_idx == fnd || !target_check(target_sign, target) {
                continue;
            }
            let nuc_subst = k.contexts.get_context();
            let sat_subst = k.contexts.get_context();
            let mut trail = Trail::new();
            let nuc_atom = k.clauses[nuc].literals[fnd].atom;
            if unify(&k.terms, &mut k.contexts, query, sat_subst, nuc_atom, nuc_subst, &mut trail) {
                let mut slots = build_slots(k, nuc, |i, _| i != target_idx);
                // Free the context allocated for the found slot; it uses the caller's.
                if let Some(ctx) = slots[fnd].sat_subst.take() {
                    k.contexts.free_context(ctx);
                }
                slots[fnd].preassigned = Some((given, 0, flipped));
                slots[fnd].sat_subst = Some(sat_subst);
                run_clash(
                    k, cfg, ClashRule::Ur, SatTest::Unit, nuc, nuc_subst, &mut slots, idx,
                    &mut trail, out,
                );
                slots[fnd].sat_subst = None;
                free_slots(k, slots);
            }
            undo_subst(&mut k.contexts, &mut trail);
            k.contexts.free_context(sat_subst);
            k.contexts.free_context(nuc_subst);
        }
    }
}

fn ur_nucleus(
    k: &mut Kernel,
    cfg: &ProverConfig,
    target: UrTarget,
    given: ClauseId,
    idx: &Lindex,
    out: &mut Vec<ClauseId>,
) {
    if !nucleus_admissible(k, cfg, given) {
        return;
    }
    let signs: Vec<bool> = k.clauses[given].literals.iter().map(|l| l.sign).collect();
    for (target_idx, &target_sign) in signs.iter().enumerate() {
        if !target_check(target_sign, target) {
            continue;
        }
        let nuc_subst = k.contexts.get_context();
        let mut slots = build_slots(k, given, |i, _| i != target_idx);
        let mut trail = Trail::new();
        run_clash(
            k, cfg, ClashRule::Ur, SatTest::Unit, given, nuc_subst, &mut slots, idx, &mut trail,
            out,
        );
        undo_subst(&mut k.contexts, &mut trail);
        free_slots(k, slots);
        k.contexts.free_context(nuc_subst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_hyperresolution_chains_two_satellites() {
        let mut k = Kernel::new();
        let cfg = ProverConfig {
            ordered_res: false,
            ..ProverConfig::default()
        };

        // Nucleus -p(x) | -q(x) | r(x); satellites p(a), q(a).
        let nucleus = k.parse_clause("-p(x) | -q(x) | r(x).").unwrap();
        let p = k.parse_clause("p(a).").unwrap();
        let q = k.parse_clause("q(a).").unwrap();
        for c in [nucleus, p, q] {
            k.clauses.assign_id(c);
        }

        let mut idx = Lindex::default();
        idx.insert_clause(&k.terms, &k.clauses, p);
        idx.insert_clause(&k.terms, &k.clauses, q);

        let mut out = Vec::new();
        hyper_resolution(&mut k, &cfg, true, nucleus, &idx, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(k.clause_to_string(out[0]), "r(a)");
        match &k.clauses[out[0]].justification.primary {
            JustStep::HyperRes { links, .. } => {
                assert_eq!(links.len(), 2);
                assert_eq!(links[0].nuc_lit, 1);
                assert_eq!(links[1].nuc_lit, 2);
            }
            _ => panic!("expected a hyperresolution justification"),
        }
    }

    #[test]
    fn ur_resolution_produces_a_unit() {
        let mut k = Kernel::new();
        let cfg = ProverConfig {
            ordered_res: false,
            ..ProverConfig::default()
        };

        // Nucleus -p(x) | -q(x) | r(x); units p(a), r-denial.
        let nucleus = k.parse_clause("-p(x) | -q(x) | r(x).").unwrap();
        let p = k.parse_clause("p(a).").unwrap();
        let r = k.parse_clause("-r(a).").unwrap();
        for c in [nucleus, p, r] {
            k.clauses.assign_id(c);
        }

        let mut idx = Lindex::default();
        idx.insert_clause(&k.terms, &k.clauses, p);
        idx.insert_clause(&k.terms, &k.clauses, r);

        let mut out = Vec::new();
        ur_resolution(&mut k, &cfg, UrTarget::Any, nucleus, &idx, &mut out);

        // Target -q(x): resolvent is -q(a).
        assert!(out.iter().any(|&c| k.clause_to_string(c) == "-q(a)"));
        assert!(out
            .iter()
            .all(|&c| k.clauses[c].literals.len() == 1));
    }
}
