/*!
The atomic (Ivy) proof format.

[expand_proof_ivy] rewrites an (already [expanded](crate::proofs::expand))
proof so that every step is one of seven object-level shapes: input,
propositional, new_symbol, flip, instantiate, resolve, paramod.
Each resolution or paramodulation is preceded by explicit Instance steps
instantiating the parents, so the operation itself happens on syntactically
identical atoms with the identity substitution; variable renumbering is
itself an Instance step.
A clause `x=x` with id 0 is prepended exactly when some XX step was
expanded.
Every emitted clause is checked equivalent to the one it replaces by mutual
subsumption.

Positions are Ivy positions: the literal's path in the right-associated OR
tree, then a `1` for the sign node of a negative literal, then the argument
path within the atom.
Identifiers Ivy cannot read are remapped through a fixed dictionary
(`0` → `zero_for_ivy`, `1` → `one_for_ivy`, and the quote, backslash, at,
and caret characters).

The printed form is an S-expression list, one element
`(id justification literals NIL)` per clause.
*/

use crate::kernel::Kernel;
use crate::procedures::paramod::paramodulate;
use crate::procedures::subsume::subsumes;
use crate::proofs::{copy_clause_ija, flip_copy, ProofMap};
use crate::structures::clause::{
    ground_clause, number_of_literals, renumber_variables_map, varnums_in_clause, Clause, ClauseId,
};
use crate::structures::justification::{CopyMod, IvyStep, JustStep, Justification};
use crate::structures::literal::Literal;
use crate::structures::term::{TermArena, TermId, TermKind};
use crate::symbols::SymbolTable;
use crate::types::err::{fatal, ErrorKind};
use crate::unify::{
    apply, match_term, undo_subst, unify, ContextRef, Trail, MAX_VARS,
};

const DICT: [(&str, &str); 6] = [
    ("0", "zero_for_ivy"),
    ("1", "one_for_ivy"),
    ("'", "quote_for_ivy"),
    ("\\", "backslash_for_ivy"),
    ("@", "at_for_ivy"),
    ("^", "meet_for_ivy"),
];

fn dict_lookup(name: &str) -> Option<&'static str> {
    DICT.iter().find(|(key, _)| *key == name).map(|(_, v)| *v)
}

fn ivy_term_trans(k: &mut Kernel, t: TermId) {
    if let TermKind::Compound { sym, args } = k.terms.kind(t).clone() {
        if let Some(renamed) = dict_lookup(k.symbols.name(sym)) {
            let renamed = renamed.to_string();
            let new_sym = k.symbols.intern(&renamed, args.len());
            if let TermKind::Compound { sym, .. } = k.terms.kind_mut(t) {
                *sym = new_sym;
            }
        }
        for arg in args {
            ivy_term_trans(k, arg);
        }
    }
}

/// The position of literal `n` (1-based) in the right-associated OR tree.
///
/// The last literal needs no final `1`:
/// 1 of 3 -> (1), 2 of 3 -> (2 1), 3 of 3 -> (2 2).
fn ivy_lit_position(n: usize, number_of_lits: usize) -> Vec<usize> {
    let mut pos = vec![2; n - 1];
    if n != number_of_lits {
        pos.push(1);
    }
    pos
}

/// An Ivy term-in-clause position: literal position, sign marker for a
/// negative literal, then the path within the atom.
fn ivy_para_position(pos1: &[usize], sign: bool, number_of_lits: usize) -> Vec<usize> {
    let mut pos2 = ivy_lit_position(pos1[0], number_of_lits);
    if !sign {
        pos2.push(1);
    }
    pos2.extend_from_slice(&pos1[1..]);
    pos2
}

/// The (variable, instance) pairs a context stands for, over the clause's
/// variables.
fn context_to_pairs(
    k: &mut Kernel,
    cid: ClauseId,
    subst: ContextRef,
) -> Vec<(usize, TermId)> {
    let vars = varnums_in_clause(&k.terms, &k.clauses[cid]);
    let mut pairs = Vec::new();
    for v in vars {
        let var_term = k.terms.variable(v);
        let instance = apply(&mut k.terms, &k.contexts, var_term, Some(subst));
        k.terms.free_node(var_term);
        pairs.push((v, instance));
    }
    pairs
}

/// An explicit Instance step.
fn instantiate_inference(
    k: &mut Kernel,
    cid: ClauseId,
    subst: ContextRef,
) -> Result<ClauseId, ErrorKind> {
    let parent_num = k.clauses[cid].id.ok_or_else(|| fatal("instance of an unnumbered clause"))?;
    let pairs = context_to_pairs(k, cid, subst);
    let lits = k.clauses[cid].literals.clone();
    let mut child = Clause::new();
    for lit in lits {
        let atom = apply(&mut k.terms, &k.contexts, lit.atom, Some(subst));
        child.append_literal(Literal::new(lit.sign, atom));
    }
    child.justification =
        Justification::new(JustStep::Ivy(IvyStep::Instance(parent_num, pairs)));
    Ok(k.install_clause(child))
}

/// An explicit renumbering Instance step; None when renumbering is vacuous.
fn renumber_inference(k: &mut Kernel, cid: ClauseId) -> Result<Option<ClauseId>, ErrorKind> {
    let parent_num = k.clauses[cid].id.ok_or_else(|| fatal("renumber of an unnumbered clause"))?;
    let child = copy_clause_ija(k, cid);
    let map = renumber_variables_map(&mut k.terms, &k.clauses[child], MAX_VARS)?;
    if map.is_empty() {
        k.clauses.delete(child, &mut k.terms);
        return Ok(None);
    }
    let pairs = map
        .into_iter()
        .map(|(old, new)| {
            let t = k.terms.variable(new);
            (old, t)
        })
        .collect();
    {
        let clause = k.clauses.get_mut(child);
        clause.id = None;
        clause.justification =
            Justification::new(JustStep::Ivy(IvyStep::Instance(parent_num, pairs)));
    }
    Ok(Some(child))
}

/// An explicit Flip step.
fn flip_inference(k: &mut Kernel, cid: ClauseId, n: usize) -> Result<ClauseId, ErrorKind> {
    let parent_num = k.clauses[cid].id.ok_or_else(|| fatal("flip of an unnumbered clause"))?;
    let child = flip_copy(k, cid, n)?;
    let position = ivy_lit_position(n, number_of_literals(&k.clauses[child]));
    k.clauses.get_mut(child).justification =
        Justification::new(JustStep::Ivy(IvyStep::Flip(parent_num, position)));
    Ok(child)
}

struct StepBuilder<'a> {
    next_id: &'a mut u32,
}

impl StepBuilder<'_> {
    fn number(&mut self, k: &mut Kernel, cid: ClauseId, steps: &mut Vec<ClauseId>) -> u32 {
        let id = *self.next_id;
        *self.next_id += 1;
        k.clauses.get_mut(cid).id = Some(id);
        steps.push(cid);
        id
    }
}

/// Resolution as 2--4 atomic steps: instantiate the parents (where not
/// ground), flip the second literal if asked, resolve identical atoms,
/// renumber.
fn resolve2_instances(
    k: &mut Kernel,
    c1: ClauseId,
    n1: usize,
    c2: ClauseId,
    n2: i32,
    next_id: &mut u32,
) -> Result<Vec<ClauseId>, ErrorKind> {
    let l1 = k.clauses[c1].literals[n1 - 1];
    let l2 = k.clauses[c2].literals[n2.unsigned_abs() as usize - 1];
    if l1.sign == l2.sign {
        return Err(fatal("ivy: resolution on same-sign literals"));
    }

    let a2x = if n2 < 0 {
        crate::structures::literal::top_flip(&mut k.terms, l2.atom)
    } else {
        l2.atom
    };

    let s1 = k.contexts.get_context();
    let s2 = k.contexts.get_context();
    let mut trail = Trail::new();
    let mut builder = StepBuilder { next_id };
    let mut steps = Vec::new();

    let unified = unify(&k.terms, &mut k.contexts, l1.atom, s1, a2x, s2, &mut trail);
    let result = if unified {
        let c1i = if ground_clause(&k.terms, &k.clauses[c1]) {
            c1
        } else {
            let instance = instantiate_inference(k, c1, s1)?;
            builder.number(k, instance, &mut steps);
            instance
        };
        let mut c2i = if ground_clause(&k.terms, &k.clauses[c2]) {
            c2
        } else {
            let instance = instantiate_inference(k, c2, s2)?;
            builder.number(k, instance, &mut steps);
            instance
        };

        if n2 < 0 {
            let flipped = flip_inference(k, c2i, n2.unsigned_abs() as usize)?;
            builder.number(k, flipped, &mut steps);
            c2i = flipped;
        }

        undo_subst(&mut k.contexts, &mut trail);

        // Construct the resolvent from the (identical-atom) instances.
        let mut res = Clause::new();
        let lits1 = k.clauses[c1i].literals.clone();
        let lits2 = k.clauses[c2i].literals.clone();
        for (i, lit) in lits1.iter().enumerate() {
            if i != n1 - 1 {
                let atom = k.terms.copy_term(lit.atom);
                res.append_literal(Literal::new(lit.sign, atom));
            }
        }
        for (i, lit) in lits2.iter().enumerate() {
            if i != n2.unsigned_abs() as usize - 1 {
                let atom = k.terms.copy_term(lit.atom);
                res.append_literal(Literal::new(lit.sign, atom));
            }
        }
        let p1 = k.clauses[c1i].id.expect("! Ivy parent without id");
        let p2 = k.clauses[c2i].id.expect("! Ivy parent without id");
        res.justification = Justification::new(JustStep::Ivy(IvyStep::Resolve(
            p1,
            ivy_lit_position(n1, lits1.len()),
            p2,
            ivy_lit_position(n2.unsigned_abs() as usize, lits2.len()),
        )));
        let res = k.install_clause(res);
        builder.number(k, res, &mut steps);

        if let Some(renum) = renumber_inference(k, res)? {
            builder.number(k, renum, &mut steps);
        }
        Ok(steps)
    } else {
        Err(fatal("ivy: resolution atoms do not unify"))
    };

    undo_subst(&mut k.contexts, &mut trail);
    if n2 < 0 {
        crate::structures::literal::zap_top_flip(&mut k.terms, a2x);
    }
    k.contexts.free_context(s1);
    k.contexts.free_context(s2);
    result
}

/// Paramodulation as atomic steps, mirroring [resolve2_instances].
fn paramod2_instances(
    k: &mut Kernel,
    from: ClauseId,
    from_pos: &[usize],
    into: ClauseId,
    into_pos: &[usize],
    next_id: &mut u32,
) -> Result<Vec<ClauseId>, ErrorKind> {
    let from_lit = from_pos[0] - 1;
    let into_lit = into_pos[0] - 1;
    let left_to_right = from_pos[1] == 1;
    let from_side = if left_to_right { 0 } else { 1 };

    let from_atom = k.clauses[from].literals[from_lit].atom;
    let alpha = k.terms.arg(from_atom, from_side);
    let beta = k.terms.arg(from_atom, 1 - from_side);
    let into_atom = k.clauses[into].literals[into_lit].atom;
    let into_term = k
        .terms
        .term_at_pos(into_atom, &into_pos[1..])
        .ok_or_else(|| fatal("ivy: paramod position does not exist"))?;

    let s_from = k.contexts.get_context();
    let s_into = k.contexts.get_context();
    let mut trail = Trail::new();
    let mut builder = StepBuilder { next_id };
    let mut steps = Vec::new();

    let demod_like = number_of_literals(&k.clauses[from]) == 1
        && k.terms.variables_subset(beta, alpha)
        && match_term(&k.terms, &mut k.contexts, alpha, s_from, into_term, &mut trail);

    let unified = demod_like
        || unify(&k.terms, &mut k.contexts, alpha, s_from, into_term, s_into, &mut trail);

    let result = if unified {
        let from_instance = if ground_clause(&k.terms, &k.clauses[from]) {
            from
        } else {
            let instance = instantiate_inference(k, from, s_from)?;
            builder.number(k, instance, &mut steps);
            instance
        };
        let into_instance = if demod_like || ground_clause(&k.terms, &k.clauses[into]) {
            into
        } else {
            let instance = instantiate_inference(k, into, s_into)?;
            builder.number(k, instance, &mut steps);
            instance
        };

        undo_subst(&mut k.contexts, &mut trail);

        // Positions in the instances equal positions in the originals.
        let para = paramodulate(
            k,
            false,
            from_instance,
            from_lit,
            from_side,
            None,
            into_instance,
            into_pos,
            None,
        );
        let from_num = k.clauses[from_instance].id.expect("! Ivy parent without id");
        let into_num = k.clauses[into_instance].id.expect("! Ivy parent without id");
        let into_sign = k.clauses[into_instance].literals[into_lit].sign;
        k.clauses.get_mut(para).justification = Justification::new(JustStep::Ivy(IvyStep::Paramod(
            from_num,
            ivy_para_position(
                from_pos,
                true,
                number_of_literals(&k.clauses[from_instance]),
            ),
            into_num,
            ivy_para_position(
                into_pos,
                into_sign,
                number_of_literals(&k.clauses[into_instance]),
            ),
        )));
        builder.number(k, para, &mut steps);

        if let Some(renum) = renumber_inference(k, para)? {
            builder.number(k, renum, &mut steps);
        }
        Ok(steps)
    } else {
        Err(fatal("ivy: paramod terms do not unify"))
    };

    undo_subst(&mut k.contexts, &mut trail);
    k.contexts.free_context(s_from);
    k.contexts.free_context(s_into);
    result
}

/// Factoring as instantiate-then-propositional.
fn factor2_instances(
    k: &mut Kernel,
    c: ClauseId,
    n1: usize,
    n2: usize,
    next_id: &mut u32,
) -> Result<Vec<ClauseId>, ErrorKind> {
    let l1 = k.clauses[c].literals[n1 - 1];
    let l2 = k.clauses[c].literals[n2 - 1];
    if l1.sign != l2.sign {
        return Err(fatal("ivy: factor on differing signs"));
    }

    let subst = k.contexts.get_context();
    let mut trail = Trail::new();
    let mut builder = StepBuilder { next_id };
    let mut steps = Vec::new();

    let result = if unify(&k.terms, &mut k.contexts, l1.atom, subst, l2.atom, subst, &mut trail) {
        let instance = instantiate_inference(k, c, subst)?;
        builder.number(k, instance, &mut steps);

        undo_subst(&mut k.contexts, &mut trail);

        let instance_num = k.clauses[instance].id.expect("! Ivy parent without id");
        let lits = k.clauses[instance].literals.clone();
        let mut factor = Clause::new();
        for (i, lit) in lits.iter().enumerate() {
            if i != n2 - 1 {
                let atom = k.terms.copy_term(lit.atom);
                factor.append_literal(Literal::new(lit.sign, atom));
            }
        }
        factor.justification =
            Justification::new(JustStep::Ivy(IvyStep::Propositional(instance_num)));
        let factor = k.install_clause(factor);
        builder.number(k, factor, &mut steps);

        if let Some(renum) = renumber_inference(k, factor)? {
            builder.number(k, renum, &mut steps);
        }
        Ok(steps)
    } else {
        Err(fatal("ivy: factor atoms do not unify"))
    };

    undo_subst(&mut k.contexts, &mut trail);
    k.contexts.free_context(subst);
    result
}

/// Expands a proof into the atomic Ivy vocabulary.
pub fn expand_proof_ivy(k: &mut Kernel, proof: &[ClauseId]) -> Result<Vec<ClauseId>, ErrorKind> {
    // Work on copies with Ivy-safe symbol names.
    let mut work = Vec::new();
    for &c in proof {
        let copy = copy_clause_ija(k, c);
        for i in 0..k.clauses[copy].literals.len() {
            let atom = k.clauses[copy].literals[i].atom;
            ivy_term_trans(k, atom);
        }
        work.push(copy);
    }

    let mut map = ProofMap::default();
    let mut need_reflexivity = false;

    // The special clause x=x, id 0; dropped later if unused.
    let xx = {
        let eq = k.symbols.eq_sym();
        let x1 = k.terms.variable(0);
        let x2 = k.terms.variable(0);
        let atom = k.terms.binary(eq, x1, x2);
        let mut clause = Clause::new();
        clause.append_literal(Literal::new(true, atom));
        clause.id = Some(0);
        clause.justification = Justification::new(JustStep::Ivy(IvyStep::Input));
        k.install_clause(clause)
    };
    map.set(0, xx);

    let mut next_id = work
        .iter()
        .filter_map(|&c| k.clauses[c].id)
        .max()
        .unwrap_or(0)
        + 1;

    let mut out: Vec<ClauseId> = Vec::new();

    for &c in &work {
        let num = k.clauses[c].id.ok_or_else(|| fatal("proof clause without id"))?;
        let justification = k.clauses[c].justification.clone();
        let mods = justification.mods.clone();

        let new_c = match (&justification.primary, mods.as_slice()) {
            (JustStep::BinaryRes { p1, l1, p2, l2 }, _) => {
                let c1 = map.get(*p1)?;
                let c2 = map.get(*p2)?;
                let steps =
                    resolve2_instances(k, c1, *l1 as usize, c2, *l2, &mut next_id)?;
                finish_chain(&mut out, steps, &mut next_id)?
            }

            (JustStep::XxRes { parent, lit }, _) => {
                need_reflexivity = true;
                let c1 = map.get(*parent)?;
                let c2 = map.get(0)?;
                let steps = resolve2_instances(k, c1, *lit, c2, 1, &mut next_id)?;
                finish_chain(&mut out, steps, &mut next_id)?
            }

            (JustStep::Paramod { from, from_pos, into, into_pos }, _) => {
                let from = map.get(*from)?;
                let into = map.get(*into)?;
                let steps =
                    paramod2_instances(k, from, from_pos, into, into_pos, &mut next_id)?;
                finish_chain(&mut out, steps, &mut next_id)?
            }

            (JustStep::Factor { parent, l1, l2 }, _) => {
                let parent = map.get(*parent)?;
                let steps = factor2_instances(k, parent, *l1, *l2, &mut next_id)?;
                finish_chain(&mut out, steps, &mut next_id)?
            }

            (JustStep::Copy { parent }, [CopyMod::Flip(n)]) => {
                let parent = map.get(*parent)?;
                let child = flip_inference(k, parent, *n)?;
                let mut steps = Vec::new();
                let mut builder = StepBuilder { next_id: &mut next_id };
                builder.number(k, child, &mut steps);
                if let Some(renum) = renumber_inference(k, child)? {
                    builder.number(k, renum, &mut steps);
                }
                finish_chain(&mut out, steps, &mut next_id)?
            }

            (JustStep::Copy { parent }, [CopyMod::Xx(n)]) => {
                need_reflexivity = true;
                let c1 = map.get(*parent)?;
                let c2 = map.get(0)?;
                let steps = resolve2_instances(k, c1, *n, c2, 1, &mut next_id)?;
                finish_chain(&mut out, steps, &mut next_id)?
            }

            (JustStep::Copy { parent }, _) => {
                // A plain copy, possibly with merges: propositionally equal.
                let parent_num = *parent;
                let new_c = copy_clause_ija(k, c);
                k.clauses.get_mut(new_c).justification =
                    Justification::new(JustStep::Ivy(IvyStep::Propositional(parent_num)));
                out.push(new_c);
                new_c
            }

            (JustStep::Instance { parent, pairs }, _) => {
                let new_c = copy_clause_ija(k, c);
                k.clauses.get_mut(new_c).justification = Justification::new(JustStep::Ivy(
                    IvyStep::Instance(*parent, pairs.clone()),
                ));
                out.push(new_c);
                new_c
            }

            (JustStep::Ivy(_), _) => {
                // Already atomic; idempotence.
                let new_c = copy_clause_ija(k, c);
                out.push(new_c);
                new_c
            }

            (JustStep::HyperRes { .. }, _) | (JustStep::UrRes { .. }, _) => {
                return Err(fatal("ivy: expand the proof first"));
            }

            // Input-like origins.
            (_, _) => {
                let new_c = copy_clause_ija(k, c);
                k.clauses.get_mut(new_c).justification =
                    Justification::new(JustStep::Ivy(IvyStep::Input));
                out.push(new_c);
                new_c
            }
        };

        k.clauses.get_mut(new_c).id = Some(num);
        map.set(num, new_c);

        let forward = subsumes(&k.terms, &mut k.contexts, &k.clauses[c], &k.clauses[new_c]);
        let backward = subsumes(&k.terms, &mut k.contexts, &k.clauses[new_c], &k.clauses[c]);
        if !forward || !backward {
            return Err(fatal("ivy: expanded clause not equivalent"));
        }
    }

    if need_reflexivity {
        out.insert(0, xx);
    } else {
        k.clauses.delete(xx, &mut k.terms);
    }
    Ok(out)
}

/// Pushes a step chain onto the proof and returns the last step, whose
/// provisional id is handed back (the caller renames it to the original's).
fn finish_chain(
    out: &mut Vec<ClauseId>,
    steps: Vec<ClauseId>,
    next_id: &mut u32,
) -> Result<ClauseId, ErrorKind> {
    let last = *steps.last().ok_or_else(|| fatal("ivy: empty step chain"))?;
    *next_id -= 1;
    out.extend(steps);
    Ok(last)
}

// Printing.

fn sb_term(symbols: &SymbolTable, arena: &TermArena, t: TermId, sb: &mut String) {
    match arena.kind(t) {
        TermKind::Variable(n) => {
            sb.push('v');
            sb.push_str(&n.to_string());
        }
        TermKind::Compound { sym, args } => {
            sb.push('(');
            sb.push_str(symbols.name(*sym));
            for &arg in args {
                sb.push(' ');
                sb_term(symbols, arena, arg, sb);
            }
            sb.push(')');
        }
    }
}

fn sb_position(position: &[usize], sb: &mut String) {
    sb.push('(');
    for (i, p) in position.iter().enumerate() {
        if i > 0 {
            sb.push(' ');
        }
        sb.push_str(&p.to_string());
    }
    sb.push(')');
}

fn sb_pairs(symbols: &SymbolTable, arena: &TermArena, pairs: &[(usize, TermId)], sb: &mut String) {
    sb.push('(');
    for (i, (var, t)) in pairs.iter().enumerate() {
        if i > 0 {
            sb.push(' ');
        }
        sb.push('(');
        sb.push('v');
        sb.push_str(&var.to_string());
        sb.push_str(" . ");
        sb_term(symbols, arena, *t, sb);
        sb.push(')');
    }
    sb.push(')');
}

fn sb_lit(symbols: &SymbolTable, arena: &TermArena, lit: &Literal, sb: &mut String) {
    if lit.sign {
        sb_term(symbols, arena, lit.atom, sb);
    } else {
        sb.push_str("(not ");
        sb_term(symbols, arena, lit.atom, sb);
        sb.push(')');
    }
}

fn sb_literals(symbols: &SymbolTable, arena: &TermArena, lits: &[Literal], sb: &mut String) {
    match lits {
        [] => sb.push_str("false"),
        [single] => sb_lit(symbols, arena, single, sb),
        [first, rest @ ..] => {
            sb.push_str("(or ");
            sb_lit(symbols, arena, first, sb);
            sb.push(' ');
            sb_literals(symbols, arena, rest, sb);
            sb.push(')');
        }
    }
}

fn sb_just(symbols: &SymbolTable, arena: &TermArena, step: &IvyStep, sb: &mut String) {
    match step {
        IvyStep::Input => sb.push_str("(input)"),
        IvyStep::Propositional(id) => {
            sb.push_str("(propositional ");
            sb.push_str(&id.to_string());
            sb.push(')');
        }
        IvyStep::NewSymbol(id) => {
            sb.push_str("(new_symbol ");
            sb.push_str(&id.to_string());
            sb.push(')');
        }
        IvyStep::Flip(id, position) => {
            sb.push_str("(flip ");
            sb.push_str(&id.to_string());
            sb.push(' ');
            sb_position(position, sb);
            sb.push(')');
        }
        IvyStep::Instance(id, pairs) => {
            sb.push_str("(instantiate ");
            sb.push_str(&id.to_string());
            sb.push(' ');
            sb_pairs(symbols, arena, pairs, sb);
            sb.push(')');
        }
        IvyStep::Resolve(p1, pos1, p2, pos2) => {
            sb.push_str("(resolve ");
            sb.push_str(&p1.to_string());
            sb.push(' ');
            sb_position(pos1, sb);
            sb.push(' ');
            sb.push_str(&p2.to_string());
            sb.push(' ');
            sb_position(pos2, sb);
            sb.push(')');
        }
        IvyStep::Paramod(p1, pos1, p2, pos2) => {
            sb.push_str("(paramod ");
            sb.push_str(&p1.to_string());
            sb.push(' ');
            sb_position(pos1, sb);
            sb.push(' ');
            sb.push_str(&p2.to_string());
            sb.push(' ');
            sb_position(pos2, sb);
            sb.push(')');
        }
    }
}

/// The whole proof as the Ivy S-expression list.
pub fn ivy_proof_to_string(k: &Kernel, proof: &[ClauseId]) -> Result<String, ErrorKind> {
    let mut sb = String::from(";; BEGINNING OF PROOF OBJECT\n(\n");
    for &c in proof {
        let clause = &k.clauses[c];
        let step = match &clause.justification.primary {
            JustStep::Ivy(step) => step,
            _ => return Err(fatal("ivy print: non-atomic step")),
        };
        sb.push('(');
        sb.push_str(&clause.id.unwrap_or(0).to_string());
        sb.push(' ');
        sb_just(&k.symbols, &k.terms, step, &mut sb);
        sb.push(' ');
        sb_literals(&k.symbols, &k.terms, &clause.literals, &mut sb);
        sb.push_str(" NIL)\n");
    }
    sb.push_str(")\n;; END OF PROOF OBJECT\n");
    Ok(sb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProverConfig;
    use crate::procedures::saturate::{Prover, ProverReport};
    use crate::proofs::expand::expand_proof;

    fn ivy_of(prover: &mut Prover) -> (Vec<ClauseId>, String) {
        let proof = prover.proof().unwrap();
        let k = &mut prover.kernel;
        let expanded = expand_proof(k, &proof).unwrap();
        let ivy = expand_proof_ivy(k, &expanded).unwrap();
        let text = ivy_proof_to_string(k, &ivy).unwrap();
        (ivy, text)
    }

    #[test]
    fn unit_conflict_is_two_inputs_and_a_resolve() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-p(a).").unwrap();
        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);

        let (ivy, text) = ivy_of(&mut prover);
        assert_eq!(ivy.len(), 3);

        let k = &prover.kernel;
        let inputs = ivy
            .iter()
            .filter(|&&c| {
                matches!(
                    k.clauses[c].justification.primary,
                    JustStep::Ivy(IvyStep::Input)
                )
            })
            .count();
        let resolves = ivy
            .iter()
            .filter(|&&c| {
                matches!(
                    k.clauses[c].justification.primary,
                    JustStep::Ivy(IvyStep::Resolve(..))
                )
            })
            .count();
        assert_eq!(inputs, 2);
        assert_eq!(resolves, 1);
        assert!(text.contains("(resolve "));
        assert!(text.contains("false NIL)"));
    }

    #[test]
    fn xx_refutation_resolves_against_the_prepended_reflexivity() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("x = x.").unwrap();
        prover.add_input_str("a != a.").unwrap();
        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);

        let (ivy, _text) = ivy_of(&mut prover);
        let k = &prover.kernel;

        // Every step is one of the seven shapes, and any reference to id 0
        // means the prepended x=x is present and first.
        let references_zero = ivy.iter().any(|&c| {
            k.clauses[c].justification.parents().contains(&0)
        });
        if references_zero {
            assert_eq!(k.clauses[ivy[0]].id, Some(0));
        }
        for &c in &ivy {
            assert!(matches!(
                k.clauses[c].justification.primary,
                JustStep::Ivy(_)
            ));
        }
    }

    #[test]
    fn equational_proof_has_paramod_steps_with_instances() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("f(x) = x.").unwrap();
        prover.add_input_str("-p(f(a)) | q.").unwrap();
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-q.").unwrap();
        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);

        let (ivy, text) = ivy_of(&mut prover);
        let k = &prover.kernel;
        assert!(ivy.iter().any(|&c| matches!(
            k.clauses[c].justification.primary,
            JustStep::Ivy(IvyStep::Paramod(..))
        )));
        assert!(text.contains("(paramod ") || text.contains("(resolve "));
    }
}
