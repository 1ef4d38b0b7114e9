/*!
Binding environments, trails, unification and matching.

# Contexts

A [Context] is a fixed-size table of bindings (one slot per variable index up
to [MAX_VARS]) plus an integer *multiplier*.
A binding maps a variable to a term *interpreted in some other context*, which
is how two clauses may be unified without first renaming their variables
apart: a variable left unbound by a context is read as the effective variable
`multiplier * MAX_VARS + varnum`, so identical indices from different
contexts never collide.

Contexts are pooled in a [ContextBank] and addressed by [ContextRef]; their
lifetime is a single unification or matching attempt.

# Trails

Every binding is recorded in a caller-supplied [Trail].
[undo_subst] restores the recorded slots to unbound in LIFO order;
[Trail::mark]/[undo_to] give the partial undo the backtracking rule engines
need.
Failed attempts may leave bindings on the trail; callers undo in all paths.

# Operations

- [unify]: Robinson unification with occur-check, across two contexts.
- [match_term]: one-way matching; only pattern variables bind, and their
  bindings carry no context (the bound terms are taken literally).
- [apply]: build a fresh instance of a term under a context.
- [apply_basic]: as `apply`, marking substituted subterms "nonbasic" for
  basic paramodulation.
- [apply_substitute2] / [apply_basic_substitute2]: the one-pass
  paramodulation substitution --- walk the into-atom to a position, place
  the instantiated `beta` there, apply the into-context everywhere else.
*/

use crate::structures::term::{TermArena, TermFlag, TermId};

/// Bound on variable indices within one clause or context.
pub const MAX_VARS: usize = 512;

/// An index into the context pool.
pub type ContextRef = usize;

/// A binding: a term, and the context its variables are interpreted in
/// (None for bindings made by matching --- the term is taken literally).
#[derive(Clone, Copy, Debug)]
pub struct Binding {
    pub term: TermId,
    pub context: Option<ContextRef>,
}

struct Context {
    bindings: Vec<Option<Binding>>,
    multiplier: usize,
}

/// The pool of reusable contexts.
#[derive(Default)]
pub struct ContextBank {
    contexts: Vec<Context>,
    free: Vec<ContextRef>,
}

impl ContextBank {
    /// A fresh context with all slots unbound.
    pub fn get_context(&mut self) -> ContextRef {
        match self.free.pop() {
            Some(c) => c,
            None => {
                let c = self.contexts.len();
                self.contexts.push(Context {
                    bindings: vec![None; MAX_VARS],
                    multiplier: c,
                });
                c
            }
        }
    }

    /// Returns a context to the pool.
    ///
    /// The context is expected to be empty; a context is empty again once
    /// every trail that recorded bindings into it has been undone.
    pub fn free_context(&mut self, c: ContextRef) {
        debug_assert!(
            self.contexts[c].bindings.iter().all(|b| b.is_none()),
            "! Context freed while bindings remain"
        );
        self.free.push(c);
    }

    pub fn multiplier(&self, c: ContextRef) -> usize {
        self.contexts[c].multiplier
    }

    pub fn binding(&self, c: ContextRef, var: usize) -> Option<Binding> {
        self.contexts[c].bindings[var]
    }

    pub(crate) fn bind(
        &mut self,
        c: ContextRef,
        var: usize,
        term: TermId,
        term_context: Option<ContextRef>,
        trail: &mut Trail,
    ) {
        trail.entries.push((c, var));
        self.contexts[c].bindings[var] = Some(Binding {
            term,
            context: term_context,
        });
    }

    fn unbind(&mut self, c: ContextRef, var: usize) {
        self.contexts[c].bindings[var] = None;
    }

    /// True if the context maps every bound variable to a variable
    /// (a renaming, as far as it goes).
    pub fn variable_substitution(&self, arena: &TermArena, c: ContextRef) -> bool {
        self.contexts[c]
            .bindings
            .iter()
            .flatten()
            .all(|b| arena.is_variable(b.term))
    }
}

/// The undo log for speculative bindings.
#[derive(Default)]
pub struct Trail {
    entries: Vec<(ContextRef, usize)>,
}

impl Trail {
    pub fn new() -> Self {
        Trail::default()
    }

    /// A checkpoint for [undo_to].
    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Undoes every binding on the trail, leaving it empty.
pub fn undo_subst(bank: &mut ContextBank, trail: &mut Trail) {
    undo_to(bank, trail, 0);
}

/// Undoes bindings back to a [Trail::mark], in LIFO order.
pub fn undo_to(bank: &mut ContextBank, trail: &mut Trail, mark: usize) {
    while trail.entries.len() > mark {
        let (c, var) = trail.entries.pop().expect("! Trail underflow");
        bank.unbind(c, var);
    }
}

/// Follows variable bindings to the representative (term, context) pair.
pub fn dereference(
    arena: &TermArena,
    bank: &ContextBank,
    mut t: TermId,
    mut c: Option<ContextRef>,
) -> (TermId, Option<ContextRef>) {
    loop {
        match (c, arena.varnum(t)) {
            (Some(ctx), Some(var)) => match bank.binding(ctx, var) {
                Some(b) => {
                    t = b.term;
                    c = b.context;
                }
                None => return (t, c),
            },
            _ => return (t, c),
        }
    }
}

/// True if the variable does *not* occur in the (dereferenced) term.
fn occur_check(
    arena: &TermArena,
    bank: &ContextBank,
    var: usize,
    var_ctx: ContextRef,
    t: TermId,
    t_ctx: Option<ContextRef>,
) -> bool {
    let (t, t_ctx) = dereference(arena, bank, t, t_ctx);
    match arena.varnum(t) {
        Some(n) => !(n == var && t_ctx == Some(var_ctx)),
        None => arena
            .args(t)
            .iter()
            .all(|&a| occur_check(arena, bank, var, var_ctx, a, t_ctx)),
    }
}

/// Robinson unification with occur-check.
///
/// On success the contexts hold a most general unifier and the bindings made
/// are on the trail; on failure some bindings may remain on the trail, so
/// callers undo in either case.
pub fn unify(
    arena: &TermArena,
    bank: &mut ContextBank,
    t1: TermId,
    c1: ContextRef,
    t2: TermId,
    c2: ContextRef,
    trail: &mut Trail,
) -> bool {
    let (t1, c1) = dereference(arena, bank, t1, Some(c1));
    let (t2, c2) = dereference(arena, bank, t2, Some(c2));

    match (arena.varnum(t1), arena.varnum(t2)) {
        (Some(v1), Some(v2)) => {
            if v1 == v2 && c1 == c2 {
                true
            } else {
                let c1 = c1.expect("! Unify: unbound variable without context");
                bank.bind(c1, v1, t2, c2, trail);
                true
            }
        }

        (Some(v1), None) => {
            let c1 = c1.expect("! Unify: unbound variable without context");
            if occur_check(arena, bank, v1, c1, t2, c2) {
                bank.bind(c1, v1, t2, c2, trail);
                true
            } else {
                false
            }
        }

        (None, Some(v2)) => {
            let c2 = c2.expect("! Unify: unbound variable without context");
            if occur_check(arena, bank, v2, c2, t1, c1) {
                bank.bind(c2, v2, t1, c1, trail);
                true
            } else {
                false
            }
        }

        (None, None) => {
            if arena.sym(t1) != arena.sym(t2) || arena.arity(t1) != arena.arity(t2) {
                return false;
            }
            let n = arena.arity(t1);
            for i in 0..n {
                let a1 = arena.arg(t1, i);
                let a2 = arena.arg(t2, i);
                let c1 = c1.expect("! Unify: compound without context");
                let c2 = c2.expect("! Unify: compound without context");
                if !unify(arena, bank, a1, c1, a2, c2, trail) {
                    return false;
                }
            }
            true
        }
    }
}

/// One-way matching: succeeds iff some substitution over the pattern's
/// variables alone sends the pattern to the term.
pub fn match_term(
    arena: &TermArena,
    bank: &mut ContextBank,
    pat: TermId,
    pat_ctx: ContextRef,
    t: TermId,
    trail: &mut Trail,
) -> bool {
    match arena.varnum(pat) {
        Some(var) => match bank.binding(pat_ctx, var) {
            Some(b) => arena.term_ident(b.term, t),
            None => {
                bank.bind(pat_ctx, var, t, None, trail);
                true
            }
        },
        None => {
            if arena.is_variable(t)
                || arena.sym(pat) != arena.sym(t)
                || arena.arity(pat) != arena.arity(t)
            {
                return false;
            }
            for i in 0..arena.arity(pat) {
                if !match_term(arena, bank, arena.arg(pat, i), pat_ctx, arena.arg(t, i), trail) {
                    return false;
                }
            }
            true
        }
    }
}

/// Builds a fresh instance of `t` under the context.
///
/// A `None` context copies the term as-is; this is what bindings built by
/// matching dereference to.
pub fn apply(
    arena: &mut TermArena,
    bank: &ContextBank,
    t: TermId,
    c: Option<ContextRef>,
) -> TermId {
    let (t, c) = dereference(arena, bank, t, c);
    match arena.varnum(t) {
        Some(var) => match c {
            Some(ctx) => arena.variable(bank.multiplier(ctx) * MAX_VARS + var),
            None => arena.variable(var),
        },
        None => {
            let sym = arena.sym(t).expect("! Apply: compound without symbol");
            let args = arena.args(t).to_vec();
            let new_args = args.into_iter().map(|a| apply(arena, bank, a, c)).collect();
            arena.compound(sym, new_args)
        }
    }
}

/// Marks the term and every non-variable subterm nonbasic.
pub fn mark_all_nonbasic(arena: &mut TermArena, t: TermId, nonbasic: TermFlag) {
    if !arena.is_variable(t) {
        arena.set_flag(t, nonbasic);
        for arg in arena.args(t).to_vec() {
            mark_all_nonbasic(arena, arg, nonbasic);
        }
    }
}

/// As [apply], with "nonbasic" marks for basic paramodulation: a subterm
/// brought in by a variable binding is marked nonbasic throughout, and
/// nonbasic marks on the source skeleton are preserved.
pub fn apply_basic(
    arena: &mut TermArena,
    bank: &ContextBank,
    t: TermId,
    c: Option<ContextRef>,
    nonbasic: TermFlag,
) -> TermId {
    let raw_is_var = arena.is_variable(t);
    let (t, c) = dereference(arena, bank, t, c);
    match arena.varnum(t) {
        Some(var) => match c {
            Some(ctx) => arena.variable(bank.multiplier(ctx) * MAX_VARS + var),
            None => arena.variable(var),
        },
        None => {
            let sym = arena.sym(t).expect("! Apply: compound without symbol");
            let args = arena.args(t).to_vec();
            let was_nonbasic = arena.flag(t, nonbasic);
            let new_args = args
                .into_iter()
                .map(|a| apply_basic(arena, bank, a, c, nonbasic))
                .collect();
            let t2 = arena.compound(sym, new_args);
            if raw_is_var {
                mark_all_nonbasic(arena, t2, nonbasic);
            } else if was_nonbasic {
                arena.set_flag(t2, nonbasic);
            }
            t2
        }
    }
}

/// The paramodulation substitution in one pass: walk `atom` along `pos`
/// (1-based argument indices), place `apply(beta, from_ctx)` at the end of
/// the walk, and apply `into_ctx` everywhere else.
pub fn apply_substitute2(
    arena: &mut TermArena,
    bank: &ContextBank,
    atom: TermId,
    beta: TermId,
    from_ctx: Option<ContextRef>,
    pos: &[usize],
    into_ctx: Option<ContextRef>,
) -> TermId {
    match pos.split_first() {
        None => apply(arena, bank, beta, from_ctx),
        Some((&i, rest)) => {
            let sym = arena.sym(atom).expect("! Substitute: path through a variable");
            let args = arena.args(atom).to_vec();
            let new_args = args
                .into_iter()
                .enumerate()
                .map(|(k, a)| {
                    if k + 1 == i {
                        apply_substitute2(arena, bank, a, beta, from_ctx, rest, into_ctx)
                    } else {
                        apply(arena, bank, a, into_ctx)
                    }
                })
                .collect();
            arena.compound(sym, new_args)
        }
    }
}

/// As [apply_substitute2], with nonbasic marks: skeleton marks are kept and
/// the substituted subterms are marked through [apply_basic].
pub fn apply_basic_substitute2(
    arena: &mut TermArena,
    bank: &ContextBank,
    atom: TermId,
    beta: TermId,
    from_ctx: Option<ContextRef>,
    pos: &[usize],
    into_ctx: Option<ContextRef>,
    nonbasic: TermFlag,
) -> TermId {
    match pos.split_first() {
        None => apply_basic(arena, bank, beta, from_ctx, nonbasic),
        Some((&i, rest)) => {
            let sym = arena.sym(atom).expect("! Substitute: path through a variable");
            let args = arena.args(atom).to_vec();
            let was_nonbasic = arena.flag(atom, nonbasic);
            let new_args = args
                .into_iter()
                .enumerate()
                .map(|(k, a)| {
                    if k + 1 == i {
                        apply_basic_substitute2(
                            arena, bank, a, beta, from_ctx, rest, into_ctx, nonbasic,
                        )
                    } else {
                        apply_basic(arena, bank, a, into_ctx, nonbasic)
                    }
                })
                .collect();
            let t2 = arena.compound(sym, new_args);
            if was_nonbasic {
                arena.set_flag(t2, nonbasic);
            }
            t2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    struct Fixture {
        symbols: SymbolTable,
        arena: TermArena,
        bank: ContextBank,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                symbols: SymbolTable::default(),
                arena: TermArena::default(),
                bank: ContextBank::default(),
            }
        }
    }

    #[test]
    fn unify_then_apply_agree() {
        let mut fx = Fixture::new();
        let f = fx.symbols.intern("f", 2);
        let g = fx.symbols.intern("g", 1);
        let a = fx.symbols.intern("a", 0);

        // f(x0, g(x1)) with f(g(a), x0): unifiable.
        let t1 = {
            let x0 = fx.arena.variable(0);
            let x1 = fx.arena.variable(1);
            let gx1 = fx.arena.unary(g, x1);
            fx.arena.binary(f, x0, gx1)
        };
        let t2 = {
            let ca = fx.arena.constant(a);
            let ga = fx.arena.unary(g, ca);
            let x0 = fx.arena.variable(0);
            fx.arena.binary(f, ga, x0)
        };

        let c1 = fx.bank.get_context();
        let c2 = fx.bank.get_context();
        let mut trail = Trail::new();

        assert!(unify(&fx.arena, &mut fx.bank, t1, c1, t2, c2, &mut trail));

        let i1 = apply(&mut fx.arena, &fx.bank, t1, Some(c1));
        let i2 = apply(&mut fx.arena, &fx.bank, t2, Some(c2));
        assert!(fx.arena.term_ident(i1, i2));

        undo_subst(&mut fx.bank, &mut trail);
        fx.bank.free_context(c1);
        fx.bank.free_context(c2);
    }

    #[test]
    fn occur_check_rejects() {
        let mut fx = Fixture::new();
        let g = fx.symbols.intern("g", 1);

        // x0 with g(x0), same context.
        let x = fx.arena.variable(0);
        let x_inner = fx.arena.variable(0);
        let gx = fx.arena.unary(g, x_inner);

        let c = fx.bank.get_context();
        let mut trail = Trail::new();
        assert!(!unify(&fx.arena, &mut fx.bank, x, c, gx, c, &mut trail));
        undo_subst(&mut fx.bank, &mut trail);
        fx.bank.free_context(c);
    }

    #[test]
    fn different_contexts_keep_same_indices_apart() {
        let mut fx = Fixture::new();
        let g = fx.symbols.intern("g", 1);

        // x0 (ctx 1) with g(x0) (ctx 2): fine, these are different variables.
        let x = fx.arena.variable(0);
        let x_inner = fx.arena.variable(0);
        let gx = fx.arena.unary(g, x_inner);

        let c1 = fx.bank.get_context();
        let c2 = fx.bank.get_context();
        let mut trail = Trail::new();
        assert!(unify(&fx.arena, &mut fx.bank, x, c1, gx, c2, &mut trail));
        undo_subst(&mut fx.bank, &mut trail);
        fx.bank.free_context(c1);
        fx.bank.free_context(c2);
    }

    #[test]
    fn match_binds_pattern_side_only() {
        let mut fx = Fixture::new();
        let f = fx.symbols.intern("f", 2);
        let a = fx.symbols.intern("a", 0);

        // pattern f(x0, x0) against f(a, a): matches.
        let pat = {
            let x = fx.arena.variable(0);
            let x2 = fx.arena.variable(0);
            fx.arena.binary(f, x, x2)
        };
        let t = {
            let ca = fx.arena.constant(a);
            let ca2 = fx.arena.constant(a);
            fx.arena.binary(f, ca, ca2)
        };

        let c = fx.bank.get_context();
        let mut trail = Trail::new();
        assert!(match_term(&fx.arena, &mut fx.bank, pat, c, t, &mut trail));

        let instance = apply(&mut fx.arena, &fx.bank, pat, Some(c));
        assert!(fx.arena.term_ident(instance, t));
        undo_subst(&mut fx.bank, &mut trail);

        // pattern f(x0, x0) against f(a, b): no.
        let b = fx.symbols.intern("b", 0);
        let t2 = {
            let ca = fx.arena.constant(a);
            let cb = fx.arena.constant(b);
            fx.arena.binary(f, ca, cb)
        };
        assert!(!match_term(&fx.arena, &mut fx.bank, pat, c, t2, &mut trail));
        undo_subst(&mut fx.bank, &mut trail);
        fx.bank.free_context(c);
    }

    #[test]
    fn undo_restores_contexts() {
        let mut fx = Fixture::new();
        let a = fx.symbols.intern("a", 0);
        let x = fx.arena.variable(0);
        let ca = fx.arena.constant(a);

        let c1 = fx.bank.get_context();
        let c2 = fx.bank.get_context();
        let mut trail = Trail::new();
        assert!(unify(&fx.arena, &mut fx.bank, x, c1, ca, c2, &mut trail));
        assert!(fx.bank.binding(c1, 0).is_some());

        undo_subst(&mut fx.bank, &mut trail);
        assert!(fx.bank.binding(c1, 0).is_none());
        assert!(trail.is_empty());
        fx.bank.free_context(c1);
        fx.bank.free_context(c2);
    }

    #[test]
    fn substitute_places_beta_at_position() {
        let mut fx = Fixture::new();
        let p = fx.symbols.intern("p", 1);
        let f = fx.symbols.intern("f", 1);
        let b = fx.symbols.intern("b", 0);

        // atom p(f(x0)), beta = b, position [1,1] (the x0 inside f).
        let atom = {
            let x = fx.arena.variable(0);
            let fx_ = fx.arena.unary(f, x);
            fx.arena.unary(p, fx_)
        };
        let beta = fx.arena.constant(b);

        let result = apply_substitute2(&mut fx.arena, &fx.bank, atom, beta, None, &[1, 1], None);
        // p(f(b))
        let expected = {
            let cb = fx.arena.constant(b);
            let fb = fx.arena.unary(f, cb);
            fx.arena.unary(p, fb)
        };
        assert!(fx.arena.term_ident(result, expected));
    }
}
