/*!
Terms, held in an arena and addressed by handles.

A term is either a *variable*, carrying a non-negative index bounded by [MAX_VARS](crate::unify::MAX_VARS), or a *compound*, carrying a symbol and exactly as many argument handles as the symbol's arity (constants are compounds with no arguments).

Each non-variable node additionally carries:
- a flag byte whose bits are claimed by clients at startup through a [FlagRegistry] (the basic-paramodulation "nonbasic" mark, the Mace literal/negation marks, …),
- a *container* back-pointer: the parent term, or the clause / ground-clause the node is the literal atom of. Containers form a tree, so upward walks from any subterm reach the owning clause in O(depth).

Terms are not shared: every clause owns a fresh subtree, and operations which build new terms ([copy_term](TermArena::copy_term), [apply](crate::unify::apply), …) always allocate fresh nodes.
The one deliberate exception is the Mace searcher's domain-element terms, which are variable nodes shared across the ground clause set; variable nodes never carry flags or containers, which is what makes the sharing harmless.
*/

use slotmap::{new_key_type, SlotMap};

use crate::structures::clause::ClauseId;
use crate::symbols::{SymbolTable, SymNum};

new_key_type! {
    /// A handle into the term arena.
    pub struct TermId;
}

/// What a term node is.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TermKind {
    /// A variable with its index.
    Variable(usize),

    /// A compound: symbol plus argument handles (empty for constants).
    Compound { sym: SymNum, args: Vec<TermId> },
}

/// Who owns a term node.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Container {
    #[default]
    None,

    /// The parent term.
    Term(TermId),

    /// The node is the atom of a literal of this clause.
    Clause(ClauseId),

    /// The node is a literal of this ground (Mace) clause.
    Ground(usize),
}

/// One claimed bit of the per-node flag byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TermFlag(u8);

/// Hands out flag bits; claim what you need at startup.
#[derive(Default)]
pub struct FlagRegistry {
    claimed: u8,
}

impl FlagRegistry {
    /// Claims a fresh flag bit.
    ///
    /// # Panics
    /// After eight claims; flags are a startup-time resource.
    pub fn claim(&mut self) -> TermFlag {
        if self.claimed >= 8 {
            panic!("! Term flag bits exhausted");
        }
        let flag = TermFlag(1 << self.claimed);
        self.claimed += 1;
        flag
    }
}

/// A term node.
#[derive(Clone, Debug)]
pub struct TermNode {
    pub kind: TermKind,
    flags: u8,
    pub container: Container,
}

/// The term arena.
#[derive(Default)]
pub struct TermArena {
    nodes: SlotMap<TermId, TermNode>,
}

impl TermArena {
    // Construction.

    pub fn variable(&mut self, varnum: usize) -> TermId {
        self.nodes.insert(TermNode {
            kind: TermKind::Variable(varnum),
            flags: 0,
            container: Container::None,
        })
    }

    pub fn constant(&mut self, sym: SymNum) -> TermId {
        self.compound(sym, Vec::new())
    }

    /// Container links of the arguments are left alone; callers set them in
    /// one pass with [upward_term_links](Self::upward_term_links) (or the
    /// clause-level variant) once the tree is complete.
    pub fn compound(&mut self, sym: SymNum, args: Vec<TermId>) -> TermId {
        self.nodes.insert(TermNode {
            kind: TermKind::Compound { sym, args },
            flags: 0,
            container: Container::None,
        })
    }

    pub fn binary(&mut self, sym: SymNum, a: TermId, b: TermId) -> TermId {
        self.compound(sym, vec![a, b])
    }

    pub fn unary(&mut self, sym: SymNum, a: TermId) -> TermId {
        self.compound(sym, vec![a])
    }

    // Inspection.

    pub fn kind(&self, t: TermId) -> &TermKind {
        &self.nodes[t].kind
    }

    /// For rewrites that change what a node is (e.g. the reader turning
    /// variable-named constants into variables).
    pub fn kind_mut(&mut self, t: TermId) -> &mut TermKind {
        &mut self.nodes[t].kind
    }

    pub fn is_variable(&self, t: TermId) -> bool {
        matches!(self.nodes[t].kind, TermKind::Variable(_))
    }

    pub fn varnum(&self, t: TermId) -> Option<usize> {
        match self.nodes[t].kind {
            TermKind::Variable(n) => Some(n),
            TermKind::Compound { .. } => None,
        }
    }

    /// The symbol of a compound; None for variables.
    pub fn sym(&self, t: TermId) -> Option<SymNum> {
        match self.nodes[t].kind {
            TermKind::Variable(_) => None,
            TermKind::Compound { sym, .. } => Some(sym),
        }
    }

    pub fn args(&self, t: TermId) -> &[TermId] {
        match &self.nodes[t].kind {
            TermKind::Variable(_) => &[],
            TermKind::Compound { args, .. } => args,
        }
    }

    pub fn arg(&self, t: TermId, i: usize) -> TermId {
        self.args(t)[i]
    }

    pub fn arity(&self, t: TermId) -> usize {
        self.args(t).len()
    }

    pub fn is_constant(&self, t: TermId) -> bool {
        matches!(&self.nodes[t].kind, TermKind::Compound { args, .. } if args.is_empty())
    }

    /// Compound with at least one argument.
    pub fn is_complex(&self, t: TermId) -> bool {
        matches!(&self.nodes[t].kind, TermKind::Compound { args, .. } if !args.is_empty())
    }

    pub fn is_term(&self, symbols: &SymbolTable, t: TermId, name: &str, arity: usize) -> bool {
        match self.sym(t) {
            Some(sn) => symbols.is_symbol(sn, name, arity),
            None => false,
        }
    }

    /// Rewrites a variable's index in place.
    pub fn set_varnum(&mut self, t: TermId, n: usize) {
        match &mut self.nodes[t].kind {
            TermKind::Variable(v) => *v = n,
            TermKind::Compound { .. } => panic!("! set_varnum on a compound"),
        }
    }

    /// Replaces argument `i`; the caller is responsible for the old subtree.
    pub fn set_arg(&mut self, t: TermId, i: usize, new_arg: TermId) {
        match &mut self.nodes[t].kind {
            TermKind::Variable(_) => panic!("! set_arg on a variable"),
            TermKind::Compound { args, .. } => args[i] = new_arg,
        }
    }

    // Flags.

    pub fn flag(&self, t: TermId, f: TermFlag) -> bool {
        self.nodes[t].flags & f.0 != 0
    }

    pub fn set_flag(&mut self, t: TermId, f: TermFlag) {
        self.nodes[t].flags |= f.0;
    }

    pub fn clear_flag(&mut self, t: TermId, f: TermFlag) {
        self.nodes[t].flags &= !f.0;
    }

    // Containers.

    pub fn container(&self, t: TermId) -> Container {
        self.nodes[t].container
    }

    pub fn set_container(&mut self, t: TermId, c: Container) {
        self.nodes[t].container = c;
    }

    // Whole-term operations.

    /// A fresh deep copy; flags are *not* copied.
    pub fn copy_term(&mut self, t: TermId) -> TermId {
        match self.nodes[t].kind.clone() {
            TermKind::Variable(n) => self.variable(n),
            TermKind::Compound { sym, args } => {
                let new_args = args.iter().map(|&a| self.copy_term(a)).collect();
                self.compound(sym, new_args)
            }
        }
    }

    /// A fresh deep copy carrying the flag bytes of the original nodes.
    pub fn copy_term_with_flags(&mut self, t: TermId) -> TermId {
        let flags = self.nodes[t].flags;
        let copy = match self.nodes[t].kind.clone() {
            TermKind::Variable(n) => self.variable(n),
            TermKind::Compound { sym, args } => {
                let new_args = args.iter().map(|&a| self.copy_term_with_flags(a)).collect();
                self.compound(sym, new_args)
            }
        };
        self.nodes[copy].flags = flags;
        copy
    }

    /// Deep free.
    pub fn zap_term(&mut self, t: TermId) {
        for arg in self.args(t).to_vec() {
            self.zap_term(arg);
        }
        self.nodes.remove(t);
    }

    /// Frees one node, leaving its arguments alone.
    pub fn free_node(&mut self, t: TermId) {
        self.nodes.remove(t);
    }

    /// Structural equality.
    pub fn term_ident(&self, a: TermId, b: TermId) -> bool {
        match (&self.nodes[a].kind, &self.nodes[b].kind) {
            (TermKind::Variable(m), TermKind::Variable(n)) => m == n,
            (
                TermKind::Compound { sym: s1, args: a1 },
                TermKind::Compound { sym: s2, args: a2 },
            ) => {
                s1 == s2
                    && a1.len() == a2.len()
                    && a1.iter().zip(a2).all(|(&x, &y)| self.term_ident(x, y))
            }
            _ => false,
        }
    }

    /// The number of nodes in the term.
    pub fn symbol_count(&self, t: TermId) -> usize {
        1 + self.args(t).iter().map(|&a| self.symbol_count(a)).sum::<usize>()
    }

    /// Leaves have depth 0.
    pub fn term_depth(&self, t: TermId) -> usize {
        self.args(t)
            .iter()
            .map(|&a| self.term_depth(a) + 1)
            .max()
            .unwrap_or(0)
    }

    /// The greatest variable index in the term, if any.
    pub fn greatest_variable(&self, t: TermId) -> Option<usize> {
        match self.nodes[t].kind {
            TermKind::Variable(n) => Some(n),
            TermKind::Compound { .. } => self
                .args(t)
                .iter()
                .filter_map(|&a| self.greatest_variable(a))
                .max(),
        }
    }

    /// Variable indices in first-occurrence order, left to right.
    pub fn variables(&self, t: TermId) -> Vec<usize> {
        let mut vars = Vec::new();
        self.collect_variables(t, &mut vars);
        vars
    }

    fn collect_variables(&self, t: TermId, vars: &mut Vec<usize>) {
        match &self.nodes[t].kind {
            TermKind::Variable(n) => {
                if !vars.contains(n) {
                    vars.push(*n);
                }
            }
            TermKind::Compound { args, .. } => {
                for &a in args {
                    self.collect_variables(a, vars);
                }
            }
        }
    }

    pub fn number_of_vars(&self, t: TermId) -> usize {
        self.variables(t).len()
    }

    /// True if every variable of `a` occurs in `b`.
    pub fn variables_subset(&self, a: TermId, b: TermId) -> bool {
        let b_vars = self.variables(b);
        self.variables(a).iter().all(|v| b_vars.contains(v))
    }

    /// Subterm at a 1-based position path; the empty path is the term itself.
    pub fn term_at_pos(&self, t: TermId, pos: &[usize]) -> Option<TermId> {
        match pos.split_first() {
            None => Some(t),
            Some((&i, rest)) => {
                let args = self.args(t);
                if i == 0 || i > args.len() {
                    None
                } else {
                    self.term_at_pos(args[i - 1], rest)
                }
            }
        }
    }

    /// All (position, subterm) pairs in prefix order; positions are 1-based paths.
    pub fn subterm_positions(&self, t: TermId) -> Vec<(Vec<usize>, TermId)> {
        let mut acc = Vec::new();
        self.walk_positions(t, &mut Vec::new(), &mut acc);
        acc
    }

    fn walk_positions(&self, t: TermId, path: &mut Vec<usize>, acc: &mut Vec<(Vec<usize>, TermId)>) {
        acc.push((path.clone(), t));
        for (i, &arg) in self.args(t).to_vec().iter().enumerate() {
            path.push(i + 1);
            self.walk_positions(arg, path, acc);
            path.pop();
        }
    }

    /// Points every non-variable subterm at its parent.
    pub fn upward_term_links(&mut self, t: TermId) {
        for arg in self.args(t).to_vec() {
            if !self.is_variable(arg) {
                self.nodes[arg].container = Container::Term(t);
            }
            self.upward_term_links(arg);
        }
    }

    /// How many nodes are currently live (all owners together).
    pub fn live_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, t: TermId) -> bool {
        self.nodes.contains_key(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_term(arena: &mut TermArena, symbols: &mut SymbolTable) -> TermId {
        // f(g(x0), c)
        let f = symbols.intern("f", 2);
        let g = symbols.intern("g", 1);
        let c = symbols.intern("c", 0);
        let x = arena.variable(0);
        let gx = arena.unary(g, x);
        let cc = arena.constant(c);
        arena.binary(f, gx, cc)
    }

    #[test]
    fn copies_are_identical_and_disjoint() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let t = small_term(&mut arena, &mut symbols);
        let before = arena.live_nodes();
        let copy = arena.copy_term(t);
        assert!(arena.term_ident(t, copy));
        assert_ne!(t, copy);
        assert_eq!(arena.live_nodes(), 2 * before);
    }

    #[test]
    fn zap_frees_the_whole_subtree() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let t = small_term(&mut arena, &mut symbols);
        arena.zap_term(t);
        assert_eq!(arena.live_nodes(), 0);
    }

    #[test]
    fn positions_are_one_based() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let t = small_term(&mut arena, &mut symbols);
        let gx = arena.term_at_pos(t, &[1]).unwrap();
        let x = arena.term_at_pos(t, &[1, 1]).unwrap();
        assert!(arena.is_complex(gx));
        assert_eq!(arena.varnum(x), Some(0));
        assert_eq!(arena.term_at_pos(t, &[3]), None);
    }

    #[test]
    fn depth_and_counts() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let t = small_term(&mut arena, &mut symbols);
        assert_eq!(arena.term_depth(t), 2);
        assert_eq!(arena.symbol_count(t), 4);
        assert_eq!(arena.greatest_variable(t), Some(0));
    }

    #[test]
    fn flags_do_not_survive_copy() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let mut registry = FlagRegistry::default();
        let marked = registry.claim();

        let t = small_term(&mut arena, &mut symbols);
        arena.set_flag(t, marked);

        let plain = arena.copy_term(t);
        let flagged = arena.copy_term_with_flags(t);
        assert!(!arena.flag(plain, marked));
        assert!(arena.flag(flagged, marked));
    }
}
