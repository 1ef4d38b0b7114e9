/*!
An imperfect discrimination tree.

Terms are indexed by their preorder skeleton with all variables collapsed to
one wildcard key.
Retrieval returns *candidates*: every indexed term unifiable with the query
is among them, but the reverse does not hold, so callers confirm each
candidate with real [unification](crate::unify::unify) before using it.
This keeps the tree free of binding bookkeeping while still pruning most of
the search.
*/

use crate::structures::term::{TermArena, TermId};
use crate::symbols::SymNum;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum DKey {
    /// Any variable.
    Var,

    /// A compound head: symbol and arity.
    Sym(SymNum, usize),
}

struct DNode<P> {
    children: Vec<(DKey, DNode<P>)>,
    payloads: Vec<P>,
}

impl<P> DNode<P> {
    fn new() -> Self {
        DNode {
            children: Vec::new(),
            payloads: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.payloads.is_empty()
    }
}

/// The tree; payloads identify the indexed occurrence (typically a clause
/// handle and literal number).
pub struct DiscrimTree<P> {
    root: DNode<P>,
    entries: usize,
}

impl<P> Default for DiscrimTree<P> {
    fn default() -> Self {
        DiscrimTree {
            root: DNode::new(),
            entries: 0,
        }
    }
}

fn linearize(arena: &TermArena, t: TermId, keys: &mut Vec<DKey>) {
    match arena.varnum(t) {
        Some(_) => keys.push(DKey::Var),
        None => {
            let sym = arena.sym(t).expect("! Discrim: compound without symbol");
            keys.push(DKey::Sym(sym, arena.arity(t)));
            for &a in arena.args(t) {
                linearize(arena, a, keys);
            }
        }
    }
}

impl<P: Clone + PartialEq> DiscrimTree<P> {
    pub fn insert(&mut self, arena: &TermArena, t: TermId, payload: P) {
        let mut keys = Vec::new();
        linearize(arena, t, &mut keys);

        let mut node = &mut self.root;
        for key in keys {
            let pos = node.children.iter().position(|(k, _)| *k == key);
            let pos = match pos {
                Some(p) => p,
                None => {
                    node.children.push((key, DNode::new()));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[pos].1;
        }
        node.payloads.push(payload);
        self.entries += 1;
    }

    /// Removes one occurrence of the payload indexed under the term.
    pub fn remove(&mut self, arena: &TermArena, t: TermId, payload: &P) {
        let mut keys = Vec::new();
        linearize(arena, t, &mut keys);
        if remove_rec(&mut self.root, &keys, payload) {
            self.entries -= 1;
        }
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Payloads of every indexed term possibly unifiable with the query.
    pub fn retrieve_unifiable(&self, arena: &TermArena, query: TermId) -> Vec<P> {
        let mut out = Vec::new();
        let mut todo = vec![query];
        retrieve_rec(&self.root, arena, &mut todo, &mut out);
        out
    }
}

fn remove_rec<P: PartialEq>(node: &mut DNode<P>, keys: &[DKey], payload: &P) -> bool {
    match keys.split_first() {
        None => {
            if let Some(pos) = node.payloads.iter().position(|p| p == payload) {
                node.payloads.remove(pos);
                true
            } else {
                false
            }
        }
        Some((key, rest)) => {
            let pos = match node.children.iter().position(|(k, _)| k == key) {
                Some(p) => p,
                None => return false,
            };
            let removed = remove_rec(&mut node.children[pos].1, rest, payload);
            if removed && node.children[pos].1.is_empty() {
                node.children.remove(pos);
            }
            removed
        }
    }
}

fn retrieve_rec<P: Clone>(
    node: &DNode<P>,
    arena: &TermArena,
    todo: &mut Vec<TermId>,
    out: &mut Vec<P>,
) {
    let t = match todo.pop() {
        Some(t) => t,
        None => {
            out.extend_from_slice(&node.payloads);
            return;
        }
    };

    for (key, child) in &node.children {
        match key {
            // An indexed variable pairs with the whole query subterm.
            DKey::Var => retrieve_rec(child, arena, todo, out),

            DKey::Sym(sym, arity) => {
                if arena.is_variable(t) {
                    // A query variable pairs with one whole indexed subterm:
                    // walk past it, wherever it ends.
                    let mut landing = Vec::new();
                    after_consuming(child, *arity, &mut landing);
                    for sub in landing {
                        retrieve_rec(sub, arena, todo, out);
                    }
                } else if arena.sym(t) == Some(*sym) && arena.arity(t) == *arity {
                    let mark = todo.len();
                    for &a in arena.args(t).iter().rev() {
                        todo.push(a);
                    }
                    retrieve_rec(child, arena, todo, out);
                    todo.truncate(mark);
                }
            }
        }
    }

    todo.push(t);
}

/// Collects the nodes reached once `remaining` further terms of the indexed
/// skeleton have been consumed, starting just below a head key.
fn after_consuming<'t, P>(node: &'t DNode<P>, remaining: usize, out: &mut Vec<&'t DNode<P>>) {
    if remaining == 0 {
        out.push(node);
        return;
    }
    for (key, child) in &node.children {
        match key {
            DKey::Var => after_consuming(child, remaining - 1, out),
            DKey::Sym(_, arity) => after_consuming(child, remaining - 1 + arity, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    #[test]
    fn retrieval_is_complete_for_unifiable_entries() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let f = symbols.intern("f", 2);
        let g = symbols.intern("g", 1);
        let a = symbols.intern("a", 0);
        let b = symbols.intern("b", 0);

        // Index f(a, g(x)) as 1, f(b, b) as 2, f(x, y) as 3.
        let e1 = {
            let ca = arena.constant(a);
            let x = arena.variable(0);
            let gx = arena.unary(g, x);
            arena.binary(f, ca, gx)
        };
        let e2 = {
            let cb = arena.constant(b);
            let cb2 = arena.constant(b);
            arena.binary(f, cb, cb2)
        };
        let e3 = {
            let x = arena.variable(0);
            let y = arena.variable(1);
            arena.binary(f, x, y)
        };

        let mut tree: DiscrimTree<u32> = DiscrimTree::default();
        tree.insert(&arena, e1, 1);
        tree.insert(&arena, e2, 2);
        tree.insert(&arena, e3, 3);

        // Query f(a, z): unifiable with 1 and 3, not 2.
        let query = {
            let ca = arena.constant(a);
            let z = arena.variable(2);
            arena.binary(f, ca, z)
        };
        let mut found = tree.retrieve_unifiable(&arena, query);
        found.sort();
        assert_eq!(found, vec![1, 3]);

        // Query f(b, g(b)): candidates must include 3 (and may include others);
        // 2 is not unifiable but g(b) vs b differs at the skeleton, so it is pruned.
        let query2 = {
            let cb = arena.constant(b);
            let cb2 = arena.constant(b);
            let gb = arena.unary(g, cb2);
            arena.binary(f, cb, gb)
        };
        let mut found2 = tree.retrieve_unifiable(&arena, query2);
        found2.sort();
        assert_eq!(found2, vec![3]);
    }

    #[test]
    fn removal_prunes() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let p = symbols.intern("p", 1);
        let a = symbols.intern("a", 0);

        let atom = {
            let ca = arena.constant(a);
            arena.unary(p, ca)
        };
        let mut tree: DiscrimTree<u32> = DiscrimTree::default();
        tree.insert(&arena, atom, 7);
        assert_eq!(tree.len(), 1);

        tree.remove(&arena, atom, &7);
        assert!(tree.is_empty());
        assert!(tree.retrieve_unifiable(&arena, atom).is_empty());
    }
}
