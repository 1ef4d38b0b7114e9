/*!
A feature-vector trie for subsumption candidate retrieval.

Each stored clause is keyed by a short vector of features chosen to be
monotone under subsumption: if `c` subsumes `d` then every feature of `c`
is ≤ the corresponding feature of `d`.
Retrieval walks the trie with the matching inequality in each direction:
candidate *subsumers* of `d` have pointwise-≤ features, candidate *subsumed*
clauses of `c` have pointwise-≥ features.
Candidates are confirmed by the real
[subsumption test](crate::procedures::subsume::subsumes).

The features: number of distinct positive predicate symbols, number of
distinct negative predicate symbols, and greatest literal depth.
(Literal or symbol *occurrence* counts are not monotone --- a substitution
may collapse two literals onto one --- so they are not used.)
*/

use std::collections::BTreeMap;

use crate::structures::clause::{Clause, ClauseId};
use crate::structures::term::TermArena;

const FEATURES: usize = 3;

/// The feature vector of a clause.
pub fn features(arena: &TermArena, clause: &Clause) -> [u32; FEATURES] {
    let mut pos_syms: Vec<usize> = Vec::new();
    let mut neg_syms: Vec<usize> = Vec::new();
    let mut depth = 0;
    for lit in &clause.literals {
        if let Some(sym) = arena.sym(lit.atom) {
            let bucket = if lit.sign { &mut pos_syms } else { &mut neg_syms };
            if !bucket.contains(&sym) {
                bucket.push(sym);
            }
        }
        depth = depth.max(arena.term_depth(lit.atom));
    }
    [pos_syms.len() as u32, neg_syms.len() as u32, depth as u32]
}

enum FNode {
    Interior(BTreeMap<u32, FNode>),
    Leaf(Vec<ClauseId>),
}

impl FNode {
    fn interior() -> Self {
        FNode::Interior(BTreeMap::new())
    }
}

/// The trie.
pub struct FeatureIndex {
    root: FNode,
    entries: usize,
}

impl Default for FeatureIndex {
    fn default() -> Self {
        FeatureIndex {
            root: FNode::interior(),
            entries: 0,
        }
    }
}

impl FeatureIndex {
    pub fn insert(&mut self, fv: [u32; FEATURES], id: ClauseId) {
        let mut node = &mut self.root;
        for (level, &f) in fv.iter().enumerate() {
            let map = match node {
                FNode::Interior(map) => map,
                FNode::Leaf(_) => unreachable!("leaf above feature depth"),
            };
            node = map.entry(f).or_insert_with(|| {
                if level + 1 == FEATURES {
                    FNode::Leaf(Vec::new())
                } else {
                    FNode::interior()
                }
            });
        }
        match node {
            FNode::Leaf(ids) => ids.push(id),
            FNode::Interior(_) => unreachable!("interior at feature depth"),
        }
        self.entries += 1;
    }

    pub fn remove(&mut self, fv: [u32; FEATURES], id: ClauseId) {
        let mut node = &mut self.root;
        for &f in fv.iter() {
            let map = match node {
                FNode::Interior(map) => map,
                FNode::Leaf(_) => return,
            };
            node = match map.get_mut(&f) {
                Some(n) => n,
                None => return,
            };
        }
        if let FNode::Leaf(ids) = node {
            if let Some(pos) = ids.iter().position(|&x| x == id) {
                ids.remove(pos);
                self.entries -= 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Clauses whose features are pointwise ≤ the query's: candidate subsumers.
    pub fn retrieve_subsumers(&self, fv: [u32; FEATURES]) -> Vec<ClauseId> {
        let mut out = Vec::new();
        scan(&self.root, &fv, true, &mut out);
        out
    }

    /// Clauses whose features are pointwise ≥ the query's: candidates to be subsumed.
    pub fn retrieve_subsumed(&self, fv: [u32; FEATURES]) -> Vec<ClauseId> {
        let mut out = Vec::new();
        scan(&self.root, &fv, false, &mut out);
        out
    }
}

fn scan(node: &FNode, fv: &[u32], below: bool, out: &mut Vec<ClauseId>) {
    match node {
        FNode::Leaf(ids) => out.extend_from_slice(ids),
        FNode::Interior(map) => {
            let (&bound, rest) = fv.split_first().expect("! Feature vector too short");
            let range: Box<dyn Iterator<Item = &FNode>> = if below {
                Box::new(map.range(..=bound).map(|(_, n)| n))
            } else {
                Box::new(map.range(bound..).map(|(_, n)| n))
            };
            for child in range {
                scan(child, rest, below, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn direction_of_retrieval() {
        // Feature vectors stand in for clauses here; ids come from a scratch map.
        let mut keys: SlotMap<ClauseId, ()> = SlotMap::with_key();
        let small = keys.insert(());
        let large = keys.insert(());

        let mut index = FeatureIndex::default();
        index.insert([1, 0, 1], small);
        index.insert([2, 1, 3], large);

        let query = [1, 1, 2];
        assert_eq!(index.retrieve_subsumers(query), vec![small]);
        assert_eq!(index.retrieve_subsumed(query), vec![large]);

        index.remove([1, 0, 1], small);
        assert!(index.retrieve_subsumers(query).is_empty());
    }
}
