/*!
The negative-propagation index.

A discrimination tree keyed by (sign, symbol, value) and then, per argument
position, over the alphabet {domain element 0..n-1, eterm-argument}:
a near-assignment like `f(1, g(2)) = 3` is filed under sign=+, symbol=f,
value=3, path [1, n] (the `n` branch standing for "an e-term sits here").
Leaves hold the indexed atoms; insertions are undone through the trail, so
the index always reflects the current search state.

Blocks for the equality symbol, and negative blocks for relations, are
never used (equalities index under their function symbol, and `~P(…)` is
handled as `P(…)=0`), so they stay empty.
*/

use crate::mace::cells::Space;
use crate::mace::syms::MaceSymbol;
use crate::structures::term::{TermArena, TermId};

enum NegNode {
    Interior(Vec<NegNode>),
    Leaf(Vec<TermId>),
}

impl NegNode {
    fn build(depth: usize, alphabet: usize) -> NegNode {
        if depth == 0 {
            NegNode::Leaf(Vec::new())
        } else {
            NegNode::Interior(
                (0..alphabet)
                    .map(|_| NegNode::build(depth - 1, alphabet))
                    .collect(),
            )
        }
    }

    fn walk_mut(&mut self, path: &[usize]) -> &mut NegNode {
        match path.split_first() {
            None => self,
            Some((&i, rest)) => match self {
                NegNode::Interior(children) => children[i].walk_mut(rest),
                NegNode::Leaf(_) => panic!("! Negprop path too long"),
            },
        }
    }

    fn walk(&self, path: &[usize]) -> &NegNode {
        match path.split_first() {
            None => self,
            Some((&i, rest)) => match self {
                NegNode::Interior(children) => children[i].walk(rest),
                NegNode::Leaf(_) => panic!("! Negprop path too long"),
            },
        }
    }
}

/// The index: `[sign][mace symbol][value]` roots.
pub struct NegIndex {
    roots: Vec<Vec<Vec<NegNode>>>,
    alphabet: usize,
}

impl NegIndex {
    pub fn new(symbols: &[MaceSymbol], domain_size: usize) -> Self {
        let alphabet = domain_size + 1;
        let mut roots = Vec::with_capacity(2);
        for _sign in 0..2 {
            let mut per_symbol = Vec::with_capacity(symbols.len());
            for sym in symbols {
                let range = match sym.kind {
                    crate::mace::syms::MaceSymKind::Function => domain_size,
                    crate::mace::syms::MaceSymKind::Relation => 2,
                };
                let per_value = (0..range)
                    .map(|_| NegNode::build(sym.arity, alphabet))
                    .collect();
                per_symbol.push(per_value);
            }
            roots.push(per_symbol);
        }
        NegIndex { roots, alphabet }
    }

    pub(crate) fn push_leaf(&mut self, sign: usize, sym: usize, val: usize, path: &[usize], atom: TermId) {
        match self.roots[sign][sym][val].walk_mut(path) {
            NegNode::Leaf(atoms) => atoms.push(atom),
            NegNode::Interior(_) => panic!("! Negprop path too short"),
        }
    }

    pub(crate) fn pop_leaf(&mut self, sign: usize, sym: usize, val: usize, path: &[usize]) {
        match self.roots[sign][sym][val].walk_mut(path) {
            NegNode::Leaf(atoms) => {
                atoms.pop();
            }
            NegNode::Interior(_) => panic!("! Negprop path too short"),
        }
    }

    fn leaf(&self, sign: usize, sym: usize, val: usize, path: &[usize]) -> &[TermId] {
        match self.roots[sign][sym][val].walk(path) {
            NegNode::Leaf(atoms) => atoms,
            NegNode::Interior(_) => panic!("! Negprop path too short"),
        }
    }

    pub fn eterm_branch(&self) -> usize {
        self.alphabet - 1
    }
}

impl Space {
    /// The path of an alpha term: domain elements index their branch, the
    /// one non-element argument takes the eterm branch.
    fn negprop_path(&self, terms: &TermArena, alpha: TermId) -> Vec<usize> {
        terms
            .args(alpha)
            .iter()
            .map(|&arg| match terms.varnum(arg) {
                Some(v) if v < self.domain_size => v,
                _ => self.negindex.eterm_branch(),
            })
            .collect()
    }

    /// Indexes an equality near-unit, `alpha` being the side with the
    /// embedded e-term and `val` the other side's element.
    pub fn insert_negprop_eq(&mut self, terms: &TermArena, atom: TermId, alpha: TermId, val: usize) {
        let sign = if self.negated(terms, atom) { 0 } else { 1 };
        let sym = match terms.sym(alpha).and_then(|sn| self.sn_to_mace.get(&sn)) {
            Some(&m) => m,
            None => return,
        };
        if terms.arity(alpha) == 0 {
            return; // nothing to index on a constant
        }
        let path = self.negprop_path(terms, alpha);
        self.push_negindex(sign, sym, val, path, atom);
    }

    /// Indexes a non-equality near-unit; the value is its sign.
    pub fn insert_negprop_noneq(&mut self, terms: &TermArena, atom: TermId) {
        let val = if self.negated(terms, atom) { 0 } else { 1 };
        let sym = match terms.sym(atom).and_then(|sn| self.sn_to_mace.get(&sn)) {
            Some(&m) => m,
            None => return,
        };
        if terms.arity(atom) == 0 {
            return;
        }
        let path = self.negprop_path(terms, atom);
        // Relations always index on the positive side.
        self.push_negindex(1, sym, val, path, atom);
    }

    /// Is the term *nearly evaluable*: exactly one argument is not a domain
    /// element, and that argument is an e-term?
    /// Returns (position, cell id of the e-term argument).
    pub fn nterm(&self, terms: &TermArena, t: TermId) -> Option<(usize, usize)> {
        if terms.is_variable(t) || self.arith.rel_term(terms, t) || self.arith.op_term(terms, t) {
            return None;
        }
        let mut found: Option<(usize, usize)> = None;
        for (i, &arg) in terms.args(t).iter().enumerate() {
            match terms.varnum(arg) {
                Some(v) if v < self.domain_size => {}
                _ => {
                    if found.is_some() {
                        return None; // two non-element arguments
                    }
                    let id = self.eterm(terms, arg)?;
                    found = Some((i, id));
                }
            }
        }
        found
    }

    /// The atoms indexed under (sign, symbol, value) whose arguments agree
    /// with the query e-term except at `pos`, where an e-term sits.
    pub fn negprop_find_near(
        &self,
        terms: &TermArena,
        sign: usize,
        sym: usize,
        val: usize,
        query: TermId,
        pos: usize,
    ) -> Vec<TermId> {
        let path: Vec<usize> = terms
            .args(query)
            .iter()
            .enumerate()
            .map(|(i, &arg)| {
                if i == pos {
                    self.negindex.eterm_branch()
                } else {
                    terms.varnum(arg).expect("! Query is not an e-term")
                }
            })
            .collect();
        self.negindex.leaf(sign, sym, val, &path).to_vec()
    }
}
