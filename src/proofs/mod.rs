/*!
Proof objects and their transformations.

A proof is an ordered list of clauses ending in the empty clause, with every
parent preceding its children.
[extract_proof] rebuilds one from the kept-clause record by closing the
empty clause's ancestry over justification parents.

[expand](crate::proofs::expand) rewrites hyper/UR steps into chains of
binary resolutions (with explicit flip steps); [ivy](crate::proofs::ivy)
then drives every step down to the atomic Ivy vocabulary, in which each
resolution and paramodulation happens on syntactically identical atoms and
all instantiation is explicit.
*/

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::kernel::Kernel;
use crate::structures::clause::{Clause, ClauseId};
use crate::structures::justification::{ClauseNum, Justification};
use crate::structures::literal::Literal;
use crate::types::err::{fatal, ErrorKind};

pub mod expand;
pub mod ivy;

/// The ancestry of the empty clause, in id order (parents first).
pub fn extract_proof(k: &Kernel, empty: ClauseId) -> Result<Vec<ClauseId>, ErrorKind> {
    // Parent edges point child -> parent; a DFS from the empty clause then
    // reaches exactly the ancestry.
    let mut graph: DiGraph<ClauseId, ()> = DiGraph::new();
    let mut nodes: HashMap<ClauseId, NodeIndex> = HashMap::new();

    let mut pending = vec![empty];
    while let Some(cid) = pending.pop() {
        if nodes.contains_key(&cid) {
            continue;
        }
        let node = graph.add_node(cid);
        nodes.insert(cid, node);
        for parent_num in k.clauses[cid].justification.parents() {
            let parent = k
                .clauses
                .find_by_num(parent_num)
                .ok_or_else(|| fatal(format!("proof references missing parent {parent_num}")))?;
            pending.push(parent);
        }
    }
    for (&cid, &node) in &nodes {
        for parent_num in k.clauses[cid].justification.parents() {
            let parent = k
                .clauses
                .find_by_num(parent_num)
                .ok_or_else(|| fatal(format!("proof references missing parent {parent_num}")))?;
            graph.add_edge(node, nodes[&parent], ());
        }
    }

    let mut members = Vec::new();
    let mut dfs = Dfs::new(&graph, nodes[&empty]);
    while let Some(node) = dfs.next(&graph) {
        members.push(graph[node]);
    }

    // Ids are assigned parents-first, so id order is a topological order.
    members.sort_by_key(|&cid| k.clauses[cid].id);
    Ok(members)
}

/// Clause numbers as printed, in proof order.
pub fn proof_ids(k: &Kernel, proof: &[ClauseId]) -> Vec<ClauseNum> {
    proof
        .iter()
        .map(|&cid| k.clauses[cid].id.unwrap_or(0))
        .collect()
}

/// A per-transformation id map: transformations renumber without touching
/// the kernel's kept-clause record.
#[derive(Default)]
pub(crate) struct ProofMap {
    by_num: HashMap<ClauseNum, ClauseId>,
}

impl ProofMap {
    pub fn set(&mut self, num: ClauseNum, cid: ClauseId) {
        self.by_num.insert(num, cid);
    }

    pub fn get(&self, num: ClauseNum) -> Result<ClauseId, ErrorKind> {
        self.by_num
            .get(&num)
            .copied()
            .ok_or_else(|| fatal(format!("proof references missing parent {num}")))
    }
}

/// A copy carrying id, justification and attributes (atoms deep-copied).
pub(crate) fn copy_clause_ija(k: &mut Kernel, cid: ClauseId) -> ClauseId {
    let source = k.clauses[cid].clone();
    let mut child = Clause::new();
    for lit in &source.literals {
        let atom = k.terms.copy_term(lit.atom);
        child.append_literal(Literal::new(lit.sign, atom));
    }
    for &(attr, value) in &source.attributes {
        let copy = k.terms.copy_term(value);
        child.attributes.push((attr, copy));
    }
    child.id = source.id;
    child.justification = source.justification.clone();
    child.initial = source.initial;
    k.install_clause(child)
}

/// A copy with equality literal `n` (1-based) flipped.
/// The caller owns the justification.
pub(crate) fn flip_copy(k: &mut Kernel, cid: ClauseId, n: usize) -> Result<ClauseId, ErrorKind> {
    let lits = k.clauses[cid].literals.clone();
    let mut child = Clause::new();
    for (i, lit) in lits.iter().enumerate() {
        let atom = if i == n - 1 {
            if !crate::structures::literal::is_eq_atom(&k.terms, &k.symbols, lit.atom) {
                return Err(fatal("flip of a non-equality literal"));
            }
            let a = k.terms.copy_term(k.terms.arg(lit.atom, 0));
            let b = k.terms.copy_term(k.terms.arg(lit.atom, 1));
            let eq = k.symbols.eq_sym();
            k.terms.binary(eq, b, a)
        } else {
            k.terms.copy_term(lit.atom)
        };
        child.append_literal(Literal::new(lit.sign, atom));
    }
    child.justification = Justification::input(); // replaced by the caller
    Ok(k.install_clause(child))
}
