/*!
Clauses and the clause arena.

A clause is an ordered sequence of [literals](crate::structures::literal), an
attribute list, a [justification](crate::structures::justification), and a
possibly-unassigned numeric id.
Clauses are created by the inference rules without ids; the caller assigns an
id only when it decides the clause is worth keeping, and ids are what proofs
and justifications reference.

The bookkeeping fields (`initial`, `weight`, `level`, `subsumer`,
`semantics`, `matching_hint`) are read by the clause-evaluation language and
maintained by the given-clause loop.
*/

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::structures::justification::Justification;
use crate::structures::literal::{is_eq_atom, Literal};
use crate::structures::term::{Container, TermArena, TermId};
use crate::symbols::SymbolTable;
use crate::types::err::{fatal, ErrorKind};
use crate::unify::{apply, ContextBank, ContextRef, MAX_VARS};

new_key_type! {
    /// A handle into the clause arena.
    pub struct ClauseId;
}

/// Truth of a clause in the current semantic interpretation, when evaluated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Semantics {
    True,
    False,
    #[default]
    NotEvaluated,
}

/// A clause (a "topform" in the original's vocabulary).
#[derive(Clone, Debug)]
pub struct Clause {
    pub literals: Vec<Literal>,

    /// Assigned only for kept clauses.
    pub id: Option<u32>,

    /// (attribute symbol, value) pairs.
    pub attributes: Vec<(usize, TermId)>,

    pub justification: Justification,

    /// True for clauses of the input problem.
    pub initial: bool,

    pub weight: f64,

    /// 0 for input clauses, else 1 + the greatest parent level.
    pub level: u32,

    /// Set when the clause has subsumed another.
    pub subsumer: bool,

    pub matching_hint: bool,

    pub semantics: Semantics,
}

impl Clause {
    pub fn new() -> Self {
        Clause {
            literals: Vec::new(),
            id: None,
            attributes: Vec::new(),
            justification: Justification::input(),
            initial: false,
            weight: 0.0,
            level: 0,
            subsumer: false,
            matching_hint: false,
            semantics: Semantics::NotEvaluated,
        }
    }

    pub fn append_literal(&mut self, lit: Literal) {
        self.literals.push(lit);
    }

    /// The nth literal, counting from 1.
    pub fn ith_literal(&self, n: usize) -> &Literal {
        &self.literals[n - 1]
    }

    /// 1-based position of the literal with the given atom; 0 if absent.
    pub fn literal_number(&self, atom: TermId) -> usize {
        match self.literals.iter().position(|lit| lit.atom == atom) {
            Some(i) => i + 1,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

impl Default for Clause {
    fn default() -> Self {
        Clause::new()
    }
}

/// The clause arena, with the id-to-handle map for kept clauses.
#[derive(Default)]
pub struct ClauseArena {
    clauses: SlotMap<ClauseId, Clause>,
    by_num: HashMap<u32, ClauseId>,
    next_num: u32,
}

impl ClauseArena {
    pub fn insert(&mut self, clause: Clause) -> ClauseId {
        self.clauses.insert(clause)
    }

    pub fn get(&self, id: ClauseId) -> &Clause {
        &self.clauses[id]
    }

    pub fn get_mut(&mut self, id: ClauseId) -> &mut Clause {
        &mut self.clauses[id]
    }

    pub fn contains(&self, id: ClauseId) -> bool {
        self.clauses.contains_key(id)
    }

    /// Gives the clause the next number, if it has none, and returns it.
    pub fn assign_id(&mut self, id: ClauseId) -> u32 {
        if let Some(num) = self.clauses[id].id {
            return num;
        }
        self.next_num += 1;
        let num = self.next_num;
        self.clauses[id].id = Some(num);
        self.by_num.insert(num, id);
        num
    }

    pub fn find_by_num(&self, num: u32) -> Option<ClauseId> {
        self.by_num.get(&num).copied()
    }

    pub fn greatest_id(&self) -> u32 {
        self.next_num
    }

    /// Numbering for proofs built outside the kept-clause sequence.
    pub fn set_next_num(&mut self, num: u32) {
        self.next_num = num;
    }

    /// Deletes the clause and its whole term tree.
    pub fn delete(&mut self, id: ClauseId, terms: &mut TermArena) {
        if let Some(clause) = self.clauses.remove(id) {
            if let Some(num) = clause.id {
                self.by_num.remove(&num);
            }
            for lit in &clause.literals {
                terms.zap_term(lit.atom);
            }
            for (_, value) in &clause.attributes {
                terms.zap_term(*value);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClauseId, &Clause)> {
        self.clauses.iter()
    }
}

impl std::ops::Index<ClauseId> for ClauseArena {
    type Output = Clause;

    fn index(&self, id: ClauseId) -> &Clause {
        &self.clauses[id]
    }
}

impl std::ops::IndexMut<ClauseId> for ClauseArena {
    fn index_mut(&mut self, id: ClauseId) -> &mut Clause {
        &mut self.clauses[id]
    }
}

// Clause predicates.

pub fn positive_clause(clause: &Clause) -> bool {
    clause.literals.iter().all(|lit| lit.sign)
}

pub fn negative_clause(clause: &Clause) -> bool {
    clause.literals.iter().all(|lit| !lit.sign)
}

pub fn mixed_clause(clause: &Clause) -> bool {
    !positive_clause(clause) && !negative_clause(clause)
}

pub fn unit_clause(clause: &Clause) -> bool {
    clause.literals.len() == 1
}

/// At most one positive literal.
pub fn horn_clause(clause: &Clause) -> bool {
    clause.literals.iter().filter(|lit| lit.sign).count() <= 1
}

/// Exactly one positive literal.
pub fn definite_clause(clause: &Clause) -> bool {
    clause.literals.iter().filter(|lit| lit.sign).count() == 1
}

pub fn number_of_literals(clause: &Clause) -> usize {
    clause.literals.len()
}

pub fn negative_literals(clause: &Clause) -> usize {
    clause.literals.iter().filter(|lit| !lit.sign).count()
}

/// Complementary pair of identical atoms?
pub fn tautology(arena: &TermArena, clause: &Clause) -> bool {
    clause.literals.iter().enumerate().any(|(i, l1)| {
        clause.literals[i + 1..]
            .iter()
            .any(|l2| l1.sign != l2.sign && arena.term_ident(l1.atom, l2.atom))
    })
}

pub fn contains_eq(arena: &TermArena, symbols: &SymbolTable, clause: &Clause) -> bool {
    clause
        .literals
        .iter()
        .any(|lit| is_eq_atom(arena, symbols, lit.atom))
}

pub fn ground_clause(arena: &TermArena, clause: &Clause) -> bool {
    clause
        .literals
        .iter()
        .all(|lit| arena.number_of_vars(lit.atom) == 0)
}

pub fn exists_selected_literal(clause: &Clause) -> bool {
    clause.literals.iter().any(|lit| lit.selected)
}

pub fn copy_selected_literal_marks(from: &Clause, to: &mut Clause) {
    for (src, dst) in from.literals.iter().zip(to.literals.iter_mut()) {
        dst.selected = src.selected;
    }
}

/// The greatest variable index in the clause, if any variable occurs.
pub fn greatest_variable_in_clause(arena: &TermArena, clause: &Clause) -> Option<usize> {
    clause
        .literals
        .iter()
        .filter_map(|lit| arena.greatest_variable(lit.atom))
        .max()
}

/// Distinct variable count across the literals.
pub fn number_of_variables(arena: &TermArena, clause: &Clause) -> usize {
    let mut vars: Vec<usize> = Vec::new();
    for lit in &clause.literals {
        for v in arena.variables(lit.atom) {
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
    }
    vars.len()
}

/// Variable indices in first-occurrence order across the literals.
pub fn varnums_in_clause(arena: &TermArena, clause: &Clause) -> Vec<usize> {
    let mut vars: Vec<usize> = Vec::new();
    for lit in &clause.literals {
        for v in arena.variables(lit.atom) {
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
    }
    vars
}

/// The greatest atom depth.
pub fn literals_depth(arena: &TermArena, clause: &Clause) -> usize {
    clause
        .literals
        .iter()
        .map(|lit| arena.term_depth(lit.atom))
        .max()
        .unwrap_or(0)
}

pub fn clause_symbol_count(arena: &TermArena, clause: &Clause) -> usize {
    clause
        .literals
        .iter()
        .map(|lit| arena.symbol_count(lit.atom))
        .sum()
}

/// Points each atom at the clause and each subterm at its parent.
pub fn upward_clause_links(arena: &mut TermArena, clauses: &ClauseArena, id: ClauseId) {
    for i in 0..clauses[id].literals.len() {
        let atom = clauses[id].literals[i].atom;
        arena.set_container(atom, Container::Clause(id));
        arena.upward_term_links(atom);
    }
}

/// Compresses variable indices to `0..k-1` in left-to-right first-occurrence
/// order, in place. Fails when the clause has more than `max` distinct
/// variables.
pub fn renumber_variables(
    arena: &mut TermArena,
    clause: &Clause,
    max: usize,
) -> Result<(), ErrorKind> {
    renumber_variables_map(arena, clause, max).map(|_| ())
}

/// As [renumber_variables], also returning the (old, new) pairs that changed.
pub fn renumber_variables_map(
    arena: &mut TermArena,
    clause: &Clause,
    max: usize,
) -> Result<Vec<(usize, usize)>, ErrorKind> {
    let mut map: Vec<(usize, usize)> = Vec::new();
    for lit in &clause.literals {
        renumber_term(arena, lit.atom, max, &mut map)?;
    }
    Ok(map.into_iter().filter(|(old, new)| old != new).collect())
}

fn renumber_term(
    arena: &mut TermArena,
    t: TermId,
    max: usize,
    map: &mut Vec<(usize, usize)>,
) -> Result<(), ErrorKind> {
    if let Some(old) = arena.varnum(t) {
        let new = match map.iter().find(|(o, _)| *o == old) {
            Some((_, n)) => *n,
            None => {
                let n = map.len();
                if n >= max || n >= MAX_VARS {
                    return Err(fatal("renumber_variables: too many variables"));
                }
                map.push((old, n));
                n
            }
        };
        arena.set_varnum(t, new);
    } else {
        for arg in arena.args(t).to_vec() {
            renumber_term(arena, arg, max, map)?;
        }
    }
    Ok(())
}

/// Appends to `child` the instance, under the respective substitution, of
/// every inheritable attribute of each parent.
pub fn inherit_attributes(
    arena: &mut TermArena,
    bank: &ContextBank,
    symbols: &SymbolTable,
    parent1: &Clause,
    s1: Option<ContextRef>,
    parent2: Option<&Clause>,
    s2: Option<ContextRef>,
    child: &mut Clause,
) {
    let mut take = |arena: &mut TermArena, parent: &Clause, subst: Option<ContextRef>, child: &mut Clause| {
        for &(attr, value) in &parent.attributes {
            if symbols.attribute_inheritable(attr) {
                let instance = apply(arena, bank, value, subst);
                child.attributes.push((attr, instance));
            }
        }
    };
    take(arena, parent1, s1, child);
    if let Some(parent2) = parent2 {
        take(arena, parent2, s2, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::term::TermArena;

    fn p_atom(arena: &mut TermArena, symbols: &mut SymbolTable, var: usize) -> TermId {
        let p = symbols.intern("p", 1);
        let x = arena.variable(var);
        arena.unary(p, x)
    }

    #[test]
    fn literal_numbers_are_one_based() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let a1 = p_atom(&mut arena, &mut symbols, 0);
        let a2 = p_atom(&mut arena, &mut symbols, 1);

        let mut clause = Clause::new();
        clause.append_literal(Literal::new(true, a1));
        clause.append_literal(Literal::new(false, a2));

        assert_eq!(clause.literal_number(a1), 1);
        assert_eq!(clause.literal_number(a2), 2);
        assert!(clause.ith_literal(1).sign);
        assert!(!clause.ith_literal(2).sign);
    }

    #[test]
    fn renumbering_compresses_in_occurrence_order() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let f = symbols.intern("f", 2);
        let x7 = arena.variable(7);
        let x3 = arena.variable(3);
        let atom = arena.binary(f, x7, x3);

        let mut clause = Clause::new();
        clause.append_literal(Literal::new(true, atom));

        let map = renumber_variables_map(&mut arena, &clause, MAX_VARS).unwrap();
        assert_eq!(arena.varnum(arena.arg(atom, 0)), Some(0));
        assert_eq!(arena.varnum(arena.arg(atom, 1)), Some(1));
        assert!(map.contains(&(7, 0)) && map.contains(&(3, 1)));
    }

    #[test]
    fn tautology_detection() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();
        let a1 = p_atom(&mut arena, &mut symbols, 0);
        let a2 = p_atom(&mut arena, &mut symbols, 0);

        let mut clause = Clause::new();
        clause.append_literal(Literal::new(true, a1));
        clause.append_literal(Literal::new(false, a2));
        assert!(tautology(&arena, &clause));
        assert!(horn_clause(&clause));
        assert!(mixed_clause(&clause));
    }
}
