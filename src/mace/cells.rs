/*!
The cell table and the per-size search state.

One [Cell] per ground e-term: every function symbol applied to every tuple
of domain elements, and likewise for relations.
A cell holds its canonical e-term, its assigned value (a domain element for
functions, 0/1 for relations), the list of ground-clause subterms currently
equal to it, and the bitset of still-possible values.

[Space] bundles everything one domain size owns: the cell table, the ground
clauses, the undo trail, the negative-propagation index, and the statistics.
Domain elements are shared variable terms --- variables never carry flags or
containers, which is what makes the sharing safe.
*/

use std::collections::HashMap;

use crate::config::MaceConfig;
use crate::kernel::Kernel;
use crate::mace::arith::ArithSyms;
use crate::mace::negindex::NegIndex;
use crate::mace::syms::{collect_symbols, MaceSymAttr, MaceSymbol, MaceSymKind};
use crate::mace::trail::MaceTrail;
use crate::mace::MaceStats;
use crate::structures::clause::ClauseId;
use crate::structures::term::{TermArena, TermFlag, TermId};
use crate::symbols::SymNum;
use crate::types::err::{fatal, ErrorKind};

/// A fixed-size set of domain elements (or of the two truth values).
#[derive(Clone, Debug)]
pub struct DomainSet {
    blocks: Vec<u64>,
    size: usize,
}

impl DomainSet {
    pub fn full(size: usize) -> Self {
        let mut blocks = vec![u64::MAX; size.div_ceil(64)];
        let tail = size % 64;
        if tail != 0 {
            if let Some(last) = blocks.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        DomainSet { blocks, size }
    }

    pub fn contains(&self, v: usize) -> bool {
        v < self.size && self.blocks[v / 64] & (1 << (v % 64)) != 0
    }

    pub fn remove(&mut self, v: usize) {
        self.blocks[v / 64] &= !(1 << (v % 64));
    }

    pub fn insert(&mut self, v: usize) {
        self.blocks[v / 64] |= 1 << (v % 64);
    }

    pub fn count(&self) -> usize {
        self.blocks.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// The single member, if the set has exactly one.
    pub fn single(&self) -> Option<usize> {
        if self.count() == 1 {
            (0..self.size).find(|&v| self.contains(v))
        } else {
            None
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// One entry of the cell table.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Canonical representative, e.g. `f(2,3)`.
    pub eterm: TermId,

    pub value: Option<usize>,

    /// Ground-clause subterms currently equal to this e-term.
    pub occurrences: Vec<TermId>,

    pub possible: DomainSet,

    /// Greatest argument index; -1 for constants.
    pub max_index: isize,

    /// Index into the symbol descriptors.
    pub symbol: usize,
}

/// A ground clause.
#[derive(Clone, Debug)]
pub struct Mclause {
    pub lits: Vec<TermId>,

    /// Literals not yet rewritten to false.
    pub active: usize,

    pub subsumed: bool,
}

/// Everything one domain size owns.
pub struct Space {
    pub domain_size: usize,

    /// Shared variable terms standing for the domain elements.
    pub domain: Vec<TermId>,

    pub symbols: Vec<MaceSymbol>,
    pub sn_to_mace: HashMap<SymNum, usize>,

    pub cells: Vec<Cell>,

    /// Cell ids ordered by (max index, id), skolem cells last.
    pub ordered_cells: Vec<usize>,
    pub first_skolem_cell: usize,

    pub mclauses: Vec<Mclause>,

    /// Shared variable terms for numerals beyond the domain (arithmetic).
    pub nat_terms: HashMap<usize, TermId>,

    pub trail: MaceTrail,
    pub negindex: NegIndex,

    pub arith: ArithSyms,
    pub eq_sn: SymNum,
    pub literal_flag: TermFlag,
    pub negation_flag: TermFlag,

    pub stats: MaceStats,

    // Copies of the propagation toggles.
    pub trace: bool,
    pub negprop: bool,
    pub neg_assign: bool,
    pub neg_assign_near: bool,
    pub neg_elim: bool,
    pub neg_elim_near: bool,
}

impl Space {
    /// Builds the cell table for the given domain size.
    pub fn new(
        k: &mut Kernel,
        cfg: &MaceConfig,
        arith: ArithSyms,
        literal_flag: TermFlag,
        negation_flag: TermFlag,
        clauses: &[ClauseId],
        domain_size: usize,
    ) -> Result<Space, ErrorKind> {
        // The truth values live at domain[0] and domain[1], so every space
        // needs at least two elements; the drivers clamp, direct callers
        // may not.
        if domain_size < 2 {
            return Err(fatal(format!(
                "domain size {domain_size} is too small (at least 2 is required)"
            )));
        }

        let (symbols, sn_to_mace, max_natural) =
            collect_symbols(k, clauses, &arith, domain_size)?;

        if !arith.enabled {
            if let Some(m) = max_natural {
                if m >= domain_size {
                    return Err(fatal(format!(
                        "numeral {m} outside the domain 0..{domain_size}"
                    )));
                }
            }
        }

        let domain: Vec<TermId> = (0..domain_size).map(|i| k.terms.variable(i)).collect();

        let mut cells = Vec::new();
        for sym in &symbols {
            let block = crate::mace::syms::int_power(domain_size, sym.arity);
            for offset in 0..block {
                let id = sym.base + offset;
                let indices = sym.decode(id, domain_size);
                let args: Vec<TermId> = indices.iter().map(|&i| domain[i]).collect();
                let eterm = k.terms.compound(sym.sn, args);
                let range = match sym.kind {
                    MaceSymKind::Function => domain_size,
                    MaceSymKind::Relation => 2,
                };
                cells.push(Cell {
                    eterm,
                    value: None,
                    occurrences: Vec::new(),
                    possible: DomainSet::full(range),
                    max_index: indices.iter().max().map(|&m| m as isize).unwrap_or(-1),
                    symbol: sym.mace_sn,
                });
            }
        }

        // Concentric order: by (max index, id); skolem cells last on request.
        let skolem = |cell: &Cell| symbols[cell.symbol].attr == MaceSymAttr::Skolem;
        let mut main: Vec<usize> = Vec::new();
        let mut last: Vec<usize> = Vec::new();
        for (id, cell) in cells.iter().enumerate() {
            if cfg.skolems_last && skolem(cell) {
                last.push(id);
            } else {
                main.push(id);
            }
        }
        let by_band = |ids: &mut Vec<usize>, cells: &Vec<Cell>| {
            ids.sort_by_key(|&id| (cells[id].max_index, id));
        };
        by_band(&mut main, &cells);
        by_band(&mut last, &cells);
        let first_skolem_cell = main.len();
        let mut ordered_cells = main;
        ordered_cells.extend(last);

        let negindex = NegIndex::new(&symbols, domain_size);

        Ok(Space {
            domain_size,
            domain,
            symbols,
            sn_to_mace,
            cells,
            ordered_cells,
            first_skolem_cell,
            mclauses: Vec::new(),
            nat_terms: HashMap::new(),
            trail: MaceTrail::default(),
            negindex,
            arith,
            eq_sn: k.symbols.eq_sym(),
            literal_flag,
            negation_flag,
            stats: MaceStats::default(),
            trace: cfg.trace,
            negprop: cfg.negprop,
            neg_assign: cfg.neg_assign,
            neg_assign_near: cfg.neg_assign_near,
            neg_elim: cfg.neg_elim,
            neg_elim_near: cfg.neg_elim_near,
        })
    }

    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// The range of values a cell may take (domain size, or 2 for relations).
    pub fn cell_range(&self, id: usize) -> usize {
        match self.symbols[self.cells[id].symbol].kind {
            MaceSymKind::Function => self.domain_size,
            MaceSymKind::Relation => 2,
        }
    }

    /// Evaluability check: a compound of a table symbol whose arguments are
    /// all domain elements. Returns the cell id.
    pub fn eterm(&self, terms: &TermArena, t: TermId) -> Option<usize> {
        if terms.is_variable(t) || self.arith.rel_term(terms, t) || self.arith.op_term(terms, t) {
            return None;
        }
        let sym = self.sn_to_mace.get(&terms.sym(t)?)?;
        let sym = &self.symbols[*sym];
        let mut id = sym.base;
        let mut mult = 1;
        for &arg in terms.args(t).iter().rev() {
            let v = terms.varnum(arg)?;
            if v >= self.domain_size {
                return None; // a numeral beyond the domain (arithmetic only)
            }
            id += v * mult;
            mult *= self.domain_size;
        }
        Some(id)
    }

    /// Is the literal term negated (carries the negation mark)?
    pub fn negated(&self, terms: &TermArena, lit: TermId) -> bool {
        terms.flag(lit, self.negation_flag)
    }

    /// Is the term a literal root (carries the literal mark)?
    pub fn is_literal(&self, terms: &TermArena, t: TermId) -> bool {
        terms.flag(t, self.literal_flag)
    }

    pub fn is_eq_term(&self, terms: &TermArena, t: TermId) -> bool {
        terms.sym(t) == Some(self.eq_sn) && terms.arity(t) == 2
    }

    /// The shared domain element standing for "true" (or "false").
    /// Rewrites always install the shared nodes, so identity suffices.
    pub fn true_term(&self, t: TermId) -> bool {
        t == self.domain[1]
    }

    pub fn false_term(&self, t: TermId) -> bool {
        t == self.domain[0]
    }

    /// The clause a subterm belongs to, by walking containers to the literal.
    pub fn containing_mclause(&self, terms: &TermArena, mut t: TermId) -> Option<usize> {
        loop {
            match terms.container(t) {
                crate::structures::term::Container::Term(parent) => t = parent,
                crate::structures::term::Container::Ground(i) => return Some(i),
                _ => return None,
            }
        }
    }

    /// The literal a subterm sits under.
    pub fn containing_mliteral(&self, terms: &TermArena, mut t: TermId) -> TermId {
        while !self.is_literal(terms, t) {
            match terms.container(t) {
                crate::structures::term::Container::Term(parent) => t = parent,
                _ => break,
            }
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undersized_domains_are_rejected() {
        let mut k = crate::kernel::Kernel::new();
        let cfg = MaceConfig::default();
        let arith = ArithSyms::init(&mut k.symbols, false);
        let literal_flag = k.flags.claim();
        let negation_flag = k.flags.claim();

        let space = Space::new(&mut k, &cfg, arith, literal_flag, negation_flag, &[], 1);
        assert!(space.is_err());
    }

    #[test]
    fn domain_sets() {
        let mut set = DomainSet::full(70);
        assert_eq!(set.count(), 70);
        assert!(set.contains(69));
        set.remove(69);
        set.remove(0);
        assert!(!set.contains(69));
        assert_eq!(set.count(), 68);
        set.insert(0);
        assert!(set.contains(0));
        assert_eq!(DomainSet::full(2).count(), 2);

        let mut nearly = DomainSet::full(3);
        nearly.remove(0);
        nearly.remove(2);
        assert_eq!(nearly.single(), Some(1));
    }
}
