/*!
Grounding.

Each input clause with `k` variables is instantiated over all `n^k`
assignments of domain elements.
Every instance is simplified on the way in: assigned cells rewrite their
e-terms, ground arithmetic evaluates, `∨`/`¬` simplify through truth
values, duplicate literals merge, and equalities whose value is already
crossed off collapse to false.
Instances that come out true are dropped; a false instance means the
problem is unsatisfiable at this domain size before any search.
Survivors become [Mclause](crate::mace::cells::Mclause)s with active-literal
counts, their subterms threaded into the cell occurrence lists and their
container links pointing up to the clause.
*/

use crate::kernel::Kernel;
use crate::mace::cells::{Mclause, Space};
use crate::mace::propagate::Mstate;
use crate::misc::log::targets;
use crate::structures::clause::ClauseId;
use crate::structures::term::{Container, TermArena, TermId};
use crate::symbols::SymbolTable;
use crate::types::err::ErrorKind;

impl Space {
    /// Frees an instance subtree, leaving shared domain elements alone.
    pub fn zap_mterm(&self, terms: &mut TermArena, t: TermId) {
        if !terms.is_variable(t) {
            for arg in terms.args(t).to_vec() {
                self.zap_mterm(terms, arg);
            }
            terms.free_node(t);
        }
    }

    /// The shared term for a numeral beyond the domain (arithmetic only).
    fn natural_term(&mut self, terms: &mut TermArena, n: usize) -> TermId {
        if let Some(&t) = self.nat_terms.get(&n) {
            return t;
        }
        let t = terms.variable(n);
        self.nat_terms.insert(n, t);
        t
    }

    /// Replaces variables and in-domain numerals by domain elements.
    fn subst_domain_elements(
        &mut self,
        terms: &mut TermArena,
        symbols: &SymbolTable,
        t: TermId,
        vals: &[usize],
    ) -> TermId {
        if let Some(v) = terms.varnum(t) {
            let element = self.domain[vals[v]];
            terms.free_node(t);
            return element;
        }
        let sym = terms.sym(t).expect("! Ground: node without symbol");
        if let Some(n) = symbols.natural(sym) {
            terms.free_node(t);
            return if n < self.domain_size {
                self.domain[n]
            } else {
                self.natural_term(terms, n)
            };
        }
        for i in 0..terms.arity(t) {
            let arg = terms.arg(t, i);
            let new = self.subst_domain_elements(terms, symbols, arg, vals);
            terms.set_arg(t, i, new);
        }
        t
    }

    fn or_term(&self, terms: &TermArena, symbols: &SymbolTable, t: TermId) -> bool {
        terms.sym(t) == Some(symbols.or_sym()) && terms.arity(t) == 2
    }

    fn not_term(&self, terms: &TermArena, symbols: &SymbolTable, t: TermId) -> bool {
        terms.sym(t) == Some(symbols.not_sym()) && terms.arity(t) == 1
    }

    fn or_member(&self, terms: &TermArena, symbols: &SymbolTable, x: TermId, t: TermId) -> bool {
        if terms.term_ident(x, t) {
            true
        } else if !self.or_term(terms, symbols, t) {
            false
        } else {
            self.or_member(terms, symbols, x, terms.arg(t, 0))
                || self.or_member(terms, symbols, x, terms.arg(t, 1))
        }
    }

    /// Removes duplicate literals of a right-associated disjunction.
    fn merge_duplicates(
        &self,
        terms: &mut TermArena,
        symbols: &SymbolTable,
        t: TermId,
    ) -> TermId {
        if !self.or_term(terms, symbols, t) {
            return t;
        }
        let merged_tail = self.merge_duplicates(terms, symbols, terms.arg(t, 1));
        terms.set_arg(t, 1, merged_tail);
        let head = terms.arg(t, 0);
        if self.or_member(terms, symbols, head, merged_tail) {
            self.zap_mterm(terms, head);
            terms.free_node(t);
            merged_tail
        } else {
            t
        }
    }

    /// Rewrites assigned e-terms inside a term.
    fn simp_term(&self, terms: &mut TermArena, t: TermId) -> TermId {
        if terms.is_variable(t) {
            return t;
        }
        for i in 0..terms.arity(t) {
            let arg = terms.arg(t, i);
            let new = self.simp_term(terms, arg);
            terms.set_arg(t, i, new);
        }
        if let Some(id) = self.eterm(terms, t) {
            if let Some(v) = self.cells[id].value {
                self.zap_mterm(terms, t);
                return self.domain[v];
            }
        }
        t
    }

    /// Boolean-and-value simplification of one ground instance.
    fn simp_tv(&self, terms: &mut TermArena, symbols: &SymbolTable, t: TermId) -> TermId {
        if terms.is_term(symbols, t, "$T", 0) {
            self.zap_mterm(terms, t);
            return self.domain[1];
        }
        if terms.is_term(symbols, t, "$F", 0) {
            self.zap_mterm(terms, t);
            return self.domain[0];
        }

        if self.or_term(terms, symbols, t) {
            let t = self.merge_duplicates(terms, symbols, t);
            if !self.or_term(terms, symbols, t) {
                return self.simp_tv(terms, symbols, t);
            }
            for i in 0..2 {
                let arg = terms.arg(t, i);
                let new = self.simp_tv(terms, symbols, arg);
                terms.set_arg(t, i, new);
            }
            let a0 = terms.arg(t, 0);
            let a1 = terms.arg(t, 1);
            return if self.true_term(a0) || self.true_term(a1) {
                self.zap_mterm(terms, t);
                self.domain[1]
            } else if self.false_term(a0) {
                terms.free_node(t);
                a1
            } else if self.false_term(a1) {
                terms.free_node(t);
                a0
            } else {
                t
            };
        }

        if self.not_term(terms, symbols, t) {
            let arg = terms.arg(t, 0);
            let new = self.simp_tv(terms, symbols, arg);
            terms.set_arg(t, 0, new);
            let a0 = terms.arg(t, 0);
            return if self.true_term(a0) {
                self.zap_mterm(terms, t);
                self.domain[0]
            } else if self.false_term(a0) {
                self.zap_mterm(terms, t);
                self.domain[1]
            } else {
                t
            };
        }

        // An atomic formula.
        for i in 0..terms.arity(t) {
            let arg = terms.arg(t, i);
            let new = self.simp_term(terms, arg);
            terms.set_arg(t, i, new);
        }
        if self.arith.rel_term(terms, t) {
            if let Some(b) = self.arith.evaluate(terms, t, self.domain_size) {
                self.zap_mterm(terms, t);
                return self.domain[if b != 0 { 1 } else { 0 }];
            }
            // Non-evaluable; an equality may still simplify below.
        }
        if let Some(id) = self.eterm(terms, t) {
            if let Some(v) = self.cells[id].value {
                self.zap_mterm(terms, t);
                return self.domain[v];
            }
            return t;
        }
        if self.is_eq_term(terms, t) {
            // f(4,3)=2 with 2 crossed off of f(4,3) is false already.
            let a0 = terms.arg(t, 0);
            let a1 = terms.arg(t, 1);
            let pair = if let (Some(id), Some(v)) = (
                self.eterm(terms, a0),
                terms.varnum(a1).filter(|&v| v < self.domain_size),
            ) {
                Some((id, v))
            } else if let (Some(id), Some(v)) = (
                self.eterm(terms, a1),
                terms.varnum(a0).filter(|&v| v < self.domain_size),
            ) {
                Some((id, v))
            } else {
                None
            };
            if let Some((id, v)) = pair {
                if self.cells[id].value.is_none() && !self.cells[id].possible.contains(v) {
                    self.zap_mterm(terms, t);
                    return self.domain[0];
                }
            }
        }
        t
    }

    /// Splits a right-associated OR tree into literal terms, freeing the
    /// OR and NOT skeleton and setting the literal/negation marks.
    fn term_to_lits(
        &self,
        terms: &mut TermArena,
        symbols: &SymbolTable,
        t: TermId,
        out: &mut Vec<TermId>,
    ) {
        if self.or_term(terms, symbols, t) {
            let a0 = terms.arg(t, 0);
            let a1 = terms.arg(t, 1);
            terms.free_node(t);
            self.term_to_lits(terms, symbols, a0, out);
            self.term_to_lits(terms, symbols, a1, out);
        } else {
            let atom = if self.not_term(terms, symbols, t) {
                let inner = terms.arg(t, 0);
                terms.free_node(t);
                terms.set_flag(inner, self.negation_flag);
                inner
            } else {
                t
            };
            terms.set_flag(atom, self.literal_flag);
            out.push(atom);
        }
    }

    fn set_parent_pointers(&self, terms: &mut TermArena, t: TermId) {
        for arg in terms.args(t).to_vec() {
            if !terms.is_variable(arg) {
                terms.set_container(arg, Container::Term(t));
                self.set_parent_pointers(terms, arg);
            }
        }
    }

    /// Threads every e-term of the literal into its cell's occurrence list
    /// (a base entry, outliving the trail).
    fn eterm_index_term(&mut self, terms: &TermArena, t: TermId) {
        if terms.is_variable(t) {
            return;
        }
        if let Some(id) = self.eterm(terms, t) {
            self.cells[id].occurrences.push(t);
        } else {
            for &arg in terms.args(t) {
                self.eterm_index_term(terms, arg);
            }
        }
    }

    /// Installs one simplified instance as a ground clause and runs the
    /// initial unit processing.
    fn install_instance(
        &mut self,
        terms: &mut TermArena,
        symbols: &SymbolTable,
        t: TermId,
        state: &mut Mstate,
    ) {
        let mut lits = Vec::new();
        self.term_to_lits(terms, symbols, t, &mut lits);
        let idx = self.mclauses.len();
        self.mclauses.push(Mclause {
            active: lits.len(),
            subsumed: false,
            lits: lits.clone(),
        });
        for &lit in &lits {
            self.eterm_index_term(terms, lit);
            self.set_parent_pointers(terms, lit);
            terms.set_container(lit, Container::Ground(idx));
        }
        self.stats.ground_clauses_kept += 1;
        self.process_initial_clause(terms, idx, state);
    }

    /// Builds a clause's OR/NOT term with fresh atom copies.
    fn clause_term(&self, k: &mut Kernel, cid: ClauseId) -> TermId {
        let or = k.symbols.or_sym();
        let not = k.symbols.not_sym();
        let false_sym = k.symbols.false_sym();
        let lits = k.clauses[cid].literals.clone();
        let mut built: Option<TermId> = None;
        for lit in lits.into_iter().rev() {
            let atom = k.terms.copy_term(lit.atom);
            let node = if lit.sign {
                atom
            } else {
                k.terms.unary(not, atom)
            };
            built = Some(match built {
                None => node,
                Some(rest) => k.terms.binary(or, node, rest),
            });
        }
        built.unwrap_or_else(|| k.terms.constant(false_sym))
    }
}

/// Grounds every input clause over the full domain.
/// Returns false when unsatisfiability is detected on input.
pub fn generate_ground_clauses(
    k: &mut Kernel,
    space: &mut Space,
    clauses: &[ClauseId],
) -> Result<bool, ErrorKind> {
    for &cid in clauses {
        let template = space.clause_term(k, cid);
        let nvars = crate::structures::clause::greatest_variable_in_clause(&k.terms, &k.clauses[cid])
            .map(|v| v + 1)
            .unwrap_or(0);

        let mut vals = vec![0usize; nvars];
        loop {
            let instance = k.terms.copy_term(template);
            let instance =
                space.subst_domain_elements(&mut k.terms, &k.symbols, instance, &vals);
            let instance = space.simp_tv(&mut k.terms, &k.symbols, instance);
            space.stats.ground_clauses_seen += 1;

            let mut consistent = true;
            if space.false_term(instance) {
                consistent = false;
            } else if !space.true_term(instance) {
                let mut state = Mstate::new();
                space.install_instance(&mut k.terms, &k.symbols, instance, &mut state);
                consistent = state.ok;
            }
            if !consistent {
                log::info!(target: targets::MACE_GROUND, "Unsatisfiability detected on input.");
                k.terms.zap_term(template);
                return Ok(false);
            }

            // Next assignment, odometer order.
            let mut carry = true;
            for slot in vals.iter_mut() {
                if !carry {
                    break;
                }
                *slot += 1;
                if *slot < space.domain_size {
                    carry = false;
                } else {
                    *slot = 0;
                }
            }
            if carry {
                break;
            }
        }
        k.terms.zap_term(template);
    }
    Ok(true)
}
