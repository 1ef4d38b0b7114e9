/*!
Negative propagation.

Four rules derive new eliminations, each individually toggleable:

- **neg_elim** --- from an elimination `f(i,j) != v` and an indexed
  near-assignment `f(i,g(k)) = v`, infer `g(k) != j`.
- **neg_assign** --- from an assignment `f(i,j) = v` and an indexed
  near-unit of `f` at a different (or negated) value, infer `g(k) != j`.
- **neg_elim_near** --- from a near-elimination `f(i,g(k)) != v` and cells
  `f(i,j) = v` in the table, infer `g(k) != j`.
- **neg_assign_near** --- from a near-assignment `f(i,g(k)) = v` and cells
  `f(i,j)` valued differently (or with `v` crossed off), infer `g(k) != j`.

The first two read the [negprop index](crate::mace::negindex); the last two
scan one column of the cell table.
Non-equality literals ride along by reading `P(…)` as `P(…) = 1` and
`~P(…)` as `P(…) = 0`.
*/

use crate::mace::cells::Space;
use crate::mace::propagate::{Job, JobKind, Mstate};
use crate::mace::syms::{int_power, MaceSymKind};
use crate::structures::term::{TermArena, TermId};

impl Space {
    /// Rule dispatch; called for every drained job when negprop is on.
    pub fn propagate_negative(&mut self, terms: &mut TermArena, job: &Job, state: &mut Mstate) {
        match job.kind {
            JobKind::Elimination => {
                if self.neg_elim {
                    self.negprop_elim(terms, job.id, job.beta.expect("! Elimination without value"), state);
                }
            }
            JobKind::Assignment => {
                if self.neg_assign {
                    self.negprop_assign(terms, job.id, state);
                }
            }
            JobKind::NearElimination => {
                if self.neg_elim_near {
                    self.negprop_near_elim(terms, job, state);
                }
            }
            JobKind::NearAssignment => {
                if self.neg_assign_near {
                    self.negprop_near_assign(terms, job, state);
                }
            }
        }
    }

    /// The non-variable side of an indexed equality near-unit.
    fn found_alpha(&self, terms: &TermArena, atom: TermId) -> TermId {
        if self.is_eq_term(terms, atom) {
            let a0 = terms.arg(atom, 0);
            if terms.is_variable(a0) {
                terms.arg(atom, 1)
            } else {
                a0
            }
        } else {
            atom
        }
    }

    /// From `cell != beta`, find indexed near-assignments at `beta`.
    fn negprop_elim(&mut self, terms: &TermArena, id: usize, beta: usize, state: &mut Mstate) {
        let sym = self.cells[id].symbol;
        let arity = self.symbols[sym].arity;
        let alpha = self.cells[id].eterm;

        for i in 0..arity {
            let results = self.negprop_find_near(terms, 1, sym, beta, alpha, i);
            for atom in results {
                let found_alpha = self.found_alpha(terms, atom);
                if terms.is_variable(found_alpha) {
                    self.stats.neg_gone += 1;
                    continue;
                }
                let e = terms.arg(found_alpha, i);
                match self.eterm(terms, e) {
                    None => self.stats.neg_gone += 1,
                    Some(sub) => {
                        self.stats.neg_attempts += 1;
                        let j = terms
                            .varnum(terms.arg(alpha, i))
                            .expect("! E-term argument is not an element");
                        self.new_elimination(terms, sub, j, state);
                        if !state.ok {
                            return;
                        }
                    }
                }
            }
        }
    }

    /// From `cell = value`, find near-units that now disagree.
    fn negprop_assign(&mut self, terms: &TermArena, id: usize, state: &mut Mstate) {
        let sym = self.cells[id].symbol;
        let arity = self.symbols[sym].arity;
        let alpha = self.cells[id].eterm;
        let value = self.cells[id].value.expect("! Assignment job without value");
        let is_function = self.symbols[sym].kind == MaceSymKind::Function;

        if is_function {
            // Near-eliminations at the assigned value: f(i,j)=v, f(i,g(k))!=v.
            for i in 0..arity {
                let results = self.negprop_find_near(terms, 0, sym, value, alpha, i);
                for atom in results {
                    let found_alpha = self.found_alpha(terms, atom);
                    if terms.is_variable(found_alpha) {
                        self.stats.neg_gone += 1;
                        continue;
                    }
                    let e = terms.arg(found_alpha, i);
                    match self.eterm(terms, e) {
                        None => self.stats.neg_gone += 1,
                        Some(sub) => {
                            self.stats.neg_attempts += 1;
                            let j = terms
                                .varnum(terms.arg(alpha, i))
                                .expect("! E-term argument is not an element");
                            self.new_elimination(terms, sub, j, state);
                            if !state.ok {
                                return;
                            }
                        }
                    }
                }
            }
        }

        // Near-assignments at any other value: f(3,4)=5, f(3,g(2))=6 gives
        // g(2)!=4. Relations ride along as P(…)=1 / P(…)=0.
        let range = if is_function { self.domain_size } else { 2 };
        for i in 0..arity {
            for j in 0..range {
                if j == value {
                    continue;
                }
                let results = self.negprop_find_near(terms, 1, sym, j, alpha, i);
                for atom in results {
                    let found_alpha = self.found_alpha(terms, atom);
                    if terms.is_variable(found_alpha) {
                        self.stats.neg_gone += 1;
                        continue;
                    }
                    let e = terms.arg(found_alpha, i);
                    match self.eterm(terms, e) {
                        None => self.stats.neg_gone += 1,
                        Some(sub) => {
                            self.stats.neg_attempts += 1;
                            let elem = terms
                                .varnum(terms.arg(alpha, i))
                                .expect("! E-term argument is not an element");
                            self.new_elimination(terms, sub, elem, state);
                            if !state.ok {
                                return;
                            }
                        }
                    }
                }
            }
        }
    }

    /// From a near-elimination, scan the matching cell column for
    /// assignments at the eliminated value.
    fn negprop_near_elim(&mut self, terms: &TermArena, job: &Job, state: &mut Mstate) {
        let alpha = job.alpha.expect("! Near job without alpha");
        let beta = job.beta.expect("! Near job without value");
        let pos = job.pos.expect("! Near job without position");
        let subterm_id = job.id;

        if terms.is_variable(alpha) || terms.varnum(terms.arg(alpha, pos)).map_or(false, |v| v < self.domain_size) {
            self.stats.neg_gone += 1;
            return;
        }

        let base_id = self.nterm_id(terms, alpha);
        let increment = int_power(self.domain_size, terms.arity(alpha) - 1 - pos);
        let mut id = base_id;
        for i in 0..self.domain_size {
            if self.cells[id].value == Some(beta) {
                self.stats.neg_attempts += 1;
                self.new_elimination(terms, subterm_id, i, state);
                if !state.ok {
                    return;
                }
            }
            id += increment;
        }
    }

    /// From a near-assignment, scan the matching cell column for
    /// disagreeing values (and, for equations, crossed-off possibles).
    fn negprop_near_assign(&mut self, terms: &TermArena, job: &Job, state: &mut Mstate) {
        let alpha = job.alpha.expect("! Near job without alpha");
        let beta = job.beta.expect("! Near job without value");
        let pos = job.pos.expect("! Near job without position");
        let subterm_id = job.id;

        if terms.is_variable(alpha) || terms.varnum(terms.arg(alpha, pos)).map_or(false, |v| v < self.domain_size) {
            self.stats.neg_gone += 1;
            return;
        }

        let base_id = self.nterm_id(terms, alpha);
        let increment = int_power(self.domain_size, terms.arity(alpha) - 1 - pos);
        let is_literal = self.is_literal(terms, alpha);

        if !is_literal {
            // Equation: f(i,g(k))=v with v crossed off of f(i,j).
            let mut id = base_id;
            for i in 0..self.domain_size {
                if self.cells[id].value.is_none() && !self.cells[id].possible.contains(beta) {
                    self.stats.neg_attempts += 1;
                    self.new_elimination(terms, subterm_id, i, state);
                    if !state.ok {
                        return;
                    }
                }
                id += increment;
            }
        }

        // f(i,g(k))=v with f(i,j)=v' for v' != v (P(…) rides along).
        let range = if is_literal { 2 } else { self.domain_size };
        for j in 0..range {
            if j == beta {
                continue;
            }
            let mut id = base_id;
            for i in 0..self.domain_size {
                if self.cells[id].value == Some(j) {
                    self.stats.neg_attempts += 1;
                    self.new_elimination(terms, subterm_id, i, state);
                    if !state.ok {
                        return;
                    }
                }
                id += increment;
            }
        }
    }

    /// The cell id of an alpha term with its e-term argument read as 0.
    fn nterm_id(&self, terms: &TermArena, alpha: TermId) -> usize {
        let sym = &self.symbols[*self
            .sn_to_mace
            .get(&terms.sym(alpha).expect("! Alpha is a variable"))
            .expect("! Alpha symbol has no cells")];
        let mut id = sym.base;
        let mut mult = 1;
        for &arg in terms.args(alpha).iter().rev() {
            if let Some(v) = terms.varnum(arg) {
                if v < self.domain_size {
                    id += v * mult;
                }
            }
            mult *= self.domain_size;
        }
        id
    }
}
