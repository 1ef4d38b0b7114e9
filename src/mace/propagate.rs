/*!
Propagation.

An assignment `f(i,…) = v` rewrites, bottom-up, every ground-clause subterm
equal to the assigned cell; literals that reduce to true subsume their
clause, literals that reduce to false lower its active count.
A clause at zero active literals is a contradiction; at one, the surviving
literal is a new unit and is dispatched by [Space::process_clause] --- an
assignment, an elimination (a crossed-off possible value, with the forced
assignment when one value remains), or a near-unit handed to the
negative-propagation index.

Pending work lives in a FIFO job list; [Space::propagate] drains it and
[Space::assign_and_propagate] wraps one speculative assignment, returning
either the trail checkpoint to unwind to later or the contradiction (with
the trail already unwound).
*/

use std::collections::VecDeque;

use crate::mace::cells::Space;
use crate::misc::log::targets;
use crate::structures::term::{Container, TermArena, TermId};

/// What a pending job is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobKind {
    Assignment,
    Elimination,
    NearAssignment,
    NearElimination,
}

/// One pending propagation.
#[derive(Clone, Debug)]
pub struct Job {
    pub kind: JobKind,

    /// The cell: the assigned/eliminated one, or for near jobs the cell of
    /// the embedded e-term argument.
    pub id: usize,

    /// The near-unit's non-element side.
    pub alpha: Option<TermId>,

    /// The value: eliminated element, or the near-unit's right side.
    pub beta: Option<usize>,

    /// Position of the e-term argument within `alpha`.
    pub pos: Option<usize>,
}

/// Propagation found an inconsistency; the trail has been unwound.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Contradiction;

/// The job list of one propagation run.
pub struct Mstate {
    pub jobs: VecDeque<Job>,
    pub ok: bool,
}

impl Mstate {
    pub fn new() -> Self {
        Mstate {
            jobs: VecDeque::new(),
            ok: true,
        }
    }
}

impl Default for Mstate {
    fn default() -> Self {
        Mstate::new()
    }
}

impl Space {
    fn domain_var(&self, terms: &TermArena, t: TermId) -> Option<usize> {
        terms.varnum(t).filter(|&v| v < self.domain_size)
    }

    /// Installs `cell = value`, or flags the contradiction.
    pub fn new_assignment(&mut self, terms: &TermArena, id: usize, value: usize, state: &mut Mstate) {
        match self.cells[id].value {
            None => {
                self.set_cell_value(id, value);
                if self.trace {
                    println!("\t\t\t\t\tcell {id} = {value}");
                }
                state.jobs.push_back(Job {
                    kind: JobKind::Assignment,
                    id,
                    alpha: None,
                    beta: None,
                    pos: None,
                });
                self.stats.propagations += 1;
            }
            Some(v) if v == value => {}
            Some(_) => {
                log::trace!(target: targets::MACE_PROPAGATE, "Contradictory assignment; backing up.");
                state.ok = false;
            }
        }
        let _ = terms;
    }

    /// Crosses `value` off the cell, with the forced assignment when one
    /// value remains.
    pub fn new_elimination(&mut self, terms: &TermArena, id: usize, value: usize, state: &mut Mstate) {
        if self.cells[id].value == Some(value) {
            log::trace!(target: targets::MACE_PROPAGATE, "Eliminated the assigned value; backing up.");
            state.ok = false;
            return;
        }
        if self.cells[id].value.is_some() {
            return; // already valued differently
        }
        if !self.cells[id].possible.contains(value) {
            return; // already crossed off
        }

        self.stats.cross_offs += 1;
        self.cross_off(id, value);

        if self.negprop {
            state.jobs.push_back(Job {
                kind: JobKind::Elimination,
                id,
                alpha: None,
                beta: Some(value),
                pos: None,
            });
        }

        if self.cells[id].possible.count() == 0 {
            // Unreachable in principle (the forced assignment fires first);
            // treated as a contradiction rather than trusted.
            state.ok = false;
        } else if let Some(forced) = self.cells[id].possible.single() {
            self.stats.rules_from_neg += 1;
            self.new_assignment(terms, id, forced, state);
        }
    }

    /// Dispatches a clause that may have become a unit.
    pub fn process_clause(&mut self, terms: &TermArena, ci: usize, state: &mut Mstate) {
        if self.mclauses[ci].subsumed {
            return;
        }
        if self.mclauses[ci].active == 0 {
            log::trace!(target: targets::MACE_PROPAGATE, "Empty ground clause; backing up.");
            state.ok = false;
            return;
        }
        if self.mclauses[ci].active != 1 {
            return;
        }

        let lit = self
            .mclauses[ci]
            .lits
            .iter()
            .copied()
            .find(|&l| !self.false_term(l))
            .expect("! Active count disagrees with the literals");

        let negated = self.negated(terms, lit);
        let eq = self.is_eq_term(terms, lit);

        let (id, beta) = if !eq {
            match self.eterm(terms, lit) {
                Some(id) => (id, if negated { 0 } else { 1 }),
                None => {
                    if self.negprop {
                        self.nterm_check_and_process(terms, lit, state);
                    }
                    return;
                }
            }
        } else {
            let a0 = terms.arg(lit, 0);
            let a1 = terms.arg(lit, 1);
            if let (Some(id), Some(v)) = (self.eterm(terms, a0), self.domain_var(terms, a1)) {
                (id, v)
            } else if let (Some(id), Some(v)) = (self.eterm(terms, a1), self.domain_var(terms, a0)) {
                (id, v)
            } else {
                if self.negprop {
                    self.nterm_check_and_process(terms, lit, state);
                }
                return;
            }
        };

        if eq && negated {
            self.new_elimination(terms, id, beta, state);
        } else {
            self.new_assignment(terms, id, beta, state);
        }
    }

    /// A unit that is not an (e-term) assignment or elimination: if it is
    /// *nearly* one, index it and queue the near job.
    fn nterm_check_and_process(&mut self, terms: &TermArena, lit: TermId, state: &mut Mstate) {
        let negated = self.negated(terms, lit);
        let eq = self.is_eq_term(terms, lit);
        let kind = if negated && eq {
            JobKind::NearElimination
        } else {
            JobKind::NearAssignment
        };

        if eq {
            let a0 = terms.arg(lit, 0);
            let a1 = terms.arg(lit, 1);
            if let (Some(v), Some((pos, id))) = (self.domain_var(terms, a1), self.nterm(terms, a0)) {
                self.insert_negprop_eq(terms, lit, a0, v);
                state.jobs.push_back(Job {
                    kind,
                    id,
                    alpha: Some(a0),
                    beta: Some(v),
                    pos: Some(pos),
                });
            } else if let (Some(v), Some((pos, id))) =
                (self.domain_var(terms, a0), self.nterm(terms, a1))
            {
                self.insert_negprop_eq(terms, lit, a1, v);
                state.jobs.push_back(Job {
                    kind,
                    id,
                    alpha: Some(a1),
                    beta: Some(v),
                    pos: Some(pos),
                });
            }
        } else if let Some((pos, id)) = self.nterm(terms, lit) {
            self.insert_negprop_noneq(terms, lit);
            state.jobs.push_back(Job {
                kind: JobKind::NearAssignment,
                id,
                alpha: Some(lit),
                beta: Some(if negated { 0 } else { 1 }),
                pos: Some(pos),
            });
        }
    }

    /// Rewrites one literal to a truth value; returns the clause to
    /// re-examine when the literal went false.
    fn handle_literal(
        &mut self,
        terms: &TermArena,
        lit: TermId,
        result: usize,
        _state: &mut Mstate,
    ) -> Option<usize> {
        let ci = match terms.container(lit) {
            Container::Ground(ci) => ci,
            _ => return None,
        };
        let pos = self.mclauses[ci]
            .lits
            .iter()
            .position(|&l| l == lit)
            .expect("! Literal missing from its clause");
        let result = if self.negated(terms, lit) { 1 - result } else { result };
        self.stats.rewrite_bools += 1;
        self.rewrite_lit(ci, pos, self.domain[result]);

        if result == 0 {
            self.decrement_active(ci);
            Some(ci)
        } else {
            self.set_subsumed(ci);
            None
        }
    }

    /// Propagates one assignment through the cell's occurrence list.
    fn propagate_positive(&mut self, terms: &mut TermArena, id: usize, state: &mut Mstate) {
        let occurrences = self.cells[id].occurrences.clone();
        for t in occurrences {
            let mut curr = t;

            // Rewrite upward until a literal, an arithmetic node, a
            // non-e-term, or an unvalued cell.
            loop {
                if self.is_literal(terms, curr) || self.arith.op_term(terms, curr) {
                    break;
                }
                let cid = match self.eterm(terms, curr) {
                    Some(cid) => cid,
                    None => break,
                };
                let value = match self.cells[cid].value {
                    Some(v) => v,
                    None => break,
                };
                let parent = match terms.container(curr) {
                    Container::Term(p) => p,
                    _ => break,
                };
                let pos = terms
                    .args(parent)
                    .iter()
                    .position(|&a| a == curr)
                    .expect("! Broken container link");
                let replacement = self.domain[value];
                self.rewrite_arg(terms, parent, pos, replacement);
                self.stats.rewrite_terms += 1;
                curr = parent;
            }

            let mut clause_to_process = None;
            let mut index_cell = None;

            if self.arith.rel_term(terms, curr) || self.arith.op_term(terms, curr) {
                let parent_lit = self.containing_mliteral(terms, curr);
                if let Container::Ground(ci) = terms.container(parent_lit) {
                    if !self.mclauses[ci].subsumed {
                        match self.arith.evaluate(terms, parent_lit, self.domain_size) {
                            Some(b) => {
                                debug_assert!(b == 0 || b == 1, "! Arith literal not boolean");
                                clause_to_process =
                                    self.handle_literal(terms, parent_lit, b as usize, state);
                            }
                            None => {
                                if self.is_eq_term(terms, curr) {
                                    clause_to_process = Some(ci);
                                }
                            }
                        }
                    }
                }
            } else if !self.is_literal(terms, curr) {
                // A term; index it when it is an unvalued e-term, and
                // re-examine the clause when it sits within two steps of a
                // literal.
                if let Some(cid) = self.eterm(terms, curr) {
                    index_cell = Some(cid);
                }
                match terms.container(curr) {
                    Container::Term(p) => {
                        if self.is_literal(terms, p) {
                            if let Container::Ground(ci) = terms.container(p) {
                                clause_to_process = Some(ci);
                            }
                        } else if let Container::Term(pp) = terms.container(p) {
                            if self.is_literal(terms, pp) {
                                if let Container::Ground(ci) = terms.container(pp) {
                                    clause_to_process = Some(ci);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            } else {
                // A literal.
                if let Container::Ground(ci) = terms.container(curr) {
                    match self.eterm(terms, curr) {
                        None => clause_to_process = Some(ci),
                        Some(lid) => match self.cells[lid].value {
                            None => {
                                index_cell = Some(lid);
                                clause_to_process = Some(ci);
                            }
                            Some(v) => {
                                if !self.mclauses[ci].subsumed {
                                    clause_to_process = self.handle_literal(terms, curr, v, state);
                                }
                            }
                        },
                    }
                }
            }

            if let Some(cid) = index_cell {
                self.stats.indexes += 1;
                self.push_occurrence(cid, curr);
            }
            if let Some(ci) = clause_to_process {
                self.process_clause(terms, ci, state);
                if !state.ok {
                    return;
                }
            }
        }
    }

    /// Drains the job list.
    pub fn propagate(&mut self, terms: &mut TermArena, state: &mut Mstate) {
        while state.ok {
            let job = match state.jobs.pop_front() {
                Some(job) => job,
                None => break,
            };
            if job.kind == JobKind::Assignment {
                self.propagate_positive(terms, job.id, state);
            }
            if state.ok && self.negprop {
                self.propagate_negative(terms, &job, state);
            }
        }
        if !state.ok {
            state.jobs.clear();
        }
    }

    /// One speculative assignment with full propagation.
    ///
    /// On success the trail checkpoint to unwind to is returned; on
    /// contradiction the trail has already been unwound.
    pub fn assign_and_propagate(
        &mut self,
        terms: &mut TermArena,
        id: usize,
        value: usize,
    ) -> Result<usize, Contradiction> {
        debug_assert!(self.cells[id].value.is_none(), "! Repeated assignment");
        let mark = self.trail.mark();
        let mut state = Mstate::new();
        self.stats.assignments += 1;

        self.set_cell_value(id, value);
        state.jobs.push_back(Job {
            kind: JobKind::Assignment,
            id,
            alpha: None,
            beta: None,
            pos: None,
        });
        self.propagate(terms, &mut state);

        if state.ok {
            Ok(mark)
        } else {
            self.restore_to(terms, mark);
            Err(Contradiction)
        }
    }

    /// Initial processing of a freshly grounded clause: empty-clause and
    /// unit-conflict checks plus unit propagation.
    pub fn process_initial_clause(
        &mut self,
        terms: &mut TermArena,
        ci: usize,
        state: &mut Mstate,
    ) {
        self.process_clause(terms, ci, state);
        if state.ok && !state.jobs.is_empty() {
            self.propagate(terms, state);
        }
    }
}
