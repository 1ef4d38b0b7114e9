/*!
The finite-model searcher.

Input clauses are grounded over a domain `{0..n-1}`, every ground function
or relation entry becomes a [cell](crate::mace::cells), and a
propagate/select/backtrack loop looks for a consistent assignment of every
cell.
The [Mace] driver iterates domain sizes, runs one [Space](cells::Space) per
size, and reports models as [interpretations](interp::Interp).
*/

use crate::config::{LimitOracle, MaceConfig};
use crate::formula;
use crate::kernel::Kernel;
use crate::mace::arith::ArithSyms;
use crate::mace::cells::Space;
use crate::mace::interp::Interp;
use crate::mace::search::{search_space, SizeOutcome};
use crate::misc::log::targets;
use crate::parse::{read_input, InputItem, InputList};
use crate::structures::clause::ClauseId;
use crate::structures::term::TermFlag;
use crate::types::err::{ErrorKind, LimitError};

pub mod arith;
pub mod cells;
pub mod ground;
pub mod interp;
pub mod negindex;
pub mod negprop;
pub mod propagate;
pub mod search;
pub mod select;
pub mod syms;
pub mod trail;

/// Counters for one domain size.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaceStats {
    pub selections: usize,
    pub assignments: usize,
    pub propagations: usize,
    pub cross_offs: usize,
    pub rewrite_terms: usize,
    pub rewrite_bools: usize,
    pub indexes: usize,
    pub ground_clauses_seen: usize,
    pub ground_clauses_kept: usize,
    pub rules_from_neg: usize,
    pub neg_attempts: usize,
    pub neg_gone: usize,
}

/// How the whole run ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MaceOutcome {
    /// The requested number of models was found.
    MaxModels,

    /// Every requested size was searched; models were found along the way.
    AllModels,

    /// Every requested size was searched; no models exist.
    Exhausted,

    Limit(LimitError),
}

/// The run's findings.
pub struct MaceResults {
    pub models: Vec<Interp>,
    pub outcome: MaceOutcome,

    /// Counters of the last size searched.
    pub stats: MaceStats,
}

/// The model-search driver.
pub struct Mace {
    pub kernel: Kernel,
    pub config: MaceConfig,
    pub oracle: LimitOracle,

    clauses: Vec<ClauseId>,
    literal_flag: TermFlag,
    negation_flag: TermFlag,
}

impl Mace {
    pub fn new(config: MaceConfig) -> Self {
        let mut kernel = Kernel::new();
        let literal_flag = kernel.flags.claim();
        let negation_flag = kernel.flags.claim();
        let oracle = LimitOracle::new(config.max_seconds, config.max_megs);
        Mace {
            kernel,
            config,
            oracle,
            clauses: Vec::new(),
            literal_flag,
            negation_flag,
        }
    }

    /// Parses one clause of the problem.
    pub fn add_input_str(&mut self, text: &str) -> Result<ClauseId, ErrorKind> {
        let cid = self.kernel.parse_clause(text)?;
        self.clauses.push(cid);
        Ok(cid)
    }

    /// Reads a whole input text: option commands and formula lists.
    /// Goals are denied; every other list contributes its clauses.
    pub fn read_input_str(&mut self, text: &str) -> Result<(), ErrorKind> {
        let items = read_input(&mut self.kernel.symbols, &mut self.kernel.terms, text)?;
        for item in items {
            match item {
                InputItem::SetFlag(name, value) => {
                    if let Err(e) = self.config.set_flag(&name, value) {
                        log::warn!(target: targets::MACE_SEARCH, "Ignoring option: {e:?}");
                    }
                }
                InputItem::AssignParm(name, value) => {
                    if let Err(e) = self.config.assign_parm(&name, value) {
                        log::warn!(target: targets::MACE_SEARCH, "Ignoring option: {e:?}");
                    }
                }
                InputItem::Formula(InputList::Goals, t) => {
                    for denial in formula::deny_goal_whole(&mut self.kernel, t)? {
                        let cid = self.kernel.install_clause_term(denial)?;
                        self.clauses.push(cid);
                    }
                }
                InputItem::Formula(InputList::Distinct, t) => {
                    let pairs = formula::distinct_list(&mut self.kernel, t)?;
                    self.clauses.extend(pairs);
                }
                InputItem::Formula(_, t) => {
                    let cid = self.kernel.install_clause_term(t)?;
                    self.clauses.push(cid);
                }
            }
        }
        self.oracle = LimitOracle::new(self.config.max_seconds, self.config.max_megs);
        Ok(())
    }

    fn size_admitted(&self, n: usize) -> bool {
        if self.config.iterate_primes && !prime(n) {
            return false;
        }
        if self.config.iterate_nonprimes && prime(n) {
            return false;
        }
        true
    }

    /// Iterates domain sizes, searching each.
    pub fn search(&mut self) -> Result<MaceResults, ErrorKind> {
        let mut models = Vec::new();
        let mut next_number = 0;
        let mut stats = MaceStats::default();

        let mut n = self.config.start_size.max(2);
        let end = self.config.end_size;

        loop {
            if let Some(end) = end {
                if n > end {
                    break;
                }
            }
            if self.size_admitted(n) {
                log::info!(target: targets::MACE_SEARCH, "Searching domain size {n}.");

                let arith = ArithSyms::init(&mut self.kernel.symbols, self.config.arithmetic);
                if self.config.arithmetic
                    && !arith::ok_for_arithmetic(&self.kernel, &arith, &self.clauses, n)
                {
                    // Out-of-range numerals may fit a larger domain; anything
                    // else never will.
                    if !arith::ok_for_arithmetic(&self.kernel, &arith, &self.clauses, usize::MAX >> 8)
                    {
                        return Err(crate::types::err::fatal(
                            "input mixes arithmetic into ordinary terms",
                        ));
                    }
                    log::info!(
                        target: targets::MACE_SEARCH,
                        "Size {n} rejected by the arithmetic safety check."
                    );
                    n += self.config.increment.max(1);
                    continue;
                }
                let mut space = Space::new(
                    &mut self.kernel,
                    &self.config,
                    arith,
                    self.literal_flag,
                    self.negation_flag,
                    &self.clauses,
                    n,
                )?;

                let consistent =
                    ground::generate_ground_clauses(&mut self.kernel, &mut space, &self.clauses)?;

                let outcome = if consistent {
                    let per_size = self
                        .config
                        .max_seconds_per
                        .map(|s| LimitOracle::new(Some(s), None));
                    search_space(
                        &mut self.kernel,
                        &mut space,
                        &self.config,
                        &self.oracle,
                        per_size.as_ref(),
                        &mut models,
                        &mut next_number,
                    )?
                } else {
                    SizeOutcome::Exhausted
                };
                stats = space.stats;
                self.teardown_space(space);

                match outcome {
                    SizeOutcome::MaxModels => {
                        return Ok(MaceResults {
                            models,
                            outcome: MaceOutcome::MaxModels,
                            stats,
                        });
                    }
                    SizeOutcome::Limit(LimitError::MaxSeconds)
                        if self.config.max_seconds_per.is_some()
                            && self.oracle.check(0).is_none() =>
                    {
                        // Only the per-size budget ran out; move on.
                    }
                    SizeOutcome::Limit(limit) => {
                        return Ok(MaceResults {
                            models,
                            outcome: MaceOutcome::Limit(limit),
                            stats,
                        });
                    }
                    SizeOutcome::Exhausted => {}
                }
            }

            if end.is_none() && models.len() as i64 >= self.config.max_models.max(1) {
                break;
            }
            n += self.config.increment.max(1);
        }

        let outcome = if models.is_empty() {
            MaceOutcome::Exhausted
        } else {
            MaceOutcome::AllModels
        };
        Ok(MaceResults {
            models,
            outcome,
            stats,
        })
    }

    /// Frees the per-size term structures: ground clauses, cell e-terms,
    /// the domain, and the trail's survivors.
    fn teardown_space(&mut self, mut space: Space) {
        let terms = &mut self.kernel.terms;
        space.restore_to(terms, 0);
        for clause in &space.mclauses {
            for &lit in &clause.lits {
                if !terms.is_variable(lit) {
                    // Free the literal tree, leaving domain elements.
                    free_skipping_variables(terms, lit);
                }
            }
        }
        for cell in &space.cells {
            free_skipping_variables(terms, cell.eterm);
        }
        for (_, &t) in space.nat_terms.iter() {
            terms.free_node(t);
        }
        for &d in &space.domain {
            terms.free_node(d);
        }
    }
}

fn free_skipping_variables(terms: &mut crate::structures::term::TermArena, t: crate::structures::term::TermId) {
    if !terms.is_variable(t) {
        for arg in terms.args(t).to_vec() {
            free_skipping_variables(terms, arg);
        }
        terms.free_node(t);
    }
}

/// Trial-division primality, for the size iteration filters.
pub fn prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primes() {
        let known: Vec<usize> = (2..20).filter(|&n| prime(n)).collect();
        assert_eq!(known, vec![2, 3, 5, 7, 11, 13, 17, 19]);
    }

    #[test]
    fn size_iteration_finds_the_first_admitting_size() {
        // p(x) with all elements distinct from each other needs ... just
        // check that a 3-element constraint skips size 2.
        let mut mace = Mace::new(MaceConfig {
            start_size: 2,
            end_size: Some(4),
            max_models: 1,
            print_models: false,
            ..MaceConfig::default()
        });
        // Three constants, pairwise distinct: no 2-element model.
        mace.add_input_str("a != b.").unwrap();
        mace.add_input_str("b != c.").unwrap();
        mace.add_input_str("a != c.").unwrap();

        let results = mace.search().unwrap();
        assert_eq!(results.models.len(), 1);
        assert_eq!(results.models[0].domain_size, 3);
    }
}
