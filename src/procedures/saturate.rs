/*!
The given-clause loop.

Each iteration takes the lightest clause from the set of support (ties to
the lowest id, so runs are reproducible), moves it to the usable set, and
applies the enabled inference rules between it and the usable set through
the literal index.
Children are merged, renumbered, weighed, and discarded when tautologous,
too heavy, or forward-subsumed by a kept clause; survivors get ids and join
the set of support.
The loop ends at the empty clause (proof found), an empty set of support,
or a verdict from the limit oracle, which is polled once per given clause.
*/

use crate::config::{LimitOracle, ProverConfig};
use crate::index::feature::{features, FeatureIndex};
use crate::index::lindex::Lindex;
use crate::kernel::Kernel;
use crate::misc::log::targets;
use crate::parse::{read_input, InputItem, InputList};
use crate::procedures::clash::{hyper_resolution, ur_resolution, UrTarget};
use crate::procedures::factor::{binary_factors, merge_literals};
use crate::procedures::paramod::para_from_into;
use crate::procedures::resolve::{binary_resolution, ResType};
use crate::procedures::subsume::subsumes;
use crate::procedures::weight::Weigher;
use crate::structures::clause::{renumber_variables, tautology, ClauseId};
use crate::structures::justification::Justification;
use crate::structures::term::TermId;
use crate::types::err::{ErrorKind, LimitError};
use crate::unify::MAX_VARS;

/// Counters of one search.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProverStats {
    pub given: usize,
    pub generated: usize,
    pub kept: usize,
    pub forward_subsumed: usize,
    pub back_subsumed: usize,
    pub proofs: usize,
}

/// How a search ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProverReport {
    /// The empty clause was derived (max_proofs times).
    ProofFound,

    /// The set of support ran dry (or a given/kept cap was hit).
    SosEmpty,

    /// The limit oracle called time.
    Limit(LimitError),
}

/// The prover: a kernel plus the search state.
pub struct Prover {
    pub kernel: Kernel,
    pub config: ProverConfig,
    pub oracle: LimitOracle,
    pub stats: ProverStats,

    pub sos: Vec<ClauseId>,
    pub usable: Vec<ClauseId>,
    pub disabled: Vec<ClauseId>,
    pub hints: Vec<ClauseId>,

    lindex: Lindex,
    kept_features: FeatureIndex,
    weigher: Option<Weigher>,
    weight_rules: Vec<TermId>,
    empty_clause: Option<ClauseId>,
    initialized: bool,
}

impl Prover {
    pub fn new(config: ProverConfig) -> Self {
        let oracle = LimitOracle::new(config.max_seconds, config.max_megs);
        Prover {
            kernel: Kernel::new(),
            config,
            oracle,
            stats: ProverStats::default(),
            sos: Vec::new(),
            usable: Vec::new(),
            disabled: Vec::new(),
            hints: Vec::new(),
            lindex: Lindex::default(),
            kept_features: FeatureIndex::default(),
            weigher: None,
            weight_rules: Vec::new(),
            empty_clause: None,
            initialized: false,
        }
    }

    /// Parses one clause into the set of support.
    pub fn add_input_str(&mut self, text: &str) -> Result<ClauseId, ErrorKind> {
        let cid = self.kernel.parse_clause(text)?;
        self.add_input_clause(cid, InputList::Sos);
        Ok(cid)
    }

    /// Installs an already-built clause as input to the named list.
    pub fn add_input_clause(&mut self, cid: ClauseId, list: InputList) {
        {
            let clause = self.kernel.clauses.get_mut(cid);
            clause.initial = true;
            clause.justification = Justification::input();
        }
        match list {
            InputList::Usable | InputList::Assumptions => self.usable.push(cid),
            InputList::Hints => {
                self.kernel.clauses.get_mut(cid).matching_hint = true;
                self.hints.push(cid);
            }
            _ => self.sos.push(cid),
        }
    }

    /// Reads a whole input text: option commands and formula lists.
    pub fn read_input_str(&mut self, text: &str) -> Result<(), ErrorKind> {
        let items = read_input(&mut self.kernel.symbols, &mut self.kernel.terms, text)?;
        for item in items {
            match item {
                InputItem::SetFlag(name, value) => {
                    if let Err(e) = self.config.set_flag(&name, value) {
                        log::warn!(target: targets::SATURATE, "Ignoring option: {e:?}");
                    }
                }
                InputItem::AssignParm(name, value) => {
                    if let Err(e) = self.config.assign_parm(&name, value) {
                        log::warn!(target: targets::SATURATE, "Ignoring option: {e:?}");
                    }
                }
                InputItem::Formula(InputList::Goals, t) => {
                    for denial in crate::formula::deny_goal(&mut self.kernel, t)? {
                        let cid = self.kernel.install_clause_term(denial)?;
                        self.add_input_clause(cid, InputList::Sos);
                    }
                }
                InputItem::Formula(InputList::Distinct, t) => {
                    for pair in crate::formula::distinct_list(&mut self.kernel, t)? {
                        self.add_input_clause(pair, InputList::Sos);
                    }
                }
                InputItem::Formula(InputList::Demodulators, t) => {
                    log::warn!(target: targets::SATURATE, "No rewriting engine; demodulator read as a clause.");
                    let cid = self.kernel.install_clause_term(t)?;
                    self.add_input_clause(cid, InputList::Usable);
                }
                InputItem::Formula(list, t) => {
                    let cid = self.kernel.install_clause_term(t)?;
                    self.add_input_clause(cid, list);
                }
            }
        }
        self.oracle = LimitOracle::new(self.config.max_seconds, self.config.max_megs);
        Ok(())
    }

    /// Registers a weight rule (a parsed `weight(...) = expr` term).
    pub fn add_weight_rule(&mut self, rule: TermId) {
        self.weight_rules.push(rule);
    }

    /// The kept empty clause, once a proof has been found.
    pub fn empty_clause(&self) -> Option<ClauseId> {
        self.empty_clause
    }

    /// The proof ending in the empty clause, in parent-first order.
    pub fn proof(&self) -> Option<Vec<ClauseId>> {
        let empty = self.empty_clause?;
        crate::proofs::extract_proof(&self.kernel, empty).ok()
    }

    fn initialize(&mut self) -> Result<(), ErrorKind> {
        if self.initialized {
            return Ok(());
        }
        let weigher = Weigher::init(&mut self.kernel, &self.config, &self.weight_rules)?;
        self.weigher = Some(weigher);

        // Input processing: renumber, weigh, number, index.
        let start: Vec<(ClauseId, bool)> = self
            .sos
            .iter()
            .map(|&c| (c, true))
            .chain(self.usable.iter().map(|&c| (c, false)))
            .collect();
        for (cid, _in_sos) in &start {
            renumber_variables(&mut self.kernel.terms, &self.kernel.clauses[*cid], MAX_VARS)?;
            self.weigh(*cid);
            self.kernel.clauses.assign_id(*cid);
            self.kept_features
                .insert(features(&self.kernel.terms, &self.kernel.clauses[*cid]), *cid);
            self.stats.kept += 1;
            if self.kernel.clauses[*cid].is_empty() {
                self.empty_clause = Some(*cid);
            }
        }
        for cid in self.usable.clone() {
            self.lindex
                .insert_clause(&self.kernel.terms, &self.kernel.clauses, cid);
        }
        for cid in self.hints.clone() {
            self.kernel.clauses.assign_id(cid);
        }
        self.initialized = true;
        Ok(())
    }

    fn weigh(&mut self, cid: ClauseId) {
        let weigher = self.weigher.as_ref().expect("! Weigher missing");
        let w = weigher.clause_weight(
            &mut self.kernel.terms,
            &mut self.kernel.contexts,
            &self.kernel.symbols,
            &self.kernel.clauses[cid],
        );
        self.kernel.clauses.get_mut(cid).weight = w;
    }

    /// Lightest clause of the set of support; ties to the lowest id.
    fn select_given(&mut self) -> Option<ClauseId> {
        let best = self
            .sos
            .iter()
            .enumerate()
            .min_by(|(_, &a), (_, &b)| {
                let ca = &self.kernel.clauses[a];
                let cb = &self.kernel.clauses[b];
                ca.weight
                    .partial_cmp(&cb.weight)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(ca.id.cmp(&cb.id))
            })
            .map(|(i, _)| i)?;
        Some(self.sos.remove(best))
    }

    fn generate(&mut self, given: ClauseId) -> Vec<ClauseId> {
        let mut new = Vec::new();
        let cfg = self.config.clone();
        let k = &mut self.kernel;

        if cfg.binary_resolution {
            binary_resolution(k, &cfg, ResType::Any, given, &self.lindex, &mut new);
        }
        if cfg.pos_hyper_resolution {
            hyper_resolution(k, &cfg, true, given, &self.lindex, &mut new);
        }
        if cfg.neg_hyper_resolution {
            hyper_resolution(k, &cfg, false, given, &self.lindex, &mut new);
        }
        if cfg.ur_resolution {
            ur_resolution(k, &cfg, UrTarget::Any, given, &self.lindex, &mut new);
        }
        if cfg.paramodulation {
            for partner in self.usable.clone() {
                para_from_into(k, &cfg, given, partner, true, &mut new);
                if partner != given {
                    para_from_into(k, &cfg, partner, given, true, &mut new);
                }
            }
        }
        if cfg.factor {
            binary_factors(k, given, &mut new);
        }
        new
    }

    /// Returns true when the child was kept.
    fn process_derived(&mut self, cid: ClauseId) -> Result<bool, ErrorKind> {
        self.stats.generated += 1;

        merge_literals(&mut self.kernel, cid);
        renumber_variables(&mut self.kernel.terms, &self.kernel.clauses[cid], MAX_VARS)?;

        if tautology(&self.kernel.terms, &self.kernel.clauses[cid]) {
            self.kernel.clauses.delete(cid, &mut self.kernel.terms);
            return Ok(false);
        }

        self.weigh(cid);
        let clause = &self.kernel.clauses[cid];
        if !clause.is_empty() && clause.weight > self.config.max_weight {
            self.kernel.clauses.delete(cid, &mut self.kernel.terms);
            return Ok(false);
        }

        // Forward subsumption against the kept clauses.
        let fv = features(&self.kernel.terms, &self.kernel.clauses[cid]);
        for candidate in self.kept_features.retrieve_subsumers(fv) {
            if subsumes(
                &self.kernel.terms,
                &mut self.kernel.contexts,
                &self.kernel.clauses[candidate],
                &self.kernel.clauses[cid],
            ) {
                self.kernel.clauses.get_mut(candidate).subsumer = true;
                self.kernel.clauses.delete(cid, &mut self.kernel.terms);
                self.stats.forward_subsumed += 1;
                return Ok(false);
            }
        }

        // Keep it.
        let parents = self.kernel.clauses[cid].justification.parents();
        let level = parents
            .iter()
            .filter_map(|p| self.kernel.clauses.find_by_num(*p))
            .map(|p| self.kernel.clauses[p].level)
            .max()
            .map(|l| l + 1)
            .unwrap_or(0);
        self.kernel.clauses.get_mut(cid).level = level;
        self.kernel.clauses.assign_id(cid);
        self.stats.kept += 1;

        self.mark_hint(cid);

        if self.kernel.clauses[cid].is_empty() {
            log::info!(target: targets::SATURATE, "Empty clause derived.");
            self.empty_clause = Some(cid);
            self.stats.proofs += 1;
            return Ok(true);
        }

        if self.config.back_subsume {
            self.back_subsume(cid);
        }

        if self.config.echo {
            println!("kept: {}.", self.kernel.clause_to_string(cid));
        }

        self.kept_features.insert(fv, cid);
        self.sos.push(cid);
        Ok(true)
    }

    fn mark_hint(&mut self, cid: ClauseId) {
        for h in self.hints.clone() {
            let forward = subsumes(
                &self.kernel.terms,
                &mut self.kernel.contexts,
                &self.kernel.clauses[h],
                &self.kernel.clauses[cid],
            );
            if forward
                && subsumes(
                    &self.kernel.terms,
                    &mut self.kernel.contexts,
                    &self.kernel.clauses[cid],
                    &self.kernel.clauses[h],
                )
            {
                self.kernel.clauses.get_mut(cid).matching_hint = true;
                return;
            }
        }
    }

    /// Retires kept clauses the new clause subsumes.
    fn back_subsume(&mut self, cid: ClauseId) {
        let fv = features(&self.kernel.terms, &self.kernel.clauses[cid]);
        let mut victims = Vec::new();
        for candidate in self.kept_features.retrieve_subsumed(fv) {
            if candidate != cid
                && subsumes(
                    &self.kernel.terms,
                    &mut self.kernel.contexts,
                    &self.kernel.clauses[cid],
                    &self.kernel.clauses[candidate],
                )
            {
                victims.push(candidate);
            }
        }
        for victim in victims {
            log::trace!(target: targets::SUBSUMPTION, "Back subsumption retired a clause.");
            self.kernel.clauses.get_mut(cid).subsumer = true;
            let vf = features(&self.kernel.terms, &self.kernel.clauses[victim]);
            self.kept_features.remove(vf, victim);
            if let Some(i) = self.sos.iter().position(|&c| c == victim) {
                self.sos.remove(i);
            }
            if let Some(i) = self.usable.iter().position(|&c| c == victim) {
                self.usable.remove(i);
                self.lindex
                    .remove_clause(&self.kernel.terms, &self.kernel.clauses, victim);
            }
            self.disabled.push(victim);
            self.stats.back_subsumed += 1;
        }
    }

    /// Runs the loop to a verdict.
    pub fn search(&mut self) -> Result<ProverReport, ErrorKind> {
        self.initialize()?;

        if self.empty_clause.is_some() {
            return Ok(ProverReport::ProofFound);
        }

        'given_loop: loop {
            if let Some(limit) = self.oracle.check(self.kernel.terms.live_nodes()) {
                return Ok(ProverReport::Limit(limit));
            }
            if let Some(max) = self.config.max_given {
                if self.stats.given >= max {
                    log::info!(target: targets::SATURATE, "Given-clause cap reached.");
                    return Ok(ProverReport::SosEmpty);
                }
            }
            if let Some(max) = self.config.max_kept {
                if self.stats.kept >= max {
                    log::info!(target: targets::SATURATE, "Kept-clause cap reached.");
                    return Ok(ProverReport::SosEmpty);
                }
            }

            let given = match self.select_given() {
                Some(c) => c,
                None => return Ok(ProverReport::SosEmpty),
            };
            self.stats.given += 1;
            log::debug!(
                target: targets::SATURATE,
                "given #{}: {}",
                self.stats.given,
                self.kernel.clause_to_string(given)
            );

            self.usable.push(given);
            self.lindex
                .insert_clause(&self.kernel.terms, &self.kernel.clauses, given);

            let children = self.generate(given);
            for child in children {
                self.process_derived(child)?;
                if self.stats.proofs >= self.config.max_proofs && self.empty_clause.is_some() {
                    break 'given_loop;
                }
            }
        }

        Ok(ProverReport::ProofFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refutes_a_unit_conflict() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-p(a).").unwrap();

        let report = prover.search().unwrap();
        assert_eq!(report, ProverReport::ProofFound);
        let proof = prover.proof().unwrap();
        assert_eq!(proof.len(), 3); // two inputs and the empty clause
    }

    #[test]
    fn satisfiable_input_exhausts() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("q(b).").unwrap();

        let report = prover.search().unwrap();
        assert_eq!(report, ProverReport::SosEmpty);
    }

    #[test]
    fn chains_through_an_implication() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-p(x) | q(x).").unwrap();
        prover.add_input_str("-q(a).").unwrap();

        let report = prover.search().unwrap();
        assert_eq!(report, ProverReport::ProofFound);
    }

    #[test]
    fn xx_refutation() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("x = x.").unwrap();
        prover.add_input_str("a != a.").unwrap();

        let report = prover.search().unwrap();
        assert_eq!(report, ProverReport::ProofFound);
    }

    #[test]
    fn equational_chain() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("a = b.").unwrap();
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-p(b).").unwrap();

        let report = prover.search().unwrap();
        assert_eq!(report, ProverReport::ProofFound);
    }
}
