/*!
The backtracking search over cells.

Chronological: select an open cell, try its still-possible values in domain
order, propagate each, recurse on success.
A failed or exhausted value is crossed off on the level that tried it, so
the cross-off survives until the level above unwinds.
Models are emitted when every cell holds a value; verification through
[check_with_arithmetic](Space::check_with_arithmetic) covers the literals
only arithmetic can finish.
The loop polls the limit oracles once per decision.
*/

use crate::config::{LimitOracle, MaceConfig};
use crate::kernel::Kernel;
use crate::mace::cells::Space;
use crate::mace::interp::{interp_from_space, Interp};
use crate::misc::log::targets;
use crate::types::err::{fatal, ErrorKind, LimitError};

/// How one domain size ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SizeOutcome {
    /// The requested number of models was collected.
    MaxModels,

    /// The space was searched out.
    Exhausted,

    Limit(LimitError),
}

struct Decision {
    cell: usize,

    /// Next value to try.
    next_value: usize,

    /// A successful assignment being explored below: (value, trail mark).
    last: Option<(usize, usize)>,
}

impl Space {
    /// Every non-subsumed ground clause must have a true literal, with
    /// arithmetic literals evaluated; non-arithmetic literals must already
    /// be reduced.
    pub fn check_with_arithmetic(&self, k: &Kernel) -> Result<bool, ErrorKind> {
        for clause in &self.mclauses {
            if clause.subsumed {
                continue;
            }
            let mut clause_is_true = false;
            for &lit in &clause.lits {
                if self.true_term(lit) {
                    clause_is_true = true;
                    break;
                }
                if self.false_term(lit) {
                    continue;
                }
                if self.arith.quasi_evaluable(&k.terms, lit) {
                    let value = self.arith.evaluate(&k.terms, lit, self.domain_size);
                    let value = value.map(|b| b != 0).unwrap_or(false);
                    let value = if self.negated(&k.terms, lit) { !value } else { value };
                    if value {
                        clause_is_true = true;
                        break;
                    }
                } else {
                    return Err(fatal(
                        "model reported, but a clause is not reduced",
                    ));
                }
            }
            if !clause_is_true {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The band bound for concentric-band selection: one past the greatest
    /// argument index among assigned cells.
    fn max_constrained(&self) -> isize {
        self.cells
            .iter()
            .filter(|c| c.value.is_some())
            .map(|c| c.max_index)
            .max()
            .unwrap_or(-1)
            + 1
    }
}

/// Searches one prepared space to a verdict; models append to `models`,
/// numbered from `next_number`.
pub fn search_space(
    k: &mut Kernel,
    space: &mut Space,
    cfg: &MaceConfig,
    oracle: &LimitOracle,
    per_size: Option<&LimitOracle>,
    models: &mut Vec<Interp>,
    next_number: &mut usize,
) -> Result<SizeOutcome, ErrorKind> {
    let mut decisions: Vec<Decision> = Vec::new();

    'search: loop {
        if let Some(limit) = oracle.check(k.terms.live_nodes()) {
            return Ok(SizeOutcome::Limit(limit));
        }
        if let Some(per) = per_size {
            if let Some(limit) = per.check(k.terms.live_nodes()) {
                return Ok(SizeOutcome::Limit(limit));
            }
        }

        // Descend: pick the next open cell, or report a model.
        let band = space.max_constrained();
        match space.select_cell(&mut k.terms, cfg.selection_order, cfg.selection_measure, band) {
            Some(cell) => {
                decisions.push(Decision {
                    cell,
                    next_value: 0,
                    last: None,
                });
            }
            None => {
                if space.check_with_arithmetic(k)? {
                    *next_number += 1;
                    let interp =
                        interp_from_space(k, space, *next_number, oracle.elapsed_seconds() as u64)?;
                    log::info!(target: targets::MACE_SEARCH, "Model {} found.", *next_number);
                    if cfg.print_models {
                        println!("{interp}");
                        println!();
                    }
                    models.push(interp);
                    if cfg.max_models >= 0 && models.len() as i64 >= cfg.max_models {
                        return Ok(SizeOutcome::MaxModels);
                    }
                }
                // Enumerate further models (or escape a bad arithmetic
                // valuation) by treating this leaf as exhausted.
            }
        }

        // Resume the deepest decision until one advances.
        loop {
            let depth = decisions.len();
            let decision = match decisions.last_mut() {
                Some(d) => d,
                None => return Ok(SizeOutcome::Exhausted),
            };

            // Coming back up: unwind the explored assignment and cross the
            // value off on this level.
            if let Some((value, mark)) = decision.last.take() {
                let cell = decision.cell;
                space.restore_to(&mut k.terms, mark);
                if space.cells[cell].possible.contains(value) {
                    space.cross_off(cell, value);
                }
            }

            let cell = decision.cell;
            let range = space.cell_range(cell);
            let next = (decision.next_value..range).find(|&v| space.cells[cell].possible.contains(v));

            match next {
                Some(value) => {
                    decision.next_value = value + 1;
                    log::trace!(
                        target: targets::MACE_SEARCH,
                        "depth {depth}: trying cell {cell} = {value}"
                    );
                    match space.assign_and_propagate(&mut k.terms, cell, value) {
                        Ok(mark) => {
                            decision.last = Some((value, mark));
                            continue 'search;
                        }
                        Err(_) => {
                            // The propagation unwound itself; cross the
                            // value off on this level.
                            if space.cells[cell].possible.contains(value) {
                                space.cross_off(cell, value);
                            }
                        }
                    }
                }
                None => {
                    decisions.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mace::Mace;

    #[test]
    fn two_element_model_for_one_constraint() {
        let mut mace = Mace::new(MaceConfig {
            start_size: 2,
            end_size: Some(2),
            max_models: 1,
            print_models: false,
            ..MaceConfig::default()
        });
        mace.add_input_str("f(x) != x.").unwrap();

        let results = mace.search().unwrap();
        assert_eq!(results.models.len(), 1);
        let model = &results.models[0];
        // f swaps the two elements.
        assert_eq!(model.lookup("f", &[0]), Some(1));
        assert_eq!(model.lookup("f", &[1]), Some(0));
    }

    #[test]
    fn unsatisfiable_ground_input_is_exhausted() {
        let mut mace = Mace::new(MaceConfig {
            start_size: 2,
            end_size: Some(3),
            print_models: false,
            ..MaceConfig::default()
        });
        mace.add_input_str("p(a).").unwrap();
        mace.add_input_str("-p(a).").unwrap();

        let results = mace.search().unwrap();
        assert!(results.models.is_empty());
        assert_eq!(results.outcome, crate::mace::MaceOutcome::Exhausted);
    }

    #[test]
    fn model_counting_enumerates_valuations() {
        // p(a) alone over a 2-element domain: a has 2 choices and p one
        // forced row plus one free row: 4 models.
        let mut mace = Mace::new(MaceConfig {
            start_size: 2,
            end_size: Some(2),
            max_models: -1,
            print_models: false,
            ..MaceConfig::default()
        });
        mace.add_input_str("p(a).").unwrap();

        let results = mace.search().unwrap();
        assert_eq!(results.models.len(), 4);
    }
}
