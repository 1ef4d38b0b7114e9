/*!
Configuration of the two engines.

All options live in plain structs with documented fields; `Default` encodes
the standard values.
The input language's `set(flag)`, `clear(flag)` and `assign(parm, value)`
commands go through the string-keyed surface
([set_flag](ProverConfig::set_flag) / [assign_parm](ProverConfig::assign_parm)
and the Mace equivalents); unknown names are reported, and the caller decides
whether that is an error or a warning.

The [LimitOracle] is the clock-and-limits collaborator both search loops poll
at their cooperative tick points.
*/

use crate::types::err::{ErrorKind, LimitError};

/// Options of the saturation prover.
#[derive(Clone, Debug)]
pub struct ProverConfig {
    // Inference rules.
    pub binary_resolution: bool,
    pub pos_hyper_resolution: bool,
    pub neg_hyper_resolution: bool,
    pub ur_resolution: bool,
    pub paramodulation: bool,
    pub factor: bool,

    // Rule policies.
    /// Restrict resolution to maximal literals.
    pub ordered_res: bool,

    /// Restrict paramodulation to maximal literals.
    pub ordered_para: bool,

    /// Recheck maximality on the instantiated parents when a parent has
    /// several maximal literals.
    pub check_res_instances: bool,
    pub check_para_instances: bool,

    /// Only input clauses may serve as UR nuclei.
    pub initial_nuclei: bool,

    /// Cap on the number of clashable literals of a UR nucleus.
    pub ur_nucleus_limit: Option<usize>,

    /// Positive (from/into positive clauses only) paramodulation.
    pub positive_para: bool,

    pub basic_paramodulation: bool,
    pub para_from_vars: bool,
    pub para_into_vars: bool,
    pub para_from_small: bool,

    // Clause processing.
    /// Children heavier than this are discarded.
    pub max_weight: f64,

    pub back_subsume: bool,

    // Default symbol weights and penalties.
    pub variable_weight: f64,
    pub constant_weight: f64,
    pub not_weight: f64,
    pub or_weight: f64,
    pub sk_constant_weight: f64,
    pub prop_atom_weight: f64,
    pub nest_penalty: f64,
    pub depth_penalty: f64,
    pub var_penalty: f64,

    // Limits.
    pub max_seconds: Option<u64>,
    pub max_given: Option<usize>,
    pub max_kept: Option<usize>,
    pub max_megs: Option<usize>,
    pub max_proofs: usize,

    /// Echo derived clauses to stdout.
    pub echo: bool,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig {
            binary_resolution: true,
            pos_hyper_resolution: false,
            neg_hyper_resolution: false,
            ur_resolution: false,
            paramodulation: true,
            factor: true,

            ordered_res: true,
            ordered_para: true,
            check_res_instances: false,
            check_para_instances: false,
            initial_nuclei: false,
            ur_nucleus_limit: None,
            positive_para: false,
            basic_paramodulation: false,
            para_from_vars: true,
            para_into_vars: false,
            para_from_small: false,

            max_weight: 100.0,
            back_subsume: true,

            variable_weight: 1.0,
            constant_weight: 1.0,
            not_weight: 0.0,
            or_weight: 0.0,
            sk_constant_weight: 1.0,
            prop_atom_weight: 1.0,
            nest_penalty: 0.0,
            depth_penalty: 0.0,
            var_penalty: 0.0,

            max_seconds: None,
            max_given: None,
            max_kept: None,
            max_megs: None,
            max_proofs: 1,

            echo: false,
        }
    }
}

impl ProverConfig {
    /// Applies `set(name)` / `clear(name)`.
    pub fn set_flag(&mut self, name: &str, value: bool) -> Result<(), ErrorKind> {
        match name {
            "binary_resolution" => self.binary_resolution = value,
            "pos_hyper_resolution" | "hyper_resolution" => self.pos_hyper_resolution = value,
            "neg_hyper_resolution" => self.neg_hyper_resolution = value,
            "ur_resolution" => self.ur_resolution = value,
            "paramodulation" => self.paramodulation = value,
            "factor" => self.factor = value,
            "ordered_res" => self.ordered_res = value,
            "ordered_para" => self.ordered_para = value,
            "check_res_instances" => self.check_res_instances = value,
            "check_para_instances" => self.check_para_instances = value,
            "initial_nuclei" => self.initial_nuclei = value,
            "positive_para" => self.positive_para = value,
            "basic_paramodulation" => self.basic_paramodulation = value,
            "para_from_vars" => self.para_from_vars = value,
            "para_into_vars" => self.para_into_vars = value,
            "para_from_small" => self.para_from_small = value,
            "back_subsume" => self.back_subsume = value,
            "echo" => self.echo = value,
            _ => return Err(ErrorKind::UnrecognizedOption(name.to_string())),
        }
        Ok(())
    }

    /// Applies `assign(name, value)`.
    pub fn assign_parm(&mut self, name: &str, value: i64) -> Result<(), ErrorKind> {
        match name {
            "max_weight" => self.max_weight = value as f64,
            "max_seconds" => self.max_seconds = positive(value).map(|v| v as u64),
            "max_given" => self.max_given = positive(value),
            "max_kept" => self.max_kept = positive(value),
            "max_megs" => self.max_megs = positive(value),
            "max_proofs" => self.max_proofs = value.max(1) as usize,
            "ur_nucleus_limit" => self.ur_nucleus_limit = positive(value),
            "variable_weight" => self.variable_weight = value as f64,
            "constant_weight" => self.constant_weight = value as f64,
            "not_weight" => self.not_weight = value as f64,
            "or_weight" => self.or_weight = value as f64,
            "sk_constant_weight" => self.sk_constant_weight = value as f64,
            "prop_atom_weight" => self.prop_atom_weight = value as f64,
            "nest_penalty" => self.nest_penalty = value as f64,
            "depth_penalty" => self.depth_penalty = value as f64,
            "var_penalty" => self.var_penalty = value as f64,
            _ => return Err(ErrorKind::UnrecognizedOption(name.to_string())),
        }
        Ok(())
    }
}

fn positive(value: i64) -> Option<usize> {
    if value < 0 {
        None
    } else {
        Some(value as usize)
    }
}

/// Cell selection orders of the model searcher.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectionOrder {
    /// First open cell in id order.
    Linear,

    /// Best open cell among those sharing the first open cell's greatest
    /// argument index.
    Concentric,

    /// Concentric, restricted to cells within the currently-constrained band.
    ConcentricBand,
}

/// Cell scoring during selection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectionMeasure {
    /// No scoring; take the first open cell.
    None,

    MostOccurrences,

    MostPropagations,

    MostContradictions,

    MostCrossed,
}

/// Options of the model searcher.
#[derive(Clone, Debug)]
pub struct MaceConfig {
    pub print_models: bool,
    pub trace: bool,

    // Negative propagation, as a family and per rule.
    pub negprop: bool,
    pub neg_assign: bool,
    pub neg_assign_near: bool,
    pub neg_elim: bool,
    pub neg_elim_near: bool,

    /// Evaluate the built-in arithmetic symbols.
    pub arithmetic: bool,

    pub iterate_primes: bool,
    pub iterate_nonprimes: bool,
    pub skolems_last: bool,

    pub start_size: usize,
    pub end_size: Option<usize>,
    pub increment: usize,

    /// Negative means all models.
    pub max_models: i64,

    pub max_seconds: Option<u64>,
    pub max_seconds_per: Option<u64>,
    pub max_megs: Option<usize>,

    pub selection_order: SelectionOrder,
    pub selection_measure: SelectionMeasure,
}

impl Default for MaceConfig {
    fn default() -> Self {
        MaceConfig {
            print_models: true,
            trace: false,

            negprop: true,
            neg_assign: true,
            neg_assign_near: true,
            neg_elim: true,
            neg_elim_near: true,

            arithmetic: false,

            iterate_primes: false,
            iterate_nonprimes: false,
            skolems_last: false,

            start_size: 2,
            end_size: None,
            increment: 1,

            max_models: 1,

            max_seconds: None,
            max_seconds_per: None,
            max_megs: None,

            selection_order: SelectionOrder::ConcentricBand,
            selection_measure: SelectionMeasure::MostCrossed,
        }
    }
}

impl MaceConfig {
    pub fn set_flag(&mut self, name: &str, value: bool) -> Result<(), ErrorKind> {
        match name {
            "print_models" => self.print_models = value,
            "trace" => self.trace = value,
            "negprop" => self.negprop = value,
            "neg_assign" => self.neg_assign = value,
            "neg_assign_near" => self.neg_assign_near = value,
            "neg_elim" => self.neg_elim = value,
            "neg_elim_near" => self.neg_elim_near = value,
            "arithmetic" => self.arithmetic = value,
            "iterate_primes" => self.iterate_primes = value,
            "iterate_nonprimes" => self.iterate_nonprimes = value,
            "skolems_last" => self.skolems_last = value,
            _ => return Err(ErrorKind::UnrecognizedOption(name.to_string())),
        }
        Ok(())
    }

    pub fn assign_parm(&mut self, name: &str, value: i64) -> Result<(), ErrorKind> {
        match name {
            "domain_size" | "start_size" => self.start_size = value.max(2) as usize,
            "end_size" => self.end_size = positive(value),
            "increment" => self.increment = value.max(1) as usize,
            "max_models" => self.max_models = value,
            "max_seconds" => self.max_seconds = positive(value).map(|v| v as u64),
            "max_seconds_per" => self.max_seconds_per = positive(value).map(|v| v as u64),
            "max_megs" => self.max_megs = positive(value),
            "selection_order" => {
                self.selection_order = match value {
                    0 => SelectionOrder::Linear,
                    1 => SelectionOrder::Concentric,
                    _ => SelectionOrder::ConcentricBand,
                }
            }
            "selection_measure" => {
                self.selection_measure = match value {
                    1 => SelectionMeasure::MostOccurrences,
                    2 => SelectionMeasure::MostPropagations,
                    3 => SelectionMeasure::MostContradictions,
                    4 => SelectionMeasure::MostCrossed,
                    _ => SelectionMeasure::None,
                }
            }
            _ => return Err(ErrorKind::UnrecognizedOption(name.to_string())),
        }
        Ok(())
    }
}

/// The clock-and-limits collaborator.
///
/// Both search loops call [check](LimitOracle::check) at their cooperative
/// tick points and return early with the limit hit, if any.
/// Cancellation (a signal handler, a supervising thread) is modelled by the
/// `cancel` callback, read at the same points.
pub struct LimitOracle {
    start: std::time::Instant,
    pub max_seconds: Option<u64>,
    pub max_megs: Option<usize>,
    pub cancel: Option<Box<dyn Fn() -> bool + Send>>,
}

/// Rough per-node cost used for the memory estimate, in bytes.
const NODE_BYTES: usize = 96;

impl LimitOracle {
    pub fn new(max_seconds: Option<u64>, max_megs: Option<usize>) -> Self {
        LimitOracle {
            start: std::time::Instant::now(),
            max_seconds,
            max_megs,
            cancel: None,
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// The limit hit, if any.
    pub fn check(&self, live_nodes: usize) -> Option<LimitError> {
        if let Some(cancel) = &self.cancel {
            if cancel() {
                return Some(LimitError::Interrupted);
            }
        }
        if let Some(max) = self.max_seconds {
            if self.start.elapsed().as_secs() >= max {
                return Some(LimitError::MaxSeconds);
            }
        }
        if let Some(megs) = self.max_megs {
            if live_nodes * NODE_BYTES > megs * 1024 * 1024 {
                return Some(LimitError::MaxMegs);
            }
        }
        None
    }
}

impl Default for LimitOracle {
    fn default() -> Self {
        LimitOracle::new(None, None)
    }
}
