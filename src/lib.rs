/*!
A first-order deduction library, backing a saturation-based resolution/paramodulation prover and a finite-model searcher.

The two engines share one data model: interned [symbols](crate::symbols), [terms](crate::structures::term) held in an arena and addressed by handles, and [clauses](crate::structures::clause) whose derivations are recorded as [justifications](crate::structures::justification).

# Orientation

At a high level:
- A problem is a set of clauses, read through the [parser](crate::parse) or built programmatically.
- The [prover](crate::procedures::saturate) runs a given-clause loop: clauses are selected from the set of support by [weight](crate::procedures::weight), inference rules ([resolution](crate::procedures::resolve), [hyper/UR clashes](crate::procedures::clash), [paramodulation](crate::procedures::paramod), [factoring](crate::procedures::factor)) are applied against the usable set through [retrieval indexes](crate::index), and survivors are kept until the empty clause appears or the set of support runs dry.
- A derivation of the empty clause is reconstructed as a [proof](crate::proofs), which may be expanded step by step down to the atomic Ivy format.
- The [model searcher](crate::mace) grounds the same clauses over a finite domain and runs a propagate/select/backtrack search over a cell table, one cell per ground function or relation entry.

Useful starting points:
- [unify](crate::unify) for the binding environments (contexts with variable-renaming multipliers) and trails everything above is built on.
- [procedures::saturate](crate::procedures::saturate) for the prover's main loop.
- [mace::search](crate::mace::search) for the model searcher's main loop.
- [config](crate::config) for the options both engines read.

# Example

Refute `p(a). -p(a).`:

```rust
use ladr::config::ProverConfig;
use ladr::procedures::saturate::{Prover, ProverReport};

let mut prover = Prover::new(ProverConfig::default());
prover.add_input_str("p(a).").unwrap();
prover.add_input_str("-p(a).").unwrap();

let report = prover.search().unwrap();
assert!(matches!(report, ProverReport::ProofFound));
assert!(prover.proof().is_some());
```

# Logs

Calls to [log!](log) are made throughout, with targets listed in [misc::log] so output can be narrowed to one subsystem, e.g. `RUST_LOG=mace_propagate …` with [env_logger](https://docs.rs/env_logger/latest/env_logger/).
*/

#![allow(clippy::collapsible_else_if)]
#![allow(clippy::single_match)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod kernel;
pub mod misc;
pub mod types;

pub mod symbols;

pub mod structures;

pub mod unify;

pub mod order;

pub mod index;

pub mod parse;

pub mod formula;

pub mod procedures;

pub mod proofs;

pub mod mace;
