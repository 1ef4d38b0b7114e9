/*!
The prover CLI.

```sh
prover9 [-f FILE]... [-x] [-t SECONDS]
```

Reads the input files (standard input when none are given), runs predicate
elimination and then the given-clause loop, and prints the proof.
With `-x` the proof is also expanded to the atomic Ivy format and printed
as an S-expression proof object.

Exit codes: 0 proof(s) found, 2 set of support exhausted, 4/5 max-seconds
reached (with/without a proof), 6/7 max-megs reached, 101 interrupted,
102 fatal error.
*/

use std::io::Read;

use clap::Parser;

use ladr::procedures::pred_elim::predicate_elimination;
use ladr::procedures::saturate::{Prover, ProverReport};
use ladr::proofs::expand::expand_proof;
use ladr::proofs::ivy::{expand_proof_ivy, ivy_proof_to_string};
use ladr::types::err::LimitError;

#[derive(Parser)]
#[command(name = "prover9", about = "A saturation-based resolution/paramodulation prover.")]
struct Args {
    /// Input file(s); standard input when absent.
    #[arg(short = 'f')]
    files: Vec<String>,

    /// Also print the expanded Ivy proof object.
    #[arg(short = 'x')]
    ivy: bool,

    /// Overall time budget in seconds.
    #[arg(short = 't')]
    max_seconds: Option<u64>,

    /// Skip predicate elimination.
    #[arg(long)]
    no_pred_elim: bool,
}

fn main() {
    #[cfg(feature = "log")]
    env_logger::init();

    let args = Args::parse();
    std::process::exit(run(args));
}

fn run(args: Args) -> i32 {
    let mut prover = Prover::new(ladr::config::ProverConfig::default());
    if args.max_seconds.is_some() {
        prover.config.max_seconds = args.max_seconds;
    }

    // Read the problem.
    let mut inputs = Vec::new();
    if args.files.is_empty() {
        let mut text = String::new();
        if std::io::stdin().read_to_string(&mut text).is_err() {
            eprintln!("prover9: cannot read standard input");
            return 102;
        }
        inputs.push(text);
    } else {
        for file in &args.files {
            match std::fs::read_to_string(file) {
                Ok(text) => inputs.push(text),
                Err(e) => {
                    eprintln!("prover9: cannot read {file}: {e}");
                    return 102;
                }
            }
        }
    }
    for text in &inputs {
        if let Err(e) = prover.read_input_str(text) {
            eprintln!("prover9: {e:?}");
            return 102;
        }
    }

    // Predicate elimination over the whole input; survivors (originals and
    // resolvents alike) drive the search from the set of support.
    if !args.no_pred_elim {
        let all: Vec<_> = prover.sos.iter().chain(prover.usable.iter()).copied().collect();
        let mut disabled = Vec::new();
        match predicate_elimination(&mut prover.kernel, all, &mut disabled, false) {
            Ok(kept) => {
                prover.sos = kept;
                prover.usable = Vec::new();
                prover.disabled.extend(disabled);
            }
            Err(e) => {
                eprintln!("prover9: {e:?}");
                return 102;
            }
        }
    }

    let report = match prover.search() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("prover9: {e:?}");
            return 102;
        }
    };

    match report {
        ProverReport::ProofFound => {
            let proof = match prover.proof() {
                Some(proof) => proof,
                None => {
                    eprintln!("prover9: proof reported but not reconstructible");
                    return 102;
                }
            };
            println!("============ PROOF ============");
            for &c in &proof {
                let clause = &prover.kernel.clauses[c];
                println!(
                    "{} {}.  [{:?}]",
                    clause.id.unwrap_or(0),
                    prover.kernel.clause_to_string(c),
                    clause.justification.primary
                );
            }
            println!("========== END PROOF ==========");

            if args.ivy {
                let k = &mut prover.kernel;
                let printed = expand_proof(k, &proof)
                    .and_then(|expanded| expand_proof_ivy(k, &expanded))
                    .and_then(|ivy| ivy_proof_to_string(k, &ivy));
                match printed {
                    Ok(text) => print!("{text}"),
                    Err(e) => {
                        eprintln!("prover9: {e:?}");
                        return 102;
                    }
                }
            }
            0
        }
        ProverReport::SosEmpty => {
            println!("SEARCH FAILED: set of support empty.");
            2
        }
        ProverReport::Limit(limit) => {
            println!("SEARCH FAILED: {limit:?}.");
            let found = prover.empty_clause().is_some();
            match limit {
                LimitError::MaxSeconds => {
                    if found {
                        4
                    } else {
                        5
                    }
                }
                LimitError::MaxMegs => {
                    if found {
                        6
                    } else {
                        7
                    }
                }
                LimitError::Interrupted => 101,
                _ => 2,
            }
        }
    }
}
