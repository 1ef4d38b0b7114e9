/*!
The model-search CLI.

```sh
mace4 [-f FILE]... [-n START] [-N END] [-i INCR] [-m MODELS] [-t SECONDS] [-s] [-p] [-A]
```

Reads the input files (standard input when none are given) and searches
domain sizes START, START+INCR, … for models, printing each interpretation.

Exit codes: 0 max-models found, 2 exhausted with no model, 3 all models
printed, 4/5 max-seconds reached (with/without a model), 6/7 max-megs
reached, 101 interrupted, 102 fatal error.
*/

use std::io::Read;

use clap::Parser;

use ladr::config::MaceConfig;
use ladr::mace::{Mace, MaceOutcome};
use ladr::types::err::LimitError;

#[derive(Parser)]
#[command(name = "mace4", about = "A finite-model searcher.")]
struct Args {
    /// Input file(s); standard input when absent.
    #[arg(short = 'f')]
    files: Vec<String>,

    /// Starting domain size.
    #[arg(short = 'n', default_value_t = 2)]
    start_size: usize,

    /// Final domain size (unbounded when absent).
    #[arg(short = 'N')]
    end_size: Option<usize>,

    /// Domain size increment.
    #[arg(short = 'i', default_value_t = 1)]
    increment: usize,

    /// Stop after this many models; -1 means all.
    #[arg(short = 'm', default_value_t = 1)]
    max_models: i64,

    /// Overall time budget in seconds.
    #[arg(short = 't')]
    max_seconds: Option<u64>,

    /// Time budget per domain size, in seconds.
    #[arg(short = 'T')]
    max_seconds_per: Option<u64>,

    /// Select skolem-constant cells last.
    #[arg(short = 's')]
    skolems_last: bool,

    /// Print models as they are found.
    #[arg(short = 'p', default_value_t = true)]
    print_models: bool,

    /// Evaluate the built-in arithmetic symbols.
    #[arg(short = 'A')]
    arithmetic: bool,
}

fn main() {
    #[cfg(feature = "log")]
    env_logger::init();

    let args = Args::parse();
    std::process::exit(run(args));
}

fn run(args: Args) -> i32 {
    let config = MaceConfig {
        start_size: args.start_size,
        end_size: args.end_size,
        increment: args.increment,
        max_models: args.max_models,
        max_seconds: args.max_seconds,
        max_seconds_per: args.max_seconds_per,
        skolems_last: args.skolems_last,
        print_models: args.print_models,
        arithmetic: args.arithmetic,
        ..MaceConfig::default()
    };
    let mut mace = Mace::new(config);

    let mut inputs = Vec::new();
    if args.files.is_empty() {
        let mut text = String::new();
        if std::io::stdin().read_to_string(&mut text).is_err() {
            eprintln!("mace4: cannot read standard input");
            return 102;
        }
        inputs.push(text);
    } else {
        for file in &args.files {
            match std::fs::read_to_string(file) {
                Ok(text) => inputs.push(text),
                Err(e) => {
                    eprintln!("mace4: cannot read {file}: {e}");
                    return 102;
                }
            }
        }
    }
    for text in &inputs {
        if let Err(e) = mace.read_input_str(text) {
            eprintln!("mace4: {e:?}");
            return 102;
        }
    }

    let results = match mace.search() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("mace4: {e:?}");
            return 102;
        }
    };

    let found = !results.models.is_empty();
    match results.outcome {
        MaceOutcome::MaxModels => {
            println!("\nExiting with {} model(s).", results.models.len());
            0
        }
        MaceOutcome::AllModels => {
            println!("\nAll requested sizes searched; {} model(s).", results.models.len());
            3
        }
        MaceOutcome::Exhausted => {
            println!("\nNo models found.");
            2
        }
        MaceOutcome::Limit(limit) => {
            println!("\nSEARCH STOPPED: {limit:?}.");
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
