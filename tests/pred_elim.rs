use ladr::config::{MaceConfig, ProverConfig};
use ladr::kernel::Kernel;
use ladr::mace::Mace;
use ladr::procedures::pred_elim::predicate_elimination;
use ladr::procedures::saturate::{Prover, ProverReport};

/// Runs predicate elimination over the clauses and returns the survivors
/// re-rendered as input text.
fn eliminate(clauses: &[&str]) -> Vec<String> {
    let mut k = Kernel::new();
    let ids: Vec<_> = clauses
        .iter()
        .map(|c| k.parse_clause(c).unwrap())
        .collect();
    let mut disabled = Vec::new();
    let kept = predicate_elimination(&mut k, ids, &mut disabled, false).unwrap();
    kept.iter().map(|&c| format!("{}.", k.clause_to_string(c))).collect()
}

fn prover_refutes(clauses: &[String]) -> bool {
    let mut prover = Prover::new(ProverConfig {
        max_given: Some(500),
        ..ProverConfig::default()
    });
    for c in clauses {
        prover.add_input_str(c).unwrap();
    }
    prover.search().unwrap() == ProverReport::ProofFound
}

fn mace_finds_model(clauses: &[String]) -> bool {
    let mut mace = Mace::new(MaceConfig {
        start_size: 2,
        end_size: Some(4),
        max_models: 1,
        print_models: false,
        ..MaceConfig::default()
    });
    for c in clauses {
        mace.add_input_str(c).unwrap();
    }
    !mace.search().unwrap().models.is_empty()
}

mod equisatisfiability {
    use super::*;

    #[test]
    fn satisfiable_stays_satisfiable() {
        let original = [
            "p(x) | -p(f(x)) | q(x).",
            "-q(y) | p(y) | -p(b).",
            "p(c) | -p(d).",
        ];
        let original_strings: Vec<String> = original.iter().map(|c| c.to_string()).collect();
        let reduced = eliminate(&original);

        // q is gone from the reduced set.
        assert!(reduced.iter().all(|c| !c.contains('q')));

        // An independent model search agrees on satisfiability.
        assert!(mace_finds_model(&original_strings));
        assert!(mace_finds_model(&reduced));
    }

    #[test]
    fn unsatisfiable_stays_unsatisfiable() {
        let original = [
            "p(a) | -p(b) | q(a).",
            "-q(x) | p(b) | -p(a).",
            "p(a) | p(b).",
            "-p(a) | p(b).",
            "p(a) | -p(b).",
            "-p(a) | -p(b).",
        ];
        let original_strings: Vec<String> = original.iter().map(|c| c.to_string()).collect();
        let reduced = eliminate(&original);

        assert!(reduced.iter().all(|c| !c.contains('q')));
        assert!(prover_refutes(&original_strings));
        assert!(prover_refutes(&reduced));
    }
}
