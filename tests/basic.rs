use ladr::config::ProverConfig;
use ladr::procedures::saturate::{Prover, ProverReport};

mod refutation {
    use super::*;

    #[test]
    fn unit_conflict() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-p(a).").unwrap();

        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);

        let proof = prover.proof().unwrap();
        assert_eq!(proof.len(), 3);
        assert!(prover.kernel.clauses[*proof.last().unwrap()].is_empty());
    }

    #[test]
    fn reflexivity_denial() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("x = x.").unwrap();
        prover.add_input_str("a != a.").unwrap();

        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);
    }

    #[test]
    fn modus_ponens_chain() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-p(x) | q(f(x)).").unwrap();
        prover.add_input_str("-q(x) | r(x).").unwrap();
        prover.add_input_str("-r(f(a)).").unwrap();

        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);
    }

    #[test]
    fn satisfiable_set_exhausts() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("q(b).").unwrap();
        prover.add_input_str("-r(c).").unwrap();

        assert_eq!(prover.search().unwrap(), ProverReport::SosEmpty);
    }

    #[test]
    fn proof_parents_precede_children() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-p(x) | q(x).").unwrap();
        prover.add_input_str("-q(a).").unwrap();

        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);
        let proof = prover.proof().unwrap();

        let mut seen = Vec::new();
        for &c in &proof {
            let clause = &prover.kernel.clauses[c];
            for parent in clause.justification.parents() {
                assert!(seen.contains(&parent), "parent {parent} after child");
            }
            seen.push(clause.id.unwrap());
        }
    }
}

mod input_language {
    use super::*;

    #[test]
    fn full_input_files() {
        let mut prover = Prover::new(ProverConfig::default());
        prover
            .read_input_str(
                "
                assign(max_given, 200).
                formulas(usable).
                  -p(x) | q(x).
                end_of_list.
                formulas(sos).
                  p(a).
                  -q(a).
                end_of_list.
                ",
            )
            .unwrap();

        assert_eq!(prover.config.max_given, Some(200));
        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);
    }

    #[test]
    fn goal_denial() {
        let mut prover = Prover::new(ProverConfig::default());
        prover
            .read_input_str(
                "
                formulas(sos).
                  p(c).
                end_of_list.
                formulas(goals).
                  exists x p(x).
                end_of_list.
                ",
            )
            .unwrap();

        // Denial: all x -p(x); resolves with p(c).
        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);
    }

    #[test]
    fn unknown_options_are_warnings() {
        let mut prover = Prover::new(ProverConfig::default());
        prover
            .read_input_str(
                "
                set(no_such_flag).
                formulas(sos).
                  p(a).
                end_of_list.
                ",
            )
            .unwrap();
        assert_eq!(prover.sos.len(), 1);
    }
}
