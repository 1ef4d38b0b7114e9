use ladr::config::ProverConfig;
use ladr::procedures::saturate::{Prover, ProverReport};
use ladr::proofs::expand::expand_proof;
use ladr::proofs::ivy::{expand_proof_ivy, ivy_proof_to_string};
use ladr::structures::justification::{IvyStep, JustStep};

mod equational_proofs {
    use super::*;

    #[test]
    fn equality_chain() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("a = b.").unwrap();
        prover.add_input_str("b = c.").unwrap();
        prover.add_input_str("a != c.").unwrap();

        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);
    }

    #[test]
    fn rewriting_under_a_function() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("f(x) = x.").unwrap();
        prover.add_input_str("p(f(f(a))).").unwrap();
        prover.add_input_str("-p(a).").unwrap();

        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);
    }
}

mod ivy_expansion {
    use super::*;

    fn ivy_steps(prover: &mut Prover) -> Vec<ladr::structures::clause::ClauseId> {
        let proof = prover.proof().unwrap();
        let k = &mut prover.kernel;
        let expanded = expand_proof(k, &proof).unwrap();
        expand_proof_ivy(k, &expanded).unwrap()
    }

    #[test]
    fn every_step_is_atomic() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("a = b.").unwrap();
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-p(b).").unwrap();
        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);

        let ivy = ivy_steps(&mut prover);
        for &c in &ivy {
            assert!(matches!(
                prover.kernel.clauses[c].justification.primary,
                JustStep::Ivy(_)
            ));
        }
        // The proof ends in the empty clause.
        let last = *ivy.last().unwrap();
        assert!(prover.kernel.clauses[last].is_empty());
    }

    #[test]
    fn expansion_is_stable_on_atomic_proofs() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-p(x) | q(x).").unwrap();
        prover.add_input_str("-q(a).").unwrap();
        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);

        let ivy = ivy_steps(&mut prover);
        let again = {
            let k = &mut prover.kernel;
            expand_proof_ivy(k, &ivy).unwrap()
        };
        // Re-expansion of an atomic proof changes nothing but identity.
        assert_eq!(ivy.len(), again.len());
        for (&a, &b) in ivy.iter().zip(&again) {
            let ka = &prover.kernel.clauses[a];
            let kb = &prover.kernel.clauses[b];
            assert_eq!(
                std::mem::discriminant(&ka.justification.primary),
                std::mem::discriminant(&kb.justification.primary)
            );
        }
    }

    #[test]
    fn instances_precede_resolutions_on_nonground_parents() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("-p(x) | q(x).").unwrap();
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-q(a).").unwrap();
        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);

        let ivy = ivy_steps(&mut prover);
        let k = &prover.kernel;
        assert!(ivy.iter().any(|&c| matches!(
            k.clauses[c].justification.primary,
            JustStep::Ivy(IvyStep::Instance(..))
        )));
        assert!(ivy.iter().any(|&c| matches!(
            k.clauses[c].justification.primary,
            JustStep::Ivy(IvyStep::Resolve(..))
        )));
    }

    #[test]
    fn printed_form_is_a_proof_object() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("-p(a).").unwrap();
        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);

        let ivy = ivy_steps(&mut prover);
        let text = ivy_proof_to_string(&prover.kernel, &ivy).unwrap();
        assert!(text.starts_with(";; BEGINNING OF PROOF OBJECT"));
        assert!(text.contains("(input)"));
        assert!(text.contains("(resolve "));
        assert!(text.trim_end().ends_with(";; END OF PROOF OBJECT"));
    }

    #[test]
    fn ivy_renames_awkward_symbols() {
        let mut prover = Prover::new(ProverConfig::default());
        prover.add_input_str("p(0).").unwrap();
        prover.add_input_str("-p(0).").unwrap();
        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);

        let ivy = ivy_steps(&mut prover);
        let text = ivy_proof_to_string(&prover.kernel, &ivy).unwrap();
        assert!(text.contains("zero_for_ivy"));
        assert!(!text.contains("(p 0)"));
    }
}
