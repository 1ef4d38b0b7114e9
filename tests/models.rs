use ladr::config::MaceConfig;
use ladr::mace::{Mace, MaceOutcome};

fn quiet(config: MaceConfig) -> MaceConfig {
    MaceConfig {
        print_models: false,
        ..config
    }
}

mod group_models {
    use super::*;

    #[test]
    fn klein_four_group() {
        // Commutative, associative, identity, exponent two: at size 4 the
        // first model is the Klein four-group under some labelling.
        let mut mace = Mace::new(quiet(MaceConfig {
            start_size: 4,
            end_size: Some(4),
            max_models: 1,
            ..MaceConfig::default()
        }));
        mace.add_input_str("x * y = y * x.").unwrap();
        mace.add_input_str("x * (y * z) = (x * y) * z.").unwrap();
        mace.add_input_str("x * e = x.").unwrap();
        mace.add_input_str("x * x = e.").unwrap();

        let results = mace.search().unwrap();
        assert_eq!(results.outcome, MaceOutcome::MaxModels);
        assert_eq!(results.models.len(), 1);

        let model = &results.models[0];
        let e = model.lookup("e", &[]).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(
                    model.lookup("*", &[i, j]),
                    model.lookup("*", &[j, i]),
                    "table must be symmetric"
                );
            }
            assert_eq!(model.lookup("*", &[i, i]), Some(e), "exponent two");
            assert_eq!(model.lookup("*", &[i, e]), Some(i), "identity");
        }
    }

    #[test]
    fn no_exponent_two_group_of_size_three() {
        let mut mace = Mace::new(quiet(MaceConfig {
            start_size: 3,
            end_size: Some(3),
            max_models: 1,
            ..MaceConfig::default()
        }));
        mace.add_input_str("x * (y * z) = (x * y) * z.").unwrap();
        mace.add_input_str("x * e = x.").unwrap();
        mace.add_input_str("e * x = x.").unwrap();
        mace.add_input_str("x * x = e.").unwrap();
        // Force at least two elements apart so the identity is not trivial.
        mace.add_input_str("a != e.").unwrap();
        // Cancellation, so the table is a quasigroup.
        mace.add_input_str("x * y != x * z | y = z.").unwrap();

        let results = mace.search().unwrap();
        assert_eq!(results.outcome, MaceOutcome::Exhausted);
        assert!(results.models.is_empty());
    }
}

mod relational_models {
    use super::*;

    #[test]
    fn successor_chain_has_a_model() {
        // p(0), and p propagates two successor steps at a time.
        let mut mace = Mace::new(quiet(MaceConfig {
            start_size: 3,
            end_size: Some(3),
            max_models: 1,
            ..MaceConfig::default()
        }));
        mace.add_input_str("p(0).").unwrap();
        mace.add_input_str("-p(s(x)) | p(s(s(x))).").unwrap();

        let results = mace.search().unwrap();
        assert!(!results.models.is_empty());
    }

    #[test]
    fn negative_propagation_toggles_agree() {
        let problem = ["f(x) != x.", "f(f(x)) = x.", "p(f(a))."];

        let run = |negprop: bool| {
            let mut mace = Mace::new(quiet(MaceConfig {
                start_size: 2,
                end_size: Some(2),
                max_models: -1,
                negprop,
                ..MaceConfig::default()
            }));
            for c in problem {
                mace.add_input_str(c).unwrap();
            }
            mace.search().unwrap().models.len()
        };

        // Negative propagation prunes work, never models.
        assert_eq!(run(true), run(false));
        assert!(run(true) > 0);
    }
}

mod arithmetic_models {
    use super::*;

    #[test]
    fn successor_defined_by_modular_arithmetic() {
        let mut mace = Mace::new(quiet(MaceConfig {
            start_size: 4,
            end_size: Some(4),
            max_models: 1,
            arithmetic: true,
            ..MaceConfig::default()
        }));
        mace.add_input_str("s(x) = (x + 1) mod domain_size.").unwrap();

        let results = mace.search().unwrap();
        assert_eq!(results.models.len(), 1);
        let model = &results.models[0];
        for i in 0..4 {
            assert_eq!(model.lookup("s", &[i]), Some((i + 1) % 4));
        }
    }

    #[test]
    fn unsatisfiable_arithmetic_constraint() {
        // x < x never holds.
        let mut mace = Mace::new(quiet(MaceConfig {
            start_size: 2,
            end_size: Some(3),
            arithmetic: true,
            ..MaceConfig::default()
        }));
        mace.add_input_str("a < a.").unwrap();

        let results = mace.search().unwrap();
        assert!(results.models.is_empty());
    }
}

mod output_format {
    use super::*;

    #[test]
    fn interpretation_shape() {
        let mut mace = Mace::new(quiet(MaceConfig {
            start_size: 2,
            end_size: Some(2),
            max_models: 1,
            ..MaceConfig::default()
        }));
        mace.add_input_str("f(x) != x.").unwrap();
        mace.add_input_str("p(a).").unwrap();

        let results = mace.search().unwrap();
        let text = results.models[0].to_string();
        assert!(text.starts_with("interpretation( 2, [number=1, seconds="));
        assert!(text.contains("function(a, [ "));
        assert!(text.contains("function(f(_), [ "));
        assert!(text.contains("relation(p(_), [ "));
        assert!(text.trim_end().ends_with("])."));
    }
}
