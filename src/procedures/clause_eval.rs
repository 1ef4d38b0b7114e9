/*!
Clause-evaluation rules.

A rule is a boolean term over clause predicates (`positive`, `horn`,
`unit`, `has_equality`, `initial`, `resolvent`, …) and arithmetic
comparisons on clause measures (`weight < 20`, `literals = 1`, …),
combined with `&`, `|` and `-`.
[compile] turns the parsed term into an evaluator once; evaluation is then
a cheap walk.
*/

use crate::kernel::Kernel;
use crate::structures::clause::{
    contains_eq, definite_clause, horn_clause, literals_depth, mixed_clause, negative_clause,
    number_of_literals, number_of_variables, positive_clause, unit_clause, Clause, Semantics,
};
use crate::structures::justification::JustStep;
use crate::structures::term::{TermArena, TermId};
use crate::symbols::SymbolTable;

/// One comparison operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Relation {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
}

/// Which measure a comparison reads.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Measure {
    Weight,
    Variables,
    Depth,
    Literals,
    Level,
}

/// A compiled rule.
#[derive(Clone, Debug)]
pub enum ClauseEval {
    And(Box<ClauseEval>, Box<ClauseEval>),
    Or(Box<ClauseEval>, Box<ClauseEval>),
    Not(Box<ClauseEval>),

    All,
    Positive,
    Negative,
    Mixed,

    Hint,

    True,
    False,

    HasEquality,
    Horn,
    Definite,
    Unit,

    Initial,
    Resolvent,
    HyperResolvent,
    UrResolvent,
    Factor,
    Paramodulant,
    BackDemodulant,
    Subsumer,

    Compare(Measure, Relation, f64),
}

/// Compiles a parsed rule term; None when the term is not a rule.
pub fn compile(symbols: &SymbolTable, arena: &TermArena, t: TermId) -> Option<ClauseEval> {
    let is = |name: &str, arity: usize| arena.is_term(symbols, t, name, arity);

    if is("&", 2) {
        let left = compile(symbols, arena, arena.arg(t, 0))?;
        let right = compile(symbols, arena, arena.arg(t, 1))?;
        return Some(ClauseEval::And(Box::new(left), Box::new(right)));
    }
    if is("|", 2) {
        let left = compile(symbols, arena, arena.arg(t, 0))?;
        let right = compile(symbols, arena, arena.arg(t, 1))?;
        return Some(ClauseEval::Or(Box::new(left), Box::new(right)));
    }
    if is("-", 1) {
        let inner = compile(symbols, arena, arena.arg(t, 0))?;
        return Some(ClauseEval::Not(Box::new(inner)));
    }

    for (name, eval) in [
        ("all", ClauseEval::All),
        ("positive", ClauseEval::Positive),
        ("negative", ClauseEval::Negative),
        ("mixed", ClauseEval::Mixed),
        ("hint", ClauseEval::Hint),
        ("true", ClauseEval::True),
        ("false", ClauseEval::False),
        ("has_equality", ClauseEval::HasEquality),
        ("horn", ClauseEval::Horn),
        ("definite", ClauseEval::Definite),
        ("unit", ClauseEval::Unit),
        ("initial", ClauseEval::Initial),
        ("resolvent", ClauseEval::Resolvent),
        ("hyper_resolvent", ClauseEval::HyperResolvent),
        ("ur_resolvent", ClauseEval::UrResolvent),
        ("factor", ClauseEval::Factor),
        ("paramodulant", ClauseEval::Paramodulant),
        ("back_demodulant", ClauseEval::BackDemodulant),
        ("subsumer", ClauseEval::Subsumer),
    ] {
        if is(name, 0) {
            return Some(eval);
        }
    }

    let relation = if is("<", 2) {
        Relation::Less
    } else if is(">", 2) {
        Relation::Greater
    } else if is("<=", 2) {
        Relation::LessEqual
    } else if is(">=", 2) {
        Relation::GreaterEqual
    } else if is("=", 2) {
        Relation::Equal
    } else {
        return None;
    };

    let a0 = arena.arg(t, 0);
    let measure = if arena.is_term(symbols, a0, "weight", 0) {
        Measure::Weight
    } else if arena.is_term(symbols, a0, "variables", 0) {
        Measure::Variables
    } else if arena.is_term(symbols, a0, "depth", 0) {
        Measure::Depth
    } else if arena.is_term(symbols, a0, "literals", 0) {
        Measure::Literals
    } else if arena.is_term(symbols, a0, "level", 0) {
        Measure::Level
    } else {
        return None;
    };

    let a1 = arena.arg(t, 1);
    let value = arena
        .sym(a1)
        .filter(|_| arena.is_constant(a1))
        .and_then(|sn| symbols.name(sn).parse::<f64>().ok())?;

    Some(ClauseEval::Compare(measure, relation, value))
}

/// Evaluates a compiled rule on a clause.
pub fn eval(k: &Kernel, rule: &ClauseEval, clause: &Clause) -> bool {
    match rule {
        ClauseEval::And(a, b) => eval(k, a, clause) && eval(k, b, clause),
        ClauseEval::Or(a, b) => eval(k, a, clause) || eval(k, b, clause),
        ClauseEval::Not(a) => !eval(k, a, clause),

        ClauseEval::All => true,
        ClauseEval::Positive => positive_clause(clause),
        ClauseEval::Negative => negative_clause(clause),
        ClauseEval::Mixed => mixed_clause(clause),

        ClauseEval::Hint => clause.matching_hint,

        ClauseEval::True => {
            clause.semantics == Semantics::True || clause.semantics == Semantics::NotEvaluated
        }
        ClauseEval::False => clause.semantics == Semantics::False,

        ClauseEval::HasEquality => contains_eq(&k.terms, &k.symbols, clause),
        ClauseEval::Horn => horn_clause(clause),
        ClauseEval::Definite => definite_clause(clause),
        ClauseEval::Unit => unit_clause(clause),

        ClauseEval::Initial => clause.initial,
        ClauseEval::Resolvent => {
            matches!(clause.justification.primary, JustStep::BinaryRes { .. })
        }
        ClauseEval::HyperResolvent => {
            matches!(clause.justification.primary, JustStep::HyperRes { .. })
        }
        ClauseEval::UrResolvent => matches!(clause.justification.primary, JustStep::UrRes { .. }),
        ClauseEval::Factor => matches!(clause.justification.primary, JustStep::Factor { .. }),
        ClauseEval::Paramodulant => {
            matches!(clause.justification.primary, JustStep::Paramod { .. })
        }
        ClauseEval::BackDemodulant => false, // no demodulation engine
        ClauseEval::Subsumer => clause.subsumer,

        ClauseEval::Compare(measure, relation, bound) => {
            let value = match measure {
                Measure::Weight => clause.weight,
                Measure::Variables => number_of_variables(&k.terms, clause) as f64,
                Measure::Depth => literals_depth(&k.terms, clause) as f64,
                Measure::Literals => number_of_literals(clause) as f64,
                Measure::Level => clause.level as f64,
            };
            match relation {
                Relation::Less => value < *bound,
                Relation::LessEqual => value <= *bound,
                Relation::Greater => value > *bound,
                Relation::GreaterEqual => value >= *bound,
                Relation::Equal => value == *bound,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_term_str;

    #[test]
    fn compile_and_evaluate() {
        let mut k = Kernel::new();
        let rule_term = parse_term_str(
            &mut k.symbols,
            &mut k.terms,
            "horn & literals <= 2 & -has_equality.",
        )
        .unwrap();
        let rule = compile(&k.symbols, &k.terms, rule_term).expect("rule compiles");

        let yes = k.parse_clause("p(a) | -q(a).").unwrap();
        let no = k.parse_clause("a = b.").unwrap();
        assert!(eval(&k, &rule, &k.clauses[yes]));
        assert!(!eval(&k, &rule, &k.clauses[no]));
    }

    #[test]
    fn unknown_terms_do_not_compile() {
        let mut k = Kernel::new();
        let t = parse_term_str(&mut k.symbols, &mut k.terms, "frobnicate.").unwrap();
        assert!(compile(&k.symbols, &k.terms, t).is_none());
    }
}
