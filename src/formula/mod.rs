/*!
Quantified formulas and the problem reducer.

The prover proper works on clauses; this module covers the one formula-level
job in scope: turning a denied conjecture into independent subproblems.
A goal is negated, put in negation normal form, and *miniscoped* (quantifiers
pushed inward past connectives they do not govern).
The members of the resulting top-level disjunction are independent denials:
refuting every one of them refutes the original denial.

Clausification in general is out of scope; what is supported here is the
*trivial* tail of it --- dropping outermost universal quantifiers and
replacing existential variables that are under no universal quantifier with
fresh skolem constants.
A goal whose denial still needs proper skolem functions is reported rather
than guessed at.
*/

use crate::kernel::Kernel;
use crate::parse::term_set_variables;
use crate::structures::clause::ClauseId;
use crate::structures::justification::{JustStep, Justification};
use crate::structures::literal::Literal;
use crate::structures::term::{TermArena, TermId, TermKind};
use crate::symbols::{SymbolKind, SymNum};
use crate::types::err::{fatal, ErrorKind};

/// A formula in the usual shape.
#[derive(Clone, Debug)]
pub enum Formula {
    Atom(TermId),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    All(usize, Box<Formula>),
    Exists(usize, Box<Formula>),
}

impl Formula {
    fn negate(self) -> Formula {
        Formula::Not(Box::new(self))
    }
}

/// Converts a parsed term into a formula.
///
/// Free variables (under the kernel's variable style) stay variables;
/// quantified names bind fresh variable indices within their scope.
pub fn term_to_formula(k: &mut Kernel, t: TermId) -> Result<Formula, ErrorKind> {
    term_set_variables(&k.symbols, &mut k.terms, t, k.variable_style);
    let next_var = k.terms.greatest_variable(t).map(|v| v + 1).unwrap_or(0);
    let mut counter = next_var;
    build_formula(k, t, &mut counter)
}

fn build_formula(k: &mut Kernel, t: TermId, counter: &mut usize) -> Result<Formula, ErrorKind> {
    let is = |k: &Kernel, name: &str, arity: usize| k.terms.is_term(&k.symbols, t, name, arity);

    if is(k, "&", 2) {
        let a = build_formula(k, k.terms.arg(t, 0), counter)?;
        let b = build_formula(k, k.terms.arg(t, 1), counter)?;
        Ok(Formula::And(vec![a, b]))
    } else if is(k, "|", 2) {
        let a = build_formula(k, k.terms.arg(t, 0), counter)?;
        let b = build_formula(k, k.terms.arg(t, 1), counter)?;
        Ok(Formula::Or(vec![a, b]))
    } else if is(k, "->", 2) {
        let a = build_formula(k, k.terms.arg(t, 0), counter)?;
        let b = build_formula(k, k.terms.arg(t, 1), counter)?;
        Ok(Formula::Or(vec![a.negate(), b]))
    } else if is(k, "<->", 2) {
        let a = build_formula(k, k.terms.arg(t, 0), counter)?;
        let b = build_formula(k, k.terms.arg(t, 1), counter)?;
        Ok(Formula::And(vec![
            Formula::Or(vec![a.clone().negate(), b.clone()]),
            Formula::Or(vec![b.negate(), a]),
        ]))
    } else if is(k, "-", 1) {
        let a = build_formula(k, k.terms.arg(t, 0), counter)?;
        Ok(a.negate())
    } else if is(k, "all", 2) || is(k, "exists", 2) {
        let universal = is(k, "all", 2);
        let bound = k.terms.arg(t, 0);
        let body = k.terms.arg(t, 1);
        let var = *counter;
        *counter += 1;
        match k.terms.sym(bound) {
            Some(name) if k.terms.is_constant(bound) => {
                subst_const_by_var(&mut k.terms, body, name, var);
            }
            _ => {
                // Style already made the bound name a variable; rebind it.
                if let Some(old) = k.terms.varnum(bound) {
                    subst_var_by_var(&mut k.terms, body, old, var);
                } else {
                    return Err(fatal("quantifier binds a non-name"));
                }
            }
        }
        let inner = build_formula(k, body, counter)?;
        Ok(if universal {
            Formula::All(var, Box::new(inner))
        } else {
            Formula::Exists(var, Box::new(inner))
        })
    } else if is(k, "!=", 2) {
        let a = k.terms.arg(t, 0);
        let b = k.terms.arg(t, 1);
        let a = k.terms.copy_term(a);
        let b = k.terms.copy_term(b);
        let eq = k.symbols.eq_sym();
        let atom = k.terms.binary(eq, a, b);
        Ok(Formula::Not(Box::new(Formula::Atom(atom))))
    } else {
        Ok(Formula::Atom(k.terms.copy_term(t)))
    }
}

fn subst_const_by_var(terms: &mut TermArena, t: TermId, name: SymNum, var: usize) {
    match terms.kind(t).clone() {
        TermKind::Variable(_) => {}
        TermKind::Compound { sym, args } => {
            if args.is_empty() && sym == name {
                *terms.kind_mut(t) = TermKind::Variable(var);
            } else {
                for arg in args {
                    subst_const_by_var(terms, arg, name, var);
                }
            }
        }
    }
}

fn subst_var_by_var(terms: &mut TermArena, t: TermId, old: usize, new: usize) {
    match terms.kind(t).clone() {
        TermKind::Variable(v) if v == old => terms.set_varnum(t, new),
        TermKind::Variable(_) => {}
        TermKind::Compound { args, .. } => {
            for arg in args {
                subst_var_by_var(terms, arg, old, new);
            }
        }
    }
}

/// Negation normal form: negations pushed to the atoms.
pub fn nnf(f: Formula) -> Formula {
    match f {
        Formula::Atom(_) => f,
        Formula::And(fs) => Formula::And(fs.into_iter().map(nnf).collect()),
        Formula::Or(fs) => Formula::Or(fs.into_iter().map(nnf).collect()),
        Formula::All(v, inner) => Formula::All(v, Box::new(nnf(*inner))),
        Formula::Exists(v, inner) => Formula::Exists(v, Box::new(nnf(*inner))),
        Formula::Not(inner) => match *inner {
            Formula::Atom(_) => Formula::Not(inner),
            Formula::Not(g) => nnf(*g),
            Formula::And(fs) => Formula::Or(fs.into_iter().map(|g| nnf(g.negate())).collect()),
            Formula::Or(fs) => Formula::And(fs.into_iter().map(|g| nnf(g.negate())).collect()),
            Formula::All(v, g) => Formula::Exists(v, Box::new(nnf(g.negate()))),
            Formula::Exists(v, g) => Formula::All(v, Box::new(nnf(g.negate()))),
        },
    }
}

fn occurs_free(terms: &TermArena, f: &Formula, var: usize) -> bool {
    match f {
        Formula::Atom(t) => terms.variables(*t).contains(&var),
        Formula::Not(g) => occurs_free(terms, g, var),
        Formula::And(fs) | Formula::Or(fs) => fs.iter().any(|g| occurs_free(terms, g, var)),
        // Quantified variable indices are globally fresh, so shadowing
        // cannot happen here.
        Formula::All(_, g) | Formula::Exists(_, g) => occurs_free(terms, g, var),
    }
}

/// Pushes quantifiers inward: through the connective they distribute over,
/// and past members that do not mention the variable.
pub fn miniscope(terms: &TermArena, f: Formula) -> Formula {
    match f {
        Formula::Atom(_) | Formula::Not(_) => f,
        Formula::And(fs) => Formula::And(fs.into_iter().map(|g| miniscope(terms, g)).collect()),
        Formula::Or(fs) => Formula::Or(fs.into_iter().map(|g| miniscope(terms, g)).collect()),

        Formula::All(v, inner) => {
            let inner = miniscope(terms, *inner);
            match inner {
                // ∀ distributes over ∧.
                Formula::And(fs) => Formula::And(
                    fs.into_iter()
                        .map(|g| miniscope(terms, Formula::All(v, Box::new(g))))
                        .collect(),
                ),
                // ∀x (A ∨ B) with x not in A: A ∨ ∀x B.
                Formula::Or(fs) => split_quantifier(terms, v, fs, true),
                g if !occurs_free(terms, &g, v) => g,
                g => Formula::All(v, Box::new(g)),
            }
        }

        Formula::Exists(v, inner) => {
            let inner = miniscope(terms, *inner);
            match inner {
                // ∃ distributes over ∨.
                Formula::Or(fs) => Formula::Or(
                    fs.into_iter()
                        .map(|g| miniscope(terms, Formula::Exists(v, Box::new(g))))
                        .collect(),
                ),
                Formula::And(fs) => split_quantifier(terms, v, fs, false),
                g if !occurs_free(terms, &g, v) => g,
                g => Formula::Exists(v, Box::new(g)),
            }
        }
    }
}

/// Factors the members not mentioning the variable out of the quantifier.
fn split_quantifier(terms: &TermArena, v: usize, fs: Vec<Formula>, universal: bool) -> Formula {
    let (with, without): (Vec<Formula>, Vec<Formula>) =
        fs.into_iter().partition(|g| occurs_free(terms, g, v));

    let rebuild = |fs: Vec<Formula>| {
        if universal {
            Formula::Or(fs)
        } else {
            Formula::And(fs)
        }
    };

    if with.is_empty() {
        return rebuild(without);
    }
    let quantified = {
        let body = if with.len() == 1 {
            with.into_iter().next().expect("! nonempty")
        } else {
            rebuild(with)
        };
        if universal {
            Formula::All(v, Box::new(body))
        } else {
            Formula::Exists(v, Box::new(body))
        }
    };
    if without.is_empty() {
        quantified
    } else {
        let mut members = without;
        members.push(quantified);
        rebuild(members)
    }
}

/// Negates the conjecture, normalises, miniscopes, and returns the members
/// of the resulting disjunction: independent denied subproblems.
pub fn reduce_problem(k: &mut Kernel, goal: TermId) -> Result<Vec<Formula>, ErrorKind> {
    let f = term_to_formula(k, goal)?;
    let denial = miniscope(&k.terms, nnf(f.negate()));
    Ok(match denial {
        Formula::Or(fs) => fs,
        other => vec![other],
    })
}

/// Clause terms for a denial that needs no proper skolemization: outer
/// universals dropped, top existentials become fresh skolem constants.
/// Fails when the goal splits into several subproblems (run them through
/// [reduce_problem] separately) or genuinely needs skolem functions.
pub fn deny_goal(k: &mut Kernel, goal: TermId) -> Result<Vec<TermId>, ErrorKind> {
    let mut subproblems = reduce_problem(k, goal)?;
    if subproblems.len() != 1 {
        return Err(fatal(format!(
            "goal splits into {} independent subproblems; reduce it first",
            subproblems.len()
        )));
    }
    let denial = subproblems.remove(0);
    subproblem_clauses(k, denial)
}

/// Clause terms of the whole denial, subproblems and all --- what a model
/// search wants, since a counterexample satisfies the full disjunction.
pub fn deny_goal_whole(k: &mut Kernel, goal: TermId) -> Result<Vec<TermId>, ErrorKind> {
    let f = term_to_formula(k, goal)?;
    let denial = miniscope(&k.terms, nnf(f.negate()));
    subproblem_clauses(k, denial)
}

/// Clause terms of one denied subproblem.
pub fn subproblem_clauses(k: &mut Kernel, denial: Formula) -> Result<Vec<TermId>, ErrorKind> {
    let stripped = strip_quantifiers(k, denial, false)?;
    let conjuncts = cnf(stripped)?;
    let mut out = Vec::new();
    for clause in conjuncts {
        out.push(clause_formula_to_term(k, clause)?);
    }
    Ok(out)
}

/// Removes quantifiers: universals are dropped (their variables stay
/// variables), existentials not under a universal become skolem constants.
fn strip_quantifiers(
    k: &mut Kernel,
    f: Formula,
    under_universal: bool,
) -> Result<Formula, ErrorKind> {
    match f {
        Formula::Atom(_) | Formula::Not(_) => Ok(f),
        Formula::And(fs) => Ok(Formula::And(
            fs.into_iter()
                .map(|g| strip_quantifiers(k, g, under_universal))
                .collect::<Result<_, _>>()?,
        )),
        Formula::Or(fs) => Ok(Formula::Or(
            fs.into_iter()
                .map(|g| strip_quantifiers(k, g, under_universal))
                .collect::<Result<_, _>>()?,
        )),
        Formula::All(_, inner) => strip_quantifiers(k, *inner, true),
        Formula::Exists(v, inner) => {
            if under_universal {
                return Err(fatal(
                    "goal denial needs skolem functions; supply a clausal denial",
                ));
            }
            let name = fresh_skolem_name(k);
            let sk = k.symbols.intern(&name, 0);
            k.symbols.set_kind(sk, SymbolKind::Skolem);
            let inner = *inner;
            let replaced = replace_var_with_constant(k, inner, v, sk);
            strip_quantifiers(k, replaced, under_universal)
        }
    }
}

fn fresh_skolem_name(k: &mut Kernel) -> String {
    let mut n = 1;
    loop {
        let name = format!("c{n}");
        if k.symbols.lookup(&name, 0).is_none() {
            return name;
        }
        n += 1;
    }
}

fn replace_var_with_constant(k: &mut Kernel, f: Formula, var: usize, sk: SymNum) -> Formula {
    match f {
        Formula::Atom(t) => {
            replace_in_term(&mut k.terms, t, var, sk);
            Formula::Atom(t)
        }
        Formula::Not(g) => Formula::Not(Box::new(replace_var_with_constant(k, *g, var, sk))),
        Formula::And(fs) => Formula::And(
            fs.into_iter()
                .map(|g| replace_var_with_constant(k, g, var, sk))
                .collect(),
        ),
        Formula::Or(fs) => Formula::Or(
            fs.into_iter()
                .map(|g| replace_var_with_constant(k, g, var, sk))
                .collect(),
        ),
        Formula::All(v, g) => Formula::All(v, Box::new(replace_var_with_constant(k, *g, var, sk))),
        Formula::Exists(v, g) => {
            Formula::Exists(v, Box::new(replace_var_with_constant(k, *g, var, sk)))
        }
    }
}

fn replace_in_term(terms: &mut TermArena, t: TermId, var: usize, sk: SymNum) {
    match terms.kind(t).clone() {
        TermKind::Variable(v) if v == var => {
            *terms.kind_mut(t) = TermKind::Compound {
                sym: sk,
                args: Vec::new(),
            };
        }
        TermKind::Variable(_) => {}
        TermKind::Compound { args, .. } => {
            for arg in args {
                replace_in_term(terms, arg, var, sk);
            }
        }
    }
}

/// Distributes ∨ over ∧: a quantifier-free NNF formula as a list of
/// disjunction lists.
fn cnf(f: Formula) -> Result<Vec<Vec<Formula>>, ErrorKind> {
    match f {
        Formula::Atom(_) | Formula::Not(_) => Ok(vec![vec![f]]),
        Formula::And(fs) => {
            let mut out = Vec::new();
            for g in fs {
                out.extend(cnf(g)?);
            }
            Ok(out)
        }
        Formula::Or(fs) => {
            let mut acc: Vec<Vec<Formula>> = vec![Vec::new()];
            for g in fs {
                let gs = cnf(g)?;
                let mut next = Vec::new();
                for partial in &acc {
                    for conjunct in &gs {
                        let mut merged = partial.clone();
                        merged.extend(conjunct.iter().cloned());
                        next.push(merged);
                    }
                }
                acc = next;
            }
            Ok(acc)
        }
        Formula::All(..) | Formula::Exists(..) => {
            Err(fatal("quantifier survived stripping"))
        }
    }
}

fn clause_formula_to_term(k: &mut Kernel, lits: Vec<Formula>) -> Result<TermId, ErrorKind> {
    let mut parts = Vec::new();
    for lit in lits {
        // Atoms are copied: CNF distribution shares them between clauses,
        // and clauses must not share terms.
        match lit {
            Formula::Atom(t) => {
                let fresh = k.terms.copy_term(t);
                parts.push(Literal::new(true, fresh));
            }
            Formula::Not(inner) => match *inner {
                Formula::Atom(t) => {
                    let fresh = k.terms.copy_term(t);
                    parts.push(Literal::new(false, fresh));
                }
                _ => return Err(fatal("denial literal is not atomic")),
            },
            _ => return Err(fatal("denial literal is not atomic")),
        }
    }
    // Rebuild as a `|`/`-` term so the ordinary clause conversion applies.
    let or = k.symbols.or_sym();
    let not = k.symbols.not_sym();
    let false_sym = k.symbols.false_sym();
    let mut built: Option<TermId> = None;
    for lit in parts.into_iter().rev() {
        let node = if lit.sign {
            lit.atom
        } else {
            k.terms.unary(not, lit.atom)
        };
        built = Some(match built {
            None => node,
            Some(rest) => k.terms.binary(or, node, rest),
        });
    }
    Ok(built.unwrap_or_else(|| k.terms.constant(false_sym)))
}

/// Expands a `distinct([t1, …, tn])` list into the pairwise inequality
/// clauses and installs them.
pub fn distinct_list(k: &mut Kernel, list: TermId) -> Result<Vec<ClauseId>, ErrorKind> {
    let mut members = Vec::new();
    let mut cursor = list;
    loop {
        if k.terms.is_term(&k.symbols, cursor, "$cons", 2) {
            members.push(k.terms.arg(cursor, 0));
            cursor = k.terms.arg(cursor, 1);
        } else if k.terms.is_term(&k.symbols, cursor, "$nil", 0) {
            break;
        } else {
            return Err(fatal("distinct expects a list"));
        }
    }

    let eq = k.symbols.eq_sym();
    let mut out = Vec::new();
    for i in 0..members.len() {
        for j in i + 1..members.len() {
            let a = k.terms.copy_term(members[i]);
            let b = k.terms.copy_term(members[j]);
            let atom = k.terms.binary(eq, a, b);
            let mut clause = crate::structures::clause::Clause::new();
            clause.append_literal(Literal::new(false, atom));
            clause.justification = Justification::new(JustStep::Input);
            out.push(k.install_clause(clause));
        }
    }
    k.terms.zap_term(list);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_term_str;

    #[test]
    fn denial_of_a_universal_goal_uses_skolem_constants() {
        let mut k = Kernel::new();
        let goal = parse_term_str(&mut k.symbols, &mut k.terms, "all a all b (f(a) = f(b)).")
            .unwrap();

        let clauses = deny_goal(&mut k, goal).unwrap();
        assert_eq!(clauses.len(), 1);
        let cid = k.install_clause_term(clauses[0]).unwrap();
        // One negative equality between two fresh skolem constants.
        assert_eq!(k.clauses[cid].literals.len(), 1);
        assert!(!k.clauses[cid].literals[0].sign);
        let atom = k.clauses[cid].literals[0].atom;
        let lhs_sym = k.terms.sym(k.terms.arg(k.terms.arg(atom, 0), 0)).unwrap();
        assert!(k.symbols.is_skolem(lhs_sym));
    }

    #[test]
    fn implication_goal_splits_into_unit_denials() {
        let mut k = Kernel::new();
        let goal = parse_term_str(&mut k.symbols, &mut k.terms, "p(c) -> q(c).").unwrap();

        // Denial of p -> q is p & -q: two unit clauses.
        let clauses = deny_goal(&mut k, goal).unwrap();
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn disjunctive_denial_reports_subproblems() {
        let mut k = Kernel::new();
        // Denial of p(c) & q(d) is -p(c) | -q(d): two independent subproblems.
        let goal = parse_term_str(&mut k.symbols, &mut k.terms, "p(c) & q(d).").unwrap();
        let subproblems = reduce_problem(&mut k, goal).unwrap();
        assert_eq!(subproblems.len(), 2);
        assert!(deny_goal(&mut k, goal).is_err());
    }

    #[test]
    fn miniscope_pushes_universals_through_conjunctions() {
        let mut k = Kernel::new();
        let goal =
            parse_term_str(&mut k.symbols, &mut k.terms, "exists a (p(a) & q(a)).").unwrap();
        // Denial: all a (-p(a) | -q(a)); one subproblem, one clause.
        let clauses = deny_goal(&mut k, goal).unwrap();
        assert_eq!(clauses.len(), 1);
        let cid = k.install_clause_term(clauses[0]).unwrap();
        assert_eq!(k.clauses[cid].literals.len(), 2);
        assert!(k.clauses[cid].literals.iter().all(|l| !l.sign));
    }
}
