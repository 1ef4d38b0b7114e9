/*!
Symbolic weighting.

A weight rule is an equation `weight(pattern) = expr`.
The pattern is matched against term nodes top-down (the anonymous variable
`_` matches any subterm without binding); on a match the right side is
evaluated, where `+ * / min max -` combine subexpression weights,
`depth(t)`, `vars(t)` and `weight(t)` measure the matched bindings, and
`call(name, t)` defers to a registered external weight function.

Terms no rule covers get the structural default: leaves weigh their
configured constants, compounds weigh 1 plus their arguments (plus the nest
penalty for directly nested same-symbol operators).
Clause weight adds the per-literal weights, the not/or weights, and the
depth and variable penalties.
*/

use std::collections::HashMap;

use crate::config::ProverConfig;
use crate::kernel::Kernel;
use crate::misc::log::targets;
use crate::structures::clause::{
    literals_depth, negative_literals, number_of_literals, number_of_variables, Clause,
};
use crate::structures::term::{TermArena, TermId};
use crate::symbols::{SymbolTable, SymNum};
use crate::types::err::{fatal, ErrorKind};
use crate::unify::{apply, undo_subst, ContextBank, ContextRef, Trail};

/// An external weight function, keyed by name for `call(name, t)`.
pub type ExternalWeight = Box<dyn Fn(&TermArena, TermId) -> f64>;

struct WeightRule {
    /// The argument of `weight(...)` on the left side.
    pattern: TermId,

    /// The right side.
    beta: TermId,
}

/// Compiled weight rules plus the default weights.
pub struct Weigher {
    rules: Vec<WeightRule>,
    not_rules: bool,
    or_rules: bool,

    variable_weight: f64,
    constant_weight: f64,
    not_weight: f64,
    or_weight: f64,
    sk_constant_weight: f64,
    prop_atom_weight: f64,
    nest_penalty: f64,
    depth_penalty: f64,
    var_penalty: f64,

    sum: SymNum,
    prod: SymNum,
    div: SymNum,
    min: SymNum,
    max: SymNum,
    neg: SymNum,
    depth: SymNum,
    vars: SymNum,
    call: SymNum,
    weight: SymNum,
    avar: SymNum,

    externals: HashMap<String, ExternalWeight>,
}

impl Weigher {
    /// Compiles the rules (each a parsed `weight(...) = expr` equation).
    pub fn init(k: &mut Kernel, cfg: &ProverConfig, rules: &[TermId]) -> Result<Self, ErrorKind> {
        let mut weigher = Weigher {
            rules: Vec::new(),
            not_rules: false,
            or_rules: false,

            variable_weight: cfg.variable_weight,
            constant_weight: cfg.constant_weight,
            not_weight: cfg.not_weight,
            or_weight: cfg.or_weight,
            sk_constant_weight: cfg.sk_constant_weight,
            prop_atom_weight: cfg.prop_atom_weight,
            nest_penalty: cfg.nest_penalty,
            depth_penalty: cfg.depth_penalty,
            var_penalty: cfg.var_penalty,

            sum: k.symbols.intern("+", 2),
            prod: k.symbols.intern("*", 2),
            div: k.symbols.intern("/", 2),
            min: k.symbols.intern("min", 2),
            max: k.symbols.intern("max", 2),
            neg: k.symbols.intern("-", 1),
            depth: k.symbols.intern("depth", 1),
            vars: k.symbols.intern("vars", 1),
            call: k.symbols.intern("call", 2),
            weight: k.symbols.intern("weight", 1),
            avar: k.symbols.intern("_", 0),

            externals: HashMap::new(),
        };

        for &rule in rules {
            weigher.check_rule(k, rule)?;
            let alpha = k.terms.arg(rule, 0); // weight(pattern)
            let pattern = k.terms.arg(alpha, 0);
            let beta = k.terms.arg(rule, 1);
            if k.terms.sym(pattern) == Some(k.symbols.not_sym()) && k.terms.arity(pattern) == 1 {
                weigher.not_rules = true;
            }
            if k.terms.sym(pattern) == Some(k.symbols.or_sym()) && k.terms.arity(pattern) == 2 {
                weigher.or_rules = true;
            }
            weigher.rules.push(WeightRule { pattern, beta });
        }
        Ok(weigher)
    }

    pub fn register_external(&mut self, name: impl Into<String>, f: ExternalWeight) {
        self.externals.insert(name.into(), f);
    }

    fn check_rule(&self, k: &Kernel, rule: TermId) -> Result<(), ErrorKind> {
        if !(k.terms.sym(rule) == Some(k.symbols.eq_sym()) && k.terms.arity(rule) == 2) {
            return Err(fatal("weight rule is not an equation"));
        }
        let alpha = k.terms.arg(rule, 0);
        if !(k.terms.sym(alpha) == Some(self.weight) && k.terms.arity(alpha) == 1) {
            return Err(fatal("weight rule left side must be weight(...)"));
        }
        self.check_beta(k, k.terms.arg(rule, 1))
    }

    fn check_beta(&self, k: &Kernel, b: TermId) -> Result<(), ErrorKind> {
        let sym = k.terms.sym(b);
        if sym == Some(self.sum)
            || sym == Some(self.prod)
            || sym == Some(self.div)
            || sym == Some(self.min)
            || sym == Some(self.max)
        {
            self.check_beta(k, k.terms.arg(b, 0))?;
            self.check_beta(k, k.terms.arg(b, 1))
        } else if sym == Some(self.neg) && k.terms.arity(b) == 1 {
            self.check_beta(k, k.terms.arg(b, 0))
        } else if sym == Some(self.depth)
            || sym == Some(self.vars)
            || sym == Some(self.call)
            || sym == Some(self.weight)
        {
            Ok(())
        } else if term_to_number(&k.terms, &k.symbols, b, self.neg).is_some() {
            Ok(())
        } else {
            Err(fatal("weight rule right side not understood"))
        }
    }

    /// The weight of a term.
    pub fn term_weight(
        &self,
        terms: &mut TermArena,
        bank: &mut ContextBank,
        symbols: &SymbolTable,
        t: TermId,
    ) -> f64 {
        let ctx = bank.get_context();
        let w = self.weigh(terms, bank, symbols, t, ctx);
        bank.free_context(ctx);
        w
    }

    fn weigh(
        &self,
        terms: &mut TermArena,
        bank: &mut ContextBank,
        symbols: &SymbolTable,
        t: TermId,
        ctx: ContextRef,
    ) -> f64 {
        if terms.is_variable(t) {
            return self.variable_weight;
        }

        // Look for a rule to apply.
        for i in 0..self.rules.len() {
            let pattern = self.rules[i].pattern;
            let beta = self.rules[i].beta;
            let mut trail = Trail::new();
            if match_wild(terms, bank, pattern, ctx, t, &mut trail, self.avar) {
                let w = self.calc(terms, bank, symbols, beta, ctx);
                undo_subst(bank, &mut trail);
                return w;
            }
            undo_subst(bank, &mut trail);
        }

        // Nothing matches; the structural default.
        let sym = terms.sym(t).expect("! Weigh: compound without symbol");
        if terms.is_constant(t) {
            if symbols.is_skolem(sym) && self.sk_constant_weight != 1.0 {
                self.sk_constant_weight
            } else if symbols.is_relation(sym) {
                self.prop_atom_weight
            } else {
                self.constant_weight
            }
        } else {
            let args = terms.args(t).to_vec();
            let mut w = 1.0;
            for &arg in &args {
                if self.nest_penalty != 0.0 && args.len() <= 2 && terms.sym(arg) == Some(sym) {
                    w += self.nest_penalty;
                }
                w += self.weigh(terms, bank, symbols, arg, ctx);
            }
            w
        }
    }

    /// Evaluates a rule's right side under the match bindings.
    fn calc(
        &self,
        terms: &mut TermArena,
        bank: &mut ContextBank,
        symbols: &SymbolTable,
        b: TermId,
        ctx: ContextRef,
    ) -> f64 {
        let sym = terms.sym(b);
        if sym == Some(self.weight) && terms.arity(b) == 1 {
            let b_prime = apply(terms, bank, terms.arg(b, 0), Some(ctx));
            let inner = bank.get_context();
            let w = self.weigh(terms, bank, symbols, b_prime, inner);
            bank.free_context(inner);
            terms.zap_term(b_prime);
            w
        } else if sym == Some(self.sum) && terms.arity(b) == 2 {
            self.calc(terms, bank, symbols, terms.arg(b, 0), ctx)
                + self.calc(terms, bank, symbols, terms.arg(b, 1), ctx)
        } else if sym == Some(self.prod) && terms.arity(b) == 2 {
            self.calc(terms, bank, symbols, terms.arg(b, 0), ctx)
                * self.calc(terms, bank, symbols, terms.arg(b, 1), ctx)
        } else if sym == Some(self.div) && terms.arity(b) == 2 {
            self.calc(terms, bank, symbols, terms.arg(b, 0), ctx)
                / self.calc(terms, bank, symbols, terms.arg(b, 1), ctx)
        } else if sym == Some(self.max) && terms.arity(b) == 2 {
            let w1 = self.calc(terms, bank, symbols, terms.arg(b, 0), ctx);
            let w2 = self.calc(terms, bank, symbols, terms.arg(b, 1), ctx);
            w1.max(w2)
        } else if sym == Some(self.min) && terms.arity(b) == 2 {
            let w1 = self.calc(terms, bank, symbols, terms.arg(b, 0), ctx);
            let w2 = self.calc(terms, bank, symbols, terms.arg(b, 1), ctx);
            w1.min(w2)
        } else if sym == Some(self.neg) && terms.arity(b) == 1 {
            -self.calc(terms, bank, symbols, terms.arg(b, 0), ctx)
        } else if sym == Some(self.depth) && terms.arity(b) == 1 {
            apply_depth(terms, bank, terms.arg(b, 0), ctx) as f64
        } else if sym == Some(self.vars) && terms.arity(b) == 1 {
            let b_prime = apply(terms, bank, terms.arg(b, 0), Some(ctx));
            let n = terms.number_of_vars(b_prime);
            terms.zap_term(b_prime);
            n as f64
        } else if sym == Some(self.call) && terms.arity(b) == 2 {
            let name = terms
                .sym(terms.arg(b, 0))
                .map(|sn| symbols.name(sn).to_string())
                .unwrap_or_default();
            let b_prime = apply(terms, bank, terms.arg(b, 1), Some(ctx));
            let w = match self.externals.get(&name) {
                Some(f) => f(terms, b_prime),
                None => {
                    log::warn!(target: targets::SATURATE, "No external weight function {name:?}.");
                    0.0
                }
            };
            terms.zap_term(b_prime);
            w
        } else {
            term_to_number(terms, symbols, b, self.neg).unwrap_or_else(|| {
                log::warn!(target: targets::SATURATE, "Bad weight rule right side.");
                0.0
            })
        }
    }

    /// The weight of a clause.
    pub fn clause_weight(
        &self,
        terms: &mut TermArena,
        bank: &mut ContextBank,
        symbols: &SymbolTable,
        clause: &Clause,
    ) -> f64 {
        let mut wt;
        if !self.not_rules && !self.or_rules {
            wt = 0.0;
            for lit in &clause.literals {
                wt += self.term_weight(terms, bank, symbols, lit.atom);
            }
            wt += negative_literals(clause) as f64 * self.not_weight;
            wt += (number_of_literals(clause).saturating_sub(1)) as f64 * self.or_weight;
        } else {
            // Build a temporary term for the whole clause so OR/NOT rules
            // can see those nodes.
            let temp = lits_to_term(terms, symbols, clause);
            wt = self.term_weight(terms, bank, symbols, temp);
            free_lits_to_term(terms, temp, symbols);

            if !self.not_rules {
                wt += negative_literals(clause) as f64 * (self.not_weight - 1.0);
            }
            if !self.or_rules {
                wt += (number_of_literals(clause).saturating_sub(1)) as f64 * (self.or_weight - 1.0);
            }
        }

        if self.depth_penalty != 0.0 {
            wt += self.depth_penalty * literals_depth(terms, clause) as f64;
        }
        if self.var_penalty != 0.0 {
            wt += self.var_penalty * number_of_variables(terms, clause) as f64;
        }
        wt
    }
}

/// Matching with the anonymous wildcard: `avar` matches any subterm without
/// binding anything.
fn match_wild(
    terms: &TermArena,
    bank: &mut ContextBank,
    pat: TermId,
    ctx: ContextRef,
    t: TermId,
    trail: &mut Trail,
    avar: SymNum,
) -> bool {
    if terms.sym(pat) == Some(avar) && terms.is_constant(pat) {
        return true;
    }
    match terms.varnum(pat) {
        Some(var) => match bank.binding(ctx, var) {
            Some(b) => terms.term_ident(b.term, t),
            None => {
                bank.bind(ctx, var, t, None, trail);
                true
            }
        },
        None => {
            if terms.is_variable(t)
                || terms.sym(pat) != terms.sym(t)
                || terms.arity(pat) != terms.arity(t)
            {
                return false;
            }
            for i in 0..terms.arity(pat) {
                if !match_wild(terms, bank, terms.arg(pat, i), ctx, terms.arg(t, i), trail, avar) {
                    return false;
                }
            }
            true
        }
    }
}

/// Depth of the instance without building it.
fn apply_depth(terms: &TermArena, bank: &ContextBank, t: TermId, ctx: ContextRef) -> usize {
    match terms.varnum(t) {
        Some(var) => match bank.binding(ctx, var) {
            Some(b) => terms.term_depth(b.term),
            None => 0,
        },
        None => {
            if terms.is_constant(t) {
                0
            } else {
                terms
                    .args(t)
                    .iter()
                    .map(|&a| apply_depth(terms, bank, a, ctx))
                    .max()
                    .unwrap_or(0)
                    + 1
            }
        }
    }
}

/// Reads a numeric constant, possibly negated.
fn term_to_number(
    terms: &TermArena,
    symbols: &SymbolTable,
    t: TermId,
    neg: SymNum,
) -> Option<f64> {
    if terms.sym(t) == Some(neg) && terms.arity(t) == 1 {
        return term_to_number(terms, symbols, terms.arg(t, 0), neg).map(|n| -n);
    }
    let sym = terms.sym(t)?;
    if terms.is_constant(t) {
        symbols.name(sym).parse::<f64>().ok()
    } else {
        None
    }
}

/// A temporary OR/NOT term over the clause's atoms (atoms are shared, the
/// OR/NOT skeleton is fresh).
fn lits_to_term(terms: &mut TermArena, symbols: &SymbolTable, clause: &Clause) -> TermId {
    let mut built: Option<TermId> = None;
    for lit in clause.literals.iter().rev() {
        let node = if lit.sign {
            lit.atom
        } else {
            terms.unary(symbols.not_sym(), lit.atom)
        };
        built = Some(match built {
            None => node,
            Some(rest) => terms.binary(symbols.or_sym(), node, rest),
        });
    }
    built.unwrap_or_else(|| terms.constant(symbols.false_sym()))
}

/// Frees only the skeleton built by [lits_to_term].
fn free_lits_to_term(terms: &mut TermArena, t: TermId, symbols: &SymbolTable) {
    let sym = terms.sym(t);
    if sym == Some(symbols.or_sym()) && terms.arity(t) == 2 {
        let a = terms.arg(t, 0);
        let b = terms.arg(t, 1);
        terms.free_node(t);
        free_lits_to_term(terms, a, symbols);
        free_lits_to_term(terms, b, symbols);
    } else if sym == Some(symbols.not_sym()) && terms.arity(t) == 1 {
        terms.free_node(t);
    } else if sym == Some(symbols.false_sym()) {
        terms.free_node(t);
    }
    // Atoms belong to the clause; leave them alone.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_term_str;

    #[test]
    fn default_weight_counts_symbols() {
        let mut k = Kernel::new();
        let cfg = ProverConfig::default();
        let weigher = Weigher::init(&mut k, &cfg, &[]).unwrap();

        let c = k.parse_clause("p(f(x, a)).").unwrap();
        let w = weigher.clause_weight(&mut k.terms, &mut k.contexts, &k.symbols, &k.clauses[c]);
        // p(...) = 1 + f-subterm (1 + var 1 + const 1) = 4.
        assert_eq!(w, 4.0);
    }

    #[test]
    fn rules_override_the_default() {
        let mut k = Kernel::new();
        let cfg = ProverConfig::default();

        let rule = parse_term_str(
            &mut k.symbols,
            &mut k.terms,
            "weight(f(x, _)) = 10 + weight(x).",
        )
        .unwrap();
        crate::parse::term_set_variables(
            &k.symbols,
            &mut k.terms,
            rule,
            crate::parse::VariableStyle::Standard,
        );
        let weigher = Weigher::init(&mut k, &cfg, &[rule]).unwrap();

        let c = k.parse_clause("p(f(g(a), b)).").unwrap();
        let w = weigher.clause_weight(&mut k.terms, &mut k.contexts, &k.symbols, &k.clauses[c]);
        // p adds 1; f(...) matches the rule: 10 + weight(g(a)) = 10 + 2.
        assert_eq!(w, 13.0);
    }

    #[test]
    fn depth_and_var_penalties() {
        let mut k = Kernel::new();
        let cfg = ProverConfig {
            depth_penalty: 100.0,
            var_penalty: 1000.0,
            ..ProverConfig::default()
        };
        let weigher = Weigher::init(&mut k, &cfg, &[]).unwrap();

        let c = k.parse_clause("p(f(x)).").unwrap();
        let w = weigher.clause_weight(&mut k.terms, &mut k.contexts, &k.symbols, &k.clauses[c]);
        // Atom weight 3, depth 2 -> +200, one variable -> +1000.
        assert_eq!(w, 1203.0);
    }
}
