/*!
Ground arithmetic for the model searcher.

A fixed symbol set: binary `+ * / mod min max < <= > >= =`, unary `-` and
`abs`, and the constant `domain_size`.
Values are integers; domain elements evaluate to their index.
`mod` is mathematical modulo --- the result takes the divisor's sign ---
which differs from the machine remainder on negative operands.
Division (or modulo) by zero makes the containing atom *non-evaluable*
rather than an error.
*/

use crate::structures::term::{TermArena, TermId};
use crate::symbols::{SymbolKind, SymbolTable, SymNum};

/// The interned arithmetic symbols; `enabled` off makes every test false,
/// so problems without arithmetic never pay for it.
#[derive(Clone, Debug)]
pub struct ArithSyms {
    pub enabled: bool,

    sum: SymNum,
    prod: SymNum,
    neg: SymNum,
    div: SymNum,
    modulo: SymNum,
    min: SymNum,
    max: SymNum,
    abs: SymNum,
    domain_size_sym: SymNum,

    lt: SymNum,
    le: SymNum,
    gt: SymNum,
    ge: SymNum,
    eq: SymNum,
}

impl ArithSyms {
    pub fn init(symbols: &mut SymbolTable, enabled: bool) -> Self {
        let mut intern_op = |symbols: &mut SymbolTable, name: &str, arity: usize| {
            let sn = symbols.intern(name, arity);
            if enabled {
                symbols.set_kind(sn, SymbolKind::Arithmetic);
            }
            sn
        };
        ArithSyms {
            enabled,
            sum: intern_op(symbols, "+", 2),
            prod: intern_op(symbols, "*", 2),
            neg: intern_op(symbols, "-", 1),
            div: intern_op(symbols, "/", 2),
            modulo: intern_op(symbols, "mod", 2),
            min: intern_op(symbols, "min", 2),
            max: intern_op(symbols, "max", 2),
            abs: intern_op(symbols, "abs", 1),
            domain_size_sym: intern_op(symbols, "domain_size", 0),
            lt: symbols.intern("<", 2),
            le: symbols.intern("<=", 2),
            gt: symbols.intern(">", 2),
            ge: symbols.intern(">=", 2),
            eq: symbols.eq_sym(),
        }
    }

    pub fn is_op(&self, sn: SymNum) -> bool {
        self.enabled
            && (sn == self.sum
                || sn == self.prod
                || sn == self.neg
                || sn == self.div
                || sn == self.modulo
                || sn == self.min
                || sn == self.max
                || sn == self.abs
                || sn == self.domain_size_sym)
    }

    /// Equality is always an evaluable relation --- `0 = 0` must reduce
    /// whether or not the arithmetic symbols are in play.
    pub fn is_rel(&self, sn: SymNum) -> bool {
        sn == self.eq
            || (self.enabled && (sn == self.lt || sn == self.le || sn == self.gt || sn == self.ge))
    }

    pub fn op_term(&self, terms: &TermArena, t: TermId) -> bool {
        matches!(terms.sym(t), Some(sn) if self.is_op(sn))
    }

    pub fn rel_term(&self, terms: &TermArena, t: TermId) -> bool {
        matches!(terms.sym(t), Some(sn) if self.is_rel(sn))
    }

    fn is_arith(&self, terms: &TermArena, t: TermId) -> bool {
        terms.is_variable(t) || self.op_term(terms, t) || self.rel_term(terms, t)
    }

    /// Every node arithmetic, every leaf a number (division by zero aside).
    pub fn quasi_evaluable(&self, terms: &TermArena, t: TermId) -> bool {
        if !self.is_arith(terms, t) {
            false
        } else if terms.is_variable(t) {
            true
        } else {
            terms.args(t).iter().all(|&a| self.quasi_evaluable(terms, a))
        }
    }

    /// Evaluates a ground arithmetic term; None when non-evaluable
    /// (a non-arithmetic subterm, or division by zero).
    pub fn evaluate(&self, terms: &TermArena, t: TermId, domain_size: usize) -> Option<i64> {
        if let Some(n) = terms.varnum(t) {
            return Some(n as i64);
        }
        let sn = terms.sym(t)?;
        if !self.is_op(sn) && !self.is_rel(sn) {
            return None;
        }

        if sn == self.div || sn == self.modulo {
            let d = self.evaluate(terms, terms.arg(t, 1), domain_size)?;
            if d == 0 {
                return None;
            }
            let a = self.evaluate(terms, terms.arg(t, 0), domain_size)?;
            return Some(if sn == self.div { a / d } else { modulo(a, d) });
        }

        if sn == self.neg {
            return Some(-self.evaluate(terms, terms.arg(t, 0), domain_size)?);
        }
        if sn == self.abs {
            return Some(self.evaluate(terms, terms.arg(t, 0), domain_size)?.abs());
        }
        if sn == self.domain_size_sym {
            return Some(domain_size as i64);
        }

        let a = self.evaluate(terms, terms.arg(t, 0), domain_size)?;
        let b = self.evaluate(terms, terms.arg(t, 1), domain_size)?;
        Some(if sn == self.sum {
            a + b
        } else if sn == self.prod {
            a * b
        } else if sn == self.min {
            a.min(b)
        } else if sn == self.max {
            a.max(b)
        } else if sn == self.lt {
            (a < b) as i64
        } else if sn == self.le {
            (a <= b) as i64
        } else if sn == self.gt {
            (a > b) as i64
        } else if sn == self.ge {
            (a >= b) as i64
        } else {
            // =, as an arithmetic relation.
            (a == b) as i64
        })
    }
}

/// Input safety for a domain size: ordinary (non-arithmetic) subterms may
/// not contain arithmetic nodes or numerals outside the domain, and an
/// equality may not pin an ordinary term to an out-of-range numeral.
/// Rejected inputs may become safe at a larger size.
pub fn ok_for_arithmetic(
    k: &crate::kernel::Kernel,
    arith: &ArithSyms,
    clauses: &[crate::structures::clause::ClauseId],
    domain_size: usize,
) -> bool {
    clauses.iter().all(|&cid| {
        k.clauses[cid]
            .literals
            .iter()
            .all(|lit| atom_safe(k, arith, lit.atom, domain_size))
    })
}

fn natural_of(k: &crate::kernel::Kernel, t: TermId) -> Option<usize> {
    k.terms.sym(t).and_then(|sn| k.symbols.natural(sn))
}

fn top_safe(k: &crate::kernel::Kernel, arith: &ArithSyms, t: TermId, n: usize) -> bool {
    if k.terms.is_variable(t) {
        true
    } else if k.terms.is_constant(t) {
        natural_of(k, t).map_or(true, |v| v < n)
    } else {
        !arith.op_term(&k.terms, t) && !arith.rel_term(&k.terms, t)
    }
}

fn all_safe(k: &crate::kernel::Kernel, arith: &ArithSyms, t: TermId, n: usize) -> bool {
    top_safe(k, arith, t, n) && k.terms.args(t).iter().all(|&a| all_safe(k, arith, a, n))
}

fn all_ordinary_nodes_safe(k: &crate::kernel::Kernel, arith: &ArithSyms, t: TermId, n: usize) -> bool {
    if k.terms.is_variable(t) || k.terms.is_constant(t) {
        true
    } else if arith.op_term(&k.terms, t) || arith.rel_term(&k.terms, t) {
        k.terms
            .args(t)
            .iter()
            .all(|&a| all_ordinary_nodes_safe(k, arith, a, n))
    } else {
        all_safe(k, arith, t, n)
    }
}

fn non_arith(k: &crate::kernel::Kernel, arith: &ArithSyms, t: TermId) -> bool {
    if k.terms.is_variable(t) {
        false
    } else if k.terms.is_constant(t) {
        natural_of(k, t).is_none()
    } else {
        !arith.op_term(&k.terms, t) && !arith.rel_term(&k.terms, t)
    }
}

fn atom_safe(k: &crate::kernel::Kernel, arith: &ArithSyms, atom: TermId, n: usize) -> bool {
    if k.terms.sym(atom) == Some(arith.eq) && k.terms.arity(atom) == 2 {
        let a = k.terms.arg(atom, 0);
        let b = k.terms.arg(atom, 1);
        let pins_out_of_range = (non_arith(k, arith, a)
            && natural_of(k, b).map_or(false, |v| v >= n))
            || (non_arith(k, arith, b) && natural_of(k, a).map_or(false, |v| v >= n));
        !pins_out_of_range && all_ordinary_nodes_safe(k, arith, atom, n)
    } else {
        all_ordinary_nodes_safe(k, arith, atom, n)
    }
}

/// Mathematical modulo: the result has the divisor's sign.
///
/// ```text
///   a    b    a/b   a rem b   a mod b
///  14    5     2       4         4
/// -14    5    -2      -4         1
///  14   -5    -2       4        -1
/// -14   -5     2      -4        -4
/// ```
pub fn modulo(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_term_str;

    #[test]
    fn modulo_follows_the_divisor() {
        assert_eq!(modulo(14, 5), 4);
        assert_eq!(modulo(-14, 5), 1);
        assert_eq!(modulo(14, -5), -1);
        assert_eq!(modulo(-14, -5), -4);
    }

    #[test]
    fn evaluation_over_domain_elements() {
        let mut symbols = SymbolTable::default();
        let mut terms = TermArena::default();
        let arith = ArithSyms::init(&mut symbols, true);

        // (2 + 3) * 2, with numbers as domain-element variables.
        let t = {
            let two = terms.variable(2);
            let three = terms.variable(3);
            let sum = parse_sym(&mut symbols, "+");
            let prod = parse_sym(&mut symbols, "*");
            let s = terms.binary(sum, two, three);
            let two2 = terms.variable(2);
            terms.binary(prod, s, two2)
        };
        assert_eq!(arith.evaluate(&terms, t, 4), Some(10));
    }

    #[test]
    fn division_by_zero_is_non_evaluable() {
        let mut symbols = SymbolTable::default();
        let mut terms = TermArena::default();
        let arith = ArithSyms::init(&mut symbols, true);

        let div = parse_sym(&mut symbols, "/");
        let t = {
            let five = terms.variable(5);
            let zero = terms.variable(0);
            terms.binary(div, five, zero)
        };
        assert_eq!(arith.evaluate(&terms, t, 6), None);

        let modulo_sym = symbols.intern("mod", 2);
        let t2 = {
            let five = terms.variable(5);
            let zero = terms.variable(0);
            terms.binary(modulo_sym, five, zero)
        };
        assert_eq!(arith.evaluate(&terms, t2, 6), None);
    }

    #[test]
    fn disabled_arithmetic_sees_nothing() {
        let mut symbols = SymbolTable::default();
        let mut terms = TermArena::default();
        let arith = ArithSyms::init(&mut symbols, false);

        let t = parse_term_str(&mut symbols, &mut terms, "1 + 2.").unwrap();
        assert!(!arith.op_term(&terms, t));
        assert_eq!(arith.evaluate(&terms, t, 4), None);
    }

    fn parse_sym(symbols: &mut SymbolTable, name: &str) -> crate::symbols::SymNum {
        symbols.intern(name, 2)
    }
}
