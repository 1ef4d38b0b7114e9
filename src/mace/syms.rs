/*!
Mace symbol descriptors.

Each function and relation symbol of the problem gets a descriptor carrying
its *base*: the offset of its block in the global cell array.
With domain size `n`, a symbol of arity `a` owns `n^a` consecutive cells,
and the cell of `f(i_1,…,i_a)` is found positionally:
`base + Σ_k i_k · n^(a-1-k)`.
Descriptors are ordered by (arity, lex value, symbol number), so constants
come first and runs are reproducible.
*/

use std::collections::HashMap;

use crate::kernel::Kernel;
use crate::mace::arith::ArithSyms;
use crate::structures::clause::ClauseId;
use crate::structures::term::TermId;
use crate::symbols::SymNum;
use crate::types::err::{fatal, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MaceSymKind {
    Function,
    Relation,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MaceSymAttr {
    Ordinary,
    Equality,
    Skolem,
}

#[derive(Clone, Debug)]
pub struct MaceSymbol {
    pub sn: SymNum,
    pub arity: usize,
    pub kind: MaceSymKind,
    pub attr: MaceSymAttr,

    /// Offset of the symbol's cell block.
    pub base: usize,

    /// Index of this descriptor (the "mace symbol number").
    pub mace_sn: usize,
}

pub fn int_power(n: usize, exp: usize) -> usize {
    n.pow(exp as u32)
}

/// Collects the function and relation symbols of the clauses, ordered and
/// based. Returns the descriptors, the symbol-number map, and the greatest
/// numeral seen (numerals name domain elements, not symbols).
pub fn collect_symbols(
    k: &Kernel,
    clauses: &[ClauseId],
    arith: &ArithSyms,
    domain_size: usize,
) -> Result<(Vec<MaceSymbol>, HashMap<SymNum, usize>, Option<usize>), ErrorKind> {
    let mut fsyms: Vec<SymNum> = Vec::new();
    let mut rsyms: Vec<SymNum> = Vec::new();
    let mut max_natural: Option<usize> = None;

    for &cid in clauses {
        for lit in &k.clauses[cid].literals {
            let root = k
                .terms
                .sym(lit.atom)
                .ok_or_else(|| fatal("mace: variable literal atom"))?;
            if k.symbols.natural(root).is_some() {
                return Err(fatal("mace: relation symbol is a domain element"));
            }
            if !k.symbols.is_eq_symbol(root) && !arith.is_rel(root) && !rsyms.contains(&root) {
                rsyms.push(root);
            }
            for &arg in k.terms.args(lit.atom) {
                collect_fsyms(k, arith, arg, &mut fsyms, &mut max_natural);
            }
        }
    }

    let mut all: Vec<(SymNum, MaceSymKind)> = fsyms
        .into_iter()
        .map(|sn| (sn, MaceSymKind::Function))
        .chain(rsyms.into_iter().map(|sn| (sn, MaceSymKind::Relation)))
        .collect();
    all.sort_by_key(|&(sn, _)| (k.symbols.arity(sn), k.symbols.lex_val(sn), sn));

    let mut symbols = Vec::new();
    let mut map = HashMap::new();
    let mut base = 0;
    for (mace_sn, (sn, kind)) in all.into_iter().enumerate() {
        let arity = k.symbols.arity(sn);
        let attr = if k.symbols.is_skolem(sn) {
            MaceSymAttr::Skolem
        } else {
            MaceSymAttr::Ordinary
        };
        symbols.push(MaceSymbol {
            sn,
            arity,
            kind,
            attr,
            base,
            mace_sn,
        });
        map.insert(sn, mace_sn);
        base += int_power(domain_size, arity);
    }

    Ok((symbols, map, max_natural))
}

fn collect_fsyms(
    k: &Kernel,
    arith: &ArithSyms,
    t: TermId,
    fsyms: &mut Vec<SymNum>,
    max_natural: &mut Option<usize>,
) {
    let sn = match k.terms.sym(t) {
        Some(sn) => sn,
        None => return, // a variable
    };
    if let Some(n) = k.symbols.natural(sn) {
        *max_natural = Some(max_natural.map_or(n, |m| m.max(n)));
    } else if arith.is_op(sn) {
        // Arithmetic operations get no cells.
    } else if !fsyms.contains(&sn) {
        fsyms.push(sn);
    }
    for &arg in k.terms.args(t) {
        collect_fsyms(k, arith, arg, fsyms, max_natural);
    }
}

impl MaceSymbol {
    /// Cell id of this symbol applied to the given domain elements.
    pub fn encode(&self, indices: &[usize], domain_size: usize) -> usize {
        let mut id = self.base;
        let mut mult = 1;
        for &i in indices.iter().rev() {
            id += i * mult;
            mult *= domain_size;
        }
        id
    }

    /// The argument indices of a cell id in this symbol's block.
    pub fn decode(&self, id: usize, domain_size: usize) -> Vec<usize> {
        let mut x = id - self.base;
        let mut indices = vec![0; self.arity];
        for slot in indices.iter_mut().rev() {
            *slot = x % domain_size;
            x /= domain_size;
        }
        indices
    }

    /// The greatest argument index of the cell; None for constants.
    pub fn max_index(&self, id: usize, domain_size: usize) -> Option<usize> {
        self.decode(id, domain_size).into_iter().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MaceSymbol {
        MaceSymbol {
            sn: 0,
            arity: 2,
            kind: MaceSymKind::Function,
            attr: MaceSymAttr::Ordinary,
            base: 10,
            mace_sn: 0,
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let sym = sample();
        let n = 4;
        for i in 0..n {
            for j in 0..n {
                let id = sym.encode(&[i, j], n);
                assert_eq!(sym.decode(id, n), vec![i, j]);
                assert_eq!(sym.max_index(id, n), Some(i.max(j)));
            }
        }
        assert_eq!(sym.encode(&[0, 0], 4), 10);
        assert_eq!(sym.encode(&[1, 2], 4), 10 + 4 + 2);
    }
}
