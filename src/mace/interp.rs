/*!
Interpretation output.

A model is reported as
`interpretation(N, [number=K, seconds=T], [ function(f(_,_), [...]), relation(p(_), [...]) ]).`
with every table flattened row-major in argument order --- exactly the cell
block of the symbol in id order.
*/

use crate::kernel::Kernel;
use crate::mace::cells::Space;
use crate::mace::syms::{int_power, MaceSymKind};
use crate::types::err::{fatal, ErrorKind};

/// One symbol's table.
#[derive(Clone, Debug)]
pub struct InterpEntry {
    pub name: String,
    pub arity: usize,
    pub function: bool,

    /// Row-major values, one per cell of the symbol's block.
    pub table: Vec<usize>,
}

/// A reported model.
#[derive(Clone, Debug)]
pub struct Interp {
    pub domain_size: usize,

    /// 1-based model number across the whole run.
    pub number: usize,

    pub seconds: u64,

    pub entries: Vec<InterpEntry>,
}

/// Reads the (fully assigned) cell table off as a model.
pub fn interp_from_space(
    k: &Kernel,
    space: &Space,
    number: usize,
    seconds: u64,
) -> Result<Interp, ErrorKind> {
    let mut entries = Vec::new();
    for sym in &space.symbols {
        let block = int_power(space.domain_size, sym.arity);
        let mut table = Vec::with_capacity(block);
        for offset in 0..block {
            let value = space.cells[sym.base + offset]
                .value
                .ok_or_else(|| fatal("model reported with an open cell"))?;
            table.push(value);
        }
        entries.push(InterpEntry {
            name: k.symbols.name(sym.sn).to_string(),
            arity: sym.arity,
            function: sym.kind == MaceSymKind::Function,
            table,
        });
    }
    Ok(Interp {
        domain_size: space.domain_size,
        number,
        seconds,
        entries,
    })
}

impl std::fmt::Display for Interp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "interpretation( {}, [number={}, seconds={}], [",
            self.domain_size, self.number, self.seconds
        )?;
        for (i, entry) in self.entries.iter().enumerate() {
            let kind = if entry.function { "function" } else { "relation" };
            let head = if entry.arity == 0 {
                entry.name.clone()
            } else {
                let blanks = vec!["_"; entry.arity].join(",");
                format!("{}({})", entry.name, blanks)
            };
            let values = entry
                .table
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let sep = if i + 1 == self.entries.len() { "" } else { "," };
            writeln!(f, "        {kind}({head}, [ {values} ]){sep}")?;
        }
        write!(f, "]).")
    }
}

impl Interp {
    /// Value of `name(args…)` in the model.
    pub fn lookup(&self, name: &str, args: &[usize]) -> Option<usize> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name && e.arity == args.len())?;
        let mut index = 0;
        for &a in args {
            index = index * self.domain_size + a;
        }
        entry.table.get(index).copied()
    }
}
