/*!
The kernel: one struct owning the mutable state every component reads and
writes --- the symbol table, the term and clause arenas, the context pool,
and the claimed term-flag bits.

Passing the kernel explicitly (rather than scattering the state across
module-level statics, as the ancestors of this code did) keeps the
single-threaded discipline visible in the signatures: components borrow the
fields they need, exclusively where they mutate.
*/

use crate::parse::{self, VariableStyle};
use crate::structures::clause::{upward_clause_links, Clause, ClauseArena, ClauseId};
use crate::structures::term::{FlagRegistry, TermArena, TermFlag, TermId};
use crate::symbols::SymbolTable;
use crate::types::err::ErrorKind;
use crate::unify::ContextBank;

pub struct Kernel {
    pub symbols: SymbolTable,
    pub terms: TermArena,
    pub clauses: ClauseArena,
    pub contexts: ContextBank,
    pub flags: FlagRegistry,

    /// The "nonbasic" mark of basic paramodulation.
    pub nonbasic: TermFlag,

    /// Variable style used when reading input.
    pub variable_style: VariableStyle,
}

impl Default for Kernel {
    fn default() -> Self {
        let mut flags = FlagRegistry::default();
        let nonbasic = flags.claim();
        Kernel {
            symbols: SymbolTable::default(),
            terms: TermArena::default(),
            clauses: ClauseArena::default(),
            contexts: ContextBank::default(),
            flags,
            nonbasic,
            variable_style: VariableStyle::default(),
        }
    }
}

impl Kernel {
    pub fn new() -> Self {
        Kernel::default()
    }

    /// Parses one clause from text and installs it (no id assigned).
    pub fn parse_clause(&mut self, text: &str) -> Result<ClauseId, ErrorKind> {
        let t = parse::parse_term_str(&mut self.symbols, &mut self.terms, text)
            .map_err(ErrorKind::Parse)?;
        self.install_clause_term(t)
    }

    /// Converts an already-parsed term into an installed clause.
    pub fn install_clause_term(&mut self, t: TermId) -> Result<ClauseId, ErrorKind> {
        let clause =
            parse::term_to_clause(&mut self.symbols, &mut self.terms, t, self.variable_style)?;
        Ok(self.install_clause(clause))
    }

    /// Inserts the clause, sets its container links, and notes each literal's
    /// root symbol as a relation.
    pub fn install_clause(&mut self, clause: Clause) -> ClauseId {
        let id = self.clauses.insert(clause);
        upward_clause_links(&mut self.terms, &self.clauses, id);
        for i in 0..self.clauses[id].literals.len() {
            if let Some(sn) = self.terms.sym(self.clauses[id].literals[i].atom) {
                self.symbols.set_relation(sn);
            }
        }
        id
    }

    pub fn clause_to_string(&self, id: ClauseId) -> String {
        parse::clause_to_string(&self.symbols, &self.terms, &self.clauses[id])
    }

    pub fn term_to_string(&self, t: TermId) -> String {
        parse::term_to_string(&self.symbols, &self.terms, t)
    }
}
