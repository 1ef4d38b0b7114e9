/*!
The symbol table.

Every function, relation, and constant symbol is interned here, keyed by (name, arity) --- the same name with two different arities yields two distinct symbols.
A symbol number ([SymNum]) is an index into the table and is stable for the life of the table.

Alongside name and arity a symbol carries:
- a *kind* tag distinguishing ordinary symbols from skolem symbols and from built-ins (equality, boolean constants, arithmetic),
- a *lexical value* used by the term ordering (defaults to insertion order, settable),
- optional *fixity* data (precedence 1..=999 and one of the seven parse types) consulted by the parser and printer,
- for declared attribute symbols, whether instances of the attribute pass from parents to children during inference.

The usual lifecycle is: built-ins at construction, everything else while reading input, no mutation afterwards.
*/

use std::collections::HashMap;

use lasso::{Rodeo, Spur};

/// A symbol number: an index into the symbol table.
pub type SymNum = usize;

/// The kind of a symbol.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolKind {
    /// An ordinary function or relation symbol.
    Ordinary,

    /// A skolem function or constant.
    Skolem,

    /// The equality relation.
    Equality,

    /// A boolean built-in ($T, $F, |, negation).
    Boolean,

    /// An arithmetic built-in (+, *, mod, …).
    Arithmetic,
}

/// How an operator is written in the concrete syntax.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseType {
    /// Binary, non-associative: neither argument may have equal precedence.
    Infix,

    /// Binary, left-associative.
    InfixLeft,

    /// Binary, right-associative.
    InfixRight,

    /// Unary prefix; the argument may have equal precedence.
    Prefix,

    /// Unary prefix; the argument must have lower precedence.
    PrefixParen,

    /// Unary postfix; the argument may have equal precedence.
    Postfix,

    /// Unary postfix; the argument must have lower precedence.
    PostfixParen,
}

impl ParseType {
    /// The arity implied by the parse type.
    pub fn arity(self) -> usize {
        match self {
            ParseType::Infix | ParseType::InfixLeft | ParseType::InfixRight => 2,
            _ => 1,
        }
    }
}

/// Fixity data for a declared operator.
#[derive(Clone, Copy, Debug)]
pub struct ParseProps {
    /// 1..=999; a larger value binds more loosely.
    pub precedence: u16,

    pub parse_type: ParseType,
}

struct SymbolEntry {
    name: Spur,
    arity: usize,
    kind: SymbolKind,
    lex_val: usize,
    parse: Option<ParseProps>,
    /// Some(inheritable) when the symbol has been declared an attribute.
    attribute: Option<bool>,
    /// Set once the symbol has been seen at the root of a literal atom.
    relation: bool,
}

/// The symbol table.
pub struct SymbolTable {
    rodeo: Rodeo,
    by_key: HashMap<(Spur, usize), SymNum>,
    entries: Vec<SymbolEntry>,
    parse_by_name: HashMap<Spur, ParseProps>,

    /// Precedence given to `all x …` / `exists x …` bodies.
    pub quantifier_precedence: u16,

    // Cached built-in symbol numbers.
    eq: SymNum,
    neq: SymNum,
    or: SymNum,
    not: SymNum,
    true_sym: SymNum,
    false_sym: SymNum,
}

impl Default for SymbolTable {
    fn default() -> Self {
        let mut table = SymbolTable {
            rodeo: Rodeo::new(),
            by_key: HashMap::new(),
            entries: Vec::new(),
            parse_by_name: HashMap::new(),
            quantifier_precedence: 750,
            eq: 0,
            neq: 0,
            or: 0,
            not: 0,
            true_sym: 0,
            false_sym: 0,
        };

        table.eq = table.intern("=", 2);
        table.set_kind(table.eq, SymbolKind::Equality);
        table.neq = table.intern("!=", 2);
        table.set_kind(table.neq, SymbolKind::Boolean);
        table.or = table.intern("|", 2);
        table.set_kind(table.or, SymbolKind::Boolean);
        table.not = table.intern("-", 1);
        table.set_kind(table.not, SymbolKind::Boolean);
        table.true_sym = table.intern("$T", 0);
        table.set_kind(table.true_sym, SymbolKind::Boolean);
        table.false_sym = table.intern("$F", 0);
        table.set_kind(table.false_sym, SymbolKind::Boolean);

        // The standard operator declarations.
        table.declare_parse_type("|", 790, ParseType::InfixRight);
        table.declare_parse_type("&", 780, ParseType::InfixRight);
        table.declare_parse_type("->", 775, ParseType::Infix);
        table.declare_parse_type("<->", 775, ParseType::Infix);
        table.declare_parse_type("=", 700, ParseType::Infix);
        table.declare_parse_type("!=", 700, ParseType::Infix);
        table.declare_parse_type("<", 700, ParseType::Infix);
        table.declare_parse_type("<=", 700, ParseType::Infix);
        table.declare_parse_type(">", 700, ParseType::Infix);
        table.declare_parse_type(">=", 700, ParseType::Infix);
        table.declare_parse_type("+", 490, ParseType::InfixRight);
        table.declare_parse_type("*", 470, ParseType::InfixRight);
        table.declare_parse_type("/", 460, ParseType::Infix);
        table.declare_parse_type("mod", 460, ParseType::Infix);
        table.declare_parse_type("-", 510, ParseType::Prefix);

        table.declare_attribute("label", false);
        table.declare_attribute("answer", true);

        table
    }
}

impl SymbolTable {
    /// Interns (name, arity), returning the existing symbol number if the pair is already present.
    pub fn intern(&mut self, name: &str, arity: usize) -> SymNum {
        let spur = self.rodeo.get_or_intern(name);
        if let Some(&sn) = self.by_key.get(&(spur, arity)) {
            return sn;
        }
        let sn = self.entries.len();
        self.entries.push(SymbolEntry {
            name: spur,
            arity,
            kind: SymbolKind::Ordinary,
            lex_val: sn,
            parse: self.parse_by_name.get(&spur).copied().filter(|p| p.parse_type.arity() == arity),
            attribute: None,
            relation: false,
        });
        self.by_key.insert((spur, arity), sn);
        sn
    }

    /// The symbol number of (name, arity), if interned.
    pub fn lookup(&self, name: &str, arity: usize) -> Option<SymNum> {
        let spur = self.rodeo.get(name)?;
        self.by_key.get(&(spur, arity)).copied()
    }

    pub fn name(&self, sn: SymNum) -> &str {
        self.rodeo.resolve(&self.entries[sn].name)
    }

    pub fn arity(&self, sn: SymNum) -> usize {
        self.entries[sn].arity
    }

    /// The current high-water mark of assigned symbol numbers.
    pub fn greatest_symnum(&self) -> SymNum {
        self.entries.len().saturating_sub(1)
    }

    pub fn kind(&self, sn: SymNum) -> SymbolKind {
        self.entries[sn].kind
    }

    pub fn set_kind(&mut self, sn: SymNum, kind: SymbolKind) {
        self.entries[sn].kind = kind;
    }

    pub fn is_skolem(&self, sn: SymNum) -> bool {
        self.entries[sn].kind == SymbolKind::Skolem
    }

    pub fn lex_val(&self, sn: SymNum) -> usize {
        self.entries[sn].lex_val
    }

    pub fn set_lex_val(&mut self, sn: SymNum, val: usize) {
        self.entries[sn].lex_val = val;
    }

    pub fn is_relation(&self, sn: SymNum) -> bool {
        self.entries[sn].relation
    }

    pub fn set_relation(&mut self, sn: SymNum) {
        self.entries[sn].relation = true;
    }

    /// True if `sn` is (name, arity).
    pub fn is_symbol(&self, sn: SymNum, name: &str, arity: usize) -> bool {
        self.arity(sn) == arity && self.name(sn) == name
    }

    // Built-in accessors.

    pub fn eq_sym(&self) -> SymNum {
        self.eq
    }

    pub fn neq_sym(&self) -> SymNum {
        self.neq
    }

    pub fn or_sym(&self) -> SymNum {
        self.or
    }

    pub fn not_sym(&self) -> SymNum {
        self.not
    }

    pub fn true_sym(&self) -> SymNum {
        self.true_sym
    }

    pub fn false_sym(&self) -> SymNum {
        self.false_sym
    }

    pub fn is_eq_symbol(&self, sn: SymNum) -> bool {
        sn == self.eq
    }

    // Fixity.

    /// Declares an operator, interning the symbol at the arity the parse type implies.
    ///
    /// The declaration is keyed by name: a later `intern` of the same name at the
    /// matching arity picks the fixity up.
    pub fn declare_parse_type(&mut self, name: &str, precedence: u16, parse_type: ParseType) -> SymNum {
        let props = ParseProps {
            precedence,
            parse_type,
        };
        let sn = self.intern(name, parse_type.arity());
        let spur = self.entries[sn].name;
        self.parse_by_name.insert(spur, props);
        self.entries[sn].parse = Some(props);
        sn
    }

    /// Fixity of a name, if any symbol with that name has been declared an operator.
    pub fn parse_props(&self, name: &str) -> Option<ParseProps> {
        let spur = self.rodeo.get(name)?;
        self.parse_by_name.get(&spur).copied()
    }

    /// Fixity of a symbol.
    pub fn parse_props_of(&self, sn: SymNum) -> Option<ParseProps> {
        self.entries[sn].parse
    }

    // Attributes.

    /// Declares a unary attribute symbol; inheritable attributes pass to children during inference.
    pub fn declare_attribute(&mut self, name: &str, inheritable: bool) -> SymNum {
        let sn = self.intern(name, 1);
        self.entries[sn].attribute = Some(inheritable);
        sn
    }

    pub fn is_attribute(&self, sn: SymNum) -> bool {
        self.entries[sn].attribute.is_some()
    }

    pub fn attribute_inheritable(&self, sn: SymNum) -> bool {
        self.entries[sn].attribute == Some(true)
    }

    /// If the name is a natural-number numeral, its value.
    pub fn natural(&self, sn: SymNum) -> Option<usize> {
        let name = self.name(sn);
        if self.arity(sn) == 0 && !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            name.parse().ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent_per_arity() {
        let mut table = SymbolTable::default();
        let f2 = table.intern("f", 2);
        let f2_again = table.intern("f", 2);
        let f3 = table.intern("f", 3);
        assert_eq!(f2, f2_again);
        assert_ne!(f2, f3);
        assert_eq!(table.arity(f2), 2);
        assert_eq!(table.arity(f3), 3);
        assert_eq!(table.name(f3), "f");
    }

    #[test]
    fn fixity_by_name() {
        let mut table = SymbolTable::default();
        let props = table.parse_props("+").unwrap();
        assert_eq!(props.precedence, 490);
        assert_eq!(props.parse_type, ParseType::InfixRight);

        // A fresh binary symbol with a declared name picks the fixity up.
        let plus = table.intern("+", 2);
        assert!(table.parse_props_of(plus).is_some());
    }

    #[test]
    fn naturals() {
        let mut table = SymbolTable::default();
        let three = table.intern("3", 0);
        let f = table.intern("f", 1);
        assert_eq!(table.natural(three), Some(3));
        assert_eq!(table.natural(f), None);
    }
}
