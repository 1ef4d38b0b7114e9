/*!
The mixfix reader and printer.

The concrete syntax is driven entirely by the symbol table's operator
declarations: precedences 1..=999 (larger binds more loosely) and the seven
parse types.
Beyond operators the reader knows:
- names (`[a-zA-Z0-9_$]+`), runs of special characters, and quoted symbols,
- `%` line comments,
- list sugar `[a,b,c]` and `[h:t]` over the `$cons`/`$nil` constructors,
- quantified subformulas `all x F` / `exists x F`, read at the table's
  quantifier precedence,
- input files as `formulas(<list>). … end_of_list.` blocks plus `set(f).`,
  `clear(f).` and `assign(p, v).` commands.

Variables are recognised only when a term is converted for use as a clause
or formula, under one of the two [styles](VariableStyle): Prolog
(uppercase-initial names) or standard (`x y z u v w` and `v6`, `v7`, …).
The printer inverts the reader closely enough that proofs and models
re-parse.
*/

use crate::structures::clause::Clause;
use crate::structures::literal::Literal;
use crate::structures::term::{TermArena, TermId, TermKind};
use crate::symbols::{ParseType, SymbolTable};
use crate::types::err::{ErrorKind, ParseError};

/// How variable names are recognised.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum VariableStyle {
    /// `x y z u v w` and `v` followed by digits.
    #[default]
    Standard,

    /// Uppercase-initial (or `_`-initial) names.
    Prolog,
}

const SPECIAL_CHARS: &str = "+-*/\\^<>=`~?@&|!#';";

#[derive(Clone, Debug, PartialEq)]
enum Token {
    /// A run of name characters.
    Name(String),

    /// A run of special characters.
    Special(String),

    /// A quoted symbol, quotes stripped.
    Quoted(String),

    Punct(char),
}

fn lex(input: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,

            b'%' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }

            b'(' | b')' | b'[' | b']' | b',' | b'.' | b':' | b'{' | b'}' => {
                tokens.push((i, Token::Punct(b as char)));
                i += 1;
            }

            b'"' => {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(ParseError::UnclosedQuote { at: start });
                }
                tokens.push((start, Token::Quoted(input[start + 1..i].to_string())));
                i += 1;
            }

            _ if is_name_char(b) => {
                let start = i;
                while i < bytes.len() && is_name_char(bytes[i]) {
                    i += 1;
                }
                tokens.push((start, Token::Name(input[start..i].to_string())));
            }

            _ if SPECIAL_CHARS.contains(b as char) => {
                let start = i;
                while i < bytes.len() && SPECIAL_CHARS.contains(bytes[i] as char) {
                    i += 1;
                }
                tokens.push((start, Token::Special(input[start..i].to_string())));
            }

            _ => {
                return Err(ParseError::Unexpected {
                    at: i,
                    expected: "a token",
                })
            }
        }
    }
    Ok(tokens)
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// The reader: a token cursor over one input string.
pub struct Parser<'a> {
    symbols: &'a mut SymbolTable,
    arena: &'a mut TermArena,
    tokens: Vec<(usize, Token)>,
    cursor: usize,
}

const TOP_PRECEDENCE: u16 = 1000;

impl<'a> Parser<'a> {
    pub fn new(
        symbols: &'a mut SymbolTable,
        arena: &'a mut TermArena,
        input: &str,
    ) -> Result<Self, ParseError> {
        Ok(Parser {
            symbols,
            arena,
            tokens: lex(input)?,
            cursor: 0,
        })
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(_, t)| t)
    }

    fn here(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .map(|(at, _)| *at)
            .unwrap_or_else(|| self.tokens.last().map(|(at, _)| *at + 1).unwrap_or(0))
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).map(|(_, t)| t.clone());
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ParseError> {
        let at = self.here();
        match self.advance() {
            Some(Token::Punct(p)) if p == c => Ok(()),
            _ => Err(ParseError::Unexpected {
                at,
                expected: punct_name(c),
            }),
        }
    }

    /// Reads one term terminated by `.`.
    pub fn read_term(&mut self) -> Result<TermId, ParseError> {
        let t = self.parse_expr(TOP_PRECEDENCE)?;
        self.expect_punct('.')?;
        Ok(t)
    }

    fn parse_expr(&mut self, limit: u16) -> Result<TermId, ParseError> {
        let mut left = self.parse_primary(limit)?;
        let mut left_prec = 0;

        loop {
            let name = match self.peek() {
                Some(Token::Name(s)) | Some(Token::Special(s)) => s.clone(),
                _ => break,
            };
            let props = match self.symbols.parse_props(&name) {
                Some(p) => p,
                None => break,
            };
            let p = props.precedence;
            if p > limit {
                break;
            }
            match props.parse_type {
                ParseType::Infix | ParseType::InfixLeft | ParseType::InfixRight => {
                    if props.parse_type == ParseType::Infix && left_prec == p {
                        return Err(ParseError::BadFixity { at: self.here() });
                    }
                    self.advance();
                    let right_limit = match props.parse_type {
                        ParseType::InfixRight => p,
                        _ => p - 1,
                    };
                    let right = self.parse_expr(right_limit)?;
                    let sym = self.symbols.intern(&name, 2);
                    left = self.arena.binary(sym, left, right);
                    left_prec = p;
                }
                ParseType::Postfix | ParseType::PostfixParen => {
                    self.advance();
                    let sym = self.symbols.intern(&name, 1);
                    left = self.arena.unary(sym, left);
                    left_prec = p;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_primary(&mut self, limit: u16) -> Result<TermId, ParseError> {
        let at = self.here();
        match self.advance() {
            Some(Token::Punct('(')) => {
                let t = self.parse_expr(TOP_PRECEDENCE)?;
                self.expect_punct(')')?;
                Ok(t)
            }

            Some(Token::Punct('[')) => self.parse_list(),

            Some(Token::Quoted(s)) => {
                let sym = self.symbols.intern(&s, 0);
                Ok(self.arena.constant(sym))
            }

            Some(Token::Name(s)) | Some(Token::Special(s)) => {
                // Quantified subformula: all x F / exists x F.
                if (s == "all" || s == "exists") && matches!(self.peek(), Some(Token::Name(_))) {
                    let var_name = match self.advance() {
                        Some(Token::Name(v)) => v,
                        _ => unreachable!(),
                    };
                    let qp = self.symbols.quantifier_precedence;
                    let body = self.parse_expr(qp)?;
                    let var_sym = self.symbols.intern(&var_name, 0);
                    let var = self.arena.constant(var_sym);
                    let q = self.symbols.intern(&s, 2);
                    return Ok(self.arena.binary(q, var, body));
                }

                // Prefix operator.
                if let Some(props) = self.symbols.parse_props(&s) {
                    if matches!(props.parse_type, ParseType::Prefix | ParseType::PrefixParen)
                        && props.precedence <= limit
                        && !matches!(self.peek(), Some(Token::Punct('(')))
                    {
                        let arg_limit = match props.parse_type {
                            ParseType::Prefix => props.precedence,
                            _ => props.precedence - 1,
                        };
                        let arg = self.parse_expr(arg_limit)?;
                        let sym = self.symbols.intern(&s, 1);
                        return Ok(self.arena.unary(sym, arg));
                    }
                }

                // Application or constant.
                if matches!(self.peek(), Some(Token::Punct('('))) {
                    self.advance();
                    let mut args = Vec::new();
                    loop {
                        args.push(self.parse_expr(TOP_PRECEDENCE)?);
                        match self.advance() {
                            Some(Token::Punct(',')) => continue,
                            Some(Token::Punct(')')) => break,
                            _ => {
                                return Err(ParseError::Unexpected {
                                    at: self.here(),
                                    expected: "`,` or `)`",
                                })
                            }
                        }
                    }
                    let sym = self.symbols.intern(&s, args.len());
                    Ok(self.arena.compound(sym, args))
                } else {
                    let sym = self.symbols.intern(&s, 0);
                    Ok(self.arena.constant(sym))
                }
            }

            _ => Err(ParseError::Unexpected {
                at,
                expected: "a term",
            }),
        }
    }

    /// `[a,b,c]`, `[h:t]`, `[]` over $cons/$nil.
    fn parse_list(&mut self) -> Result<TermId, ParseError> {
        let nil = self.symbols.intern("$nil", 0);
        let cons = self.symbols.intern("$cons", 2);

        if matches!(self.peek(), Some(Token::Punct(']'))) {
            self.advance();
            return Ok(self.arena.constant(nil));
        }

        let mut items = vec![self.parse_expr(TOP_PRECEDENCE)?];
        let mut tail = None;
        loop {
            match self.advance() {
                Some(Token::Punct(',')) => items.push(self.parse_expr(TOP_PRECEDENCE)?),
                Some(Token::Punct(':')) => {
                    tail = Some(self.parse_expr(TOP_PRECEDENCE)?);
                    self.expect_punct(']')?;
                    break;
                }
                Some(Token::Punct(']')) => break,
                _ => {
                    return Err(ParseError::Unexpected {
                        at: self.here(),
                        expected: "`,`, `:` or `]`",
                    })
                }
            }
        }

        let mut list = match tail {
            Some(t) => t,
            None => self.arena.constant(nil),
        };
        for item in items.into_iter().rev() {
            list = self.arena.binary(cons, item, list);
        }
        Ok(list)
    }
}

fn punct_name(c: char) -> &'static str {
    match c {
        '.' => "`.`",
        '(' => "`(`",
        ')' => "`)`",
        '[' => "`[`",
        ']' => "`]`",
        ',' => "`,`",
        ':' => "`:`",
        _ => "punctuation",
    }
}

/// Parses a single term (terminated by `.` or end of input).
pub fn parse_term_str(
    symbols: &mut SymbolTable,
    arena: &mut TermArena,
    input: &str,
) -> Result<TermId, ParseError> {
    let mut parser = Parser::new(symbols, arena, input)?;
    let t = parser.parse_expr(TOP_PRECEDENCE)?;
    if matches!(parser.peek(), Some(Token::Punct('.'))) {
        parser.advance();
    }
    Ok(t)
}

/// Is the name a variable under the style?
pub fn variable_name(style: VariableStyle, name: &str) -> bool {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    match style {
        VariableStyle::Prolog => first.is_ascii_uppercase() || first == '_',
        VariableStyle::Standard => {
            matches!(name, "x" | "y" | "z" | "u" | "v" | "w")
                || (first == 'v' && name.len() > 1 && chars.all(|c| c.is_ascii_digit()))
        }
    }
}

/// Rewrites variable-named constants into variable nodes, numbering them in
/// first-occurrence order. Returns the number of distinct variables.
pub fn term_set_variables(
    symbols: &SymbolTable,
    arena: &mut TermArena,
    t: TermId,
    style: VariableStyle,
) -> usize {
    let mut names: Vec<String> = Vec::new();
    set_variables_rec(symbols, arena, t, style, &mut names);
    names.len()
}

fn set_variables_rec(
    symbols: &SymbolTable,
    arena: &mut TermArena,
    t: TermId,
    style: VariableStyle,
    names: &mut Vec<String>,
) {
    match arena.kind(t).clone() {
        TermKind::Variable(_) => {}
        TermKind::Compound { sym, args } => {
            if args.is_empty() && variable_name(style, symbols.name(sym)) {
                let name = symbols.name(sym).to_string();
                let varnum = match names.iter().position(|n| *n == name) {
                    Some(i) => i,
                    None => {
                        names.push(name);
                        names.len() - 1
                    }
                };
                *arena_kind_mut(arena, t) = TermKind::Variable(varnum);
            } else {
                for arg in args {
                    set_variables_rec(symbols, arena, arg, style, names);
                }
            }
        }
    }
}

fn arena_kind_mut(arena: &mut TermArena, t: TermId) -> &mut TermKind {
    arena.kind_mut(t)
}

/// Converts a parsed term into a clause: `|` splits literals, `-` negates,
/// `a != b` becomes a negative equality, `#`-attached attributes are
/// collected. Variables are recognised under the style.
pub fn term_to_clause(
    symbols: &mut SymbolTable,
    arena: &mut TermArena,
    t: TermId,
    style: VariableStyle,
) -> Result<Clause, ErrorKind> {
    let mut clause = Clause::new();

    // Peel attributes: t # attr1 # attr2.
    let mut body = t;
    let mut attributes = Vec::new();
    while arena.is_term(symbols, body, "#", 2) {
        let attr = arena.arg(body, 1);
        let rest = arena.arg(body, 0);
        if let Some(attr_sym) = arena.sym(attr) {
            if symbols.is_attribute(attr_sym) && arena.arity(attr) == 1 {
                attributes.push((attr_sym, arena.arg(attr, 0)));
            }
        }
        arena.free_node(attr);
        arena.free_node(body);
        body = rest;
    }
    attributes.reverse();

    term_set_variables(symbols, arena, body, style);
    for (_, value) in &attributes {
        term_set_variables(symbols, arena, *value, style);
    }
    clause.attributes = attributes;

    collect_literals(symbols, arena, body, &mut clause);
    Ok(clause)
}

fn collect_literals(
    symbols: &SymbolTable,
    arena: &mut TermArena,
    t: TermId,
    clause: &mut Clause,
) {
    if arena.sym(t) == Some(symbols.or_sym()) && arena.arity(t) == 2 {
        let left = arena.arg(t, 0);
        let right = arena.arg(t, 1);
        arena.free_node(t);
        collect_literals(symbols, arena, left, clause);
        collect_literals(symbols, arena, right, clause);
        return;
    }

    let mut sign = true;
    let mut atom = t;
    while arena.sym(atom) == Some(symbols.not_sym()) && arena.arity(atom) == 1 {
        let inner = arena.arg(atom, 0);
        arena.free_node(atom);
        sign = !sign;
        atom = inner;
    }
    // a != b is sugar for -(a = b).
    if arena.sym(atom) == Some(symbols.neq_sym()) && arena.arity(atom) == 2 {
        let a = arena.arg(atom, 0);
        let b = arena.arg(atom, 1);
        arena.free_node(atom);
        sign = !sign;
        atom = arena.binary(symbols.eq_sym(), a, b);
    }
    // The false constant as an atom stands for the empty disjunct; drop it.
    if arena.sym(atom) == Some(symbols.false_sym()) && sign {
        arena.free_node(atom);
        return;
    }
    clause.append_literal(Literal::new(sign, atom));
}

/// Named input lists.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputList {
    Sos,
    Usable,
    Goals,
    Hints,
    Assumptions,
    Demodulators,
    Distinct,
}

impl InputList {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sos" => Some(InputList::Sos),
            "usable" => Some(InputList::Usable),
            "goals" => Some(InputList::Goals),
            "hints" => Some(InputList::Hints),
            "assumptions" => Some(InputList::Assumptions),
            "demodulators" => Some(InputList::Demodulators),
            "distinct" => Some(InputList::Distinct),
            _ => None,
        }
    }
}

/// One item of an input file.
#[derive(Clone, Debug)]
pub enum InputItem {
    /// A term read inside a `formulas(<list>)` block.
    Formula(InputList, TermId),

    SetFlag(String, bool),

    AssignParm(String, i64),
}

/// Reads a whole input file: formula blocks and option commands.
pub fn read_input(
    symbols: &mut SymbolTable,
    arena: &mut TermArena,
    input: &str,
) -> Result<Vec<InputItem>, ErrorKind> {
    let mut parser = Parser::new(symbols, arena, input).map_err(ErrorKind::Parse)?;
    let mut items = Vec::new();

    while !parser.at_end() {
        let at = parser.here();
        let t = parser.read_term().map_err(ErrorKind::Parse)?;

        if parser.arena_is(t, "formulas", 1) || parser.arena_is(t, "clauses", 1) {
            let tag = parser.arena.arg(t, 0);
            let list = parser
                .arena
                .sym(tag)
                .map(|sn| parser.symbols.name(sn).to_string())
                .and_then(|name| InputList::from_name(&name))
                .ok_or(ErrorKind::Parse(ParseError::UnknownList { at }))?;
            parser.arena.zap_term(t);

            loop {
                let formula = parser.read_term().map_err(ErrorKind::Parse)?;
                if parser.arena_is(formula, "end_of_list", 0) {
                    parser.arena.zap_term(formula);
                    break;
                }
                items.push(InputItem::Formula(list, formula));
            }
        } else if parser.arena_is(t, "set", 1) || parser.arena_is(t, "clear", 1) {
            let value = parser.arena_is(t, "set", 1);
            let name = parser.constant_name(parser.arena.arg(t, 0), at)?;
            parser.arena.zap_term(t);
            items.push(InputItem::SetFlag(name, value));
        } else if parser.arena_is(t, "assign", 2) {
            let name = parser.constant_name(parser.arena.arg(t, 0), at)?;
            let value = parser.integer_value(parser.arena.arg(t, 1), at)?;
            parser.arena.zap_term(t);
            items.push(InputItem::AssignParm(name, value));
        } else {
            return Err(ErrorKind::Parse(ParseError::Unexpected {
                at,
                expected: "formulas(...), set(...), clear(...), or assign(...)",
            }));
        }
    }
    Ok(items)
}

impl<'a> Parser<'a> {
    fn arena_is(&self, t: TermId, name: &str, arity: usize) -> bool {
        self.arena.is_term(self.symbols, t, name, arity)
    }

    fn constant_name(&self, t: TermId, at: usize) -> Result<String, ErrorKind> {
        match self.arena.sym(t) {
            Some(sn) if self.arena.arity(t) == 0 => Ok(self.symbols.name(sn).to_string()),
            _ => Err(ErrorKind::Parse(ParseError::Unexpected {
                at,
                expected: "an option name",
            })),
        }
    }

    fn integer_value(&self, t: TermId, at: usize) -> Result<i64, ErrorKind> {
        let bad = || {
            ErrorKind::Parse(ParseError::Unexpected {
                at,
                expected: "an integer",
            })
        };
        if self.arena_is(t, "-", 1) {
            let inner = self.arena.arg(t, 0);
            let sn = self.arena.sym(inner).ok_or_else(bad)?;
            let n = self.symbols.natural(sn).ok_or_else(bad)?;
            Ok(-(n as i64))
        } else {
            let sn = self.arena.sym(t).ok_or_else(bad)?;
            let n = self.symbols.natural(sn).ok_or_else(bad)?;
            Ok(n as i64)
        }
    }
}

// Printing.

/// Renders a term in the concrete syntax, honouring declared operators.
pub fn term_to_string(symbols: &SymbolTable, arena: &TermArena, t: TermId) -> String {
    let mut out = String::new();
    write_term(symbols, arena, t, &mut out);
    out
}

fn write_term(symbols: &SymbolTable, arena: &TermArena, t: TermId, out: &mut String) {
    match arena.kind(t) {
        TermKind::Variable(n) => out.push_str(&variable_display(*n)),
        TermKind::Compound { sym, args } => {
            let name = symbols.name(*sym);
            match (args.len(), symbols.parse_props_of(*sym)) {
                (2, Some(props)) if props.parse_type.arity() == 2 => {
                    write_subterm(symbols, arena, args[0], out);
                    out.push(' ');
                    out.push_str(name);
                    out.push(' ');
                    write_subterm(symbols, arena, args[1], out);
                }
                (1, Some(props))
                    if matches!(props.parse_type, ParseType::Prefix | ParseType::PrefixParen) =>
                {
                    out.push_str(name);
                    write_subterm(symbols, arena, args[0], out);
                }
                (0, _) => out.push_str(name),
                _ => {
                    out.push_str(name);
                    out.push('(');
                    for (i, &a) in args.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        write_term(symbols, arena, a, out);
                    }
                    out.push(')');
                }
            }
        }
    }
}

fn write_subterm(symbols: &SymbolTable, arena: &TermArena, t: TermId, out: &mut String) {
    // Parenthesise operator subterms; precedence-aware minimisation is not
    // worth the ambiguity risk in proof output.
    let needs_parens = match arena.kind(t) {
        TermKind::Compound { sym, args } if !args.is_empty() => {
            symbols.parse_props_of(*sym).is_some()
        }
        _ => false,
    };
    if needs_parens {
        out.push('(');
        write_term(symbols, arena, t, out);
        out.push(')');
    } else {
        write_term(symbols, arena, t, out);
    }
}

/// `x y z u v w` then `v6`, `v7`, … --- the standard style's inverse.
pub fn variable_display(n: usize) -> String {
    match n {
        0 => "x".to_string(),
        1 => "y".to_string(),
        2 => "z".to_string(),
        3 => "u".to_string(),
        4 => "v".to_string(),
        5 => "w".to_string(),
        _ => format!("v{n}"),
    }
}

/// Renders a clause: literals joined by ` | `, negative equalities as `!=`,
/// the empty clause as `$F`.
pub fn clause_to_string(symbols: &SymbolTable, arena: &TermArena, clause: &Clause) -> String {
    if clause.literals.is_empty() {
        return "$F".to_string();
    }
    let mut parts = Vec::new();
    for lit in &clause.literals {
        let atom_str = term_to_string(symbols, arena, lit.atom);
        if lit.sign {
            parts.push(atom_str);
        } else if arena.sym(lit.atom) == Some(symbols.eq_sym()) && arena.arity(lit.atom) == 2 {
            let a = term_to_string(symbols, arena, arena.arg(lit.atom, 0));
            let b = term_to_string(symbols, arena, arena.arg(lit.atom, 1));
            parts.push(format!("{a} != {b}"));
        } else {
            parts.push(format!("-{atom_str}"));
        }
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_and_operators() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();

        let t = parse_term_str(&mut symbols, &mut arena, "f(x, g(y)) = x * y + z.").unwrap();
        // Root is `=`; right side is `+` with `*` below it on the left.
        assert!(arena.is_term(&symbols, t, "=", 2));
        let rhs = arena.arg(t, 1);
        assert!(arena.is_term(&symbols, rhs, "+", 2));
        assert!(arena.is_term(&symbols, arena.arg(rhs, 0), "*", 2));
    }

    #[test]
    fn right_associativity() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();

        let t = parse_term_str(&mut symbols, &mut arena, "a + b + c.").unwrap();
        // a + (b + c)
        let right = arena.arg(t, 1);
        assert!(arena.is_term(&symbols, right, "+", 2));
        assert!(arena.is_term(&symbols, arena.arg(t, 0), "a", 0));
    }

    #[test]
    fn clause_conversion() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();

        let t = parse_term_str(&mut symbols, &mut arena, "p(x) | -q(x, a) | b != c.").unwrap();
        let clause =
            term_to_clause(&mut symbols, &mut arena, t, VariableStyle::Standard).unwrap();
        assert_eq!(clause.literals.len(), 3);
        assert!(clause.literals[0].sign);
        assert!(!clause.literals[1].sign);
        assert!(!clause.literals[2].sign);
        // x became variable 0 in both literals.
        assert_eq!(arena.varnum(arena.arg(clause.literals[0].atom, 0)), Some(0));
        assert_eq!(arena.varnum(arena.arg(clause.literals[1].atom, 0)), Some(0));
        // b != c became a negative equality.
        assert!(arena.is_term(&symbols, clause.literals[2].atom, "=", 2));
    }

    #[test]
    fn prolog_style_variables() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();

        let t = parse_term_str(&mut symbols, &mut arena, "p(X, a).").unwrap();
        let clause = term_to_clause(&mut symbols, &mut arena, t, VariableStyle::Prolog).unwrap();
        let atom = clause.literals[0].atom;
        assert_eq!(arena.varnum(arena.arg(atom, 0)), Some(0));
        assert!(arena.is_constant(arena.arg(atom, 1)));
    }

    #[test]
    fn lists() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();

        let t = parse_term_str(&mut symbols, &mut arena, "[a, b].").unwrap();
        assert!(arena.is_term(&symbols, t, "$cons", 2));
        let tail = arena.arg(t, 1);
        assert!(arena.is_term(&symbols, tail, "$cons", 2));
        assert!(arena.is_term(&symbols, arena.arg(tail, 1), "$nil", 0));
    }

    #[test]
    fn input_files() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();

        let text = "
            set(ordered_res).
            assign(max_seconds, 30).
            formulas(sos).
              p(a).
              -p(x) | q(x).
            end_of_list.
        ";
        let items = read_input(&mut symbols, &mut arena, text).unwrap();
        assert_eq!(items.len(), 4);
        assert!(matches!(&items[0], InputItem::SetFlag(name, true) if name == "ordered_res"));
        assert!(matches!(&items[1], InputItem::AssignParm(name, 30) if name == "max_seconds"));
        assert!(matches!(items[2], InputItem::Formula(InputList::Sos, _)));
    }

    #[test]
    fn printer_round_trip() {
        let mut symbols = SymbolTable::default();
        let mut arena = TermArena::default();

        let t = parse_term_str(&mut symbols, &mut arena, "f(x) = g(x, a) + b.").unwrap();
        let printed = term_to_string(&symbols, &arena, t);
        let t2 = parse_term_str(&mut symbols, &mut arena, &format!("{printed}.")).unwrap();
        assert!(arena.term_ident(t, t2));
    }
}
