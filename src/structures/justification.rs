/*!
Justifications: the derivation record attached to every clause.

A justification is a *primary* step plus a list of modifier steps applied in
place while the clause was processed (flips, built-in x=x resolutions,
duplicate-literal merges).
Keeping the modifiers separate from the primary step is what lets the proof
transformations in [proofs](crate::proofs) expand a derivation without
guessing which rewrites a step implied.

Ordinary justifications are *non-atomic*: a single step may implicitly
renumber variables, flip an equality, or merge literals.
The [Ivy steps](IvyStep) are the atomic normal form produced by
[expand_proof_ivy](crate::proofs::ivy::expand_proof_ivy): each one is a
direct syntactic manipulation.

Literal numbers are 1-based throughout; a *negative* literal number means
"with the equality flipped".
A position is a literal number followed by a 1-based argument path into the
atom; a paramodulation from-position carries the side (1 = left, 2 = right)
as its second entry.
*/

use crate::structures::term::TermId;

/// Clause numbers as used in proofs; 0 is reserved for the prepended `x=x`.
pub type ClauseNum = u32;

/// A position: literal number, then a path into the atom.
pub type Position = Vec<usize>;

/// The derivation record of one clause.
#[derive(Clone, Debug)]
pub struct Justification {
    pub primary: JustStep,
    pub mods: Vec<CopyMod>,
}

impl Justification {
    pub fn new(primary: JustStep) -> Self {
        Justification {
            primary,
            mods: Vec::new(),
        }
    }

    pub fn input() -> Self {
        Justification::new(JustStep::Input)
    }

    /// Parent ids referenced by the step, in order. The implicit `x=x`
    /// partner of an XX step is not a parent.
    pub fn parents(&self) -> Vec<ClauseNum> {
        match &self.primary {
            JustStep::Input
            | JustStep::Goal
            | JustStep::Deny
            | JustStep::Clausify
            | JustStep::ExpandDef => Vec::new(),

            JustStep::Copy { parent }
            | JustStep::XxRes { parent, .. }
            | JustStep::Factor { parent, .. }
            | JustStep::Instance { parent, .. } => vec![*parent],

            JustStep::BinaryRes { p1, p2, .. } => vec![*p1, *p2],

            JustStep::HyperRes { nucleus, links } | JustStep::UrRes { nucleus, links } => {
                let mut ids = vec![*nucleus];
                for link in links {
                    if link.sat != 0 {
                        ids.push(link.sat);
                    }
                }
                ids
            }

            JustStep::Paramod { from, into, .. } => vec![*from, *into],

            JustStep::Ivy(step) => step.parents(),
        }
    }
}

/// The primary step of a justification.
#[derive(Clone, Debug)]
pub enum JustStep {
    /// The clause came from the problem.
    Input,

    /// Formula-level origins.
    Goal,
    Deny,
    Clausify,
    ExpandDef,

    /// A syntactic copy of the parent (modifiers may follow).
    Copy { parent: ClauseNum },

    /// Binary resolution; negative literal numbers mean "with a flipped equality".
    BinaryRes {
        p1: ClauseNum,
        l1: i32,
        p2: ClauseNum,
        l2: i32,
    },

    /// Resolution of a negative equality with the implicit `x=x`.
    XxRes { parent: ClauseNum, lit: usize },

    /// Hyperresolution: the nucleus and one link per clashed literal.
    HyperRes {
        nucleus: ClauseNum,
        links: Vec<ClashLink>,
    },

    /// UR-resolution, same shape as hyperresolution.
    UrRes {
        nucleus: ClauseNum,
        links: Vec<ClashLink>,
    },

    Paramod {
        from: ClauseNum,
        from_pos: Position,
        into: ClauseNum,
        into_pos: Position,
    },

    /// Factoring literals l1 and l2 (l2 removed).
    Factor {
        parent: ClauseNum,
        l1: usize,
        l2: usize,
    },

    /// Instantiation by the given (variable, term) pairs.
    Instance {
        parent: ClauseNum,
        pairs: Vec<(usize, TermId)>,
    },

    /// An atomic step of an Ivy proof.
    Ivy(IvyStep),
}

/// One clashed literal of a hyper- or UR-resolution step.
///
/// `sat == 0 && sat_lit == 0` records resolution of the nucleus literal with
/// the implicit `x=x`; a negative `sat_lit` means the satellite equality was
/// flipped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClashLink {
    /// 1-based literal number in the nucleus.
    pub nuc_lit: usize,

    pub sat: ClauseNum,

    pub sat_lit: i32,
}

/// A modifier applied in place after the primary step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CopyMod {
    /// Equality literal `lit` was flipped.
    Flip(usize),

    /// Literal `lit` was removed by resolution with `x=x`.
    Xx(usize),

    /// Literal `lit` was removed as a duplicate of an earlier literal.
    Merge(usize),

    /// Propositional simplification.
    Propositional,

    /// Renamed through a new-symbol introduction.
    NewSymbol,
}

/// Atomic (object-level) steps, the output vocabulary of the Ivy expansion.
#[derive(Clone, Debug)]
pub enum IvyStep {
    Input,

    Propositional(ClauseNum),

    NewSymbol(ClauseNum),

    Flip(ClauseNum, Position),

    Instance(ClauseNum, Vec<(usize, TermId)>),

    Resolve(ClauseNum, Position, ClauseNum, Position),

    Paramod(ClauseNum, Position, ClauseNum, Position),
}

impl IvyStep {
    pub fn parents(&self) -> Vec<ClauseNum> {
        match self {
            IvyStep::Input => Vec::new(),
            IvyStep::Propositional(p)
            | IvyStep::NewSymbol(p)
            | IvyStep::Flip(p, _)
            | IvyStep::Instance(p, _) => vec![*p],
            IvyStep::Resolve(p1, _, p2, _) | IvyStep::Paramod(p1, _, p2, _) => vec![*p1, *p2],
        }
    }
}
