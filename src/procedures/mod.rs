/*!
The inference rules and the loops that drive them.

Every rule observes the same contract: a child clause is built with fresh
applied literals, a justification naming its parents by id, inherited
attributes, upward container links --- and *no* id of its own.
The caller assigns an id only if it keeps the clause.
*/

use crate::kernel::Kernel;
use crate::structures::literal::Literal;
use crate::unify::{apply, apply_basic, ContextRef};

pub mod clash;
pub mod clause_eval;
pub mod factor;
pub mod paramod;
pub mod pred_elim;
pub mod resolve;
pub mod saturate;
pub mod subsume;
pub mod weight;

/// The instance of a literal under a substitution.
pub(crate) fn apply_lit(k: &mut Kernel, lit: Literal, ctx: Option<ContextRef>) -> Literal {
    Literal::new(lit.sign, apply(&mut k.terms, &k.contexts, lit.atom, ctx))
}

/// As [apply_lit], with nonbasic marks when basic paramodulation is on.
pub(crate) fn apply_lit_para(
    k: &mut Kernel,
    basic: bool,
    lit: Literal,
    ctx: Option<ContextRef>,
) -> Literal {
    if basic {
        let nonbasic = k.nonbasic;
        Literal::new(
            lit.sign,
            apply_basic(&mut k.terms, &k.contexts, lit.atom, ctx, nonbasic),
        )
    } else {
        apply_lit(k, lit, ctx)
    }
}
