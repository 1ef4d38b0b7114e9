/*!
Items related to [logging](log).

Calls to the log macro are made throughout the library.
No log implementation is provided; for details, see [log].
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to the [given-clause loop](crate::procedures::saturate).
    pub const SATURATE: &str = "saturate";

    /// Logs related to the [resolution rules](crate::procedures::resolve).
    pub const RESOLVE: &str = "resolve";

    /// Logs related to [paramodulation](crate::procedures::paramod).
    pub const PARAMOD: &str = "paramod";

    /// Logs related to [subsumption](crate::procedures::subsume).
    pub const SUBSUMPTION: &str = "subsumption";

    /// Logs related to [predicate elimination](crate::procedures::pred_elim).
    pub const PRED_ELIM: &str = "pred_elim";

    /// Logs related to [proof transformation](crate::proofs).
    pub const PROOFS: &str = "proofs";

    /// Logs related to [grounding](crate::mace::ground).
    pub const MACE_GROUND: &str = "mace_ground";

    /// Logs related to [Mace propagation](crate::mace::propagate).
    pub const MACE_PROPAGATE: &str = "mace_propagate";

    /// Logs related to the [Mace search loop](crate::mace::search).
    pub const MACE_SEARCH: &str = "mace_search";

    /// Logs related to [parsing](crate::parse).
    pub const PARSE: &str = "parse";
}
