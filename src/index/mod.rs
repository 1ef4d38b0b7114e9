//! Retrieval indexes: discrimination trees for unify/match candidates and a
//! feature-vector trie for subsumption candidates.

pub mod discrim;
pub mod feature;
pub mod lindex;
