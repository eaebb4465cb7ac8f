//! Team-name matching: normalization rules, the alias table, and the
//! staged resolver built on both.

pub mod alias;
pub mod normalize;
pub mod resolver;

pub use alias::{AliasTable, SharedAliasTable};
pub use normalize::normalize;
pub use resolver::{MatchMethod, ResolvedTeam, TeamResolver};
