//! Consensus domain
//!
//! When several tools report on the same aspect of a task (e.g. `severity`),
//! their opinions can disagree. The [`ConsensusResolver`] reconciles them
//! into one value per aspect and scores how much the tools agreed.
//!
//! # Resolution order
//!
//! ```text
//! disagreement on aspect
//!   │
//!   ├─ 1. expert tool for the aspect answered?  → Expert
//!   ├─ 2. weighted winner holds decisive share?  → WeightedVote
//!   ├─ 3. strict majority of contributors?       → Majority
//!   └─ 4. otherwise                              → WeightedFallback
//! ```
//!
//! Weights are registry quality scores ÷ 100. Disagreement is never an
//! error: it only lowers the agreement ratio and the confidence.

pub mod expertise;
pub mod resolver;
pub mod result;
pub mod vote;

pub use expertise::ExpertTable;
pub use resolver::{ConsensusResolver, ResolverSettings};
pub use result::{Conflict, ConsensusResult, ResolutionMethod};
pub use vote::{Opinion, TallyEntry, VoteTally};
