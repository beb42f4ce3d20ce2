//! # prf-expansion
//!
//! Pseudo-relevance feedback query expansion for ad-hoc retrieval.
//!
//! ## Features
//!
//! - RM1 and RM3 relevance models
//! - Axiomatic semantic term matching with reproducible background sampling
//! - A pluggable index seam with an in-memory implementation
//! - JSON configuration with validation
//!
//! ## Example
//!
//! ```
//! use prf_expansion::prelude::*;
//!
//! # fn main() -> prf_expansion::error::Result<()> {
//! let index = MemoryIndex::from_texts(&[
//!     "the lazy fox jumped over the dog",
//!     "but had the presence of mind",
//! ]);
//! let config = FeedbackConfig::default().with_df_bounds(0, 1.0);
//! let expansion = QueryExpansionBuilder::new(config)
//!     .model(ExpansionModel::Rm3)
//!     .build()?;
//!
//! let mut query = QueryModel::from_text("q1", "fox");
//! let results: ResultSet = vec![(0, 1.0), (1, 0.5)].into_iter().collect();
//! expansion.expand_query(&index, &mut query, &results, None)?;
//! assert!(query.len() > 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod feedback;
pub mod index;
pub mod query;

pub mod prelude {
    pub use crate::config::{ExpansionModel, FeedbackConfig};
    pub use crate::error::{ExpansionError, Result};
    pub use crate::feedback::{
        AxiomaticExpander, Expansion, ExpansionRequest, ExpansionTerm, MergeMode, QueryExpander,
        QueryExpansion, QueryExpansionBuilder, Rm1Expander, Rm3Expander,
    };
    pub use crate::index::{DocId, FeedbackIndex, MemoryIndex, TermId};
    pub use crate::query::{QueryModel, QueryTerm, ResultSet, ScoredDocument};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
