//! Pseudo-relevance feedback query expansion.
//!
//! Three estimators rewrite a query from the top documents of a first-pass
//! retrieval:
//!
//! - **RM1**: a relevance model built from term frequencies in the feedback
//!   documents, weighted by a softmax over the retrieval scores
//! - **RM3**: RM1 interpolated with the original query
//! - **Axiomatic**: mutual-information term matching over the feedback
//!   documents and a seeded sample of background documents
//!
//! Expanders implement [`QueryExpander`] and are usually driven through a
//! [`QueryExpansion`] built by [`QueryExpansionBuilder`].

pub mod axiomatic;
pub mod builder;
pub mod core;
pub mod document;
pub mod expander;
pub mod rm1;
pub mod rm3;
pub mod scoring;
pub mod statistics;
pub mod top_k;

pub use axiomatic::{AxiomaticExpander, DEFAULT_SEED, seed_from_query_id};
pub use builder::QueryExpansionBuilder;
pub use self::core::QueryExpansion;
pub use document::{FeedbackDocument, TermFilter};
pub use expander::{Expansion, ExpansionRequest, ExpansionTerm, MergeMode, QueryExpander};
pub use rm1::{RelevanceModel, Rm1Expander};
pub use rm3::Rm3Expander;
pub use scoring::{Idf, log_sum_exp, softmax};
pub use statistics::{TermPairKey, TermStatistics};
pub use top_k::TopKSelector;
