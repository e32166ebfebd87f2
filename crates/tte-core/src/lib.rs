//! Event-integration engine for time-varying interval data.
//!
//! Takes a subject-level interval ("episode") table and an event table,
//! resolves which event wins per subject (competing risks), splits intervals
//! at event dates that fall strictly inside them, prorates cumulative
//! covariates across splits, and assembles a counting-process-format output
//! table with an outcome column.
//!
//! Stages, in dependency order:
//!
//! - **schema**: configuration validation against the loaded table schemas
//! - **subjects**: typed per-subject extraction and integrity checks
//! - **resolve**: competing-risk resolution / occurrence collection
//! - **split**: strict-boundary interval splitting
//! - **prorate**: proportional covariate adjustment
//! - **timegen**: elapsed-time conversion
//! - **assemble**: output table assembly and summary counts
//!
//! The only entry point most callers need is [`integrate_events`].

pub mod assemble;
pub mod pipeline;
pub mod prorate;
pub mod resolve;
pub mod schema;
pub mod split;
pub mod subjects;
pub mod timegen;

pub use pipeline::{integrate_events, integrate_validated};
pub use schema::{ValidatedConfig, validate_config};
pub use split::OutputRow;
