//! Business logic for the callflow processor
//!
//! This crate contains the pipeline stages between the source fetchers and
//! the sinks, plus the run orchestration.
//!
//! # Architecture
//!
//! A run is one bounded batch job: fetch all four sources concurrently,
//! join the snapshot, gate each call per sink kind, derive the sink's
//! projection, deliver. The stages between fetch and delivery are pure
//! computations over the immutable per-run snapshot.
//!
//! - `CallDataSet` - call-keyed and operator-keyed lookups over a snapshot
//! - `completeness` - per-sink eligibility decisions
//! - `derive` - sink-specific field derivation
//! - `HttpExternalCdrSink` - batch webhook delivery
//! - `PipelineRunner` - end-to-end run orchestration with single-flight
//!   guards and a run deadline

pub mod aggregator;
pub mod completeness;
pub mod derive;
pub mod external_sink;
pub mod run_controller;

pub use aggregator::CallDataSet;
pub use completeness::{is_eligible, SinkKind};
pub use external_sink::HttpExternalCdrSink;
pub use run_controller::{PipelineRunner, RunReport, SourceSet};
