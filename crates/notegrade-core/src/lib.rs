//! Core of notegrade: LLM-as-judge scoring of clinical note variants.
//!
//! Pipeline: [`model::ReferenceGroup`]s go into the batch orchestrator
//! ([`engine::batch::BatchRunner`]), which calls the judge
//! ([`judge::JudgeClient`]) once per (reference, variant) task, ranks each
//! group ([`engine::ranker`]) and hands the ranked records to the
//! cross-group summarizer ([`report::comparison`]).

pub mod config;
pub mod engine;
pub mod errors;
pub mod judge;
pub mod model;
pub mod providers;
pub mod report;

#[cfg(test)]
pub(crate) mod test_support;
