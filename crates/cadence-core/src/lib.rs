//! Core engine for cadence: constraint-driven weekly content calendars.
//!
//! A run takes a company, its personas, and target keywords, plans a week of
//! posts across the company's channels, generates each post and its
//! three-comment thread through a [`generator::TextGenerator`], gates every
//! artifact on a heuristic quality score, and audits the finished batch.

pub mod assign;
pub mod audit;
pub mod config;
pub mod error;
pub mod export;
pub mod gate;
pub mod generator;
pub mod models;
pub mod orchestrator;
pub mod quality;
pub mod schedule;
pub mod store;
pub mod thread;

pub use config::{EngineConfig, RetryPolicy};
pub use error::{CalendarError, GenerationError, InputError};
pub use orchestrator::{CalendarInput, CalendarRequest, Orchestrator, generate_calendar};
pub use store::CalendarStore;
