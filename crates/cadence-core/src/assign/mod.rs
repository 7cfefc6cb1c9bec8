//! Phase 1 assignment: keywords, strategy, and persona per post.
//!
//! All usage tracking lives in [`AssignmentState`], which the orchestrator
//! owns for the duration of one run.

pub mod keywords;
pub mod persona;
pub mod strategy;

pub use keywords::{KeywordAssignment, KeywordState, assign_keywords};
pub use persona::{PersonaAssignment, PersonaLimits, PersonaState, assign_personas};
pub use strategy::select_strategy;

/// Mutable tracking for one run's assignment steps.
#[derive(Debug, Clone, Default)]
pub struct AssignmentState {
    pub keywords: KeywordState,
    pub personas: PersonaState,
}
