//! Text generation backends.
//!
//! ```text
//! Orchestrator
//!     |
//!     v
//! GeneratorRegistry --get("gemini")--> Arc<dyn TextGenerator>
//!                                          |
//!     generate_post(plan, company) --------+--> GeneratedPost { title, body }
//!     generate_comment(plan, post, company) --> GeneratedComment { text }
//! ```

pub mod gemini;
pub mod prompt;
pub mod registry;
pub mod retry;
pub mod template;
pub mod trait_def;
pub mod types;

pub use gemini::GeminiGenerator;
pub use registry::GeneratorRegistry;
pub use retry::with_retry;
pub use template::TemplateGenerator;
pub use trait_def::TextGenerator;
pub use types::{GeneratedComment, GeneratedPost};
