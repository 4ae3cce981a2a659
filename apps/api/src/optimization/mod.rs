// Model-backed collaborators of the optimization workflow.
// All model calls go through llm_client.

pub mod optimizer;
pub mod project_analyzer;
pub mod prompts;

pub use optimizer::LlmResumeOptimizer;
pub use project_analyzer::LlmProjectAnalyzer;
