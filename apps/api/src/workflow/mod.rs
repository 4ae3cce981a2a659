// Optimization workflow: one state machine driving optimize, gap-fill,
// scoring, project replacement and usage commit.
// Model calls go through the optimization module; nothing here talks to the LLM directly.

pub mod controller;
pub mod gaps;
pub mod handlers;
pub mod replacement;
pub mod session;
pub mod store;

pub use controller::{WorkflowController, WorkflowDeps};
pub use store::RedisWorkflowStore;
