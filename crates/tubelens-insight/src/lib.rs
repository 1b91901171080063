//! Narrative analysis of aggregated channel metrics via the Anthropic
//! Messages API.
//!
//! [`build_prompt`] renders a bounded prompt from the analytics output,
//! [`AnthropicClient`] sends it, and [`request_insights`] runs the two
//! analysis passes and tidies the replies into markdown sections.

pub mod client;
pub mod error;
pub mod format;
pub mod prompt;
pub mod service;
pub mod types;

pub use client::{AnthropicClient, ModelSettings};
pub use error::InsightError;
pub use format::tidy_response;
pub use prompt::{build_prompt, PromptInput, PromptKind};
pub use service::{request_insights, InsightReport, InsightSection, InsightService};
