// QBR deck generation: industry knowledge, prompt composition, model-output sanitizing and
// number formatting. All model calls go through llm_client.

pub mod handlers;
pub mod industry;
pub mod number_format;
pub mod prompts;
pub mod sanitizer;
pub mod summary;
