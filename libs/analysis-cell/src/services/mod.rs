pub mod gateway;
pub mod prompts;
