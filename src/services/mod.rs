pub mod diagnostic_writer;
pub mod field_extractor;
pub mod llm_service;
pub mod prompt_builder;
pub mod response_parser;
pub mod table_writer;
pub mod text_synthesizer;

pub use diagnostic_writer::DiagnosticWriter;
pub use llm_service::{Classifier, LlmService};
pub use prompt_builder::PromptBuilder;
pub use response_parser::{ParseReport, ResponseParser};
pub use table_writer::{TableRecord, TableWriter};
