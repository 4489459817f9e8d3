//! Heft Core - Loot Filter Compiler
//!
//! # Guarantees
//! 1. Children Override Parents
//! 2. Warnings Never Block
//! 3. Malformed Input Produces No File
//! 4. Deterministic Output

pub mod value;
pub mod fields;
pub mod records;
pub mod styles;
pub mod contrast;
pub mod validation;
pub mod config;
pub mod assemble;
pub mod render;
pub mod source;
pub mod hashing;
pub mod pipeline;

pub use value::{FieldValue, Scalar, Directives, format_entry};
pub use fields::{ConditionFields, ThemeFields, Layered};
pub use records::{Extends, NamedRecord, RecordTable};
pub use styles::StyleTable;
pub use contrast::{contrast_ratio, relative_luminance, Color};
pub use validation::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use config::{Chapter, ChapterTable, SectionFields};
pub use assemble::{Assembler, Rule, Visibility};
pub use render::{RenderedFilter, Renderer};
pub use source::{DirectorySource, Fragment, FragmentSource, NameFilter, SourceError};
pub use pipeline::{CompilationPipeline, CompiledFilter, PipelineError, Selection};

pub const TOOL_NAME: &str = "heft";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
