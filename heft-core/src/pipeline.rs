//! Compilation Pipeline - Single Entry Point
//!
//! Fragments are read once, flattened into the four tables, and rendered in
//! one pass. The output file is replaced atomically, and only after the
//! whole filter has been rendered.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::assemble::Assembler;
use crate::config::{Chapter, ChapterTable};
use crate::fields::{ConditionFields, ThemeFields};
use crate::records::{NamedRecord, RecordTable};
use crate::render::{RenderedFilter, Renderer};
use crate::source::{merge_fragments, Fragment, FragmentSource, NameFilter, SourceError};
use crate::styles::StyleTable;
use crate::validation::{Diagnostic, Diagnostics};
use crate::{ENGINE_VERSION, TOOL_NAME};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Invalid {table} \"{name}\": {source}")]
    InvalidEntry {
        table: &'static str,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which folders and profile names a run reads, and where it writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Selection {
    pub root: PathBuf,
    pub config: String,
    pub strictness: String,
    pub condition: String,
    pub style: String,
    pub theme: String,
    pub output_dir: PathBuf,
    pub output_name: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            config: "hestalon".to_string(),
            strictness: "regular".to_string(),
            condition: "hestalon".to_string(),
            style: "hestalon".to_string(),
            theme: "hestalon".to_string(),
            output_dir: PathBuf::from("dist"),
            output_name: "hestalon.filter".to_string(),
        }
    }
}

impl Selection {
    pub fn configs_dir(&self) -> PathBuf {
        self.root.join("configs").join(&self.config)
    }

    pub fn strictness_dir(&self) -> PathBuf {
        self.root.join("strictness").join(&self.strictness)
    }

    pub fn conditions_dir(&self) -> PathBuf {
        self.root.join("conditions").join(&self.condition)
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.root.join("themes").join(&self.theme)
    }

    pub fn styles_dir(&self) -> PathBuf {
        self.root.join("styles")
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir).join(&self.output_name)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledFilter {
    pub path: PathBuf,
    #[serde(flatten)]
    pub filter: RenderedFilter,
    pub diagnostics: Vec<Diagnostic>,
}

/// The compilation pipeline - owns every table for one run
pub struct CompilationPipeline {
    chapters: ChapterTable,
    conditions: RecordTable<ConditionFields>,
    themes: RecordTable<ThemeFields>,
    styles: StyleTable,
}

impl CompilationPipeline {
    pub fn new() -> Self {
        Self {
            chapters: ChapterTable::new(),
            conditions: RecordTable::new("condition"),
            themes: RecordTable::new("theme"),
            styles: StyleTable::new(),
        }
    }

    /// Read every table named by `selection` from `source`.
    pub fn load(source: &impl FragmentSource, selection: &Selection) -> Result<Self, PipelineError> {
        let mut pipeline = Self::new();

        let mut configs = source.fragments(&selection.configs_dir(), &NameFilter::AnyJson)?;
        configs.extend(source.fragments(&selection.strictness_dir(), &NameFilter::AnyJson)?);
        pipeline.add_chapters(merge_fragments(configs))?;

        let conditions = source.fragments(&selection.conditions_dir(), &NameFilter::AnyJson)?;
        pipeline.add_conditions(merge_fragments(conditions))?;

        let themes = source.fragments(&selection.themes_dir(), &NameFilter::AnyJson)?;
        pipeline.add_themes(merge_fragments(themes))?;

        let style_filter = NameFilter::Named(selection.style.clone());
        for fragment in source.fragments(&selection.styles_dir(), &style_filter)? {
            pipeline.add_styles(&fragment);
        }

        tracing::info!(
            chapters = pipeline.chapters.len(),
            conditions = pipeline.conditions.len(),
            themes = pipeline.themes.len(),
            styles = pipeline.styles.len(),
            "tables loaded"
        );
        Ok(pipeline)
    }

    pub fn add_chapters(&mut self, fragment: Fragment) -> Result<(), PipelineError> {
        for (name, value) in fragment {
            let chapter: Chapter = parse_entry("chapter", &name, value)?;
            self.chapters.insert(name, chapter);
        }
        Ok(())
    }

    pub fn add_conditions(&mut self, fragment: Fragment) -> Result<(), PipelineError> {
        for (name, value) in fragment {
            let record: NamedRecord<ConditionFields> = parse_entry("condition", &name, value)?;
            self.conditions.insert(name, record);
        }
        Ok(())
    }

    pub fn add_themes(&mut self, fragment: Fragment) -> Result<(), PipelineError> {
        for (name, value) in fragment {
            let record: NamedRecord<ThemeFields> = parse_entry("theme", &name, value)?;
            self.themes.insert(name, record);
        }
        Ok(())
    }

    pub fn add_styles(&mut self, fragment: &Fragment) {
        self.styles.merge_fragment(fragment);
    }

    /// Resolve and render every chapter.
    pub fn render(&mut self, diagnostics: &mut Diagnostics) -> RenderedFilter {
        self.conditions.resolve_all(diagnostics);
        self.themes.resolve_all(diagnostics);

        let renderer = Renderer::new(format!("{} {} loot filter", TOOL_NAME, ENGINE_VERSION));
        let mut assembler = Assembler::new(&mut self.conditions, &mut self.themes, &self.styles);
        renderer.render(&self.chapters, &mut assembler, diagnostics)
    }

    /// Render and write the filter to `path`.
    pub fn compile_to(&mut self, path: &Path) -> Result<CompiledFilter, PipelineError> {
        let mut diagnostics = Diagnostics::new();
        let filter = self.render(&mut diagnostics);
        write_atomic(path, filter.text.as_bytes())?;
        tracing::info!(path = %path.display(), fingerprint = %filter.fingerprint, "filter written");

        Ok(CompiledFilter {
            path: path.to_path_buf(),
            filter,
            diagnostics: diagnostics.entries().to_vec(),
        })
    }

    /// Load, render and write one run.
    pub fn run(source: &impl FragmentSource, selection: &Selection) -> Result<CompiledFilter, PipelineError> {
        let mut pipeline = Self::load(source, selection)?;
        pipeline.compile_to(&selection.output_path())
    }
}

impl Default for CompilationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_entry<T: serde::de::DeserializeOwned>(
    table: &'static str,
    name: &str,
    value: serde_json::Value,
) -> Result<T, PipelineError> {
    serde_json::from_value(value).map_err(|source| PipelineError::InvalidEntry {
        table,
        name: name.to_string(),
        source,
    })
}

/// Write `data` to a temp file next to `path`, then move it into place.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), PipelineError> {
    let io_err = |source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(data).map_err(io_err)?;
    file.as_file().sync_all().map_err(io_err)?;
    file.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
