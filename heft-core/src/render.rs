//! Renderer - Ordered Filter Text
//!
//! Chapters render by ascending priority. Chapter N (1-based, in render
//! order) is tagged `[N * 1000]` and its sections `[N * 1000 + k]` in
//! declaration order. Tags are assigned before empty rules are dropped, so
//! a dropped section leaves a gap instead of renumbering its siblings.

use serde::{Deserialize, Serialize};

use crate::assemble::{Assembler, Rule};
use crate::config::{ordered, ChapterTable};
use crate::hashing::fingerprint;
use crate::validation::{Diagnostic, DiagnosticKind, Diagnostics};

pub const FILLER_LENGTH: usize = 120;
pub const DIRECTIVE_WIDTH: usize = 30;
pub const LABEL_WIDTH: usize = 10;
pub const CHAPTER_STEP: u32 = 1000;

/// Result of one render pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedFilter {
    #[serde(skip)]
    pub text: String,
    pub fingerprint: String,
    pub chapters: usize,
    pub sections: usize,
    pub dropped: usize,
}

struct RenderedSection {
    id: u32,
    name: String,
    rule: Rule,
}

struct RenderedChapter {
    id: u32,
    name: String,
    sections: Vec<RenderedSection>,
}

#[derive(Default)]
struct Lines(String);

impl Lines {
    fn line(&mut self, text: impl AsRef<str>) {
        self.0.push_str(text.as_ref());
        self.0.push('\n');
    }

    fn comment(&mut self, text: impl AsRef<str>) {
        self.line(format!("# {}", text.as_ref()));
    }

    fn blank(&mut self) {
        self.0.push('\n');
    }
}

pub struct Renderer {
    title: String,
}

impl Renderer {
    /// `title` is the banner's tool name and version.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn render(
        &self,
        chapters: &ChapterTable,
        assembler: &mut Assembler<'_>,
        diagnostics: &mut Diagnostics,
    ) -> RenderedFilter {
        let mut rendered = vec![];
        let mut dropped = 0;

        for (index, (name, chapter)) in ordered(chapters).into_iter().enumerate() {
            tracing::info!(chapter = %name, priority = chapter.priority, "generating chapter");
            let base = (index as u32 + 1) * CHAPTER_STEP;
            let mut sections = vec![];

            for (offset, (section_name, section)) in chapter.section.iter().enumerate() {
                let rule = assembler.assemble(chapter, section_name, section, diagnostics);
                if rule.is_empty() {
                    diagnostics.record(Diagnostic::warning(
                        DiagnosticKind::EmptyRule,
                        section_name.as_str(),
                        format!(
                            "ignoring section \"{}\" in \"{}\", no actions and conditions found",
                            section_name, name
                        ),
                    ));
                    dropped += 1;
                    continue;
                }
                sections.push(RenderedSection {
                    id: base + offset as u32 + 1,
                    name: section_name.clone(),
                    rule,
                });
            }

            rendered.push(RenderedChapter {
                id: base,
                name: name.to_string(),
                sections,
            });
        }

        let mut body = Lines::default();
        for chapter in &rendered {
            write_chapter(&mut body, chapter);
        }
        let fingerprint = fingerprint(&body.0);

        let mut out = Lines::default();
        self.write_banner(&mut out, &fingerprint);
        write_contents(&mut out, &rendered);
        out.0.push_str(&body.0);

        let sections = rendered.iter().map(|c| c.sections.len()).sum();
        tracing::info!(chapters = rendered.len(), sections, dropped, "filter rendered");

        RenderedFilter {
            text: out.0,
            fingerprint,
            chapters: rendered.len(),
            sections,
            dropped,
        }
    }

    fn write_banner(&self, out: &mut Lines, fingerprint: &str) {
        out.comment("=".repeat(FILLER_LENGTH));
        out.comment(&self.title);
        out.comment(format!("fingerprint: {}", fingerprint));
        out.comment("=".repeat(FILLER_LENGTH));
        out.blank();
    }
}

fn write_contents(out: &mut Lines, chapters: &[RenderedChapter]) {
    out.comment("Table of contents");
    for chapter in chapters {
        out.comment(format!("  [{}] {}", chapter.id, chapter.name));
        for section in &chapter.sections {
            out.comment(format!("    [{}] {}", section.id, section.name));
        }
    }
    out.blank();
}

fn write_chapter(out: &mut Lines, chapter: &RenderedChapter) {
    out.comment("=".repeat(FILLER_LENGTH));
    out.comment(format!("[[{}]] {}", chapter.id, chapter.name));
    out.comment("=".repeat(FILLER_LENGTH));

    for section in &chapter.sections {
        let rule = &section.rule;
        out.comment("-".repeat(FILLER_LENGTH));
        out.comment(format!(
            "{:width$} [{}] {}",
            "Section:",
            section.id,
            section.name,
            width = LABEL_WIDTH
        ));
        if let Some(theme) = &rule.theme {
            out.comment(format!("{:width$} {}", "Theme:", theme, width = LABEL_WIDTH));
        }
        out.comment("-".repeat(FILLER_LENGTH));
        out.line(rule.visibility.to_string());

        out.line("\t# conditions");
        for (directive, value) in &rule.conditions {
            out.line(format!("\t{:width$} {}", directive, value, width = DIRECTIVE_WIDTH));
        }
        out.line("\t# actions");
        for (directive, value) in &rule.actions {
            out.line(format!("\t{:width$} {}", directive, value, width = DIRECTIVE_WIDTH));
        }
        out.blank();
    }
}
