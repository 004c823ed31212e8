use std::fmt::Write as _;
use std::path::Path;

use async_trait::async_trait;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use populator_core::ContentKind;

use super::{RenderError, Renderer, write_bytes};
use crate::content::{
    ContentGenerator, LogEntry, MeetingNotes, Memo, Policy, Project, Report, lorem_paragraphs,
    title_case,
};

/// Plain `.txt` files: memos, meeting notes, logs, or prose.
#[derive(Debug, Clone)]
pub struct PlainTextRenderer {
    content: ContentGenerator,
    forced: Option<ContentKind>,
}

impl PlainTextRenderer {
    pub fn new(content: ContentGenerator) -> Self {
        Self {
            content,
            forced: None,
        }
    }

    /// Renderer for unregistered output kinds: always writes a memo.
    pub fn fallback(content: ContentGenerator) -> Self {
        Self {
            content,
            forced: Some(ContentKind::Memo),
        }
    }

    fn compose(&self, kind: ContentKind, rng: &mut ChaCha8Rng) -> String {
        match kind {
            ContentKind::Memo => memo_text(&self.content.memo(rng)),
            ContentKind::Notes => notes_text(&self.content.meeting_notes(rng)),
            ContentKind::Log => {
                let count = rng.random_range(50..200);
                log_text(&self.content.log_entries(count, rng))
            }
            other => {
                let mut out = format!("{}\n\n", title_case(other.as_str()).to_uppercase());
                let count = rng.random_range(3..8);
                out.push_str(&lorem_paragraphs(count, rng).join("\n\n"));
                out.push('\n');
                out
            }
        }
    }
}

#[async_trait]
impl Renderer for PlainTextRenderer {
    fn name(&self) -> &'static str {
        if self.forced.is_some() { "fallback" } else { "txt" }
    }

    async fn render(
        &self,
        path: &Path,
        content: ContentKind,
        rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        let text = self.compose(self.forced.unwrap_or(content), rng);
        write_bytes(path, text.into_bytes()).await
    }
}

/// `.md` files: meeting notes, project briefs, policies and reports.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    content: ContentGenerator,
}

impl MarkdownRenderer {
    pub fn new(content: ContentGenerator) -> Self {
        Self { content }
    }

    fn compose(&self, kind: ContentKind, rng: &mut ChaCha8Rng) -> String {
        match kind {
            ContentKind::Project => project_markdown(&self.content.project(rng)),
            ContentKind::Policy => policy_markdown(&self.content.policy(rng)),
            ContentKind::Report | ContentKind::Financial => {
                report_markdown(&self.content.report(rng))
            }
            _ => notes_markdown(&self.content.meeting_notes(rng)),
        }
    }
}

#[async_trait]
impl Renderer for MarkdownRenderer {
    fn name(&self) -> &'static str {
        "md"
    }

    async fn render(
        &self,
        path: &Path,
        content: ContentKind,
        rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        let text = self.compose(content, rng);
        write_bytes(path, text.into_bytes()).await
    }
}

// Writing into a String never fails, so `writeln!` results are discarded below.

fn memo_text(memo: &Memo) -> String {
    let mut out = String::from("MEMORANDUM\n\n");
    let _ = writeln!(out, "TO:      {}", memo.to);
    let _ = writeln!(out, "FROM:    {}", memo.from);
    let _ = writeln!(out, "DATE:    {}", memo.date.format("%B %d, %Y"));
    let _ = writeln!(out, "SUBJECT: {}", memo.subject);
    out.push_str(&"-".repeat(60));
    out.push_str("\n\n");
    out.push_str(&memo.body.join("\n\n"));
    out.push('\n');
    out
}

fn notes_text(notes: &MeetingNotes) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", notes.title.to_uppercase());
    let _ = writeln!(out, "Date: {}", notes.date);
    let _ = writeln!(out, "Attendees: {}\n", notes.attendees.join(", "));
    out.push_str("AGENDA\n");
    for (index, item) in notes.agenda.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, item);
    }
    out.push_str("\nDISCUSSION\n");
    for point in &notes.discussion {
        let _ = writeln!(out, "  - {point}");
    }
    out.push_str("\nACTION ITEMS\n");
    for item in &notes.action_items {
        let _ = writeln!(out, "  [ ] {} ({}, due {})", item.task, item.owner, item.due);
    }
    out
}

fn log_text(entries: &[LogEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{} [{:<5}] {} {}: {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.level,
            entry.host,
            entry.service,
            entry.message
        );
    }
    out
}

fn notes_markdown(notes: &MeetingNotes) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", notes.title);
    let _ = writeln!(out, "**Date:** {}  ", notes.date);
    let _ = writeln!(out, "**Attendees:** {}\n", notes.attendees.join(", "));
    out.push_str("## Agenda\n\n");
    for (index, item) in notes.agenda.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, item);
    }
    out.push_str("\n## Discussion\n\n");
    for point in &notes.discussion {
        let _ = writeln!(out, "- {point}");
    }
    out.push_str("\n## Action Items\n\n");
    for item in &notes.action_items {
        let _ = writeln!(out, "- [ ] {} (@{}, due {})", item.task, item.owner, item.due);
    }
    out
}

fn project_markdown(project: &Project) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} ({})\n", project.name, project.code);
    let _ = writeln!(out, "> {}\n", project.description);
    out.push_str("| Field | Value |\n|---|---|\n");
    let _ = writeln!(out, "| Owner | {} |", project.owner);
    let _ = writeln!(out, "| Status | {} |", project.status);
    let _ = writeln!(out, "| Start | {} |", project.start_date);
    let _ = writeln!(out, "| End | {} |", project.end_date);
    let _ = writeln!(out, "| Budget | ${} |\n", project.budget);
    out.push_str("## Milestones\n\n");
    for milestone in &project.milestones {
        let mark = if milestone.done { "x" } else { " " };
        let _ = writeln!(out, "- [{mark}] {} ({})", milestone.name, milestone.due);
    }
    out
}

fn policy_markdown(policy: &Policy) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", policy.title);
    let _ = writeln!(
        out,
        "*Policy {} | Owner: {} | Effective {}*\n",
        policy.number, policy.owner, policy.effective_date
    );
    for (index, section) in policy.sections.iter().enumerate() {
        let _ = writeln!(out, "## {}. {}\n\n{}\n", index + 1, section.heading, section.body);
    }
    out
}

fn report_markdown(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", report.title);
    let _ = writeln!(out, "_{} | {}_\n", report.author, report.date);
    let _ = writeln!(out, "{}\n", report.summary);
    out.push_str("| Metric | Value | Change |\n|---|---:|---:|\n");
    for metric in &report.metrics {
        let _ = writeln!(
            out,
            "| {} | {:.2} | {:+.2}% |",
            metric.label, metric.value, metric.change_pct
        );
    }
    for section in &report.sections {
        let _ = writeln!(out, "\n## {}\n\n{}", section.heading, section.body);
    }
    out
}
