use std::fmt::Write as _;
use std::path::Path;

use async_trait::async_trait;
use rand_chacha::ChaCha8Rng;

use populator_core::ContentKind;

use super::{RenderError, Renderer, escape_markup as esc, write_bytes};
use crate::content::{AppConfig, ContentGenerator, Policy, Project, Report, Table};

/// `.xml` configuration files, data exports and project descriptors.
#[derive(Debug, Clone)]
pub struct XmlRenderer {
    content: ContentGenerator,
}

impl XmlRenderer {
    pub fn new(content: ContentGenerator) -> Self {
        Self { content }
    }

    fn compose(&self, kind: ContentKind, rng: &mut ChaCha8Rng) -> String {
        let body = match kind {
            ContentKind::Config => config_xml(&self.content.config(rng)),
            ContentKind::Project => project_xml(&self.content.project(rng)),
            _ => table_xml(&self.content.table(rng)),
        };
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}")
    }
}

#[async_trait]
impl Renderer for XmlRenderer {
    fn name(&self) -> &'static str {
        "xml"
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

/// Standalone `.html` pages for reports and policies.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    content: ContentGenerator,
}

impl HtmlRenderer {
    pub fn new(content: ContentGenerator) -> Self {
        Self { content }
    }

    fn compose(&self, kind: ContentKind, rng: &mut ChaCha8Rng) -> String {
        match kind {
            ContentKind::Policy => policy_html(&self.content.policy(rng)),
            _ => report_html(&self.content.report(rng)),
        }
    }
}

#[async_trait]
impl Renderer for HtmlRenderer {
    fn name(&self) -> &'static str {
        "html"
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

fn config_xml(config: &AppConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<configuration service=\"{}\" version=\"{}\">",
        esc(&config.service),
        esc(&config.version)
    );
    let _ = writeln!(out, "  <environment>{}</environment>", esc(&config.environment));
    let _ = writeln!(out, "  <port>{}</port>", config.port);
    let _ = writeln!(out, "  <logLevel>{}</logLevel>", esc(&config.log_level));
    let db = &config.database;
    let _ = writeln!(
        out,
        "  <database host=\"{}\" port=\"{}\" name=\"{}\" poolSize=\"{}\"/>",
        esc(&db.host),
        db.port,
        esc(&db.name),
        db.pool_size
    );
    out.push_str("  <features>\n");
    for (name, enabled) in &config.features {
        let _ = writeln!(out, "    <feature name=\"{}\" enabled=\"{enabled}\"/>", esc(name));
    }
    out.push_str("  </features>\n</configuration>\n");
    out
}

fn project_xml(project: &Project) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<project code=\"{}\" status=\"{}\">",
        esc(&project.code),
        esc(&project.status)
    );
    let _ = writeln!(out, "  <name>{}</name>", esc(&project.name));
    let _ = writeln!(out, "  <owner>{}</owner>", esc(&project.owner));
    let _ = writeln!(out, "  <start>{}</start>", project.start_date);
    let _ = writeln!(out, "  <end>{}</end>", project.end_date);
    let _ = writeln!(out, "  <budget currency=\"USD\">{}</budget>", project.budget);
    let _ = writeln!(out, "  <description>{}</description>", esc(&project.description));
    out.push_str("  <milestones>\n");
    for milestone in &project.milestones {
        let _ = writeln!(
            out,
            "    <milestone due=\"{}\" done=\"{}\">{}</milestone>",
            milestone.due,
            milestone.done,
            esc(&milestone.name)
        );
    }
    out.push_str("  </milestones>\n</project>\n");
    out
}

fn table_xml(table: &Table) -> String {
    let mut out = String::from("<records>\n");
    for row in &table.rows {
        out.push_str("  <record>\n");
        for (header, value) in table.headers.iter().zip(row) {
            let _ = writeln!(out, "    <{header}>{}</{header}>", esc(value));
        }
        out.push_str("  </record>\n");
    }
    out.push_str("</records>\n");
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n\
         body {{ font-family: Arial, sans-serif; margin: 40px; color: #222; }}\n\
         table {{ border-collapse: collapse; }}\n\
         th, td {{ border: 1px solid #ccc; padding: 6px 12px; }}\n\
         </style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = esc(title),
    )
}

fn report_html(report: &Report) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", esc(&report.title));
    let _ = writeln!(
        body,
        "<p class=\"meta\">{} &middot; {}</p>",
        esc(&report.author),
        report.date
    );
    let _ = writeln!(body, "<p>{}</p>", esc(&report.summary));
    body.push_str("<table>\n<tr><th>Metric</th><th>Value</th><th>Change</th></tr>\n");
    for metric in &report.metrics {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{:.2}</td><td>{:+.2}%</td></tr>",
            esc(&metric.label),
            metric.value,
            metric.change_pct
        );
    }
    body.push_str("</table>\n");
    for section in &report.sections {
        let _ = writeln!(
            body,
            "<h2>{}</h2>\n<p>{}</p>",
            esc(&section.heading),
            esc(&section.body)
        );
    }
    page(&report.title, &body)
}

fn policy_html(policy: &Policy) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", esc(&policy.title));
    let _ = writeln!(
        body,
        "<p class=\"meta\">Policy {} &middot; Owner: {} &middot; Effective {}</p>",
        esc(&policy.number),
        esc(&policy.owner),
        policy.effective_date
    );
    for (index, section) in policy.sections.iter().enumerate() {
        let _ = writeln!(
            body,
            "<h2>{}. {}</h2>\n<p>{}</p>",
            index + 1,
            esc(&section.heading),
            esc(&section.body)
        );
    }
    page(&policy.title, &body)
}
