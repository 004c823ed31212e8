//! Word, Excel and PDF documents.
//!
//! Records are drawn on the async side so the task rng stays in order; the
//! encoders themselves run on the blocking pool.

use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use docx_rs::{Docx, Paragraph, Run, Table as DocxTable, TableCell, TableRow};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use rand_chacha::ChaCha8Rng;
use rust_xlsxwriter::{Format, Workbook};

use populator_core::ContentKind;

use super::data::{financial_table, tabulate};
use super::{RenderError, Renderer, encode_blocking, write_bytes};
use crate::content::{
    Contract, ContentGenerator, FinancialReport, Invoice, MeetingNotes, Memo, Party, Policy,
    Project, Report, Section, Table,
};

/// Page-oriented view of a record, shared by docx and pdf.
#[derive(Debug, Clone, Default)]
pub(crate) struct Outline {
    pub title: String,
    pub details: Vec<(String, String)>,
    /// Sections with an empty heading are plain body text.
    pub sections: Vec<Section>,
    pub table: Option<Table>,
}

impl Outline {
    pub fn compose(content: &ContentGenerator, kind: ContentKind, rng: &mut ChaCha8Rng) -> Self {
        match kind {
            ContentKind::Policy => policy_outline(content.policy(rng)),
            ContentKind::Contract => contract_outline(content.contract(rng)),
            ContentKind::Report => report_outline(content.report(rng)),
            ContentKind::Financial => financial_outline(content.financial_report(rng)),
            ContentKind::Invoice | ContentKind::Invoices => invoice_outline(content.invoice(rng)),
            ContentKind::Notes => notes_outline(content.meeting_notes(rng)),
            ContentKind::Project => project_outline(content.project(rng)),
            _ => memo_outline(content.memo(rng)),
        }
    }
}

fn detail(label: &str, value: impl ToString) -> (String, String) {
    (label.to_string(), value.to_string())
}

fn body(text: impl Into<String>) -> Section {
    Section {
        heading: String::new(),
        body: text.into(),
    }
}

fn memo_outline(memo: Memo) -> Outline {
    Outline {
        title: "MEMORANDUM".to_string(),
        details: vec![
            detail("To", &memo.to),
            detail("From", &memo.from),
            detail("Date", memo.date),
            detail("Subject", &memo.subject),
        ],
        sections: memo.body.into_iter().map(body).collect(),
        table: None,
    }
}

fn policy_outline(policy: Policy) -> Outline {
    Outline {
        title: policy.title,
        details: vec![
            detail("Policy Number", &policy.number),
            detail("Owner", &policy.owner),
            detail("Effective Date", policy.effective_date),
        ],
        sections: policy.sections,
        table: None,
    }
}

fn party_line(party: &Party) -> String {
    format!(
        "{}, {}, {}, {} {} ({})",
        party.name, party.street, party.city, party.state, party.zip, party.email
    )
}

fn contract_outline(contract: Contract) -> Outline {
    let parties = contract
        .parties
        .iter()
        .map(party_line)
        .collect::<Vec<_>>()
        .join("; ");
    let mut sections = vec![Section {
        heading: "Parties".to_string(),
        body: parties,
    }];
    sections.extend(contract.clauses);

    Outline {
        title: contract.title,
        details: vec![
            detail("Contract Number", &contract.number),
            detail("Effective Date", contract.effective_date),
            detail("Term", format!("{} months", contract.term_months)),
        ],
        sections,
        table: None,
    }
}

fn report_outline(report: Report) -> Outline {
    let mut sections = vec![Section {
        heading: "Executive Summary".to_string(),
        body: report.summary,
    }];
    sections.extend(report.sections);

    let rows = report
        .metrics
        .iter()
        .map(|metric| {
            vec![
                metric.label.clone(),
                format!("{:.2}", metric.value),
                format!("{:+.2}%", metric.change_pct),
            ]
        })
        .collect();

    Outline {
        title: report.title,
        details: vec![detail("Author", &report.author), detail("Date", report.date)],
        sections,
        table: Some(Table {
            headers: vec!["Metric".into(), "Value".into(), "Change".into()],
            rows,
        }),
    }
}

fn financial_outline(report: FinancialReport) -> Outline {
    Outline {
        title: format!("{} Financial Statement", report.company),
        details: vec![
            detail("Period", &report.period),
            detail("Net Income", format!("{:.2}", report.net_income)),
        ],
        sections: Vec::new(),
        table: Some(financial_table(&report)),
    }
}

fn invoice_outline(invoice: Invoice) -> Outline {
    let rows = invoice
        .items
        .iter()
        .map(|item| {
            vec![
                item.description.clone(),
                item.quantity.to_string(),
                format!("{:.2}", item.unit_price),
                format!("{:.2}", item.amount),
            ]
        })
        .collect();

    Outline {
        title: format!("Invoice {}", invoice.number),
        details: vec![
            detail("Date", invoice.date),
            detail("Due Date", invoice.due_date),
            detail("From", party_line(&invoice.vendor)),
            detail("Bill To", party_line(&invoice.customer)),
            detail("Subtotal", format!("{:.2}", invoice.subtotal)),
            detail("Tax", format!("{:.2}", invoice.tax)),
            detail("Total", format!("{:.2}", invoice.total)),
            detail("Status", &invoice.status),
        ],
        sections: Vec::new(),
        table: Some(Table {
            headers: vec![
                "Description".into(),
                "Quantity".into(),
                "Unit Price".into(),
                "Amount".into(),
            ],
            rows,
        }),
    }
}

fn notes_outline(notes: MeetingNotes) -> Outline {
    let sections = vec![
        Section {
            heading: "Attendees".to_string(),
            body: notes.attendees.join(", "),
        },
        Section {
            heading: "Agenda".to_string(),
            body: notes.agenda.join(" "),
        },
        Section {
            heading: "Discussion".to_string(),
            body: notes.discussion.join(" "),
        },
    ];

    let rows = notes
        .action_items
        .iter()
        .map(|item| vec![item.owner.clone(), item.task.clone(), item.due.to_string()])
        .collect();

    Outline {
        title: notes.title,
        details: vec![detail("Date", notes.date)],
        sections,
        table: Some(Table {
            headers: vec!["Owner".into(), "Action".into(), "Due".into()],
            rows,
        }),
    }
}

fn project_outline(project: Project) -> Outline {
    let rows = project
        .milestones
        .iter()
        .map(|milestone| {
            vec![
                milestone.name.clone(),
                milestone.due.to_string(),
                if milestone.done { "done" } else { "open" }.to_string(),
            ]
        })
        .collect();

    Outline {
        title: project.name,
        details: vec![
            detail("Code", &project.code),
            detail("Owner", &project.owner),
            detail("Status", &project.status),
            detail("Start", project.start_date),
            detail("End", project.end_date),
            detail("Budget", project.budget),
        ],
        sections: vec![Section {
            heading: "Description".to_string(),
            body: project.description,
        }],
        table: Some(Table {
            headers: vec!["Milestone".into(), "Due".into(), "Status".into()],
            rows,
        }),
    }
}

/// `.docx` documents built with `docx-rs`.
#[derive(Debug, Clone)]
pub struct DocxRenderer {
    content: ContentGenerator,
}

impl DocxRenderer {
    pub fn new(content: ContentGenerator) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Renderer for DocxRenderer {
    fn name(&self) -> &'static str {
        "docx"
    }

    async fn render(
        &self,
        path: &Path,
        content: ContentKind,
        rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        let outline = Outline::compose(&self.content, content, rng);
        let bytes = encode_blocking(move || encode_docx(&outline)).await?;
        write_bytes(path, bytes).await
    }
}

fn text_run(text: &str, size: usize, bold: bool) -> Run {
    let run = Run::new().add_text(text).size(size);
    if bold { run.bold() } else { run }
}

fn docx_table(table: &Table) -> DocxTable {
    let row = |cells: &[String], bold: bool| {
        TableRow::new(
            cells
                .iter()
                .map(|cell| {
                    TableCell::new().add_paragraph(Paragraph::new().add_run(text_run(cell, 20, bold)))
                })
                .collect(),
        )
    };

    let mut rows = vec![row(&table.headers, true)];
    rows.extend(table.rows.iter().map(|cells| row(cells, false)));
    DocxTable::new(rows)
}

pub(crate) fn encode_docx(outline: &Outline) -> Result<Vec<u8>, RenderError> {
    let mut docx = Docx::new().add_paragraph(Paragraph::new().add_run(text_run(&outline.title, 36, true)));

    for (label, value) in &outline.details {
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(text_run(&format!("{label}: "), 22, true))
                .add_run(text_run(value, 22, false)),
        );
    }
    for section in &outline.sections {
        if !section.heading.is_empty() {
            docx = docx.add_paragraph(Paragraph::new().add_run(text_run(&section.heading, 28, true)));
        }
        docx = docx.add_paragraph(Paragraph::new().add_run(text_run(&section.body, 22, false)));
    }
    if let Some(table) = &outline.table {
        docx = docx.add_table(docx_table(table));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|err| RenderError::Encode(err.to_string()))?;
    Ok(buffer.into_inner())
}

/// `.xlsx` workbooks built with `rust_xlsxwriter`.
#[derive(Debug, Clone)]
pub struct XlsxRenderer {
    content: ContentGenerator,
}

impl XlsxRenderer {
    pub fn new(content: ContentGenerator) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Renderer for XlsxRenderer {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    async fn render(
        &self,
        path: &Path,
        content: ContentKind,
        rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        let table = tabulate(&self.content, content, rng);
        let sheet = sheet_name(content);
        let bytes = encode_blocking(move || encode_xlsx(sheet, &table)).await?;
        write_bytes(path, bytes).await
    }
}

fn sheet_name(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Employees | ContentKind::Employee => "Employees",
        ContentKind::Invoices | ContentKind::Invoice => "Invoices",
        ContentKind::Financial => "Income Statement",
        _ => "Data",
    }
}

/// One sheet with a bold header row. Cells that parse as numbers are stored
/// as numbers.
pub(crate) fn encode_xlsx(sheet_name: &str, table: &Table) -> Result<Vec<u8>, RenderError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (col, title) in table.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title, &header)?;
    }
    for (index, cells) in table.rows.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell.parse::<f64>() {
                Ok(number) if number.is_finite() => {
                    sheet.write_number(row, col, number)?;
                }
                _ => {
                    sheet.write_string(row, col, cell)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// `.pdf` documents built with `printpdf` and the built-in Helvetica faces.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    content: ContentGenerator,
}

impl PdfRenderer {
    pub fn new(content: ContentGenerator) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Renderer for PdfRenderer {
    fn name(&self) -> &'static str {
        "pdf"
    }

    async fn render(
        &self,
        path: &Path,
        content: ContentKind,
        rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        let outline = Outline::compose(&self.content, content, rng);
        let bytes = encode_blocking(move || encode_pdf(&outline)).await?;
        write_bytes(path, bytes).await
    }
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LAYER: &str = "Layer 1";
/// Millimetres per point, with line spacing.
const LINE_PITCH: f32 = 0.3528 * 1.4;

fn pdf_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Encode(err.to_string())
}

/// Top-to-bottom text layout that starts a new page when the margin is hit.
struct PdfPages {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: f32,
}

impl PdfPages {
    fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            cursor: PAGE_HEIGHT - MARGIN,
        })
    }

    fn advance(&mut self, height: f32) {
        if self.cursor - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.cursor = PAGE_HEIGHT - MARGIN;
        }
        self.cursor -= height;
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        self.advance(size * LINE_PITCH);
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.cursor), font);
    }

    fn paragraph(&mut self, text: &str, size: f32) {
        let columns = ((PAGE_WIDTH - 2.0 * MARGIN) / (size * 0.19)) as usize;
        for line in wrap(text, columns.max(20)) {
            self.line(&line, size, false);
        }
        self.advance(size * 0.3528 * 0.6);
    }

    fn row(&mut self, cells: &[String], bold: bool) {
        let size = 9.0;
        self.advance(size * LINE_PITCH);
        let width = (PAGE_WIDTH - 2.0 * MARGIN) / cells.len().max(1) as f32;
        let max_chars = (width / (size * 0.19)) as usize;
        let font = if bold { &self.bold } else { &self.regular };
        for (index, cell) in cells.iter().enumerate() {
            let text: String = cell.chars().take(max_chars.max(4)).collect();
            let x = MARGIN + width * index as f32;
            self.layer.use_text(text, size, Mm(x), Mm(self.cursor), font);
        }
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

pub(crate) fn encode_pdf(outline: &Outline) -> Result<Vec<u8>, RenderError> {
    let mut pages = PdfPages::new(&outline.title)?;
    pages.line(&outline.title, 18.0, true);
    pages.advance(4.0);

    for (label, value) in &outline.details {
        pages.paragraph(&format!("{label}: {value}"), 10.0);
    }
    for section in &outline.sections {
        if !section.heading.is_empty() {
            pages.line(&section.heading, 13.0, true);
        }
        pages.paragraph(&section.body, 10.0);
    }
    if let Some(table) = &outline.table {
        pages.row(&table.headers, true);
        for cells in &table.rows {
            pages.row(cells, false);
        }
    }

    pages.finish()
}

/// Greedy word wrap to at most `columns` characters per line.
///
/// A single word longer than `columns` gets a line of its own.
pub(crate) fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;

    fn content() -> ContentGenerator {
        ContentGenerator::new(NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date"))
    }

    #[test]
    fn wrap_respects_column_limit() {
        let lines = wrap("alpha beta gamma delta epsilon", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta", "epsilon"]);
        assert_eq!(wrap("", 10), Vec::<String>::new());
        assert_eq!(wrap("overlongword tail", 4), vec!["overlongword", "tail"]);
    }

    #[test]
    fn invoice_outline_carries_line_items() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let outline = Outline::compose(&content(), ContentKind::Invoice, &mut rng);
        assert!(outline.title.starts_with("Invoice INV-"));
        let table = outline.table.expect("line items");
        assert_eq!(table.headers.len(), 4);
        assert!(!table.rows.is_empty());
    }

    #[test]
    fn unmatched_kinds_become_memos() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let outline = Outline::compose(&content(), ContentKind::Log, &mut rng);
        assert_eq!(outline.title, "MEMORANDUM");
        assert_eq!(outline.details.len(), 4);
    }

    #[test]
    fn docx_is_a_readable_package() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let outline = Outline::compose(&content(), ContentKind::Report, &mut rng);
        let bytes = encode_docx(&outline).expect("encode docx");
        assert!(bytes.starts_with(b"PK"));
        let docx = docx_rs::read_docx(&bytes).expect("read docx");
        assert!(!docx.document.children.is_empty());
    }

    #[test]
    fn pdf_grows_with_content() {
        let short = Outline {
            title: "Short".to_string(),
            sections: vec![body("one paragraph")],
            ..Outline::default()
        };
        let long = Outline {
            title: "Long".to_string(),
            sections: (0..200)
                .map(|index| body(format!("paragraph {index} with some words in it")))
                .collect(),
            ..Outline::default()
        };
        let short = encode_pdf(&short).expect("encode pdf");
        let long = encode_pdf(&long).expect("encode pdf");
        assert!(short.starts_with(b"%PDF"));
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }
}
