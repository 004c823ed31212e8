use std::path::Path;

use async_trait::async_trait;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use populator_core::ContentKind;

use super::{RenderError, Renderer, write_bytes};
use crate::content::{ContentGenerator, Employee, FinancialReport, Invoice, Table};

/// Pretty-printed JSON of the record for any content kind.
#[derive(Debug, Clone)]
pub struct JsonRenderer {
    content: ContentGenerator,
}

impl JsonRenderer {
    pub fn new(content: ContentGenerator) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Renderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn render(
        &self,
        path: &Path,
        content: ContentKind,
        rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        let document = self.content.document(content, rng);
        let mut bytes = serde_json::to_vec_pretty(&document)?;
        bytes.push(b'\n');
        write_bytes(path, bytes).await
    }
}

/// Header plus rows: employee rosters, invoice registers, spreadsheets.
#[derive(Debug, Clone)]
pub struct CsvRenderer {
    content: ContentGenerator,
}

impl CsvRenderer {
    pub fn new(content: ContentGenerator) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Renderer for CsvRenderer {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn render(
        &self,
        path: &Path,
        content: ContentKind,
        rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        let table = tabulate(&self.content, content, rng);
        let bytes = encode_csv(&table)?;
        write_bytes(path, bytes).await
    }
}

/// Rows for the spreadsheet-like formats (csv and xlsx).
pub(super) fn tabulate(content: &ContentGenerator, kind: ContentKind, rng: &mut ChaCha8Rng) -> Table {
    match kind {
        ContentKind::Employees | ContentKind::Employee => {
            let count = rng.random_range(20..80);
            let employees: Vec<Employee> = (0..count).map(|_| content.employee(rng)).collect();
            employee_table(&employees)
        }
        ContentKind::Invoices | ContentKind::Invoice => {
            let count = rng.random_range(10..40);
            let invoices: Vec<Invoice> = (0..count).map(|_| content.invoice(rng)).collect();
            invoice_table(&invoices)
        }
        ContentKind::Financial => financial_table(&content.financial_report(rng)),
        _ => content.table(rng),
    }
}

fn encode_csv(table: &Table) -> Result<Vec<u8>, RenderError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|err| RenderError::Encode(err.to_string()))
}

fn employee_table(employees: &[Employee]) -> Table {
    let headers = [
        "employee_id",
        "first_name",
        "last_name",
        "email",
        "phone",
        "department",
        "title",
        "hire_date",
        "salary",
        "manager",
    ];
    Table {
        headers: headers.iter().map(|header| header.to_string()).collect(),
        rows: employees
            .iter()
            .map(|employee| {
                vec![
                    employee.id.clone(),
                    employee.first_name.clone(),
                    employee.last_name.clone(),
                    employee.email.clone(),
                    employee.phone.clone(),
                    employee.department.clone(),
                    employee.title.clone(),
                    employee.hire_date.to_string(),
                    employee.salary.to_string(),
                    employee.manager.clone(),
                ]
            })
            .collect(),
    }
}

fn invoice_table(invoices: &[Invoice]) -> Table {
    let headers = [
        "invoice_number",
        "date",
        "due_date",
        "customer",
        "items",
        "subtotal",
        "tax",
        "total",
        "status",
    ];
    Table {
        headers: headers.iter().map(|header| header.to_string()).collect(),
        rows: invoices
            .iter()
            .map(|invoice| {
                vec![
                    invoice.number.clone(),
                    invoice.date.to_string(),
                    invoice.due_date.to_string(),
                    invoice.customer.name.clone(),
                    invoice.items.len().to_string(),
                    format!("{:.2}", invoice.subtotal),
                    format!("{:.2}", invoice.tax),
                    format!("{:.2}", invoice.total),
                    invoice.status.clone(),
                ]
            })
            .collect(),
    }
}

pub(super) fn financial_table(report: &FinancialReport) -> Table {
    let line_row = |section: &str, label: &str, amount: f64| {
        vec![
            report.period.clone(),
            section.to_string(),
            label.to_string(),
            format!("{amount:.2}"),
        ]
    };
    let mut rows: Vec<Vec<String>> = report
        .revenue
        .iter()
        .map(|line| line_row("revenue", &line.label, line.amount))
        .collect();
    rows.extend(
        report
            .expenses
            .iter()
            .map(|line| line_row("expense", &line.label, line.amount)),
    );
    rows.push(line_row("total", "Net Income", report.net_income));

    Table {
        headers: ["period", "section", "line", "amount"]
            .iter()
            .map(|header| header.to_string())
            .collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_quotes_embedded_commas() {
        let table = Table {
            headers: vec!["name".to_string(), "amount".to_string()],
            rows: vec![vec!["Acme, Inc.".to_string(), "10.00".to_string()]],
        };
        let bytes = encode_csv(&table).expect("encode");
        assert_eq!(
            String::from_utf8(bytes).expect("utf8"),
            "name,amount\n\"Acme, Inc.\",10.00\n"
        );
    }
}
