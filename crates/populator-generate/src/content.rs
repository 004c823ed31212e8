//! Typed business records used as file contents.
//!
//! Every generator draws from the caller's rng, so a task seeded the same way
//! always produces the same document.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::company::en::{Bs, Buzzword, CatchPhrase, CompanyName};
use fake::faker::internet::en::{IPv4, SafeEmail};
use fake::faker::job::en::Title as JobTitle;
use fake::faker::lorem::en::{Paragraph, Sentence, Word, Words};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use serde::Serialize;

use populator_core::ContentKind;

const DEPARTMENTS: &[&str] = &[
    "Finance",
    "Human Resources",
    "Marketing",
    "Sales",
    "Operations",
    "Legal",
    "IT",
    "Executive",
];
const PROJECT_STATUSES: &[&str] = &["planning", "active", "on_hold", "completed"];
const LOG_LEVELS: &[(&str, u32)] = &[("INFO", 70), ("DEBUG", 15), ("WARN", 10), ("ERROR", 5)];
const SERVICES: &[&str] = &["api", "auth", "billing", "scheduler", "gateway", "worker"];
const ENVIRONMENTS: &[&str] = &["development", "staging", "production"];

#[derive(Debug, Clone, Serialize)]
pub struct Memo {
    pub to: String,
    pub from: String,
    pub date: NaiveDate,
    pub subject: String,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionItem {
    pub owner: String,
    pub task: String,
    pub due: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeetingNotes {
    pub title: String,
    pub date: NaiveDate,
    pub attendees: Vec<String>,
    pub agenda: Vec<String>,
    pub discussion: Vec<String>,
    pub action_items: Vec<ActionItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Party {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub number: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub vendor: Party,
    pub customer: Party,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub title: String,
    pub hire_date: NaiveDate,
    pub salary: u32,
    pub manager: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Milestone {
    pub name: String,
    pub due: NaiveDate,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub name: String,
    pub code: String,
    pub owner: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: u64,
    pub description: String,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Contract {
    pub title: String,
    pub number: String,
    pub effective_date: NaiveDate,
    pub term_months: u32,
    pub parties: Vec<Party>,
    pub clauses: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialLine {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialReport {
    pub company: String,
    pub period: String,
    pub revenue: Vec<FinancialLine>,
    pub expenses: Vec<FinancialLine>,
    pub net_income: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub author: String,
    pub date: NaiveDate,
    pub summary: String,
    pub sections: Vec<Section>,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Policy {
    pub title: String,
    pub number: String,
    pub owner: String,
    pub effective_date: NaiveDate,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Slide {
    pub title: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub level: String,
    pub service: String,
    pub host: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub service: String,
    pub version: String,
    pub environment: String,
    pub port: u16,
    pub log_level: String,
    pub database: DatabaseConfig,
    pub features: BTreeMap<String, bool>,
}

/// Rows of string cells under a header row.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One generated record for any content kind.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Document {
    Memo(Memo),
    Notes(MeetingNotes),
    Log(Vec<LogEntry>),
    Config(AppConfig),
    Invoice(Invoice),
    Invoices(Vec<Invoice>),
    Employee(Employee),
    Employees(Vec<Employee>),
    Project(Project),
    Data(Table),
    Financial(FinancialReport),
    Report(Report),
    Policy(Policy),
    Contract(Contract),
    Presentation(Vec<Slide>),
}

/// Builds records dated relative to a fixed "today".
#[derive(Debug, Clone, Copy)]
pub struct ContentGenerator {
    today: NaiveDate,
}

impl ContentGenerator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn document(&self, kind: ContentKind, rng: &mut dyn RngCore) -> Document {
        match kind {
            ContentKind::Memo => Document::Memo(self.memo(rng)),
            ContentKind::Notes => Document::Notes(self.meeting_notes(rng)),
            ContentKind::Log => Document::Log(self.log_entries(rng.random_range(20..60), rng)),
            ContentKind::Config => Document::Config(self.config(rng)),
            ContentKind::Invoice => Document::Invoice(self.invoice(rng)),
            ContentKind::Invoices => {
                let count = rng.random_range(5..15);
                Document::Invoices((0..count).map(|_| self.invoice(rng)).collect())
            }
            ContentKind::Employee => Document::Employee(self.employee(rng)),
            ContentKind::Employees => {
                let count = rng.random_range(10..40);
                Document::Employees((0..count).map(|_| self.employee(rng)).collect())
            }
            ContentKind::Project => Document::Project(self.project(rng)),
            ContentKind::Data => Document::Data(self.table(rng)),
            ContentKind::Financial => Document::Financial(self.financial_report(rng)),
            ContentKind::Report => Document::Report(self.report(rng)),
            ContentKind::Policy => Document::Policy(self.policy(rng)),
            ContentKind::Contract => Document::Contract(self.contract(rng)),
            ContentKind::Presentation => Document::Presentation(self.slides(rng)),
        }
    }

    pub fn memo(&self, rng: &mut dyn RngCore) -> Memo {
        let subject: String = CatchPhrase().fake_with_rng(rng);
        Memo {
            to: format!("{} Team", pick(DEPARTMENTS, rng)),
            from: Name().fake_with_rng(rng),
            date: self.days_ago(rng, 0..=90),
            subject,
            body: lorem_paragraphs(rng.random_range(2..5), rng),
        }
    }

    pub fn meeting_notes(&self, rng: &mut dyn RngCore) -> MeetingNotes {
        let date = self.days_ago(rng, 0..=60);
        let attendees: Vec<String> = (0..rng.random_range(3..8))
            .map(|_| Name().fake_with_rng(rng))
            .collect();
        let agenda = (0..rng.random_range(3..6))
            .map(|_| Sentence(3..7).fake_with_rng(rng))
            .collect();
        let discussion = (0..rng.random_range(2..5))
            .map(|_| Sentence(8..16).fake_with_rng(rng))
            .collect();
        let action_items = (0..rng.random_range(2..6))
            .map(|_| ActionItem {
                owner: attendees
                    .choose(rng)
                    .cloned()
                    .unwrap_or_else(|| "Unassigned".to_string()),
                task: Sentence(4..9).fake_with_rng(rng),
                due: date + Duration::days(rng.random_range(3..30)),
            })
            .collect();
        let topic: String = Buzzword().fake_with_rng(rng);

        MeetingNotes {
            title: format!("{} sync", title_case(&topic)),
            date,
            attendees,
            agenda,
            discussion,
            action_items,
        }
    }

    pub fn invoice(&self, rng: &mut dyn RngCore) -> Invoice {
        let date = self.days_ago(rng, 0..=365);
        let items: Vec<LineItem> = (0..rng.random_range(1..8))
            .map(|_| {
                let quantity = rng.random_range(1..50);
                let unit_price = cents(rng.random_range(5.0..2_500.0));
                let words: Vec<String> = Words(2..4).fake_with_rng(rng);
                LineItem {
                    description: title_case(&words.join(" ")),
                    quantity,
                    unit_price,
                    amount: cents(unit_price * f64::from(quantity)),
                }
            })
            .collect();
        let subtotal = cents(items.iter().map(|item| item.amount).sum());
        let tax = cents(subtotal * 0.08);
        let status = pick(&["paid", "pending", "overdue"], rng);

        Invoice {
            number: format!("INV-{}-{:05}", date.format("%Y"), rng.random_range(1..100_000)),
            date,
            due_date: date + Duration::days(30),
            vendor: party(rng),
            customer: party(rng),
            items,
            subtotal,
            tax,
            total: cents(subtotal + tax),
            status: status.to_string(),
        }
    }

    pub fn employee(&self, rng: &mut dyn RngCore) -> Employee {
        let first_name: String = FirstName().fake_with_rng(rng);
        let last_name: String = LastName().fake_with_rng(rng);
        let email = format!(
            "{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        );
        Employee {
            id: format!("E{:05}", rng.random_range(1..100_000)),
            email,
            first_name,
            last_name,
            phone: PhoneNumber().fake_with_rng(rng),
            department: pick(DEPARTMENTS, rng).to_string(),
            title: JobTitle().fake_with_rng(rng),
            hire_date: self.days_ago(rng, 30..=3_650),
            salary: rng.random_range(40..220) * 1_000,
            manager: Name().fake_with_rng(rng),
        }
    }

    pub fn project(&self, rng: &mut dyn RngCore) -> Project {
        let start_date = self.days_ago(rng, 30..=540);
        let end_date = start_date + Duration::days(rng.random_range(60..365));
        let milestones = (0..rng.random_range(3..7))
            .map(|index| {
                let due = start_date + Duration::days(30 * (index + 1));
                Milestone {
                    name: title_case(&Sentence(2..4).fake_with_rng::<String, _>(rng)),
                    due,
                    done: due < self.today,
                }
            })
            .collect();
        let word: String = Word().fake_with_rng(rng);

        Project {
            name: format!("Project {}", title_case(&word)),
            code: format!("PRJ-{:04}", rng.random_range(1..10_000)),
            owner: Name().fake_with_rng(rng),
            status: pick(PROJECT_STATUSES, rng).to_string(),
            start_date,
            end_date,
            budget: rng.random_range(10..500) * 1_000,
            description: Bs().fake_with_rng(rng),
            milestones,
        }
    }

    pub fn contract(&self, rng: &mut dyn RngCore) -> Contract {
        let kind = pick(
            &["Services", "Supply", "Consulting", "License", "Maintenance"],
            rng,
        );
        let clauses = [
            "Scope of Work",
            "Payment Terms",
            "Confidentiality",
            "Term and Termination",
            "Limitation of Liability",
            "Governing Law",
        ]
        .iter()
        .map(|heading| section(heading, rng))
        .collect();

        Contract {
            title: format!("{kind} Agreement"),
            number: format!("CTR-{:06}", rng.random_range(1..1_000_000)),
            effective_date: self.days_ago(rng, 0..=720),
            term_months: [6, 12, 24, 36].choose(rng).copied().unwrap_or(12),
            parties: vec![party(rng), party(rng)],
            clauses,
        }
    }

    pub fn financial_report(&self, rng: &mut dyn RngCore) -> FinancialReport {
        let revenue = vec![
            money_line("Product Sales", 200_000.0, 2_000_000.0, rng),
            money_line("Services", 50_000.0, 800_000.0, rng),
            money_line("Subscriptions", 20_000.0, 500_000.0, rng),
        ];
        let expenses = vec![
            money_line("Salaries", 100_000.0, 900_000.0, rng),
            money_line("Rent", 20_000.0, 120_000.0, rng),
            money_line("Marketing", 10_000.0, 250_000.0, rng),
            money_line("Technology", 10_000.0, 200_000.0, rng),
        ];
        let total = |lines: &[FinancialLine]| lines.iter().map(|line| line.amount).sum::<f64>();
        let quarter = rng.random_range(1..=4);

        FinancialReport {
            company: CompanyName().fake_with_rng(rng),
            period: format!("Q{quarter} {}", self.today.format("%Y")),
            net_income: cents(total(&revenue) - total(&expenses)),
            revenue,
            expenses,
        }
    }

    pub fn report(&self, rng: &mut dyn RngCore) -> Report {
        let topic: String = CatchPhrase().fake_with_rng(rng);
        let sections = ["Overview", "Findings", "Recommendations", "Next Steps"]
            .iter()
            .map(|heading| section(heading, rng))
            .collect();
        let metrics = ["Revenue", "Active Customers", "Churn", "Satisfaction"]
            .iter()
            .map(|label| Metric {
                label: label.to_string(),
                value: cents(rng.random_range(10.0..10_000.0)),
                change_pct: cents(rng.random_range(-15.0..25.0)),
            })
            .collect();

        Report {
            title: title_case(&topic),
            author: Name().fake_with_rng(rng),
            date: self.days_ago(rng, 0..=180),
            summary: Paragraph(2..4).fake_with_rng(rng),
            sections,
            metrics,
        }
    }

    pub fn policy(&self, rng: &mut dyn RngCore) -> Policy {
        let subject = pick(
            &[
                "Remote Work",
                "Data Retention",
                "Acceptable Use",
                "Travel and Expenses",
                "Information Security",
                "Code of Conduct",
            ],
            rng,
        );
        let sections = ["Purpose", "Scope", "Policy", "Responsibilities", "Enforcement"]
            .iter()
            .map(|heading| section(heading, rng))
            .collect();

        Policy {
            title: format!("{subject} Policy"),
            number: format!("POL-{:03}", rng.random_range(1..1_000)),
            owner: pick(DEPARTMENTS, rng).to_string(),
            effective_date: self.days_ago(rng, 0..=730),
            sections,
        }
    }

    pub fn slides(&self, rng: &mut dyn RngCore) -> Vec<Slide> {
        let company: String = CompanyName().fake_with_rng(rng);
        let mut slides = vec![Slide {
            title: company,
            bullets: vec![CatchPhrase().fake_with_rng(rng)],
        }];
        for _ in 0..rng.random_range(4..10) {
            let words: Vec<String> = Words(2..5).fake_with_rng(rng);
            slides.push(Slide {
                title: title_case(&words.join(" ")),
                bullets: (0..rng.random_range(3..6))
                    .map(|_| Sentence(4..10).fake_with_rng(rng))
                    .collect(),
            });
        }
        slides
    }

    pub fn log_entries(&self, count: usize, rng: &mut dyn RngCore) -> Vec<LogEntry> {
        let start = self.days_ago(rng, 0..=30).and_time(NaiveTime::MIN);
        let host: String = IPv4().fake_with_rng(rng);
        let mut timestamp = start + Duration::seconds(rng.random_range(0..86_400));

        (0..count)
            .map(|_| {
                timestamp += Duration::milliseconds(rng.random_range(10..60_000));
                let level = LOG_LEVELS
                    .choose_weighted(rng, |(_, weight)| *weight)
                    .map(|(level, _)| *level)
                    .unwrap_or("INFO");
                LogEntry {
                    timestamp,
                    level: level.to_string(),
                    service: pick(SERVICES, rng).to_string(),
                    host: host.clone(),
                    message: Sentence(4..12).fake_with_rng(rng),
                }
            })
            .collect()
    }

    pub fn config(&self, rng: &mut dyn RngCore) -> AppConfig {
        let service = pick(SERVICES, rng);
        let features = ["caching", "metrics", "audit_log", "beta_ui", "rate_limit"]
            .iter()
            .map(|flag| (flag.to_string(), rng.random_bool(0.5)))
            .collect();
        let host: String = IPv4().fake_with_rng(rng);

        AppConfig {
            service: service.to_string(),
            version: format!(
                "{}.{}.{}",
                rng.random_range(1..5),
                rng.random_range(0..20),
                rng.random_range(0..50)
            ),
            environment: pick(ENVIRONMENTS, rng).to_string(),
            port: rng.random_range(3000..9000),
            log_level: pick(&["debug", "info", "warn"], rng).to_string(),
            database: DatabaseConfig {
                host,
                port: 5432,
                name: format!("{service}_db"),
                pool_size: rng.random_range(5..50),
            },
            features,
        }
    }

    pub fn table(&self, rng: &mut dyn RngCore) -> Table {
        let headers = ["id", "date", "name", "region", "quantity", "amount"]
            .iter()
            .map(|header| header.to_string())
            .collect();
        let rows = (0..rng.random_range(20..100))
            .map(|index| {
                vec![
                    (index + 1).to_string(),
                    self.days_ago(rng, 0..=365).to_string(),
                    CompanyName().fake_with_rng(rng),
                    StateAbbr().fake_with_rng(rng),
                    rng.random_range(1..500).to_string(),
                    format!("{:.2}", rng.random_range(10.0..50_000.0)),
                ]
            })
            .collect();
        Table { headers, rows }
    }

    fn days_ago(&self, rng: &mut dyn RngCore, range: std::ops::RangeInclusive<i64>) -> NaiveDate {
        self.today - Duration::days(rng.random_range(range))
    }
}

/// Paragraphs of placeholder prose.
pub fn lorem_paragraphs(count: usize, rng: &mut dyn RngCore) -> Vec<String> {
    (0..count).map(|_| Paragraph(3..7).fake_with_rng(rng)).collect()
}

fn party(rng: &mut dyn RngCore) -> Party {
    let number: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    Party {
        name: CompanyName().fake_with_rng(rng),
        street: format!("{number} {street}"),
        city: CityName().fake_with_rng(rng),
        state: StateAbbr().fake_with_rng(rng),
        zip: ZipCode().fake_with_rng(rng),
        email: SafeEmail().fake_with_rng(rng),
    }
}

fn money_line(label: &str, low: f64, high: f64, rng: &mut dyn RngCore) -> FinancialLine {
    FinancialLine {
        label: label.to_string(),
        amount: cents(rng.random_range(low..high)),
    }
}

fn section(heading: &str, rng: &mut dyn RngCore) -> Section {
    Section {
        heading: heading.to_string(),
        body: Paragraph(3..6).fake_with_rng(rng),
    }
}

fn pick<'a>(items: &[&'a str], rng: &mut dyn RngCore) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn title_case(value: &str) -> String {
    value
        .trim_end_matches('.')
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
