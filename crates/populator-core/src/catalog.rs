use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level bucket a file is allocated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Finance,
    #[serde(rename = "Human_Resources")]
    HumanResources,
    Marketing,
    Sales,
    Operations,
    Legal,
    #[serde(rename = "IT")]
    It,
    Executive,
}

impl Category {
    /// Catalogue order. Allocation iterates categories in this order.
    pub const ALL: [Category; 8] = [
        Category::Finance,
        Category::HumanResources,
        Category::Marketing,
        Category::Sales,
        Category::Operations,
        Category::Legal,
        Category::It,
        Category::Executive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Finance => "Finance",
            Category::HumanResources => "Human_Resources",
            Category::Marketing => "Marketing",
            Category::Sales => "Sales",
            Category::Operations => "Operations",
            Category::Legal => "Legal",
            Category::It => "IT",
            Category::Executive => "Executive",
        }
    }

    /// Relative share of the total file count.
    pub fn weight(self) -> u32 {
        match self {
            Category::Finance => 15,
            Category::HumanResources => 12,
            Category::Marketing => 15,
            Category::Sales => 18,
            Category::Operations => 12,
            Category::Legal => 8,
            Category::It => 12,
            Category::Executive => 8,
        }
    }

    /// Weighted buckets for the first allocation level, in catalogue order.
    pub fn weighted() -> Vec<(Category, u32)> {
        Self::ALL.iter().map(|cat| (*cat, cat.weight())).collect()
    }

    pub fn subdirectories(self) -> &'static [&'static str] {
        match self {
            Category::Finance => &["Invoices", "Reports", "Budgets", "Tax", "Payroll", "Audits"],
            Category::HumanResources => &[
                "Policies",
                "Onboarding",
                "Payroll",
                "Training",
                "Recruiting",
                "Benefits",
            ],
            Category::Marketing => &[
                "Campaigns",
                "Collateral",
                "Analytics",
                "Brand",
                "Events",
                "Content",
            ],
            Category::Sales => &[
                "Proposals",
                "Contracts",
                "Pipeline",
                "Presentations",
                "Accounts",
                "Quotes",
            ],
            Category::Operations => &[
                "Procedures",
                "Inventory",
                "Logistics",
                "Vendors",
                "Quality",
                "Safety",
            ],
            Category::Legal => &[
                "Contracts",
                "Compliance",
                "Agreements",
                "NDAs",
                "Litigation",
                "IP",
            ],
            Category::It => &[
                "Documentation",
                "Configurations",
                "Logs",
                "Projects",
                "Security",
                "Infrastructure",
            ],
            Category::Executive => &[
                "Strategy",
                "Board_Materials",
                "Memos",
                "Reports",
                "Investors",
                "Planning",
            ],
        }
    }

    pub fn prefixes(self) -> &'static [&'static str] {
        match self {
            Category::Finance => &[
                "Invoice",
                "Budget",
                "Expense_Report",
                "Financial_Statement",
                "Quarterly_Report",
                "Annual_Report",
                "Balance_Sheet",
                "Cash_Flow",
                "Revenue_Analysis",
                "Cost_Analysis",
                "Forecast",
                "Audit_Report",
                "Tax_Return",
                "Payroll",
                "AP_Report",
                "AR_Report",
                "GL_Entry",
                "Bank_Reconciliation",
                "Variance_Report",
                "PnL_Statement",
            ],
            Category::HumanResources => &[
                "Employee_Handbook",
                "Onboarding_Checklist",
                "Performance_Review",
                "Job_Description",
                "Offer_Letter",
                "Benefits_Summary",
                "Policy",
                "Training_Manual",
                "Attendance_Record",
                "Leave_Request",
                "Exit_Interview",
                "Compensation_Plan",
                "Org_Chart",
                "Recruitment_Plan",
                "Interview_Notes",
                "Background_Check",
                "Reference_Check",
                "Disciplinary_Action",
                "Promotion_Letter",
            ],
            Category::Marketing => &[
                "Campaign_Brief",
                "Marketing_Plan",
                "Brand_Guidelines",
                "Social_Media_Calendar",
                "Content_Strategy",
                "SEO_Report",
                "Analytics_Report",
                "Press_Release",
                "Email_Template",
                "Newsletter",
                "Case_Study",
                "Customer_Survey",
                "Market_Research",
                "Competitor_Analysis",
                "Product_Launch",
                "Ad_Copy",
                "Media_Kit",
                "Event_Plan",
                "ROI_Analysis",
                "Audience_Insights",
            ],
            Category::Sales => &[
                "Proposal",
                "Quote",
                "Contract",
                "Sales_Report",
                "Pipeline_Report",
                "Account_Plan",
                "Territory_Plan",
                "Commission_Report",
                "Forecast",
                "RFP_Response",
                "Pricing_Sheet",
                "Product_Catalog",
                "Customer_Profile",
                "Sales_Deck",
                "Competitive_Intel",
                "Win_Loss_Analysis",
                "Deal_Summary",
                "Partnership_Agreement",
                "Renewal_Notice",
                "Upsell_Opportunity",
            ],
            Category::Operations => &[
                "SOP",
                "Process_Document",
                "Workflow",
                "Inventory_Report",
                "Shipping_Log",
                "Vendor_List",
                "Quality_Report",
                "Safety_Manual",
                "Maintenance_Schedule",
                "Equipment_List",
                "Facility_Plan",
                "Capacity_Plan",
                "Supply_Chain_Report",
                "Logistics_Plan",
                "Compliance_Checklist",
                "Incident_Report",
                "Audit_Checklist",
                "KPI_Dashboard",
                "Efficiency_Report",
                "Resource_Allocation",
            ],
            Category::Legal => &[
                "Contract",
                "NDA",
                "Terms_of_Service",
                "Privacy_Policy",
                "Compliance_Report",
                "Legal_Opinion",
                "Trademark_Filing",
                "Patent_Application",
                "Litigation_Summary",
                "Settlement_Agreement",
                "Lease_Agreement",
                "Employment_Agreement",
                "License_Agreement",
                "Vendor_Agreement",
                "Partnership_Agreement",
                "Amendment",
                "Addendum",
                "Power_of_Attorney",
                "Corporate_Resolution",
                "Due_Diligence",
            ],
            Category::It => &[
                "System_Architecture",
                "Network_Diagram",
                "Security_Policy",
                "Backup_Plan",
                "Disaster_Recovery",
                "Change_Request",
                "Incident_Report",
                "Configuration",
                "API_Documentation",
                "User_Guide",
                "Admin_Guide",
                "Release_Notes",
                "Test_Plan",
                "Bug_Report",
                "Feature_Spec",
                "Database_Schema",
                "Deployment_Guide",
                "Runbook",
                "Monitoring_Report",
                "Access_Log",
            ],
            Category::Executive => &[
                "Board_Presentation",
                "Strategic_Plan",
                "Executive_Summary",
                "Quarterly_Review",
                "Annual_Report",
                "Investor_Update",
                "M&A_Analysis",
                "Due_Diligence",
                "Risk_Assessment",
                "Succession_Plan",
                "Corporate_Strategy",
                "Market_Analysis",
                "Competitive_Landscape",
                "Growth_Initiative",
                "Transformation_Plan",
                "KPI_Summary",
                "Stakeholder_Report",
                "Vision_Statement",
                "Mission_Update",
                "Leadership_Memo",
            ],
        }
    }

    /// Output kinds this category produces, each with the content kinds allowed for it.
    pub fn content_map(self) -> &'static [(OutputKind, &'static [ContentKind])] {
        use ContentKind::*;
        use OutputKind as O;

        match self {
            Category::Finance => &[
                (O::Xlsx, &[Financial, Invoice, Data]),
                (O::Pdf, &[Report, Invoice]),
                (O::Docx, &[Report, Memo]),
                (O::Csv, &[Invoices, Data]),
                (O::Json, &[Invoice, Config]),
            ],
            Category::HumanResources => &[
                (O::Xlsx, &[Employees, Data]),
                (O::Pdf, &[Policy, Memo]),
                (O::Docx, &[Policy, Contract, Memo]),
                (O::Csv, &[Employees, Data]),
                (O::Json, &[Employee, Config]),
            ],
            Category::Marketing => &[
                (O::Xlsx, &[Data, Financial]),
                (O::Pdf, &[Report, Memo]),
                (O::Docx, &[Memo, Policy]),
                (O::Pptx, &[Presentation]),
                (O::Csv, &[Data]),
                (O::Json, &[Config]),
                (O::Html, &[Report]),
            ],
            Category::Sales => &[
                (O::Xlsx, &[Data, Financial]),
                (O::Pdf, &[Contract, Invoice, Report]),
                (O::Docx, &[Contract, Memo, Policy]),
                (O::Pptx, &[Presentation]),
                (O::Csv, &[Data]),
                (O::Json, &[Config]),
            ],
            Category::Operations => &[
                (O::Xlsx, &[Data, Employees]),
                (O::Pdf, &[Policy, Report]),
                (O::Docx, &[Policy, Memo]),
                (O::Csv, &[Data]),
                (O::Json, &[Config]),
                (O::Xml, &[Config, Data]),
            ],
            Category::Legal => &[
                (O::Pdf, &[Contract, Policy]),
                (O::Docx, &[Contract, Policy, Memo]),
                (O::Xlsx, &[Data]),
                (O::Json, &[Config]),
            ],
            Category::It => &[
                (O::Json, &[Config, Log]),
                (O::Xml, &[Config, Data]),
                (O::Csv, &[Data]),
                (O::Md, &[Notes, Project]),
                (O::Txt, &[Log, Notes]),
                (O::Pdf, &[Policy, Report]),
                (O::Docx, &[Policy, Memo]),
                (O::Xlsx, &[Data]),
                (O::Html, &[Report]),
            ],
            Category::Executive => &[
                (O::Pptx, &[Presentation]),
                (O::Pdf, &[Report, Memo]),
                (O::Docx, &[Report, Memo, Policy]),
                (O::Xlsx, &[Financial, Data]),
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format of a generated file. Selects the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Docx,
    Xlsx,
    Pdf,
    Txt,
    Json,
    Csv,
    Pptx,
    Xml,
    Html,
    Md,
}

impl OutputKind {
    pub const ALL: [OutputKind; 10] = [
        OutputKind::Docx,
        OutputKind::Xlsx,
        OutputKind::Pdf,
        OutputKind::Txt,
        OutputKind::Json,
        OutputKind::Csv,
        OutputKind::Pptx,
        OutputKind::Xml,
        OutputKind::Html,
        OutputKind::Md,
    ];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Docx => "docx",
            OutputKind::Xlsx => "xlsx",
            OutputKind::Pdf => "pdf",
            OutputKind::Txt => "txt",
            OutputKind::Json => "json",
            OutputKind::Csv => "csv",
            OutputKind::Pptx => "pptx",
            OutputKind::Xml => "xml",
            OutputKind::Html => "html",
            OutputKind::Md => "md",
        }
    }

    /// Relative likelihood of picking this kind for a new file.
    pub fn weight(self) -> u32 {
        match self {
            OutputKind::Docx => 20,
            OutputKind::Xlsx => 20,
            OutputKind::Pdf => 25,
            OutputKind::Txt => 5,
            OutputKind::Json => 5,
            OutputKind::Csv => 8,
            OutputKind::Pptx => 8,
            OutputKind::Xml => 3,
            OutputKind::Html => 3,
            OutputKind::Md => 3,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

/// Template hint passed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Memo,
    Notes,
    Log,
    Config,
    Invoice,
    Invoices,
    Employee,
    Employees,
    Project,
    Data,
    Financial,
    Report,
    Policy,
    Contract,
    Presentation,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Memo => "memo",
            ContentKind::Notes => "notes",
            ContentKind::Log => "log",
            ContentKind::Config => "config",
            ContentKind::Invoice => "invoice",
            ContentKind::Invoices => "invoices",
            ContentKind::Employee => "employee",
            ContentKind::Employees => "employees",
            ContentKind::Project => "project",
            ContentKind::Data => "data",
            ContentKind::Financial => "financial",
            ContentKind::Report => "report",
            ContentKind::Policy => "policy",
            ContentKind::Contract => "contract",
            ContentKind::Presentation => "presentation",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_six_subdirectories() {
        for category in Category::ALL {
            assert_eq!(category.subdirectories().len(), 6, "{category}");
        }
    }

    #[test]
    fn content_map_never_empty() {
        for category in Category::ALL {
            let map = category.content_map();
            assert!(!map.is_empty(), "{category}");
            assert!(map.iter().all(|(_, kinds)| !kinds.is_empty()));
        }
    }

    #[test]
    fn extension_lookup_accepts_leading_dot() {
        assert_eq!(OutputKind::from_extension(".PDF"), Some(OutputKind::Pdf));
        assert_eq!(OutputKind::from_extension("md"), Some(OutputKind::Md));
        assert_eq!(OutputKind::from_extension("exe"), None);
    }
}
