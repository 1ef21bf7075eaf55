//! Startup seeding of lookup tables and demo accounts

use pt_core::config::SeedConfig;
use pt_core::result::TrackerResult;
use pt_core::types::Role;
use pt_models::DocumentType;
use tracing::{info, instrument};

use crate::tracker::Tracker;

/// `(username, full name, position, email, role)`
const DEMO_USERS: [(&str, &str, &str, &str, Role); 4] = [
    ("head", "Ivanov I.I. (Head)", "Director", "head@company.ru", Role::Head),
    ("pm", "Petrov P.P. (PM)", "Project manager", "pm@company.ru", Role::Pm),
    ("emp", "Sidorov S.S. (Employee)", "Developer", "emp@company.ru", Role::Employee),
    (
        "cust",
        "Vector LLC (Customer)",
        "Customer representative",
        "cust@vector.ru",
        Role::Customer,
    ),
];

/// What a seeding run created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub document_types: usize,
    pub users: usize,
}

impl Tracker {
    /// Fill empty tables. Tables that already hold rows are left alone, so
    /// running this on every start is safe.
    #[instrument(skip(self, config))]
    pub async fn seed(&self, config: &SeedConfig) -> TrackerResult<SeedReport> {
        let mut report = SeedReport::default();

        if config.lookups && self.store.list_document_types().await?.is_empty() {
            for name in DocumentType::DEFAULTS {
                self.store.insert_document_type(name).await?;
            }
            report.document_types = DocumentType::DEFAULTS.len();
        }

        if config.demo_users && self.store.count_users().await? == 0 {
            for (username, full_name, position, email, role) in DEMO_USERS {
                self.register(username, &config.demo_password, full_name, email, position, role)
                    .await?;
            }
            report.users = DEMO_USERS.len();
        }

        if report != SeedReport::default() {
            info!(
                document_types = report.document_types,
                users = report.users,
                "seeded empty tables"
            );
        }
        Ok(report)
    }
}
