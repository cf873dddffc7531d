#![allow(missing_docs)]

use std::fmt;

use crate::config::DEFAULT_CURRENCY_SYMBOL;

/// Format a money amount to two decimals for display.
pub fn format_amount(currency: &str, amount: f64) -> String {
    format!("{currency}{amount:.2}")
}

/// Rendered view of a ticket, base block first.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketDetails {
    pub ticket_id: String,
    pub passenger_name: String,
    pub age: u32,
    pub train_number: String,
    pub base_fare: f64,
    /// Freshly computed at render time.
    pub total_fare: f64,
    pub class: ClassDetails,
}

/// Fields only present on one ticket class.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassDetails {
    Sleeper { coach_type: String, service_charge: f64 },
    Ac { tier: String, tier_charge: f64 },
}

/// One labelled line of a details block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

impl DetailRow {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

impl TicketDetails {
    /// Labelled rows in display order: id, passenger, age, train, base fare,
    /// total fare, then the class-specific rows.
    pub fn rows(&self, currency: &str) -> Vec<DetailRow> {
        let mut rows = vec![
            DetailRow::new("Ticket ID", self.ticket_id.clone()),
            DetailRow::new("Passenger Name", self.passenger_name.clone()),
            DetailRow::new("Age", self.age.to_string()),
            DetailRow::new("Train Number", self.train_number.clone()),
            DetailRow::new("Base Fare", format_amount(currency, self.base_fare)),
            DetailRow::new("Total Fare", format_amount(currency, self.total_fare)),
        ];
        match &self.class {
            ClassDetails::Sleeper {
                coach_type,
                service_charge,
            } => {
                rows.push(DetailRow::new("Coach Type", coach_type.clone()));
                rows.push(DetailRow::new(
                    "Service Charge",
                    format_amount(currency, *service_charge),
                ));
            }
            ClassDetails::Ac { tier, tier_charge } => {
                rows.push(DetailRow::new("AC Tier", tier.clone()));
                rows.push(DetailRow::new(
                    "AC Charge",
                    format_amount(currency, *tier_charge),
                ));
            }
        }
        rows
    }
}

impl fmt::Display for TicketDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========== TICKET DETAILS ==========")?;
        for row in self.rows(DEFAULT_CURRENCY_SYMBOL) {
            writeln!(f, "{:<16}: {}", row.label, row.value)?;
        }
        write!(f, "====================================")
    }
}
