//! Ticket domain models.

mod details;
mod fare;

use std::fmt;

pub use details::{format_amount, ClassDetails, DetailRow, TicketDetails};
pub use fare::{
    Advisory, AcTier, FarePolicy, TicketClass, TierChoice, AC_SENIOR_FACTOR, CHILD_AGE_LIMIT,
    CHILD_FARE_FACTOR, REFUND_RATE, SENIOR_AGE, SLEEPER_COACH_TYPE, SLEEPER_SENIOR_FACTOR,
    SLEEPER_SERVICE_CHARGE,
};

/// Literal prefix of every ticket id.
pub const TICKET_ID_PREFIX: &str = "TKT";
/// Sequence number of the first ticket issued in a run.
pub const FIRST_TICKET_SEQUENCE: u32 = 1000;

/// Workflow-assigned ticket identifier, e.g. `TKT1000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketId(String);

impl TicketId {
    /// Id for the given sequence number.
    pub fn from_sequence(sequence: u32) -> Self {
        Self(format!("{TICKET_ID_PREFIX}{sequence}"))
    }

    /// Borrow the id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive exact comparison against user input.
    pub fn matches(&self, query: &str) -> bool {
        self.0.eq_ignore_ascii_case(query.trim())
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Passenger and journey attributes shared by every ticket class.
///
/// Fields are fixed once the record is built; there are no setters.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRecord {
    id: TicketId,
    passenger_name: String,
    age: u32,
    train_number: String,
    base_fare: f64,
}

impl TicketRecord {
    pub(crate) fn new(
        id: TicketId,
        passenger_name: impl Into<String>,
        age: u32,
        train_number: impl Into<String>,
        base_fare: f64,
    ) -> Self {
        Self {
            id,
            passenger_name: passenger_name.into(),
            age,
            train_number: train_number.into(),
            base_fare,
        }
    }

    /// Ticket id.
    pub fn id(&self) -> &TicketId {
        &self.id
    }

    /// Passenger name as booked.
    pub fn passenger_name(&self) -> &str {
        &self.passenger_name
    }

    /// Passenger age in years.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Free-form train number.
    pub fn train_number(&self) -> &str {
        &self.train_number
    }

    /// Base fare before surcharges and discounts.
    pub fn base_fare(&self) -> f64 {
        self.base_fare
    }
}

/// A booked ticket: the shared record plus its class-specific fare policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    record: TicketRecord,
    policy: FarePolicy,
}

impl Ticket {
    pub(crate) fn new(record: TicketRecord, policy: FarePolicy) -> Self {
        Self { record, policy }
    }

    /// Ticket id.
    pub fn id(&self) -> &TicketId {
        self.record.id()
    }

    /// Shared passenger and journey attributes.
    pub fn record(&self) -> &TicketRecord {
        &self.record
    }

    /// Ticket class.
    pub fn class(&self) -> TicketClass {
        self.policy.class()
    }

    /// Total fare at full precision. Pure: repeated calls agree.
    pub fn compute_fare(&self) -> f64 {
        self.policy.compute_fare(&self.record)
    }

    /// Amount that would be refunded if the ticket were cancelled now.
    pub fn projected_refund(&self) -> f64 {
        self.compute_fare() * REFUND_RATE
    }

    /// Structured details: base block followed by class-specific fields.
    pub fn render_details(&self) -> TicketDetails {
        let class = match self.policy {
            FarePolicy::Sleeper => ClassDetails::Sleeper {
                coach_type: SLEEPER_COACH_TYPE.to_string(),
                service_charge: SLEEPER_SERVICE_CHARGE,
            },
            FarePolicy::Ac { tier } => ClassDetails::Ac {
                tier: tier.code().to_string(),
                tier_charge: tier.charge(),
            },
        };
        TicketDetails {
            ticket_id: self.record.id.to_string(),
            passenger_name: self.record.passenger_name.clone(),
            age: self.record.age,
            train_number: self.record.train_number.clone(),
            base_fare: self.record.base_fare,
            total_fare: self.compute_fare(),
            class,
        }
    }
}
