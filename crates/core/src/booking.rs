//! Booking workflow: validation, id allocation, construction and cancellation.

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::{
    error::{BookingError, StoreError, ValidationError},
    models::{
        AcTier, Advisory, FarePolicy, Ticket, TicketClass, TicketDetails, TicketId, TicketRecord,
        TierChoice, FIRST_TICKET_SEQUENCE,
    },
    store::TicketStore,
};

/// Oldest passenger age accepted.
pub const MAX_PASSENGER_AGE: u32 = 120;

/// Monotonic ticket id source. Never rewinds, so ids are not reused after
/// cancellation.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    /// Generator starting at `TKT1000`.
    pub fn new() -> Self {
        Self::starting_at(FIRST_TICKET_SEQUENCE)
    }

    /// Generator starting at an arbitrary sequence number.
    pub fn starting_at(sequence: u32) -> Self {
        Self { next: sequence }
    }

    /// Id the next successful booking will receive.
    pub fn peek(&self) -> TicketId {
        TicketId::from_sequence(self.next)
    }

    /// Generator for the booking after this one. Fails once the sequence
    /// is used up.
    fn following(&self) -> Result<Self, StoreError> {
        self.next
            .checked_add(1)
            .map(Self::starting_at)
            .ok_or(StoreError::IdsExhausted)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed booking input, already parsed by the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    /// Passenger name; surrounding whitespace is dropped.
    pub passenger_name: String,
    /// Age in years, `1..=120`.
    pub age: u32,
    /// Free-form train number; surrounding whitespace is dropped.
    pub train_number: String,
    /// Base fare, strictly positive.
    pub base_fare: f64,
    /// Sleeper or AC.
    pub class: TicketClass,
    /// Only consulted for AC bookings. `None` defaults to 3A with an advisory.
    pub tier: Option<TierChoice>,
}

/// Outcome of a successful booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    /// Id assigned to the new ticket.
    pub ticket_id: TicketId,
    /// Class booked.
    pub class: TicketClass,
    /// Computed fare at full precision.
    pub total_fare: f64,
    /// Set when an input had to be corrected.
    pub advisory: Option<Advisory>,
    /// Local time of issue.
    pub issued_at: DateTime<Local>,
}

/// Outcome of a successful cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct Cancellation {
    /// The removed ticket.
    pub ticket: Ticket,
    /// Refund owed, `fare * 0.8`.
    pub refund: f64,
}

/// Front desk owning the ticket store and id counter for one run.
#[derive(Debug, Default)]
pub struct BookingDesk {
    store: TicketStore,
    ids: IdGenerator,
}

impl BookingDesk {
    /// Desk with an empty store, first id `TKT1000`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Desk using the given store and generator.
    pub fn with_parts(store: TicketStore, ids: IdGenerator) -> Self {
        Self { store, ids }
    }

    /// Validate the request, then issue and store a ticket.
    ///
    /// Nothing changes on failure: the store is untouched and no id is consumed.
    pub fn book(&mut self, request: BookingRequest) -> Result<Booking, BookingError> {
        let BookingRequest {
            passenger_name,
            age,
            train_number,
            base_fare,
            class,
            tier,
        } = request;

        let passenger_name = passenger_name.trim();
        if passenger_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !(1..=MAX_PASSENGER_AGE).contains(&age) {
            return Err(ValidationError::InvalidAge(age).into());
        }
        let train_number = train_number.trim();
        if train_number.is_empty() {
            return Err(ValidationError::EmptyTrainNumber.into());
        }
        if !(base_fare.is_finite() && base_fare > 0.0) {
            return Err(ValidationError::InvalidFare(base_fare).into());
        }

        let (tier, advisory) = match class {
            TicketClass::Sleeper => (AcTier::default(), None),
            TicketClass::Ac => tier
                .unwrap_or_else(|| TierChoice::Unrecognized(String::new()))
                .resolve(),
        };
        let policy = FarePolicy::for_class(class, tier);
        if let Some(advisory) = &advisory {
            warn!(%advisory, "AC tier defaulted");
        }

        let ticket_id = self.ids.peek();
        let following = self.ids.following()?;
        let record = TicketRecord::new(
            ticket_id.clone(),
            passenger_name,
            age,
            train_number,
            base_fare,
        );
        let ticket = Ticket::new(record, policy);
        let total_fare = ticket.compute_fare();

        self.store.insert(ticket)?;
        self.ids = following;

        info!(
            ticket_id = %ticket_id,
            class = %class,
            total_fare,
            "Ticket booked"
        );
        Ok(Booking {
            ticket_id,
            class,
            total_fare,
            advisory,
            issued_at: Local::now(),
        })
    }

    /// Look up a ticket, ignoring case.
    pub fn find_ticket(&self, id: &str) -> Result<&Ticket, BookingError> {
        self.store
            .find_by_id(id)
            .ok_or_else(|| BookingError::NotFound {
                id: id.trim().to_string(),
            })
    }

    /// Refund the ticket would yield if cancelled now. Read only.
    pub fn refund_preview(&self, id: &str) -> Result<f64, BookingError> {
        self.find_ticket(id).map(Ticket::projected_refund)
    }

    /// Remove the ticket and report the refund amount.
    pub fn cancel_ticket(&mut self, id: &str) -> Result<Cancellation, BookingError> {
        let ticket = self.store.remove(id)?;
        let refund = ticket.projected_refund();
        info!(ticket_id = %ticket.id(), refund, "Ticket cancelled");
        Ok(Cancellation { ticket, refund })
    }

    /// Structured details for a ticket.
    pub fn render_ticket(&self, ticket: &Ticket) -> TicketDetails {
        ticket.render_details()
    }

    /// Number of live tickets.
    pub fn list_count(&self) -> usize {
        self.store.len()
    }

    /// True when no tickets are live.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Live tickets in booking order.
    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.store.iter()
    }

    /// Id the next successful booking will receive.
    pub fn next_ticket_id(&self) -> TicketId {
        self.ids.peek()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassDetails;

    fn approx_eq(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    fn request(class: TicketClass, age: u32, base_fare: f64) -> BookingRequest {
        BookingRequest {
            passenger_name: "Asha".to_string(),
            age,
            train_number: "12951".to_string(),
            base_fare,
            class,
            tier: None,
        }
    }

    fn ac_request(tier: TierChoice, age: u32, base_fare: f64) -> BookingRequest {
        BookingRequest {
            tier: Some(tier),
            ..request(TicketClass::Ac, age, base_fare)
        }
    }

    #[test]
    fn sleeper_fares_by_age_band() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();
        for (age, expected) in [(12, 450.0), (59, 450.0), (11, 225.0), (60, 270.0)] {
            let booking = desk.book(request(TicketClass::Sleeper, age, 400.0))?;
            assert!(
                approx_eq(booking.total_fare, expected),
                "age {age}: {} != {expected}",
                booking.total_fare
            );
            assert!(booking.advisory.is_none());
        }
        Ok(())
    }

    #[test]
    fn ac_fares_by_tier() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();

        let first = desk.book(ac_request(AcTier::First.into(), 30, 1000.0))?;
        assert!(approx_eq(first.total_fare, 1500.0));

        let second_senior = desk.book(ac_request(AcTier::Second.into(), 75, 1000.0))?;
        assert!(approx_eq(second_senior.total_fare, 1300.0 * 0.7));

        let third_child = desk.book(ac_request(AcTier::Third.into(), 3, 1000.0))?;
        assert!(approx_eq(third_child.total_fare, 600.0));
        Ok(())
    }

    #[test]
    fn unrecognized_tier_books_at_third_tier_with_advisory() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();
        let booking = desk.book(ac_request(TierChoice::Unrecognized("7".to_string()), 30, 100.0))?;
        assert!(approx_eq(booking.total_fare, 300.0));
        assert!(matches!(
            booking.advisory,
            Some(Advisory::TierDefaulted {
                applied: AcTier::Third,
                ..
            })
        ));

        let missing = desk.book(request(TicketClass::Ac, 30, 100.0))?;
        assert!(approx_eq(missing.total_fare, 300.0));
        assert!(missing.advisory.is_some());

        let ticket = desk.find_ticket(booking.ticket_id.as_str())?;
        assert_eq!(
            ticket.render_details().class,
            ClassDetails::Ac {
                tier: "3A".to_string(),
                tier_charge: 200.0
            }
        );
        Ok(())
    }

    #[test]
    fn sleeper_ignores_tier_choice() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();
        let booking = desk.book(BookingRequest {
            tier: Some(AcTier::First.into()),
            ..request(TicketClass::Sleeper, 30, 100.0)
        })?;
        assert!(approx_eq(booking.total_fare, 150.0));
        assert!(booking.advisory.is_none());
        Ok(())
    }

    #[test]
    fn validation_runs_in_order_and_rejects_without_mutation() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();

        let cases = [
            (
                BookingRequest {
                    passenger_name: "   ".to_string(),
                    age: 0,
                    ..request(TicketClass::Sleeper, 30, 100.0)
                },
                ValidationError::EmptyName,
            ),
            (
                request(TicketClass::Sleeper, 0, 100.0),
                ValidationError::InvalidAge(0),
            ),
            (
                request(TicketClass::Sleeper, 121, 100.0),
                ValidationError::InvalidAge(121),
            ),
            (
                BookingRequest {
                    train_number: String::new(),
                    base_fare: -5.0,
                    ..request(TicketClass::Sleeper, 30, 100.0)
                },
                ValidationError::EmptyTrainNumber,
            ),
            (
                request(TicketClass::Sleeper, 30, 0.0),
                ValidationError::InvalidFare(0.0),
            ),
        ];

        for (bad, expected) in cases {
            let err = desk.book(bad).unwrap_err();
            assert_eq!(err, BookingError::Validation(expected));
        }
        assert!(desk.book(request(TicketClass::Sleeper, 30, f64::NAN)).is_err());
        assert!(desk.book(request(TicketClass::Sleeper, 30, f64::INFINITY)).is_err());

        assert_eq!(desk.list_count(), 0);
        assert_eq!(desk.next_ticket_id().as_str(), "TKT1000");

        let booking = desk.book(request(TicketClass::Sleeper, 1, 100.0))?;
        assert_eq!(booking.ticket_id.as_str(), "TKT1000");
        let booking = desk.book(request(TicketClass::Sleeper, 120, 100.0))?;
        assert_eq!(booking.ticket_id.as_str(), "TKT1001");
        Ok(())
    }

    #[test]
    fn ids_are_sequential_and_never_reused() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();
        let first = desk.book(request(TicketClass::Sleeper, 30, 100.0))?;
        let second = desk.book(request(TicketClass::Sleeper, 30, 100.0))?;
        assert_eq!(first.ticket_id.as_str(), "TKT1000");
        assert_eq!(second.ticket_id.as_str(), "TKT1001");

        desk.cancel_ticket("TKT1001")?;
        let third = desk.book(request(TicketClass::Sleeper, 30, 100.0))?;
        assert_eq!(third.ticket_id.as_str(), "TKT1002");
        Ok(())
    }

    #[test]
    fn stored_fields_are_trimmed() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();
        let booking = desk.book(BookingRequest {
            passenger_name: "  Asha ".to_string(),
            train_number: " 12951 ".to_string(),
            ..request(TicketClass::Sleeper, 30, 100.0)
        })?;
        let ticket = desk.find_ticket(booking.ticket_id.as_str())?;
        assert_eq!(ticket.record().passenger_name(), "Asha");
        assert_eq!(ticket.record().train_number(), "12951");
        Ok(())
    }

    #[test]
    fn lookups_ignore_case() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();
        desk.book(request(TicketClass::Sleeper, 30, 100.0))?;
        assert_eq!(desk.find_ticket("tkt1000")?.id().as_str(), "TKT1000");
        assert_eq!(
            desk.find_ticket("TKT2000").unwrap_err(),
            BookingError::NotFound {
                id: "TKT2000".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn cancelling_unknown_id_leaves_store_unchanged() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();
        desk.book(request(TicketClass::Sleeper, 30, 100.0))?;

        let err = desk.cancel_ticket("TKT9999").unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));
        assert!(desk.refund_preview("TKT9999").is_err());
        assert_eq!(desk.list_count(), 1);
        Ok(())
    }

    #[test]
    fn duplicate_insert_is_an_invariant_violation() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();
        desk.book(request(TicketClass::Sleeper, 30, 100.0))?;

        let mut rewound = BookingDesk::with_parts(TicketStore::new(), IdGenerator::new());
        std::mem::swap(&mut rewound.store, &mut desk.store);
        let err = rewound
            .book(request(TicketClass::Sleeper, 30, 100.0))
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvariantViolation(StoreError::DuplicateId(_))
        ));
        assert_eq!(rewound.list_count(), 1);
        assert_eq!(rewound.next_ticket_id().as_str(), "TKT1000");
        Ok(())
    }

    #[test]
    fn exhausted_id_sequence_rejects_without_mutation() -> anyhow::Result<()> {
        let mut desk =
            BookingDesk::with_parts(TicketStore::new(), IdGenerator::starting_at(u32::MAX - 1));
        let last = desk.book(request(TicketClass::Sleeper, 30, 100.0))?;
        assert_eq!(last.ticket_id, TicketId::from_sequence(u32::MAX - 1));

        let err = desk
            .book(request(TicketClass::Sleeper, 30, 100.0))
            .unwrap_err();
        assert_eq!(
            err,
            BookingError::InvariantViolation(StoreError::IdsExhausted)
        );
        assert_eq!(desk.list_count(), 1);
        assert_eq!(desk.next_ticket_id(), TicketId::from_sequence(u32::MAX));
        Ok(())
    }

    #[test]
    fn end_to_end_booking_and_cancellation() -> anyhow::Result<()> {
        let mut desk = BookingDesk::new();

        let asha = desk.book(BookingRequest {
            passenger_name: "Asha".to_string(),
            age: 8,
            train_number: "12951".to_string(),
            base_fare: 1000.0,
            class: TicketClass::Sleeper,
            tier: None,
        })?;
        assert_eq!(asha.ticket_id.as_str(), "TKT1000");
        assert!(approx_eq(asha.total_fare, (1000.0 + 50.0) * 0.5));

        let raj = desk.book(BookingRequest {
            passenger_name: "Raj".to_string(),
            age: 65,
            train_number: "12952".to_string(),
            base_fare: 1500.0,
            class: TicketClass::Ac,
            tier: Some(AcTier::First.into()),
        })?;
        assert_eq!(raj.ticket_id.as_str(), "TKT1001");
        assert!(approx_eq(raj.total_fare, 1400.0));
        assert_eq!(desk.list_count(), 2);

        let preview = desk.refund_preview("TKT1000")?;
        assert!(approx_eq(preview, asha.total_fare * 0.8));

        let cancellation = desk.cancel_ticket("TKT1000")?;
        assert!(approx_eq(cancellation.refund, preview));
        assert_eq!(cancellation.ticket.id().as_str(), "TKT1000");
        assert_eq!(desk.list_count(), 1);
        assert!(matches!(
            desk.find_ticket("TKT1000"),
            Err(BookingError::NotFound { .. })
        ));

        let raj_ticket = desk.find_ticket("tkt1001")?;
        let details = desk.render_ticket(raj_ticket);
        assert!(approx_eq(details.total_fare, raj_ticket.compute_fare()));
        assert_eq!(details.passenger_name, "Raj");
        Ok(())
    }
}
