#![warn(clippy::all, missing_docs)]

//! Core domain logic for the railway reservation console.
//!
//! This crate hosts the ticket model and fare policies, the in-memory
//! ticket store, the booking workflow, input parsing and configuration
//! handling used by the terminal UI and any future frontends.

pub mod booking;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod store;

pub use booking::{Booking, BookingDesk, BookingRequest, Cancellation, IdGenerator};
pub use config::AppConfig;
pub use error::{BookingError, StoreError, ValidationError};
pub use models::{
    AcTier, Advisory, FarePolicy, Ticket, TicketClass, TicketDetails, TicketId, TierChoice,
};
pub use store::TicketStore;
