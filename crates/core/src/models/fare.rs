//! Fare policies for the two ticket classes.

use std::fmt;

use super::TicketRecord;

/// Fixed surcharge added to every Sleeper fare.
pub const SLEEPER_SERVICE_CHARGE: f64 = 50.0;
/// Coach label printed on Sleeper tickets.
pub const SLEEPER_COACH_TYPE: &str = "Sleeper Class";
/// Passengers younger than this pay the child rate.
pub const CHILD_AGE_LIMIT: u32 = 12;
/// Passengers this age or older pay the senior rate.
pub const SENIOR_AGE: u32 = 60;
/// Share of the fare paid by children, regardless of class.
pub const CHILD_FARE_FACTOR: f64 = 0.5;
/// Share of the fare paid by Sleeper seniors.
pub const SLEEPER_SENIOR_FACTOR: f64 = 0.6;
/// Share of the fare paid by AC seniors.
pub const AC_SENIOR_FACTOR: f64 = 0.7;
/// Share of the fare returned on cancellation.
pub const REFUND_RATE: f64 = 0.8;

/// Ticket class chosen at booking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketClass {
    /// Sleeper coach with a flat service charge.
    Sleeper,
    /// Air-conditioned coach priced by tier.
    Ac,
}

impl TicketClass {
    /// Short label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            TicketClass::Sleeper => "Sleeper",
            TicketClass::Ac => "AC",
        }
    }
}

impl fmt::Display for TicketClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// AC sub-category determining the fixed tier charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcTier {
    /// First AC (1A).
    First,
    /// Second AC (2A).
    Second,
    /// Third AC (3A), also the fallback tier.
    #[default]
    Third,
}

impl AcTier {
    /// All tiers in menu order.
    pub const ALL: [AcTier; 3] = [AcTier::First, AcTier::Second, AcTier::Third];

    /// Tier code as printed on the ticket.
    pub fn code(&self) -> &'static str {
        match self {
            AcTier::First => "1A",
            AcTier::Second => "2A",
            AcTier::Third => "3A",
        }
    }

    /// Surcharge added to the base fare for this tier.
    pub fn charge(&self) -> f64 {
        match self {
            AcTier::First => 500.0,
            AcTier::Second => 300.0,
            AcTier::Third => 200.0,
        }
    }

    /// Menu label, e.g. `First AC (1A)`.
    pub fn label(&self) -> &'static str {
        match self {
            AcTier::First => "First AC (1A)",
            AcTier::Second => "Second AC (2A)",
            AcTier::Third => "Third AC (3A)",
        }
    }

    /// Look up a tier by its code, ignoring case and surrounding whitespace.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        AcTier::ALL
            .into_iter()
            .find(|tier| tier.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for AcTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Tier selection as supplied by the caller, possibly unrecognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierChoice {
    /// A known tier.
    Tier(AcTier),
    /// Anything else; resolves to the default tier with an advisory.
    Unrecognized(String),
}

impl TierChoice {
    /// Resolve to a concrete tier, reporting when the default had to be applied.
    pub fn resolve(self) -> (AcTier, Option<Advisory>) {
        match self {
            TierChoice::Tier(tier) => (tier, None),
            TierChoice::Unrecognized(requested) => {
                let applied = AcTier::default();
                (applied, Some(Advisory::TierDefaulted { requested, applied }))
            }
        }
    }
}

impl From<AcTier> for TierChoice {
    fn from(tier: AcTier) -> Self {
        TierChoice::Tier(tier)
    }
}

/// Non-fatal notice accompanying a corrected input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// An unknown AC tier was replaced by the default tier.
    TierDefaulted {
        /// What the caller asked for (empty when no tier was given).
        requested: String,
        /// Tier actually used for pricing.
        applied: AcTier,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::TierDefaulted { requested, applied } if requested.trim().is_empty() => {
                write!(f, "No tier selected! Defaulting to {applied}.")
            }
            Advisory::TierDefaulted { requested, applied } => {
                write!(f, "Invalid tier '{}'! Defaulting to {applied}.", requested.trim())
            }
        }
    }
}

/// Class-specific pricing attached to every ticket at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FarePolicy {
    /// Sleeper pricing: flat service charge.
    Sleeper,
    /// AC pricing for the given tier.
    Ac {
        /// Tier fixed at booking time.
        tier: AcTier,
    },
}

impl FarePolicy {
    /// Build the policy for a class; the tier only matters for AC.
    pub fn for_class(class: TicketClass, tier: AcTier) -> Self {
        match class {
            TicketClass::Sleeper => FarePolicy::Sleeper,
            TicketClass::Ac => FarePolicy::Ac { tier },
        }
    }

    /// Class this policy prices.
    pub fn class(&self) -> TicketClass {
        match self {
            FarePolicy::Sleeper => TicketClass::Sleeper,
            FarePolicy::Ac { .. } => TicketClass::Ac,
        }
    }

    /// Fixed amount added on top of the base fare.
    pub fn surcharge(&self) -> f64 {
        match self {
            FarePolicy::Sleeper => SLEEPER_SERVICE_CHARGE,
            FarePolicy::Ac { tier } => tier.charge(),
        }
    }

    /// Multiplier for the passenger's age band. Child is checked before senior.
    pub fn discount_factor(&self, age: u32) -> f64 {
        if age < CHILD_AGE_LIMIT {
            CHILD_FARE_FACTOR
        } else if age >= SENIOR_AGE {
            match self {
                FarePolicy::Sleeper => SLEEPER_SENIOR_FACTOR,
                FarePolicy::Ac { .. } => AC_SENIOR_FACTOR,
            }
        } else {
            1.0
        }
    }

    /// Total fare for the record, unrounded.
    pub fn compute_fare(&self, record: &TicketRecord) -> f64 {
        let total = record.base_fare() + self.surcharge();
        total * self.discount_factor(record.age())
    }
}
