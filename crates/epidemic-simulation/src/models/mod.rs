//! Sub-models consulted by the integrator on every simulated day.
//!
//! - [`seasonal`]: week-based transmission multiplier
//! - [`immunity`]: vaccine protection with linear waning
//! - [`contact`]: fixed or Poisson-sampled daily contacts

pub mod contact;
pub mod immunity;
pub mod seasonal;

pub use contact::{effective_contacts, ContactNetwork, ContactSampler};
pub use immunity::{protected_fraction, Vaccination};
pub use seasonal::{epi_week, forcing, Seasonality};
