pub mod admin;
pub mod checkout;
pub mod events;

pub use admin::{AdminGate, MaybeSession, Session};
pub use checkout::{CheckoutOutcome, CheckoutService, OrderRef, VerifyOutcome};
pub use events::{Banner, EventService, NewEvent, TicketTerms};
