pub mod event;
pub mod order;
pub mod profile;
pub mod ticket;

pub use event::{Event, EventStatus};
pub use order::{Order, PaymentStatus};
pub use profile::Profile;
pub use ticket::{TicketTier, TierKind};
