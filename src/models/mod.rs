pub mod booking;
pub mod reply;
pub mod service;
pub mod session;

pub use booking::{Booking, BookingStatus, CancelledBy, NewBooking};
pub use reply::Reply;
pub use service::{Service, CATALOG};
pub use session::{Action, BookingDraft, Callback, Input, Rejection, Session, SessionState, SlotOracle, Step};
