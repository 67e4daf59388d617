pub mod bookings;
pub mod conversation;
pub mod menus;
pub mod messaging;
pub mod slots;
