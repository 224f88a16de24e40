pub mod checkin;
pub mod delivery;
pub mod goals;
pub mod nudges;
