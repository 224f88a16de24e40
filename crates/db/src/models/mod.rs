pub mod delivery;
pub mod goal;
pub mod nudge;
pub mod owner;
