pub mod ai;
pub mod input;
pub mod movement;
pub mod net;
pub mod notify;
pub mod progress;
