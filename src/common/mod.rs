pub mod date;
pub mod net;
pub mod time;
