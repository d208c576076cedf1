pub mod collector;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod process;
pub mod snapshot;
pub mod source;
pub mod uptime;
pub mod users;
