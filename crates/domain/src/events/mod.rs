pub mod client_event;
pub mod server_event;

pub use client_event::*;
pub use server_event::*;
