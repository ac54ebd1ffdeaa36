pub mod address;
pub mod client;
pub mod session;
pub mod types;

pub use address::HeuristicAddressParser;
pub use client::{ShiprocketClient, ShiprocketConfig};
pub use session::SessionCache;
