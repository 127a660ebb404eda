//! Channel-access simulator comparing four MAC schemes on a shared medium:
//! blind retransmission, blind retransmission with exponential backoff,
//! CSMA/CA and RTS/CTS.

pub mod error;
pub mod mac;
pub mod sim;
pub mod ui;
pub mod utils;

pub use error::SimError;
pub use mac::{FrameKind, MacProtocol, MacScheme, Station};
pub use sim::{SimConfig, SimReport, Simulation};
