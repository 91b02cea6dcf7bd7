//! RS-485 bridge for the Hayward/Goldline ProLogic pool controller.
//!
//! The controller continuously broadcasts its keypad display and LED state
//! on the bus; this crate reassembles and decodes that traffic into a
//! queryable status cache, and injects simulated key presses back during
//! the controller's client query windows.

pub mod bridge;
pub mod keys;
pub mod protocol;
pub mod status;

pub use bridge::{Bridge, BridgeError};
pub use keys::Key;
pub use status::StatusSnapshot;
