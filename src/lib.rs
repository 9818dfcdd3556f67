//! A fixed-capacity byte buffer exposed as a file-like D-Bus device.
//!
//! [`buffer`] holds the state machine, [`status`] the diagnostic report,
//! [`device`] ties both to the file-like call surface, and [`service`] /
//! [`client`] carry that surface over D-Bus.

pub mod buffer;
pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod service;
pub mod status;
