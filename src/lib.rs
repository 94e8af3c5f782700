//! Keypad-settable wall clock driven by a one-second tick.
//!
//! [`store::TimeStore`] owns the authoritative [`clock::TimeOfDay`] and the
//! signals between the tick interrupt, the advance task and the display
//! refresh task. [`edit::Editor`] turns keypad codes into a replacement time.
//! Both are free of board code so they run under the host test harness.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod display;
pub mod edit;
pub mod error;
pub mod font;
pub mod keypad;
pub mod store;
pub mod tasks;

pub use error::{Error, Result};
