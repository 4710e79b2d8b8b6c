//! Paceline library crate — re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can import game types, systems, and resources without needing a
//! window or GPU.

pub mod shared;
pub mod input;
pub mod runner;
pub mod buffs;
pub mod health;
pub mod pickups;
pub mod party;
pub mod speech;
pub mod milestones;
pub mod weather;
pub mod audio;
pub mod ui;
pub mod data;
