//! Integration layer for oxidized-apple
//!
//! This crate wires the media-title lifecycle tracker to a concrete
//! media subsystem: load pipeline, eject forwarding, reset handling,
//! and session initialization.

pub mod runner;

pub use runner::{MediaRunner, SharedTitle};
