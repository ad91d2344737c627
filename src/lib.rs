//! Planwright - AI-assisted event planning backend.
//!
//! An upstream language model turns natural-language commands into tool
//! calls; this crate previews them, holds mutations for explicit user
//! confirmation, executes them transactionally, and broadcasts cache
//! invalidations to other connected clients.

pub mod adapters;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;
