//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Compile CORS middleware → Bind listener
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Ctrl+C → broadcast → server stops accepting → drains → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: a bad origin pattern aborts startup before binding
//! - One broadcast channel fans the shutdown signal out to every task

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
