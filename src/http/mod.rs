//! HTTP hosting for the CORS middleware.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → trace, request ID, timeout layers
//!     → cors::CorsLayer (allow-origin + static headers, OPTIONS stops here)
//!     → server.rs forward handler → upstream
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
