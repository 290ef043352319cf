//! Top-level facade crate for promexp.
//!
//! Re-exports the core data model and the server library so users can depend
//! on a single crate.

pub mod core {
    pub use promexp_core::*;
}

pub mod server {
    pub use promexp_server::*;
}
