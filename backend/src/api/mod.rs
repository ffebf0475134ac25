//! HTTP API surface outside of authentication.
//!
//! Shared response types live in `common`; feature routers live in their own
//! submodules.

pub mod common;
pub mod player;
