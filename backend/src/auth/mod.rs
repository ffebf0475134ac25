//! Authentication module for player accounts and sessions.
//!
//! This module provides registration, login, session token verification and
//! the middleware that gates protected routes.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
