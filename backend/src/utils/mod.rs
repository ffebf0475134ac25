//! Collection of general utility modules.
//!
//! Session token handling and password hashing are kept here so both the
//! services and the middleware can reach them without depending on each other.

pub mod jwt;
pub mod password;
