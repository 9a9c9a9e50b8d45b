//! FieldOps authentication service
//!
//! Session-cookie authentication and role-based authorization for the
//! FieldOps application: credential hashing, the in-process session
//! store, the login/registration flows, and the per-request gates the
//! business routes sit behind.

pub mod error;
pub mod extractors;
pub mod lockout;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod session;
pub mod state;
pub mod validation;
