//! Common library for the FieldOps application
//!
//! This crate provides shared infrastructure used across FieldOps services:
//! PostgreSQL connectivity and the database error types.

pub mod database;
pub mod error;
