//! Acquisitions Backend Library
//!
//! This library exposes the backend modules for use in tests and other crates.

pub mod auth;
pub mod config;
pub mod cookies;
pub mod db;
pub mod error;
pub mod protection;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
