//! Utility functions used across the application.
//!
//! - [`id_generator`] - Random short identifier generation
//! - [`url_validator`] - Syntactic validation of target URLs
//! - [`short_url_builder`] - Public short URL construction from request headers

pub mod id_generator;
pub mod short_url_builder;
pub mod url_validator;
