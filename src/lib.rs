/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! # sammy-par-rs
//!
//! A Rust codec for SAMMY parameter files.
//!
//! SAMMY is an R-matrix analysis code for neutron cross-section data. Its
//! parameter files are card-based: blank-line-delimited blocks whose first
//! line carries a five-character keyword, with values living in fixed column
//! ranges. This crate parses those files into typed card models and writes
//! them back out in the same fixed-column layout.

pub mod cards;
pub mod cli;
pub mod parfile;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
