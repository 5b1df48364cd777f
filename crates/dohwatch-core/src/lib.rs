//! Core types and traits for dohwatch.
//!
//! This crate holds everything the DNS tampering detector needs that does
//! not touch the network:
//!
//! - **Types**: observations, trusted address sets, alert records, DoH JSON
//! - **Relatedness**: the exact-or-wide-range comparison used to decide
//!   whether a connection is explained by trusted DNS answers
//! - **Errors**: [`Error`] and the crate-wide [`Result`] alias
//!
//! # Example
//!
//! ```rust
//! use dohwatch_core::{relatedness, TrustedAddressSet};
//!
//! let trusted: TrustedAddressSet = ["104.16.1.2"].into_iter().collect();
//! assert!(relatedness::is_related("104.16.5.10", &trusted));
//! assert!(!relatedness::is_related("1.2.3.4", &trusted));
//! ```

#![doc(html_root_url = "https://docs.rs/dohwatch-core/0.1.0")]

mod error;
pub mod relatedness;
mod resolver;
pub mod types;

pub use error::{Error, Result};
pub use relatedness::{AddressRelatednessPolicy, ExactMatchPolicy, WideRangePolicy};
pub use resolver::AddressResolver;
pub use types::*;
