//! DNS-over-HTTPS client for dohwatch.
//!
//! This crate provides [`DohClient`], the trusted resolver the alert
//! pipeline compares connections against. It speaks the DNS JSON API
//! (`application/dns-json`) served by Google and Cloudflare.

#![doc(html_root_url = "https://docs.rs/dohwatch-client/0.1.0")]

mod client;
mod config;

pub use client::{DohClient, DohClientBuilder};
pub use config::*;
pub use dohwatch_core::{Error, Result};
