//! # godaddy-ddns
//!
//! A one-shot dynamic DNS updater for GoDaddy-hosted domains.
//!
//! ## Features
//!
//! - Resolves the current public IP from an echo service
//! - Updates all configured records in a single bulk request
//! - Skips the provider entirely while the IP is unchanged
//! - Optional minimum interval that re-applies an unchanged IP as a keep-alive
//!
//! ## Usage
//!
//! ```bash
//! # Reconcile records with the current public IP (the default command)
//! godaddy-ddns run
//!
//! # Show the resolved IP, the provider's records, and the saved state
//! godaddy-ddns status
//!
//! # Check the configuration and API credentials
//! godaddy-ddns validate
//! ```

pub mod config;
pub mod error;
pub mod godaddy;
pub mod interval;
pub mod reconciler;
pub mod resolver;
pub mod state;

pub use config::Config;
pub use error::{DdnsError, Result};
pub use reconciler::{Outcome, Reconciler};
