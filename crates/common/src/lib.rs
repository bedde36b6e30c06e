//! Common utilities and shared types for LinkGator.
//!
//! This crate provides foundational components used across all LinkGator crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Cryptography**: RSA key generation and JWK encoding for `ActivityPub` signatures
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Metrics**: Federation counters via [`FederationMetrics`]
//!
//! # Example
//!
//! ```no_run
//! use linkgator_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} -> {}", config.server.url, id_gen.generate());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod id;
pub mod metrics;

pub use config::Config;
pub use crypto::{RsaJwk, RsaKeypair, generate_rsa_keypair};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use metrics::{FederationMetrics, MetricsSnapshot};
