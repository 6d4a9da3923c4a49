//! Packet-evaluation core for a host-level intrusion prevention system.
//!
//! This crate has no knowledge of how packets physically arrive, how rules
//! are stored on disk beyond a JSON array, or where log lines end up. It
//! exposes four pieces: the [`expr`] boolean expression engine, the
//! [`model`] data types, the [`loader`] that turns JSON into a `Vec<Rule>`,
//! the [`rate_limit`] tracker, and the [`matcher`] that ties them together
//! into a per-packet verdict.

pub mod expr;
pub mod loader;
pub mod logger;
pub mod matcher;
pub mod model;
pub mod rate_limit;

pub use expr::{CompiledExpression, MatchValue};
pub use loader::{parse_all_rules, RuleLoadError};
pub use logger::Logger;
pub use matcher::decide;
pub use model::{PacketView, Protocol, Rule, RuleAction};
pub use rate_limit::RateLimiter;
