//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, query, scheme)
//!     → host.rs (hostname, port, root domain)
//!     → tenant.rs (main domain / tenant / allowed)
//!     → locale.rs (locale prefix, remaining path)
//!     → decision.rs (bypass, then ordered rules)
//!     → Pass | Redirect | Rewrite
//!
//! Engine Compilation (at startup and on reload):
//!     RoutingConfig
//!     → matcher.rs (bypass + scope matchers)
//!     → Freeze as immutable RoutingEngine
//! ```
//!
//! # Design Decisions
//! - Engine compiled from config, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always yields the same decision
//! - First matching rule wins

pub mod decision;
pub mod engine;
pub mod host;
pub mod locale;
pub mod matcher;
pub mod tenant;

pub use decision::{RawRequest, RedirectStatus, RoutingDecision, Rule, Scheme};
pub use engine::{Evaluation, RoutingEngine};
