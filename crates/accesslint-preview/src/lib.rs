//! AccessLint Preview
//!
//! The rendering-side audit pipeline. After each story renders:
//! - **Skip**: stories tagged `no-a11y` (or a configured tag) report a skip
//! - **Schedule**: the engine's chunked audit runs in bounded slices,
//!   yielding to the task queue between them
//! - **Scope**: violations outside the story root are dropped
//! - **Enrich**: rule metadata is joined in
//! - **Emit**: one versioned report record goes to the reporting sink and
//!   the channel bus, followed by an aggregate `meta` message
//!
//! A [`RunTracker`] keeps one run per story in flight and discards results
//! that finish after the user moved on.
//!
//! # Example
//!
//! ```rust,ignore
//! use accesslint_preview::{AuditConfig, ReportEmitter, StoryAuditor, StoryContext};
//!
//! let auditor = StoryAuditor::new(engine, AuditConfig::load("accesslint.toml")?)
//!     .with_emitter(ReportEmitter::new().with_sink(sink).with_bus(bus));
//! let record = auditor
//!     .after_each(&StoryContext::new("button--primary").with_root(root), &document)
//!     .await;
//! ```

#![warn(unreachable_pub)]

pub mod auditor;
pub mod config;
pub mod emitter;
pub mod enrich;
pub mod error;
pub mod matcher;
pub mod scheduler;
pub mod scope;
pub mod skip;
pub mod tracker;

pub use auditor::{StoryAuditor, StoryContext};
pub use config::{AuditConfig, TestMode, DEFAULT_SLICE_BUDGET_MS};
pub use emitter::{derive_status, ReportEmitter};
pub use enrich::Enricher;
pub use error::{AuditError, ConfigError};
pub use matcher::{to_be_accessible, MatchOutcome, MatcherOptions};
pub use scheduler::{AuditScheduler, ChunkedRun, TaskYield, Yielder};
pub use scope::{is_within, scope_violations};
pub use skip::{parse_tag_list, SkipPolicy, BUILD_SKIP_TAGS, DEFAULT_SKIP_TAG};
pub use tracker::{RunId, RunTicket, RunTracker};
