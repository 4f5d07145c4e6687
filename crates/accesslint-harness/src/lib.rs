//! AccessLint Harness
//!
//! Wires the producer ([`accesslint_preview`]) and the consumer
//! ([`accesslint_manager`]) over one in-process bus, and drives them from
//! JSON fixtures. The `accesslint-sim` binary is a thin CLI over
//! [`run_simulator`].

#![warn(unreachable_pub)]

pub mod session;
pub mod simulator;

pub use session::{JsonSink, Session, StoryRun};
pub use simulator::{run_simulator, SimulatorReport, StoryReport};
