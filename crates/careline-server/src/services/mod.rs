//! Business logic services for the triage relay.

pub mod run;
