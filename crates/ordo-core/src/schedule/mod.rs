//! Selection of an actionable subset from a built graph.
//!
//! The graph decides *order*; this module decides *how much*. The only
//! selector is the budgeted greedy pass in [`greedy`].

pub mod greedy;

pub use greedy::{Admission, AdmissionReason, Selection, select_actions};
