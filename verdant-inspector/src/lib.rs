//! # verdant-inspector
//!
//! Greenwashing detection for marketing statements.
//!
//! An [`Inspector`] asks a company-report pipeline for evidence and a
//! regulations pipeline for applicable rules, then has a judging model return
//! a typed [`Analysis`] and, for misleading claims, a [`Rewrite`] with
//! suggestions. Model output is decoded from JSON into these records; a
//! response that does not decode is an error rather than a partial result.

pub mod category;
pub mod error;
pub mod inspector;
pub mod parse;
pub mod prompts;
pub mod report;

pub use category::GreenwashingCategory;
pub use error::{InspectError, Result};
pub use inspector::Inspector;
pub use report::{Analysis, InspectionReport, Rewrite};
