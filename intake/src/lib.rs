//! Lead intake form: field validation, input formatting and submission to
//! the relay, independent of any particular UI toolkit.

pub mod config;
pub mod errors;
pub mod fields;
pub mod form;
pub mod phone;
pub mod social;
pub mod submitter;
pub mod validators;

pub use form::{FieldEvent, FormState};
pub use submitter::{Dismissal, SubmitControl, SubmitOutcome, Submitter};
