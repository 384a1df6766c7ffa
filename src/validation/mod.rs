//! Request validation
//!
//! Declarative per-field rules evaluated eagerly before any handler runs.
//! Evaluation never stops at the first failure: every violated rule ends up
//! in the returned [`ValidationError`].

mod error;
mod request;
mod rules;

pub use error::{number_value, ValidationError};
pub use request::{BodyRule, ParamRule, ParamSource, RawRequest, RequestSchema};
pub use rules::{DecimalRule, FieldKind, FieldRule, IntRule, ObjectSchema, Presence, TextRule};
