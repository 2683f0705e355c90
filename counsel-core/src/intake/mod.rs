mod flow;
mod form;

pub use flow::{IntakeFlow, IntakeStep};
pub use form::{
    parse_amount, CaseForm, FormField, StakesRange, CASE_STATUSES, CASE_TYPES, JURISDICTIONS,
    OTHER, UNKNOWN,
};
