use serde::Deserialize;
use serde_valid::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoanForm {
    #[validate(min_length = 1)]
    pub description: String,
    #[validate(exclusive_minimum = 0.0)]
    pub amount: f64,
}

/// Body of the admin decision endpoint. Kept as a string so that an unknown
/// value surfaces as a validation error rather than a deserialization one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanStatusForm {
    pub status: String,
}
