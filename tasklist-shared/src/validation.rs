/// Per-field validation errors
///
/// [`FieldErrors`] collects human-readable messages keyed by field name and
/// serializes as a plain JSON object:
///
/// ```json
/// { "title": ["The title field is required."] }
/// ```
///
/// Request types that derive `validator::Validate` convert their
/// `ValidationErrors` into this shape so every endpoint reports failures the
/// same way.
///
/// # Example
///
/// ```
/// use tasklist_shared::validation::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// errors.add("title", "The title field is required.");
///
/// assert!(errors.has("title"));
/// assert!(errors.into_result().is_err());
/// ```

use serde::Serialize;
use std::collections::BTreeMap;

/// Validation messages grouped by field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set holding a single message
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Appends a message for `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if at least one message was recorded for `field`
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of fields with at least one message
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when empty, `Err(self)` otherwise
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();

        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid.", field));
                fields.add(field.to_string(), message);
            }
        }

        fields
    }
}
