use serde::{Deserialize, Serialize};

use crate::domain::draft::{Field, SubmissionDraft};
use crate::format::{accepts_age, accepts_name, digit_count, format_phone, PHONE_DIGITS};

/// Per-field error flags; `true` means the field is in error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub full_name: bool,
    pub phone_number: bool,
    pub city: bool,
    pub age: bool,
}

impl ValidationResult {
    pub fn passed(&self) -> bool {
        self.failed_fields().is_empty()
    }

    pub fn has_error(&self, field: Field) -> bool {
        match field {
            Field::FullName => self.full_name,
            Field::PhoneNumber => self.phone_number,
            Field::City => self.city,
            Field::Age => self.age,
        }
    }

    pub fn failed_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|field| self.has_error(*field)).collect()
    }

    fn mark(&mut self, field: Field) {
        match field {
            Field::FullName => self.full_name = true,
            Field::PhoneNumber => self.phone_number = true,
            Field::City => self.city = true,
            Field::Age => self.age = true,
        }
    }
}

/// Checks the draft the way the form does before submitting.
pub fn validate(draft: &SubmissionDraft) -> ValidationResult {
    let phone = draft.phone_number.trim();
    ValidationResult {
        full_name: draft.full_name.trim().is_empty(),
        phone_number: phone.is_empty() || digit_count(phone) < PHONE_DIGITS,
        city: draft.city.trim().is_empty(),
        age: draft.age.trim().is_empty(),
    }
}

/// [`validate`] plus the shape rules the formatter enforces while typing.
///
/// Input that reaches the server did not necessarily go through the
/// formatter, so the endpoint re-checks the full shape here.
pub fn validate_strict(draft: &SubmissionDraft) -> ValidationResult {
    let mut result = validate(draft);

    if !accepts_name(draft.full_name.trim()) {
        result.mark(Field::FullName);
    }
    if !accepts_name(draft.city.trim()) {
        result.mark(Field::City);
    }
    if !accepts_age(draft.age.trim()) {
        result.mark(Field::Age);
    }
    if !is_complete_phone(draft.phone_number.trim()) {
        result.mark(Field::PhoneNumber);
    }

    result
}

fn is_complete_phone(phone: &str) -> bool {
    if digit_count(phone) != PHONE_DIGITS {
        return false;
    }
    let bare = phone.chars().all(|c| c.is_ascii_digit());
    bare || format_phone(phone).as_deref() == Some(phone)
}

#[cfg(test)]
mod tests {
    use super::{validate, validate_strict, ValidationResult};
    use crate::domain::draft::{Field, SubmissionDraft};

    fn jane() -> SubmissionDraft {
        SubmissionDraft {
            full_name: "Jane Doe".to_string(),
            phone_number: "555-123-4567".to_string(),
            city: "Austin".to_string(),
            age: "29".to_string(),
        }
    }

    #[test]
    fn complete_draft_passes() {
        let result = validate(&jane());
        assert!(result.passed());
        assert_eq!(result, ValidationResult::default());
    }

    #[test]
    fn empty_city_is_flagged() {
        let draft = SubmissionDraft { city: String::new(), ..jane() };
        let result = validate(&draft);

        assert!(result.city);
        assert!(!result.passed());
        assert_eq!(result.failed_fields(), vec![Field::City]);
    }

    #[test]
    fn whitespace_only_fields_are_empty() {
        let draft = SubmissionDraft {
            full_name: "   ".to_string(),
            age: "\t".to_string(),
            ..jane()
        };
        assert_eq!(validate(&draft).failed_fields(), vec![Field::FullName, Field::Age]);
    }

    #[test]
    fn phone_needs_ten_digits() {
        let short = SubmissionDraft { phone_number: "555-123-456".to_string(), ..jane() };
        assert!(validate(&short).phone_number);

        let bare = SubmissionDraft { phone_number: "5551234567".to_string(), ..jane() };
        assert!(!validate(&bare).phone_number);
    }

    #[test]
    fn empty_draft_flags_every_field() {
        assert_eq!(validate(&SubmissionDraft::default()).failed_fields(), Field::ALL.to_vec());
    }

    #[test]
    fn strict_validation_rejects_shapes_the_formatter_would_drop() {
        let draft = SubmissionDraft {
            full_name: "Jane <script>".to_string(),
            phone_number: "555-123-45678".to_string(),
            city: "Austin".to_string(),
            age: "1000".to_string(),
        };

        let loose = validate(&draft);
        assert!(loose.passed(), "loose validation only checks presence and digit count");

        let strict = validate_strict(&draft);
        assert_eq!(strict.failed_fields(), vec![Field::FullName, Field::PhoneNumber, Field::Age]);
    }

    #[test]
    fn strict_validation_accepts_formatted_and_bare_phones() {
        assert!(validate_strict(&jane()).passed());

        let bare = SubmissionDraft { phone_number: "5551234567".to_string(), ..jane() };
        assert!(validate_strict(&bare).passed());

        let odd = SubmissionDraft { phone_number: "55-5123-4567".to_string(), ..jane() };
        assert!(validate_strict(&odd).phone_number);
    }
}
