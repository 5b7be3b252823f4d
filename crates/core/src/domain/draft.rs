use std::fmt;

use serde::{Deserialize, Serialize};

/// The four fields a visitor fills in to join the waitlist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    PhoneNumber,
    City,
    Age,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::FullName, Field::PhoneNumber, Field::City, Field::Age];

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::PhoneNumber => "phoneNumber",
            Self::City => "city",
            Self::Age => "age",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::PhoneNumber => "Phone Number (e.g., 123-456-7890)",
            Self::City => "City",
            Self::Age => "Age",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.wire_name() == raw.trim())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Form data for the current session, before it has been submitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDraft {
    pub full_name: String,
    pub phone_number: String,
    pub city: String,
    pub age: String,
}

impl SubmissionDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::PhoneNumber => &self.phone_number,
            Field::City => &self.city,
            Field::Age => &self.age,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::FullName => self.full_name = value,
            Field::PhoneNumber => self.phone_number = value,
            Field::City => self.city = value,
            Field::Age => self.age = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, SubmissionDraft};

    #[test]
    fn draft_serializes_with_camel_case_wire_names() {
        let draft = SubmissionDraft {
            full_name: "Jane Doe".to_string(),
            phone_number: "555-123-4567".to_string(),
            city: "Austin".to_string(),
            age: "29".to_string(),
        };

        let value = serde_json::to_value(&draft).expect("draft serializes");
        for field in Field::ALL {
            assert_eq!(value[field.wire_name()], draft.get(field));
        }
    }

    #[test]
    fn field_parse_accepts_wire_names_only() {
        assert_eq!(Field::parse("phoneNumber"), Some(Field::PhoneNumber));
        assert_eq!(Field::parse(" age "), Some(Field::Age));
        assert_eq!(Field::parse("firstName"), None);
    }
}
