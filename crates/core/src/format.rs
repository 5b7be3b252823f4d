//! Incremental formatting applied to every keystroke in the waitlist form.
//!
//! Formatting never fails: a keystroke that would break a field's shape is
//! dropped and the previous value is kept.

use crate::domain::draft::Field;

pub const MAX_AGE_DIGITS: usize = 3;
pub const PHONE_DIGITS: usize = 10;
const PHONE_GROUPS: [usize; 3] = [3, 3, 4];

/// Returns the value to store for `field` after the input changed to `raw`.
pub fn format_field(field: Field, raw: &str, previous: &str) -> String {
    let accepted = match field {
        Field::Age => accepts_age(raw).then(|| raw.to_string()),
        Field::PhoneNumber => format_phone(raw),
        Field::FullName | Field::City => accepts_name(raw).then(|| raw.to_string()),
    };
    accepted.unwrap_or_else(|| previous.to_string())
}

/// Like [`format_field`] for a field addressed by its wire name. Unknown
/// fields pass through untouched.
pub fn format_named(name: &str, raw: &str, previous: &str) -> String {
    match Field::parse(name) {
        Some(field) => format_field(field, raw, previous),
        None => raw.to_string(),
    }
}

/// Replays `keys` as individual keystrokes appended to `previous`.
pub fn type_keystrokes(field: Field, previous: &str, keys: &str) -> String {
    keys.chars().fold(previous.to_string(), |current, key| {
        let mut raw = current.clone();
        raw.push(key);
        format_field(field, &raw, &current)
    })
}

pub fn accepts_age(raw: &str) -> bool {
    raw.is_empty() || (raw.len() <= MAX_AGE_DIGITS && raw.chars().all(|c| c.is_ascii_digit()))
}

pub fn accepts_name(raw: &str) -> bool {
    raw.chars().all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || c == '-')
}

/// Groups the digits of `raw` as `ddd-ddd-dddd`, or `None` when more than ten
/// digits were entered.
pub fn format_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > PHONE_DIGITS {
        return None;
    }

    let mut groups = Vec::with_capacity(PHONE_GROUPS.len());
    let mut rest = digits.as_str();
    for width in PHONE_GROUPS {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(width.min(rest.len()));
        groups.push(head);
        rest = tail;
    }
    Some(groups.join("-"))
}

pub fn digit_count(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}

#[cfg(test)]
mod tests {
    use super::{
        format_field, format_named, format_phone, type_keystrokes, MAX_AGE_DIGITS, PHONE_DIGITS,
    };
    use crate::domain::draft::Field;

    fn is_grouped_phone(value: &str) -> bool {
        if value.is_empty() {
            return true;
        }
        let groups: Vec<&str> = value.split('-').collect();
        let digits_only =
            groups.iter().all(|group| !group.is_empty() && group.chars().all(|c| c.is_ascii_digit()));
        let within_width = groups.iter().zip([3, 3, 4]).all(|(group, width)| group.len() <= width);
        let leading_full = groups[..groups.len() - 1].iter().all(|group| group.len() == 3);

        groups.len() <= 3 && digits_only && within_width && leading_full
    }

    #[test]
    fn age_rejects_letters_and_keeps_previous_value() {
        assert_eq!(type_keystrokes(Field::Age, "", "12a"), "12");
    }

    #[test]
    fn age_is_capped_at_three_digits() {
        assert_eq!(type_keystrokes(Field::Age, "", "12345"), "123");
        assert_eq!(format_field(Field::Age, "", "42"), "");
    }

    const MIXED_SEQUENCES: [&str; 8] = [
        "",
        "abc",
        "9x-8 .7!6?5",
        "0000000",
        "  4 2  ",
        "a1-2b3 4(5)6--7x8y9z0!1",
        "(555) 123-4567 ext. 89",
        "１２3４56789012345",
    ];

    fn leading_ascii_digits(keys: &str, limit: usize) -> String {
        keys.chars().filter(char::is_ascii_digit).take(limit).collect()
    }

    #[test]
    fn age_stays_digits_for_arbitrary_keystrokes() {
        for keys in MIXED_SEQUENCES {
            let stored = type_keystrokes(Field::Age, "", keys);
            assert!(stored.len() <= MAX_AGE_DIGITS, "`{keys}` stored `{stored}`");
            assert!(stored.chars().all(|c| c.is_ascii_digit()), "`{keys}` stored `{stored}`");
            assert_eq!(stored, leading_ascii_digits(keys, MAX_AGE_DIGITS), "typed `{keys}`");
        }
    }

    #[test]
    fn phone_groups_digits_as_they_are_typed() {
        let mut value = String::new();
        let mut seen = Vec::new();
        for key in "123456".chars() {
            value = type_keystrokes(Field::PhoneNumber, &value, &key.to_string());
            seen.push(value.clone());
        }

        assert_eq!(seen, vec!["1", "12", "123", "123-4", "123-45", "123-456"]);
    }

    #[test]
    fn phone_strips_non_digits() {
        assert_eq!(format_field(Field::PhoneNumber, "(555) 123.4567", ""), "555-123-4567");
    }

    #[test]
    fn phone_rejects_an_eleventh_digit() {
        let full = type_keystrokes(Field::PhoneNumber, "", "5551234567");
        assert_eq!(full, "555-123-4567");
        assert_eq!(type_keystrokes(Field::PhoneNumber, &full, "8"), full);
    }

    #[test]
    fn phone_keystrokes_always_produce_grouped_digits() {
        for keys in MIXED_SEQUENCES {
            let stored = type_keystrokes(Field::PhoneNumber, "", keys);
            assert!(is_grouped_phone(&stored), "`{keys}` stored `{stored}`");
            assert_eq!(
                stored.replace('-', ""),
                leading_ascii_digits(keys, PHONE_DIGITS),
                "typed `{keys}`"
            );
        }
        assert_eq!(type_keystrokes(Field::PhoneNumber, "", MIXED_SEQUENCES[5]), "123-456-7890");
    }

    #[test]
    fn phone_formatting_is_idempotent() {
        for raw in ["", "1", "1234", "123-456", "5551234567", "555-123-4567", "55-51-23"] {
            let once = format_field(Field::PhoneNumber, raw, "");
            let twice = format_field(Field::PhoneNumber, &once, "");
            assert_eq!(once, twice, "reformatting `{raw}` changed the value");
        }
    }

    #[test]
    fn deleting_back_to_empty_is_allowed() {
        assert_eq!(format_phone("").as_deref(), Some(""));
        assert_eq!(format_field(Field::FullName, "", "J"), "");
    }

    #[test]
    fn names_accept_letters_spaces_and_hyphens_only() {
        assert_eq!(type_keystrokes(Field::FullName, "", "Mary-Jane O'Neil"), "Mary-Jane ONeil");
        assert_eq!(type_keystrokes(Field::City, "", "St. Louis 2"), "St Louis ");
    }

    #[test]
    fn unknown_fields_pass_through() {
        assert_eq!(format_named("nickname", "x1!", "old"), "x1!");
        assert_eq!(format_named("age", "x", "4"), "4");
    }
}
