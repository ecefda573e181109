use crate::models::OcrCardFields;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

/// The fields the OCR pipeline knows how to pull out of card text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    IdNumber,
    FullName,
    Gender,
    Dob,
    HomeTown,
    Resident,
}

/// A single field -> pattern rule. Capture group 1 is the field value.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: CardField,
    pub pattern: Regex,
}

impl FieldRule {
    pub fn new(field: CardField, pattern: &str) -> Self {
        FieldRule {
            field,
            pattern: Regex::new(pattern).unwrap(),
        }
    }
}

// The default rule table for the bilingual card layout: labels are printed
// in English, value tokens (gender) in Vietnamese.
lazy_static! {
    static ref DEFAULT_RULES: Vec<FieldRule> = vec![
        FieldRule::new(CardField::IdNumber, r"\b(\d{9,12})\b"),
        FieldRule::new(CardField::FullName, r"Full name:\s*([^\n]+)"),
        FieldRule::new(CardField::Gender, r"(Nam|Nữ)"),
        FieldRule::new(CardField::Dob, r"(\d{2}/\d{2}/\d{4})"),
        FieldRule::new(CardField::HomeTown, r"Place of origin:\s*([^\n]+)"),
        FieldRule::new(CardField::Resident, r"Place of residence\s*([^\n]+)"),
    ];
}

/// Applies an ordered rule table to recognized card text.
///
/// Each pattern runs independently against the whole text and the first
/// match wins. Matched values have `;` normalized to `,` since some cards
/// use it as an internal sub-field separator. A field with no match stays
/// absent, except `resident`, which gets the address continuation pass.
pub struct FieldExtractor {
    rules: Vec<FieldRule>,
}

impl FieldExtractor {
    pub fn new() -> Self {
        FieldExtractor {
            rules: DEFAULT_RULES.clone(),
        }
    }

    /// Build an extractor with a custom rule table, e.g. for another card
    /// locale.
    pub fn with_rules(rules: Vec<FieldRule>) -> Self {
        FieldExtractor { rules }
    }

    pub fn extract(&self, text: &str) -> OcrCardFields {
        let mut fields = OcrCardFields::default();
        for rule in &self.rules {
            let value = rule
                .pattern
                .captures(text)
                .and_then(|captures| captures.get(1))
                .map(|matched| matched.as_str().replace(';', ","));
            if value.is_none() {
                debug!("No match for {:?}", rule.field);
            }
            match rule.field {
                CardField::IdNumber => fields.id_number = value,
                CardField::FullName => fields.full_name = value,
                CardField::Gender => fields.gender = value,
                CardField::Dob => fields.dob = value,
                CardField::HomeTown => fields.home_town = value,
                CardField::Resident => fields.resident = value,
            }
        }

        Self::append_address_continuation(&mut fields, text);
        fields
    }

    /// The residential address often wraps onto the last recognized lines
    /// without being re-labelled, so the labelled pattern under-captures it.
    /// Walk the lines backward (the first line is never a continuation) and
    /// append the first one holding a `,` or `;` separator, then stop.
    fn append_address_continuation(fields: &mut OcrCardFields, text: &str) {
        if fields.resident.is_none() {
            fields.resident = Some(String::new());
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let mut i = lines.len().saturating_sub(1);
        while i > 0 {
            if lines[i].contains(',') || lines[i].contains(';') {
                if let Some(resident) = fields.resident.as_mut() {
                    resident.push_str(", ");
                    resident.push_str(&lines[i].replace(';', ","));
                }
                break;
            }
            i -= 1;
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        FieldExtractor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD_TEXT: &str = "CAN CUOC CONG DAN\n\
        036078012345\n\
        Full name: NGUYEN VAN A\n\
        Date of birth 01/02/1999\n\
        Nam\n\
        Place of origin: Xuan Truong, Nam Dinh\n\
        Place of residence To 4\n\
        Phuong Dich Vong; Cau Giay; Ha Noi";

    #[test]
    fn test_extracts_all_labelled_fields() {
        let fields = FieldExtractor::new().extract(CARD_TEXT);
        assert_eq!(fields.id_number.as_deref(), Some("036078012345"));
        assert_eq!(fields.full_name.as_deref(), Some("NGUYEN VAN A"));
        assert_eq!(fields.gender.as_deref(), Some("Nam"));
        assert_eq!(fields.dob.as_deref(), Some("01/02/1999"));
        assert_eq!(
            fields.home_town.as_deref(),
            Some("Xuan Truong, Nam Dinh")
        );
    }

    #[test]
    fn test_full_name_takes_rest_of_line() {
        let fields = FieldExtractor::new().extract("Full name: NGUYEN VAN A\n");
        assert_eq!(fields.full_name.as_deref(), Some("NGUYEN VAN A"));
    }

    #[test]
    fn test_female_gender_token() {
        let fields = FieldExtractor::new().extract("Nữ");
        assert_eq!(fields.gender.as_deref(), Some("Nữ"));
    }

    #[test]
    fn test_id_number_needs_nine_to_twelve_digits() {
        let extractor = FieldExtractor::new();
        assert_eq!(extractor.extract("12345678").id_number, None);
        assert_eq!(
            extractor.extract("123456789").id_number.as_deref(),
            Some("123456789")
        );
        assert_eq!(extractor.extract("1234567890123456").id_number, None);
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Full name: NGUYEN VAN A\nFull name: TRAN THI B\n";
        let fields = FieldExtractor::new().extract(text);
        assert_eq!(fields.full_name.as_deref(), Some("NGUYEN VAN A"));
    }

    #[test]
    fn test_semicolons_normalized_in_matched_values() {
        let fields =
            FieldExtractor::new().extract("Place of origin: Xom 3; Nghia Hung; Nam Dinh\n");
        assert_eq!(
            fields.home_town.as_deref(),
            Some("Xom 3, Nghia Hung, Nam Dinh")
        );
    }

    #[test]
    fn test_unmatched_fields_are_absent() {
        let fields = FieldExtractor::new().extract("nothing recognizable here");
        assert_eq!(fields.id_number, None);
        assert_eq!(fields.full_name, None);
        assert_eq!(fields.gender, None);
        assert_eq!(fields.dob, None);
        assert_eq!(fields.home_town, None);
        // resident is initialized empty by the continuation pass
        assert_eq!(fields.resident.as_deref(), Some(""));
    }

    #[test]
    fn test_address_continuation_from_last_separator_line() {
        let text = "some header\nno separator line\n123 Le Loi St; District 1";
        let fields = FieldExtractor::new().extract(text);
        assert_eq!(
            fields.resident.as_deref(),
            Some(", 123 Le Loi St, District 1")
        );
    }

    #[test]
    fn test_address_continuation_appends_to_labelled_match() {
        let fields = FieldExtractor::new().extract(CARD_TEXT);
        assert_eq!(
            fields.resident.as_deref(),
            Some("To 4, Phuong Dich Vong, Cau Giay, Ha Noi")
        );
    }

    #[test]
    fn test_only_one_continuation_line_is_appended() {
        let text = "a, b\nc; d\ne, f";
        let fields = FieldExtractor::new().extract(text);
        assert_eq!(fields.resident.as_deref(), Some(", e, f"));
    }

    #[test]
    fn test_first_line_is_never_a_continuation() {
        let text = "only, line, with, separators\nplain\nplain again";
        let fields = FieldExtractor::new().extract(text);
        assert_eq!(fields.resident.as_deref(), Some(""));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = FieldExtractor::new();
        assert_eq!(extractor.extract(CARD_TEXT), extractor.extract(CARD_TEXT));
    }

    #[test]
    fn test_custom_rule_table() {
        let extractor = FieldExtractor::with_rules(vec![FieldRule::new(
            CardField::FullName,
            r"Ho va ten:\s*([^\n]+)",
        )]);
        let fields = extractor.extract("Ho va ten: LE VAN C\n");
        assert_eq!(fields.full_name.as_deref(), Some("LE VAN C"));
        assert_eq!(fields.id_number, None);
    }
}
