use serde::{Deserialize, Serialize};

/// Fields recognized from the printed face of the card.
///
/// `None` means extraction failed for that field; an empty string is a
/// present-but-empty value and passes response validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrCardFields {
    pub id_number: Option<String>,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub home_town: Option<String>,
    pub resident: Option<String>,
}

impl OcrCardFields {
    /// Names of the fields that are still absent, in extraction order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id_number.is_none() {
            missing.push("id_number");
        }
        if self.full_name.is_none() {
            missing.push("full_name");
        }
        if self.gender.is_none() {
            missing.push("gender");
        }
        if self.dob.is_none() {
            missing.push("dob");
        }
        if self.home_town.is_none() {
            missing.push("home_town");
        }
        if self.resident.is_none() {
            missing.push("resident");
        }
        missing
    }
}

/// Fields carried by the QR payload printed on the card.
///
/// `cmnd_id` is the legacy identity number; cards issued on the current
/// schema omit it and it stays `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCardFields {
    pub cccd_id: String,
    pub cmnd_id: Option<String>,
    pub full_name: String,
    pub dob: String,
    pub gender: String,
    pub residence: String,
    pub issuance: String,
}

/// A decoded QR payload, discriminated by delimiter count at parse time.
///
/// The payload is positional, not self-describing: the 7-part form carries
/// the legacy identifier in slot 1, the 6-part form drops it and shifts the
/// remaining fields up. Dates are kept raw (`DDMMYYYY`) here and formatted
/// on conversion to [`QrCardFields`].
#[derive(Debug, Clone, PartialEq)]
pub enum QrPayload {
    V6 {
        cccd_id: String,
        full_name: String,
        dob: String,
        gender: String,
        residence: String,
        issuance: String,
    },
    V7 {
        cccd_id: String,
        cmnd_id: String,
        full_name: String,
        dob: String,
        gender: String,
        residence: String,
        issuance: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_empty_when_complete() {
        let fields = OcrCardFields {
            id_number: Some("012345678901".to_string()),
            full_name: Some("NGUYEN VAN A".to_string()),
            gender: Some("Nam".to_string()),
            dob: Some("01/02/1999".to_string()),
            home_town: Some("Ha Noi".to_string()),
            resident: Some("".to_string()),
        };
        assert!(fields.missing_fields().is_empty());
    }

    #[test]
    fn test_missing_fields_reports_in_declaration_order() {
        let fields = OcrCardFields {
            id_number: Some("012345678901".to_string()),
            resident: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(
            fields.missing_fields(),
            vec!["full_name", "gender", "dob", "home_town"]
        );
    }

    #[test]
    fn test_empty_string_counts_as_present() {
        let fields = OcrCardFields {
            resident: Some(String::new()),
            ..Default::default()
        };
        assert!(!fields.missing_fields().contains(&"resident"));
    }

    #[test]
    fn test_qr_fields_serialize_absent_cmnd_as_null() {
        let fields = QrCardFields {
            cccd_id: "012345678901".to_string(),
            cmnd_id: None,
            full_name: "NGUYEN VAN A".to_string(),
            dob: "01-02-1999".to_string(),
            gender: "Nam".to_string(),
            residence: "Ha Noi".to_string(),
            issuance: "01-01-2021".to_string(),
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert!(json["cmnd_id"].is_null());
        assert_eq!(json["cccd_id"], "012345678901");
    }
}
