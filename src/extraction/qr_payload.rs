use crate::models::{QrCardFields, QrPayload};
use crate::utils::CardError;
use log::warn;

pub const PAYLOAD_DELIMITER: char = '|';

/// Reformat a `DDMMYYYY` token to `DD-MM-YYYY`.
///
/// Pure substring slicing. The card schema guarantees 8 digits; nothing is
/// validated against a calendar, so `"99999999"` becomes `"99-99-9999"`.
/// A token too short to slice is passed through unchanged.
pub fn format_date(token: &str) -> String {
    match (token.get(0..2), token.get(2..4), token.get(4..)) {
        (Some(day), Some(month), Some(year)) => format!("{}-{}-{}", day, month, year),
        _ => token.to_string(),
    }
}

/// Split a decoded payload into its positional schema variant.
///
/// Returns `Ok(None)` for an empty payload, the no-payload sentinel that
/// tells the retry controller to keep walking the width ladder. Exactly 7
/// parts select the legacy-bearing variant; any other count of at least 6
/// maps the first six positions (a count other than 6 is logged as a
/// data-quality warning). Fewer than 6 parts cannot be mapped positionally
/// and is reported as an unrecognized schema.
pub fn parse_payload(data: &str) -> Result<Option<QrPayload>, CardError> {
    if data.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = data.split(PAYLOAD_DELIMITER).collect();
    match parts.len() {
        7 => Ok(Some(QrPayload::V7 {
            cccd_id: parts[0].to_string(),
            cmnd_id: parts[1].to_string(),
            full_name: parts[2].to_string(),
            dob: parts[3].to_string(),
            gender: parts[4].to_string(),
            residence: parts[5].to_string(),
            issuance: parts[6].to_string(),
        })),
        count if count >= 6 => {
            if count != 6 {
                warn!(
                    "QR payload split into {} fields; mapping the first six",
                    count
                );
            }
            Ok(Some(QrPayload::V6 {
                cccd_id: parts[0].to_string(),
                full_name: parts[1].to_string(),
                dob: parts[2].to_string(),
                gender: parts[3].to_string(),
                residence: parts[4].to_string(),
                issuance: parts[5].to_string(),
            }))
        }
        count => Err(CardError::UnrecognizedPayload(count)),
    }
}

impl QrPayload {
    /// Flatten the variant into output fields, formatting the date tokens.
    pub fn into_fields(self) -> QrCardFields {
        match self {
            QrPayload::V6 {
                cccd_id,
                full_name,
                dob,
                gender,
                residence,
                issuance,
            } => QrCardFields {
                cccd_id,
                cmnd_id: None,
                full_name,
                dob: format_date(&dob),
                gender,
                residence,
                issuance: format_date(&issuance),
            },
            QrPayload::V7 {
                cccd_id,
                cmnd_id,
                full_name,
                dob,
                gender,
                residence,
                issuance,
            } => QrCardFields {
                cccd_id,
                cmnd_id: Some(cmnd_id),
                full_name,
                dob: format_date(&dob),
                gender,
                residence,
                issuance: format_date(&issuance),
            },
        }
    }
}

/// Parse a decoded payload straight to output fields.
pub fn extract_qr_info(data: &str) -> Result<Option<QrCardFields>, CardError> {
    Ok(parse_payload(data)?.map(QrPayload::into_fields))
}
