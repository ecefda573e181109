pub mod fields;
pub mod qr_payload;

pub use fields::{CardField, FieldExtractor, FieldRule};
pub use qr_payload::{extract_qr_info, format_date, parse_payload};
