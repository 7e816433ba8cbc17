//! Value normalizer: one raw field -> text that parses as one JSON value.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

const QUOTE_MIDDLE: &str = r#"${1}"${2}"${3}"#;

// A bare token is bounded by the string edges or by list separators.
fn bare_decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(^|,\s+|,)([0-9]+)(\s+,|,|$)").expect("decimal regex must compile")
    })
}

fn bare_hex_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(^|,\s+|,)(0[xX][0-9a-fA-F]+)(\s+,|,|$)").expect("hex regex must compile")
    })
}

pub(crate) fn is_json(s: &str) -> bool {
    serde_json::from_str::<Value>(s).is_ok()
}

/// Quote bare decimal and hex literals so the field can be spliced into a
/// JSON array.
///
/// When the quoted form still is not JSON the raw input is emitted as a JSON
/// string literal instead. Empty input stays empty.
pub fn normalize_value(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let quoted = bare_decimal_re().replace_all(raw, QUOTE_MIDDLE);
    let quoted = bare_hex_re().replace_all(&quoted, QUOTE_MIDDLE).into_owned();

    if is_json(&quoted) {
        quoted
    } else {
        Value::String(raw.to_owned()).to_string()
    }
}
