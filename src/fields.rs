//src/fields.rs

use crate::types::TaxonId;

/// Index of the taxon id column in a classifier output line
/// (`C/U  readID  taxID  ...`).
pub const TAXON_ID_FIELD: usize = 2;

/// A classifier output line split on tab characters.
#[derive(Debug)]
pub struct TabFields<'a> {
    fields: Vec<&'a str>,
}

impl<'a> TabFields<'a> {
    pub fn split(line: &'a str) -> Self {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Self {
            fields: line.split('\t').collect(),
        }
    }

    /// Field at `index`, `None` if the line has fewer fields.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied()
    }

    pub fn taxon_id_field(&self) -> Option<&'a str> {
        self.get(TAXON_ID_FIELD)
    }

    /// Parses the taxon id column, see [`parse_digit_run`].
    pub fn taxon_id(&self) -> Option<TaxonId> {
        self.taxon_id_field().and_then(parse_digit_run)
    }
}

/// Parses the run of ASCII digits at the start of `field`, ignoring anything
/// after it. `None` if there is no digit or the value overflows `u64`.
pub fn parse_digit_run(field: &str) -> Option<u64> {
    let end = field
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(field.len());
    if end == 0 {
        return None;
    }
    field[..end].parse().ok()
}

/// Parses the decimal number at the start of `field` (`12`, `-3.5`, `4.`),
/// ignoring anything after it.
pub fn parse_decimal_prefix(field: &str) -> Option<f64> {
    let bytes = field.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        let frac_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        digits += end - frac_start;
    }
    if digits == 0 {
        return None;
    }
    field[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxon_id_field() {
        let fields = TabFields::split("C\tread_1\t562\t45\n");
        assert_eq!(fields.get(3), Some("45"));
        assert_eq!(fields.get(4), None);
        assert_eq!(fields.get(1), Some("read_1"));
        assert_eq!(fields.taxon_id_field(), Some("562"));
        assert_eq!(fields.taxon_id(), Some(562));
    }

    #[test]
    fn test_missing_and_trailing_fields() {
        assert_eq!(TabFields::split("C\tread_1").taxon_id_field(), None);
        // trailing tab yields an empty third field
        let fields = TabFields::split("C\tread_1\t");
        assert_eq!(fields.taxon_id_field(), Some(""));
        assert_eq!(fields.taxon_id(), None);
        assert_eq!(TabFields::split("U\tread_2\t0\r\n").taxon_id(), Some(0));
    }

    #[test]
    fn test_parse_digit_run() {
        assert_eq!(parse_digit_run("123"), Some(123));
        assert_eq!(parse_digit_run("123abc"), Some(123));
        assert_eq!(parse_digit_run("abc"), None);
        assert_eq!(parse_digit_run(""), None);
        assert_eq!(parse_digit_run("-5"), None);
        assert_eq!(parse_digit_run("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_decimal_prefix() {
        assert_eq!(parse_decimal_prefix("33.5"), Some(33.5));
        assert_eq!(parse_decimal_prefix("12"), Some(12.0));
        assert_eq!(parse_decimal_prefix("-2.25x"), Some(-2.25));
        assert_eq!(parse_decimal_prefix("4."), Some(4.0));
        assert_eq!(parse_decimal_prefix(".5"), Some(0.5));
        assert_eq!(parse_decimal_prefix("."), None);
        assert_eq!(parse_decimal_prefix("nan"), None);
        assert_eq!(parse_decimal_prefix(""), None);
    }
}
