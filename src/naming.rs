//! Constraint naming.
//!
//! Foreign key names are derived from a hash of the owning table and its
//! columns, so the same mapping always produces the same name.

use md5::{Digest, Md5};

const BASE35_DIGITS: &[u8; 35] = b"0123456789abcdefghijklmnopqrstuvwxy";

/// Name of the foreign key over `columns` of `table`
///
/// The name is `FK_` followed by the base-35 MD5 of
/// ``table`<table>`column`<c1>`column`<c2>` ``, columns sorted by name.
pub fn foreign_key_name(table: &str, columns: &[String]) -> String {
    let mut sorted: Vec<&str> = columns.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut key = format!("table`{}`", table);
    for column in sorted {
        key.push_str("column`");
        key.push_str(column);
        key.push('`');
    }
    format!("FK_{}", hashed_name(&key))
}

/// Base-35 rendering of the MD5 digest of `input`
pub fn hashed_name(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    let mut digest = [0u8; 16];
    digest.copy_from_slice(&hasher.finalize());
    to_base35(u128::from_be_bytes(digest))
}

fn to_base35(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(25);
    while value > 0 {
        digits.push(BASE35_DIGITS[(value % 35) as usize]);
        value /= 35;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_foreign_key_name() {
        assert_eq!(
            foreign_key_name("FooBar_AUD", &["REV".to_string()]),
            "FK_hq6lvb9twe0idlwiwq4locy79"
        );
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let a = foreign_key_name("Line", &["order_id".to_string(), "item_id".to_string()]);
        let b = foreign_key_name("Line", &["item_id".to_string(), "order_id".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_base35() {
        assert_eq!(to_base35(0), "0");
        assert_eq!(to_base35(34), "y");
        assert_eq!(to_base35(35), "10");
    }
}
