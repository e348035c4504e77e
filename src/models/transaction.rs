use anyhow::{Result, bail};

use crate::error::RuleError;

/// One observed co-occurrence event: the labels that appeared together.
///
/// Position in the dataset is the only identity a transaction has.
pub type Transaction = Vec<String>;

/// Trim every label and drop the ones left empty.
///
/// Fails with `VALIDATION_ERROR` when nothing survives, so a stored
/// transaction is never empty.
pub fn normalize_items<S: AsRef<str>>(raw: &[S]) -> Result<Transaction> {
    let items: Transaction = raw
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        bail!(RuleError::validation("Transaction must not be empty"));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, classify};

    #[test]
    fn trims_and_drops_blank_labels() {
        let items = normalize_items(&["  ikhfa ", "", "   ", "mad"]).unwrap();
        assert_eq!(items, vec!["ikhfa", "mad"]);
    }

    #[test]
    fn keeps_duplicates() {
        let items = normalize_items(&["mad", "mad"]).unwrap();
        assert_eq!(items, vec!["mad", "mad"]);
    }

    #[test]
    fn all_blank_is_rejected() {
        let err = normalize_items(&[" ", ""]).unwrap_err();
        assert_eq!(classify(&err).0, ErrorCode::ValidationError);
    }

    #[test]
    fn empty_input_is_rejected() {
        let empty: [&str; 0] = [];
        assert!(normalize_items(&empty).is_err());
    }
}
