pub mod apriori;
pub mod encoder;
pub mod rules;

use anyhow::Result;
use tracing::debug;

use crate::models::rule::{MiningParams, Rule};
use crate::models::transaction::Transaction;
use encoder::EncodedTable;

/// Mine association rules from `transactions`.
///
/// Empty transactions are ignored. Fewer than two remaining transactions, no
/// frequent single item, or no rule above the confidence threshold all give
/// an empty result; only invalid thresholds or an internal inconsistency are
/// errors.
pub fn mine(transactions: &[Transaction], params: &MiningParams) -> Result<Vec<Rule>> {
    params.validate()?;

    let valid: Vec<&Transaction> = transactions.iter().filter(|t| !t.is_empty()).collect();
    if valid.len() < 2 {
        debug!(transactions = valid.len(), "too few transactions to mine");
        return Ok(Vec::new());
    }

    let table = EncodedTable::encode(&valid);
    debug!(
        transactions = table.num_rows(),
        items = table.num_items(),
        "transactions encoded"
    );

    let frequent = apriori::frequent_itemsets(&table, params.min_support);
    if frequent.is_empty() {
        debug!(min_support = params.min_support, "no frequent itemsets");
        return Ok(Vec::new());
    }
    debug!(itemsets = frequent.len(), "frequent itemsets found");

    let rules = rules::generate_rules(&table, &frequent, params.min_confidence)?;
    debug!(rules = rules.len(), "rules generated");
    Ok(rules)
}
