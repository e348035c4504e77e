use anyhow::Result;

use super::apriori::{FrequentItemsets, Itemset};
use super::encoder::EncodedTable;
use crate::error::RuleError;
use crate::models::rule::{ItemSet, Rule};

/// Derive association rules from frequent itemsets.
///
/// For each itemset of size >= 2, antecedents are enumerated from the
/// largest proper subset down to single items; the consequent is the
/// remainder. A rule is kept when its confidence reaches `min_confidence`.
pub fn generate_rules(
    table: &EncodedTable,
    frequent: &FrequentItemsets,
    min_confidence: f64,
) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();

    for (itemset, support) in frequent.iter().filter(|(set, _)| set.len() >= 2) {
        for size in (1..itemset.len()).rev() {
            for picked in combinations(itemset.len(), size) {
                let (antecedent, consequent) = split(itemset, &picked);

                let antecedent_support = subset_support(frequent, &antecedent)?;
                let confidence = support / antecedent_support;
                if confidence < min_confidence {
                    continue;
                }
                let consequent_support = subset_support(frequent, &consequent)?;

                rules.push(Rule {
                    antecedents: to_labels(table, &antecedent),
                    consequents: to_labels(table, &consequent),
                    support,
                    confidence,
                    lift: confidence / consequent_support,
                });
            }
        }
    }

    Ok(rules)
}

/// Every subset of a frequent itemset is frequent, so a missing or zero
/// support here means the mining step is broken.
fn subset_support(frequent: &FrequentItemsets, subset: &[u32]) -> Result<f64> {
    match frequent.support(subset) {
        Some(s) if s > 0.0 => Ok(s),
        _ => Err(RuleError::engine(format!(
            "Missing support for sub-itemset {subset:?} of a frequent itemset"
        ))
        .into()),
    }
}

fn split(itemset: &[u32], picked: &[usize]) -> (Itemset, Itemset) {
    let mut antecedent = Itemset::new();
    let mut consequent = Itemset::new();
    let mut next = picked.iter().peekable();
    for (i, &column) in itemset.iter().enumerate() {
        if next.peek() == Some(&&i) {
            next.next();
            antecedent.push(column);
        } else {
            consequent.push(column);
        }
    }
    (antecedent, consequent)
}

fn to_labels(table: &EncodedTable, columns: &[u32]) -> ItemSet {
    ItemSet::new(columns.iter().map(|&c| table.label(c)))
}

/// Index combinations of `r` out of `n`, in lexicographic order.
fn combinations(n: usize, r: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if r == 0 || r > n {
        return out;
    }
    let mut idx: Vec<usize> = (0..r).collect();
    loop {
        out.push(idx.clone());
        let Some(i) = (0..r).rev().find(|&i| idx[i] != i + n - r) else {
            return out;
        };
        idx[i] += 1;
        for j in i + 1..r {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::apriori::frequent_itemsets;

    #[test]
    fn combinations_in_lexicographic_order() {
        assert_eq!(
            combinations(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
        assert!(combinations(2, 3).is_empty());
        assert!(combinations(2, 0).is_empty());
    }

    #[test]
    fn split_partitions_itemset() {
        let (a, c) = split(&[3, 5, 8], &[0, 2]);
        assert_eq!(a.as_slice(), &[3, 8]);
        assert_eq!(c.as_slice(), &[5]);
    }

    #[test]
    fn larger_antecedents_come_first() {
        let data: Vec<Vec<String>> = vec![
            vec!["a".into(), "b".into(), "c".into()],
            vec!["a".into(), "b".into(), "c".into()],
        ];
        let table = EncodedTable::encode(&data);
        let frequent = frequent_itemsets(&table, 1.0);
        let rules = generate_rules(&table, &frequent, 1.0).unwrap();

        // 3 pairs x 2 rules + 1 triple x 6 rules
        assert_eq!(rules.len(), 12);
        let triple: Vec<_> = rules
            .iter()
            .filter(|r| r.antecedents.len() + r.consequents.len() == 3)
            .collect();
        assert_eq!(triple[0].antecedents, ItemSet::new(["a", "b"]));
        assert_eq!(triple[0].consequents, ItemSet::new(["c"]));
        assert_eq!(triple[5].antecedents, ItemSet::new(["c"]));
        assert_eq!(triple[5].consequents, ItemSet::new(["a", "b"]));
    }

    #[test]
    fn missing_subset_support_is_engine_error() {
        let frequent = FrequentItemsets::default();
        let err = subset_support(&frequent, &[0]).unwrap_err();
        assert_eq!(crate::error::classify(&err).0, crate::error::ErrorCode::EngineError);
    }
}
