use ahash::AHashMap;
use std::collections::BTreeSet;

/// Boolean item-presence table: one row per transaction, one column per
/// distinct label.
///
/// Columns follow the lexicographic order of the labels so that the same
/// input always produces the same table.
#[derive(Debug, Clone)]
pub struct EncodedTable {
    items: Vec<String>,
    rows: Vec<Vec<bool>>,
}

impl EncodedTable {
    pub fn encode<T: AsRef<[String]>>(transactions: &[T]) -> Self {
        let universe: BTreeSet<&str> = transactions
            .iter()
            .flat_map(|t| t.as_ref().iter().map(String::as_str))
            .collect();
        let items: Vec<String> = universe.into_iter().map(str::to_string).collect();
        let column: AHashMap<&str, usize> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.as_str(), i))
            .collect();

        let rows = transactions
            .iter()
            .map(|t| {
                let mut row = vec![false; items.len()];
                for item in t.as_ref() {
                    if let Some(&col) = column.get(item.as_str()) {
                        row[col] = true;
                    }
                }
                row
            })
            .collect();

        Self { items, rows }
    }

    /// Distinct labels, in column order.
    #[cfg(test)]
    fn items(&self) -> &[String] {
        &self.items
    }

    pub fn label(&self, column: u32) -> &str {
        &self.items[column as usize]
    }

    #[cfg(test)]
    fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Fraction of rows in which every column of `itemset` is present.
    pub fn support(&self, itemset: &[u32]) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let hits = self
            .rows
            .iter()
            .filter(|row| itemset.iter().all(|&c| row[c as usize]))
            .count();
        hits as f64 / self.rows.len() as f64
    }
}
