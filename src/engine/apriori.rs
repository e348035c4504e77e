use ahash::AHashMap;
use rayon::prelude::*;
use smallvec::SmallVec;

use super::encoder::EncodedTable;

/// Column indices of an itemset, ascending.
pub type Itemset = SmallVec<[u32; 4]>;

/// Frequent itemsets in discovery order (by size, then lexicographically by
/// column) together with a support lookup.
#[derive(Debug, Default)]
pub struct FrequentItemsets {
    ordered: Vec<(Itemset, f64)>,
    supports: AHashMap<Itemset, f64>,
}

impl FrequentItemsets {
    pub fn iter(&self) -> impl Iterator<Item = (&[u32], f64)> {
        self.ordered.iter().map(|(set, s)| (set.as_slice(), *s))
    }

    pub fn support(&self, itemset: &[u32]) -> Option<f64> {
        self.supports.get(itemset).copied()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    fn insert_level(&mut self, level: &[(Itemset, f64)]) {
        for (set, support) in level {
            self.supports.insert(set.clone(), *support);
            self.ordered.push((set.clone(), *support));
        }
    }
}

/// Level-wise Apriori: grow itemsets one item at a time, keeping those whose
/// support reaches `min_support`.
pub fn frequent_itemsets(table: &EncodedTable, min_support: f64) -> FrequentItemsets {
    let mut frequent = FrequentItemsets::default();

    let singles: Vec<Itemset> = (0..table.num_items() as u32)
        .map(|c| SmallVec::from_slice(&[c]))
        .collect();
    let mut level = count_level(table, singles, min_support);

    while !level.is_empty() {
        frequent.insert_level(&level);
        let sets: Vec<Itemset> = level.into_iter().map(|(set, _)| set).collect();
        let candidates = generate_candidates(&sets, &frequent);
        level = count_level(table, candidates, min_support);
    }

    frequent
}

fn count_level(
    table: &EncodedTable,
    candidates: Vec<Itemset>,
    min_support: f64,
) -> Vec<(Itemset, f64)> {
    candidates
        .into_par_iter()
        .map(|set| {
            let support = table.support(&set);
            (set, support)
        })
        .filter(|(_, support)| *support >= min_support)
        .collect()
}

/// Join itemsets that share all but their last item, dropping any candidate
/// with an infrequent subset. `level` must be sorted lexicographically.
fn generate_candidates(level: &[Itemset], frequent: &FrequentItemsets) -> Vec<Itemset> {
    let mut candidates = Vec::new();
    for (i, a) in level.iter().enumerate() {
        let k = a.len();
        for b in &level[i + 1..] {
            if a[..k - 1] != b[..k - 1] {
                break;
            }
            let mut candidate = a.clone();
            candidate.push(b[k - 1]);
            if all_subsets_frequent(&candidate, frequent) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

fn all_subsets_frequent(candidate: &[u32], frequent: &FrequentItemsets) -> bool {
    (0..candidate.len()).all(|skip| {
        let subset: Itemset = candidate
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip)
            .map(|(_, &c)| c)
            .collect();
        frequent.support(&subset).is_some()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sets(frequent: &FrequentItemsets) -> Vec<Vec<u32>> {
        frequent.iter().map(|(s, _)| s.to_vec()).collect()
    }

    #[test]
    fn tajwid_example_levels() {
        let table = EncodedTable::encode(&[
            tx(&["ikhfa", "qalqalah"]),
            tx(&["ikhfa", "mad"]),
            tx(&["ikhfa", "qalqalah", "mad"]),
        ]);
        // ikhfa=0, mad=1, qalqalah=2
        let frequent = frequent_itemsets(&table, 0.6);
        assert_eq!(sets(&frequent), vec![vec![0], vec![1], vec![2], vec![0, 1], vec![0, 2]]);
        assert_eq!(frequent.support(&[0]), Some(1.0));
        assert_eq!(frequent.support(&[1, 2]), None);
    }

    #[test]
    fn nothing_frequent_above_threshold() {
        let table = EncodedTable::encode(&[tx(&["a"]), tx(&["b"]), tx(&["c"])]);
        assert!(frequent_itemsets(&table, 0.5).is_empty());
    }

    #[test]
    fn support_equal_to_threshold_is_frequent() {
        let table = EncodedTable::encode(&[tx(&["a", "b"]), tx(&["a"])]);
        let frequent = frequent_itemsets(&table, 0.5);
        assert_eq!(frequent.support(&[0, 1]), Some(0.5));
    }

    #[test]
    fn grows_to_triples() {
        let table = EncodedTable::encode(&[
            tx(&["a", "b", "c"]),
            tx(&["a", "b", "c"]),
            tx(&["a", "b"]),
            tx(&["d"]),
        ]);
        let frequent = frequent_itemsets(&table, 0.5);
        assert_eq!(frequent.support(&[0, 1, 2]), Some(0.5));
        assert_eq!(frequent.support(&[3]), None);
        assert_eq!(frequent.len(), 7);
    }

    #[test]
    fn candidate_with_infrequent_subset_is_pruned() {
        // {a,b} and {a,c} frequent but {b,c} is not, so {a,b,c} is never counted.
        let mut frequent = FrequentItemsets::default();
        let level: Vec<(Itemset, f64)> = vec![
            (SmallVec::from_slice(&[0, 1]), 0.5),
            (SmallVec::from_slice(&[0, 2]), 0.5),
        ];
        frequent.insert_level(&level);
        let sets: Vec<Itemset> = level.into_iter().map(|(s, _)| s).collect();
        assert!(generate_candidates(&sets, &frequent).is_empty());
    }
}
