//! Top-K selection over per-item demand.

/// Ranks items by their most recent derived demand.
#[derive(Debug, Default, Copy, Clone)]
pub struct RankingEngine;

impl RankingEngine {
    /// The `k` highest-demand entries, descending by demand.
    ///
    /// Equal demands are ordered by key ascending, so the output does not
    /// depend on the iteration order of the input mapping. `k = 0` yields an
    /// empty ranking.
    pub fn top_k<K: Ord>(item_demand: impl IntoIterator<Item = (K, f64)>, k: usize) -> Vec<(K, f64)> {
        if k == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(K, f64)> = item_demand.into_iter().collect();
        ranked.sort_by(|(ka, da), (kb, db)| db.total_cmp(da).then_with(|| ka.cmp(kb)));
        ranked.truncate(k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, HashMap};

    fn demands() -> Vec<(&'static str, f64)> {
        vec![
            ("Gloves", 120.0),
            ("Syringe", 340.0),
            ("Bandages", 75.5),
            ("Gown", 210.0),
            ("Face Shield", 12.0),
            ("IV Drip", 99.0),
        ]
    }

    #[test]
    fn returns_top_k_descending() {
        let top = RankingEngine::top_k(demands(), 3);
        assert_eq!(top, vec![("Syringe", 340.0), ("Gown", 210.0), ("Gloves", 120.0)]);
    }

    #[test]
    fn k_zero_is_empty() {
        assert!(RankingEngine::top_k(demands(), 0).is_empty());
    }

    #[test]
    fn k_larger_than_input_returns_everything() {
        let top = RankingEngine::top_k(demands(), 50);
        assert_eq!(top.len(), 6);
        assert_eq!(top.last().unwrap().0, "Face Shield");
    }

    #[test]
    fn ties_break_by_key() {
        let input = vec![("b", 5.0), ("c", 5.0), ("a", 5.0), ("d", 1.0)];
        let top = RankingEngine::top_k(input, 3);
        assert_eq!(top, vec![("a", 5.0), ("b", 5.0), ("c", 5.0)]);
    }

    #[test]
    fn negative_demand_ranks_last() {
        let input = vec![("x", -10.0), ("y", 0.0), ("z", 3.0)];
        let top = RankingEngine::top_k(input, 3);
        assert_eq!(top.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec!["z", "y", "x"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the ranking is the same whether the mapping is iterated
        /// in sorted order, hash order, or reverse order.
        #[test]
        fn top_k_is_independent_of_input_order(
            entries in prop::collection::btree_map("[a-z]{1,6}", 0u32..50u32, 0..30),
            k in 0usize..40
        ) {
            let sorted: BTreeMap<String, f64> =
                entries.iter().map(|(name, d)| (name.clone(), f64::from(*d))).collect();
            let hashed: HashMap<String, f64> = sorted.clone().into_iter().collect();
            let mut reversed: Vec<(String, f64)> = sorted.clone().into_iter().collect();
            reversed.reverse();

            let a = RankingEngine::top_k(sorted.clone(), k);
            let b = RankingEngine::top_k(hashed, k);
            let c = RankingEngine::top_k(reversed, k);

            prop_assert_eq!(a.len(), k.min(sorted.len()));
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(&a, &c);
            for w in a.windows(2) {
                prop_assert!(w[0].1 >= w[1].1);
            }
        }
    }
}
