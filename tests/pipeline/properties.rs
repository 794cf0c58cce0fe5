//! Copyright © 2025-2026 Touchlink Team. All Rights Reserved.
//!
//! This file is part of Touchlink.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.


use proptest::prelude::*;
use serde_json::{json, Value};
use touchlink::dataset::{TlDataset, TlNamespace};
use touchlink::pipeline::TlPipeline;

fn namespace(keys: &[Option<i64>]) -> TlNamespace {
    let rows: Vec<Value> = keys
        .iter()
        .enumerate()
        .map(|(seq, key)| json!({"seq": seq, "k": key}))
        .collect();
    let mut namespace = TlNamespace::new();
    let dataset = if rows.is_empty() {
        TlDataset::new(vec!["seq".into(), "k".into()])
    } else {
        TlDataset::from_records(&rows).unwrap()
    };
    namespace.insert("t".to_string(), dataset);
    namespace
}

fn run(namespace: &TlNamespace, operator: &str, params: Value) -> TlDataset {
    let mut pipeline = TlPipeline::new(None, None);
    pipeline.add_step(operator, params).unwrap();
    let mut result = pipeline.execute(namespace).unwrap();
    result.remove("out").unwrap()
}

fn column(dataset: &TlDataset, name: &str) -> Vec<Value> {
    let index = dataset.column_index(name).unwrap();
    dataset.column_values(index).cloned().collect()
}

proptest! {
    #[test]
    fn sort_is_a_stable_permutation_with_nulls_last(
        keys in prop::collection::vec(prop::option::of(-5i64..5), 0..40),
        ascending in any::<bool>()
    ) {
        let ns = namespace(&keys);
        let sorted = run(&ns, "sort", json!({
            "dataset_name": "t",
            "sort_by": [{"column": "k", "ascending": ascending}],
            "output_name": "out"
        }));

        prop_assert_eq!(sorted.len(), keys.len());
        let seqs: Vec<u64> = column(&sorted, "seq").iter().map(|v| v.as_u64().unwrap()).collect();
        let mut unique = seqs.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(unique.len(), keys.len());

        let ks = column(&sorted, "k");
        let first_null = ks.iter().position(Value::is_null).unwrap_or(ks.len());
        prop_assert!(ks[first_null..].iter().all(Value::is_null));

        for i in 1..first_null {
            let (prev, next) = (ks[i - 1].as_i64().unwrap(), ks[i].as_i64().unwrap());
            if ascending {
                prop_assert!(prev <= next);
            } else {
                prop_assert!(prev >= next);
            }
            if prev == next {
                prop_assert!(seqs[i - 1] < seqs[i]);
            }
        }
        for i in first_null + 1..ks.len() {
            prop_assert!(seqs[i - 1] < seqs[i]);
        }
    }

    #[test]
    fn filter_keeps_exactly_the_matching_rows_in_order(
        keys in prop::collection::vec(prop::option::of(-5i64..5), 0..40),
        threshold in -5i64..5
    ) {
        let ns = namespace(&keys);
        let filtered = run(&ns, "filter", json!({
            "dataset_name": "t",
            "conditions": [{"column": "k", "operator": "ge", "value": threshold}],
            "output_name": "out"
        }));

        let expected: Vec<u64> = keys
            .iter()
            .enumerate()
            .filter(|(_, key)| matches!(key, Some(k) if *k >= threshold))
            .map(|(seq, _)| seq as u64)
            .collect();
        let actual: Vec<u64> = column(&filtered, "seq").iter().map(|v| v.as_u64().unwrap()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn group_counts_cover_every_non_null_key(
        keys in prop::collection::vec(prop::option::of(0i64..6), 0..40)
    ) {
        let ns = namespace(&keys);
        let grouped = run(&ns, "aggregate", json!({
            "dataset_name": "t",
            "group_by": ["k"],
            "aggregations": [{"column": "seq", "function": "count", "alias": "n"}],
            "output_name": "out"
        }));

        let total: u64 = column(&grouped, "n").iter().map(|v| v.as_u64().unwrap()).sum();
        prop_assert_eq!(total as usize, keys.iter().filter(|k| k.is_some()).count());

        let group_keys: Vec<i64> = column(&grouped, "k").iter().map(|v| v.as_i64().unwrap()).collect();
        prop_assert!(group_keys.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
