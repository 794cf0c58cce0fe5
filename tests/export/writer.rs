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


use serde_json::json;
use tempfile::TempDir;
use touchlink::dataset::{TlDataset, TlNamespace};
use touchlink::export::{compute_file_hash, TlResultIndex, TlResultWriter, INDEX_FILE_NAME};
use touchlink::errors::TlError;

fn namespace() -> TlNamespace {
    let mut namespace = TlNamespace::new();
    namespace.insert(
        "summary".to_string(),
        TlDataset::from_records(&[
            json!({"region": "A", "total": 30, "tags": ["x"]}),
            json!({"region": "B, north", "total": null, "tags": []}),
        ])
        .unwrap(),
    );
    namespace.insert(
        "raw/data".to_string(),
        TlDataset::from_records(&[json!({"v": 1.5})]).unwrap(),
    );
    namespace.insert(
        "raw data".to_string(),
        TlDataset::from_records(&[json!({"v": true})]).unwrap(),
    );
    namespace
}

#[test]
fn writes_one_csv_per_dataset_and_an_index() {
    let dir = TempDir::new().unwrap();
    let writer = TlResultWriter::new(dir.path());
    let out = writer.save(&namespace(), "task-1").unwrap();

    assert_eq!(out, dir.path().join("task-1"));
    assert!(out.join(INDEX_FILE_NAME).is_file());

    let summary = std::fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary, "region,total,tags\nA,30,\"[\"\"x\"\"]\"\n\"B, north\",,[]\n");
}

#[test]
fn index_describes_every_file() {
    let dir = TempDir::new().unwrap();
    let out = TlResultWriter::new(dir.path())
        .save(&namespace(), "task-2")
        .unwrap();

    let index = TlResultIndex::load(&out).unwrap();
    assert_eq!(index.task_id, "task-2");
    assert!(!index.timestamp.is_empty());
    assert_eq!(index.files.len(), 3);
    assert_eq!(index.total_rows(), 4);

    let names: Vec<&str> = index.datasets.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, vec!["raw data", "raw/data", "summary"]);

    // colliding sanitized names get a counter
    assert!(index.files["raw data"].ends_with("raw_data.csv"));
    assert!(index.files["raw/data"].ends_with("raw_data_2.csv"));

    for file in &index.datasets {
        assert_eq!(compute_file_hash(&file.path).unwrap(), file.hash);
        assert_eq!(std::fs::metadata(&file.path).unwrap().len(), file.size);
    }
    let summary = index.datasets.iter().find(|file| file.name == "summary").unwrap();
    assert_eq!(summary.columns, vec!["region", "total", "tags"]);
    assert_eq!(summary.rows, 2);
    assert_eq!(index.total_size(), index.datasets.iter().map(|f| f.size).sum::<u64>());
}

#[test]
fn task_ids_cannot_escape_the_results_dir() {
    let dir = TempDir::new().unwrap();
    let out = TlResultWriter::new(dir.path())
        .save(&TlNamespace::new(), "../outside")
        .unwrap();
    assert!(out.starts_with(dir.path()));

    let index = TlResultIndex::load(out.join(INDEX_FILE_NAME)).unwrap();
    assert!(index.datasets.is_empty());
    assert_eq!(index.task_id, "../outside");
}

#[test]
fn index_json_round_trips() {
    let dir = TempDir::new().unwrap();
    let out = TlResultWriter::new(dir.path()).save(&namespace(), "t").unwrap();
    let index = TlResultIndex::load(&out).unwrap();
    assert_eq!(TlResultIndex::from_json(&index.to_json().unwrap()).unwrap(), index);
    assert!(TlResultIndex::from_json("{").is_err());
}

#[test]
fn hash_changes_with_content() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    std::fs::write(&a, "one").unwrap();
    std::fs::write(&b, "two").unwrap();
    let hash = compute_file_hash(&a).unwrap();
    assert_eq!(hash.len(), 64);
    assert_ne!(hash, compute_file_hash(&b).unwrap());
    assert_eq!(hash, blake3::hash(b"one").to_hex().to_string());
}

#[test]
fn hash_streams_large_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.csv");
    let body: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, &body).unwrap();

    assert_eq!(compute_file_hash(&path).unwrap(), blake3::hash(&body).to_hex().to_string());
    assert!(matches!(
        compute_file_hash(dir.path().join("absent.csv")).unwrap_err(),
        TlError::Io(_)
    ));
}
