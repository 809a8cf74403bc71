use super::common::*;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::products::domain::{NewProduct, ProductId, Rating};
use crate::products::repository::ProductRepository;
use crate::products::store::{JsonLinesProductRepository, LineSink};

fn new_product(name: &str, score: f64) -> NewProduct {
    NewProduct::new(
        {
            let mut product = submission();
            product.product_name = name.to_string();
            product
        },
        score,
        crate::products::rating_from_score(score),
        vec!["Improve circularity via design for repair/reuse/recycling".to_string()],
    )
}

#[test]
fn appends_survive_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("products.jsonl");

    {
        let store = JsonLinesProductRepository::open(&path).expect("store opens");
        let first = store.append(new_product("first", 90.0)).expect("append");
        let second = store.append(new_product("second", 60.0)).expect("append");
        assert_eq!(first.id, ProductId(1));
        assert_eq!(second.id, ProductId(2));
    }

    let reopened = JsonLinesProductRepository::open(&path).expect("store reopens");
    let all = reopened.list_all().expect("list");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].product_name, "first");
    assert_eq!(all[0].rating, Rating::A);
    assert_eq!(all[1].rating, Rating::C);
    assert_eq!(all[1].weight_grams, Some(120));

    let third = reopened.append(new_product("third", 40.0)).expect("append");
    assert_eq!(third.id, ProductId(3));
    let recent = reopened.list_recent(2).expect("recent");
    assert_eq!(recent[0].product_name, "third");
    assert_eq!(recent[1].product_name, "second");
}

#[test]
fn skips_malformed_lines() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("products.jsonl");

    {
        let store = JsonLinesProductRepository::open(&path).expect("store opens");
        store.append(new_product("kept", 75.0)).expect("append");
    }
    let mut contents = fs::read_to_string(&path).expect("read store");
    contents.push_str("{\"id\": 9, \"product_name\": \n\n");
    fs::write(&path, contents).expect("write store");

    let store = JsonLinesProductRepository::open(&path).expect("store reopens");
    let all = store.list_all().expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].product_name, "kept");
    assert_eq!(
        store.append(new_product("next", 75.0)).expect("append").id,
        ProductId(2)
    );
}

#[test]
fn unterminated_tail_does_not_swallow_the_next_append() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("products.jsonl");

    {
        let store = JsonLinesProductRepository::open(&path).expect("store opens");
        store.append(new_product("first", 80.0)).expect("append");
    }
    let mut contents = fs::read_to_string(&path).expect("read store");
    contents.push_str("{\"id\":2,\"product_na");
    fs::write(&path, contents).expect("write store");

    {
        let store = JsonLinesProductRepository::open(&path).expect("store reopens");
        let second = store.append(new_product("second", 80.0)).expect("append");
        assert_eq!(second.id, ProductId(2));
    }

    let reopened = JsonLinesProductRepository::open(&path).expect("store reopens");
    let names: Vec<_> = reopened
        .list_all()
        .expect("list")
        .into_iter()
        .map(|record| record.product_name)
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

/// In-memory sink whose writes land before the sync step can fail.
#[derive(Clone, Default)]
struct FlakySink {
    bytes: Arc<Mutex<Vec<u8>>>,
    fail_sync: Arc<AtomicBool>,
}

impl LineSink for FlakySink {
    fn committed_len(&self) -> io::Result<u64> {
        Ok(self.bytes.lock().expect("sink lock").len() as u64)
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        self.bytes.lock().expect("sink lock").extend_from_slice(line);
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "sync failed"));
        }
        Ok(())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.bytes.lock().expect("sink lock").truncate(len as usize);
        Ok(())
    }
}

#[test]
fn failed_append_is_rolled_back_and_its_id_retired() {
    let sink = FlakySink::default();
    let store = JsonLinesProductRepository::with_sink(
        PathBuf::from("unused.jsonl"),
        Box::new(sink.clone()),
        Vec::new(),
    );

    sink.fail_sync.store(true, Ordering::SeqCst);
    assert!(store.append(new_product("lost", 80.0)).is_err());
    assert!(sink.bytes.lock().expect("sink lock").is_empty());
    assert!(store.list_all().expect("list").is_empty());

    sink.fail_sync.store(false, Ordering::SeqCst);
    let kept = store.append(new_product("kept", 80.0)).expect("append");
    assert_eq!(kept.id, ProductId(2));

    let written = String::from_utf8(sink.bytes.lock().expect("sink lock").clone()).expect("utf8");
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(lines.len(), 1);
    let parsed: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
    assert_eq!(parsed["id"], serde_json::json!(2));
    assert_eq!(parsed["product_name"], serde_json::json!("kept"));
}

#[test]
fn records_are_written_one_per_line() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("products.jsonl");
    let store = JsonLinesProductRepository::open(&path).expect("store opens");
    store.append(new_product("a", 80.0)).expect("append");
    store.append(new_product("b", 80.0)).expect("append");

    let contents = fs::read_to_string(store.path()).expect("read store");
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    let parsed: serde_json::Value = serde_json::from_str(lines[1]).expect("json line");
    assert_eq!(parsed["id"], serde_json::json!(2));
    assert_eq!(parsed["rating"], serde_json::json!("B"));
    assert!(parsed["created_at"].as_str().is_some());
}

#[test]
fn memory_store_assigns_sequential_ids() {
    let store = crate::products::InMemoryProductRepository::default();
    let ids: Vec<_> = (0..3)
        .map(|index| {
            store
                .append(new_product(&format!("p{index}"), 50.0))
                .expect("append")
                .id
        })
        .collect();
    assert_eq!(ids, vec![ProductId(1), ProductId(2), ProductId(3)]);
    assert!(store.list_recent(0).expect("recent").is_empty());
}
