use std::cell::{Cell, RefCell};

use viva_ai::embeddings::Embedder;
use viva_ai::index::build_index;
use viva_ai::retrieve::{retrieve_chunks, retrieve_hits};
use viva_core::error::AppError;

/// Counts of `x` and `y`; checks the model and remembers the last input.
struct CountXyEmbedder {
    calls: Cell<usize>,
    last_input: RefCell<String>,
}

impl CountXyEmbedder {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
            last_input: RefCell::new(String::new()),
        }
    }
}

impl Embedder for CountXyEmbedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        assert_eq!(model, "mock-embed");
        self.calls.set(self.calls.get() + 1);
        *self.last_input.borrow_mut() = input.to_string();
        let x = input.chars().filter(|c| *c == 'x').count();
        let y = input.chars().filter(|c| *c == 'y').count();
        Ok(vec![x as f32, y as f32])
    }
}

/// Ten chunks; chunk `i` has `i` x's and `9 - i` y's.
fn ten_chunks() -> Vec<String> {
    (0..10)
        .map(|i| format!("{}{}", "x".repeat(i), "y".repeat(9 - i)))
        .collect()
}

#[test]
fn top_k_equal_to_len_returns_every_chunk_once_closest_first() {
    let chunks = ten_chunks();
    let embedder = CountXyEmbedder::new();
    let (index, _) = build_index(&chunks, &embedder, "mock-embed").expect("build");

    let hits = retrieve_hits("xxxxxxxxx", &index, &chunks, &embedder, chunks.len()).expect("retrieve");
    assert_eq!(hits.len(), 10);

    let mut positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
    assert_eq!(positions[0], 9);
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    positions.sort();
    assert_eq!(positions, (0..10).collect::<Vec<_>>());
    for h in &hits {
        assert_eq!(h.text, chunks[h.position]);
        assert_eq!(h.chunk_id, index.chunk_id(h.position).unwrap_or_default());
    }
}

#[test]
fn top_three_are_distinct_and_tie_break_by_position() {
    let chunks = ten_chunks();
    let embedder = CountXyEmbedder::new();
    let (index, _) = build_index(&chunks, &embedder, "mock-embed").expect("build");

    // Query [5, 0]: chunk 7 is at 8, chunks 6 and 8 tie at 10.
    let got = retrieve_chunks("xxxxx", &index, &chunks, &embedder, 3).expect("retrieve");
    assert_eq!(got, vec![chunks[7].clone(), chunks[6].clone(), chunks[8].clone()]);
}

#[test]
fn retrieval_is_deterministic() {
    let chunks = ten_chunks();
    let embedder = CountXyEmbedder::new();
    let (index, _) = build_index(&chunks, &embedder, "mock-embed").expect("build");

    let a = retrieve_hits("xy xy", &index, &chunks, &embedder, 4).expect("a");
    let b = retrieve_hits("xy xy", &index, &chunks, &embedder, 4).expect("b");
    assert_eq!(a, b);
}

#[test]
fn oversized_top_k_is_clamped() {
    let chunks = ten_chunks();
    let embedder = CountXyEmbedder::new();
    let (index, _) = build_index(&chunks, &embedder, "mock-embed").expect("build");

    let got = retrieve_chunks("x", &index, &chunks, &embedder, 100).expect("retrieve");
    assert_eq!(got.len(), 10);
}

#[test]
fn zero_top_k_returns_nothing_without_embedding() {
    let chunks = ten_chunks();
    let embedder = CountXyEmbedder::new();
    let (index, _) = build_index(&chunks, &embedder, "mock-embed").expect("build");
    let before = embedder.calls.get();

    let got = retrieve_chunks("x", &index, &chunks, &embedder, 0).expect("retrieve");
    assert!(got.is_empty());
    assert_eq!(embedder.calls.get(), before);
}

#[test]
fn blank_query_is_rejected() {
    let chunks = ten_chunks();
    let embedder = CountXyEmbedder::new();
    let (index, _) = build_index(&chunks, &embedder, "mock-embed").expect("build");

    let err = retrieve_chunks("   ", &index, &chunks, &embedder, 3).unwrap_err();
    assert_eq!(err.code, "AI_RETRIEVAL_FAILED");
}

#[test]
fn query_is_embedded_without_trimming() {
    let chunks = ten_chunks();
    let embedder = CountXyEmbedder::new();
    let (index, _) = build_index(&chunks, &embedder, "mock-embed").expect("build");

    let got = retrieve_chunks("  xxxxxyyyy  ", &index, &chunks, &embedder, 1).expect("retrieve");
    assert_eq!(embedder.last_input.borrow().as_str(), "  xxxxxyyyy  ");
    assert_eq!(got, vec![chunks[5].clone()]);
}

#[test]
fn positions_missing_from_chunk_slice_are_skipped() {
    let chunks = ten_chunks();
    let embedder = CountXyEmbedder::new();
    let (index, _) = build_index(&chunks, &embedder, "mock-embed").expect("build");

    let hits = retrieve_hits("xxxxxxxxx", &index, &chunks[..5], &embedder, 10).expect("retrieve");
    assert_eq!(hits.len(), 5);
    assert!(hits.iter().all(|h| h.position < 5));
}
