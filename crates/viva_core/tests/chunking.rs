use viva_core::chunking::{char_suffix, chunk_text, normalize_text, split_segments, ChunkingConfig};

fn sentence(tag: char, len: usize) -> String {
    // Capitalised so that ". " + sentence is a sentence boundary.
    let mut s = String::from("S");
    s.push_str(&tag.to_string().repeat(len - 1));
    s
}

fn paper_text(count: usize, len: usize) -> String {
    let tags = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l'];
    (0..count)
        .map(|i| sentence(tags[i % tags.len()], len))
        .collect::<Vec<_>>()
        .join(". ")
}

#[test]
fn short_noise_segment_is_dropped_and_long_segment_is_one_chunk() {
    let text = format!("{}. {}", "A".repeat(50), "B".repeat(100));
    let chunks = chunk_text(&text, &ChunkingConfig::default());
    assert_eq!(chunks, vec!["B".repeat(100)]);
}

#[test]
fn text_without_qualifying_segments_yields_no_chunks() {
    let cfg = ChunkingConfig::default();
    assert!(chunk_text("", &cfg).is_empty());
    assert!(chunk_text("   \n\n  ", &cfg).is_empty());
    assert!(chunk_text("Too short. Also short. Still short.", &cfg).is_empty());
}

#[test]
fn oversized_single_segment_is_emitted_whole() {
    let long = "x".repeat(2_000);
    let chunks = chunk_text(&long, &ChunkingConfig::default());
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chars().count(), 2_000);
}

#[test]
fn every_chunk_after_the_first_starts_with_predecessor_tail() {
    let cfg = ChunkingConfig::default();
    let chunks = chunk_text(&paper_text(40, 200), &cfg);
    assert!(chunks.len() > 2, "expected several chunks, got {}", chunks.len());

    for pair in chunks.windows(2) {
        let tail = char_suffix(&pair[0], cfg.overlap);
        assert_eq!(tail.chars().count(), cfg.overlap);
        assert!(pair[1].starts_with(tail));
    }
}

#[test]
fn pre_overlap_content_never_exceeds_max() {
    let cfg = ChunkingConfig {
        max_chunk_size: 500,
        overlap: 60,
        min_segment_chars: 80,
    };
    let chunks = chunk_text(&paper_text(60, 130), &cfg);
    assert!(!chunks.is_empty());

    assert!(chunks[0].chars().count() <= cfg.max_chunk_size);
    for pair in chunks.windows(2) {
        let tail = char_suffix(&pair[0], cfg.overlap);
        let rest = &pair[1][tail.len()..];
        assert!(
            rest.trim_start().chars().count() <= cfg.max_chunk_size,
            "chunk body too long: {}",
            rest.chars().count()
        );
    }
}

#[test]
fn short_segments_never_appear_as_standalone_chunks() {
    let text = format!(
        "{}. Tiny bit. {}. Another tiny. {}",
        sentence('a', 120),
        sentence('b', 120),
        sentence('c', 120)
    );
    let chunks = chunk_text(&text, &ChunkingConfig::default());
    assert_eq!(chunks.len(), 1);
    assert!(!chunks[0].contains("Tiny bit"));
    assert!(!chunks[0].contains("Another tiny"));
}

#[test]
fn whitespace_is_normalized_before_splitting() {
    assert_eq!(normalize_text("  a\n\n b\t\tc  "), "a b c");

    let text = format!("{}.\n\n   {}", sentence('a', 100), sentence('b', 100));
    let chunks = chunk_text(&text, &ChunkingConfig::default());
    assert_eq!(chunks, vec![format!("{} {}", sentence('a', 100), sentence('b', 100))]);
}

#[test]
fn zero_overlap_starts_fresh_chunks() {
    let cfg = ChunkingConfig {
        max_chunk_size: 150,
        overlap: 0,
        min_segment_chars: 80,
    };
    let text = format!("{}. {}", sentence('a', 100), sentence('b', 100));
    let chunks = chunk_text(&text, &cfg);
    assert_eq!(chunks, vec![sentence('a', 100), sentence('b', 100)]);
}

#[test]
fn multibyte_text_is_measured_in_characters() {
    let cfg = ChunkingConfig {
        max_chunk_size: 200,
        overlap: 20,
        min_segment_chars: 80,
    };
    let seg_a = format!("Ä{}", "é".repeat(119));
    // Sentence boundaries only recognise ASCII capitals.
    let seg_b = format!("O{}", "ü".repeat(119));
    let text = format!("{seg_a}. {seg_b}");
    let chunks = chunk_text(&text, &cfg);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], seg_a);
    assert_eq!(chunks[1], format!("{} {seg_b}", "é".repeat(20)));
}

#[test]
fn config_validation_rejects_overlap_not_smaller_than_max() {
    let bad = ChunkingConfig {
        max_chunk_size: 100,
        overlap: 100,
        min_segment_chars: 80,
    };
    assert_eq!(bad.validate().unwrap_err().code, "CONFIG_INVALID");

    let zero = ChunkingConfig {
        max_chunk_size: 0,
        overlap: 0,
        min_segment_chars: 80,
    };
    assert!(zero.validate().is_err());
    assert!(ChunkingConfig::default().validate().is_ok());
}

#[test]
fn sentence_split_requires_capital_after_whitespace() {
    assert_eq!(split_segments("e.g. the model"), vec!["e.g. the model"]);
    assert_eq!(split_segments("end. Next"), vec!["end", "Next"]);
}
