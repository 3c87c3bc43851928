use insta::assert_snapshot;
use merkle_ring::{
    build_ring, render_ring, Chunk, HashAlgorithm, HashTreeError, MalformedReason, Ring,
    VisualOptions,
};
use proptest::prelude::*;

#[test]
fn serialized_text_format() {
    let ring = build_ring(["state1", "state2"], None).expect("ring");
    assert_snapshot!(ring.serialize(), @r###"
    [[nodes]]
    data = "state1"
    hash = "68e170118d612b10832d991801c33ff921f470e2e057581d11652723e37f3b7f"
    next_hash = "0c7e4bc57ad2b7d41133091f979ebe92b79db0df7baf8c5c69e589ea2b80f726"
    [[nodes]]
    data = "state2"
    hash = "0c7e4bc57ad2b7d41133091f979ebe92b79db0df7baf8c5c69e589ea2b80f726"
    next_hash = "68e170118d612b10832d991801c33ff921f470e2e057581d11652723e37f3b7f"
    "###);
}

#[test]
fn ring_dump_format() {
    let ring = build_ring(["state1", "state2"], None).expect("ring");
    assert_snapshot!(render_ring(&ring, &VisualOptions::default()), @r###"
    Node(Data: state1, Hash: 68e170, Next Hash: 0c7e4b)
    Node(Data: state2, Hash: 0c7e4b, Next Hash: 68e170)
    "###);
}

#[test]
fn ring_closes_after_n_links() {
    let ring = build_ring((0..7).map(|i| format!("state{i}")), Some(HashAlgorithm::Blake3)).unwrap();
    let mut position = 3;
    for _ in 0..ring.len() {
        position = ring.follow_link(position).expect("link");
    }
    assert_eq!(position, 3);
    assert!(ring.is_linked());
}

#[test]
fn escaped_text_survives_reload() {
    let ring = build_ring(["line\nbreak", "quote \" and \\ slash", "tab\t"], None).unwrap();
    let text = ring.serialize();
    assert!(text.contains(r#"data = "line\nbreak""#));
    let reloaded = Ring::deserialize(&text, HashAlgorithm::Sha256).unwrap();
    assert_eq!(reloaded, ring);
}

#[test]
fn forged_digests_are_recomputed() {
    let ring = build_ring(["a", "b"], None).unwrap();
    let forged = ring
        .serialize()
        .replace(&ring.nodes()[0].digest().to_hex().to_string(), &"00".repeat(32));
    let reloaded = Ring::deserialize(&forged, HashAlgorithm::Sha256).unwrap();
    assert_eq!(reloaded, ring);
}

#[test]
fn hand_written_records_need_only_data() {
    let text = "# saved ring\n[[nodes]]\ndata = \"state1\"\n\n[[nodes]]\ndata = \"state2\"\n";
    let ring = Ring::deserialize(text, HashAlgorithm::Sha256).unwrap();
    assert_eq!(ring, build_ring(["state1", "state2"], None).unwrap());
}

#[test]
fn malformed_records_report_their_position() {
    let cases = [
        ("[[nodes]]\ndata = \"a\"\n[[nodes]]\nhash = \"ff\"\n", 1, MalformedReason::MissingData),
        ("[[nodes]]\ndata = \"a\n", 0, MalformedReason::UnterminatedString),
        ("[[nodes]]\ndata = \"a\\x\"\n", 0, MalformedReason::InvalidEscape),
        (
            "[[nodes]]\ndata = \"a\"\n[[nodes]]\nencoding = \"hex\"\ndata = \"zz\"\n",
            1,
            MalformedReason::InvalidHex,
        ),
    ];
    for (text, expected_record, expected_reason) in cases {
        match Ring::deserialize(text, HashAlgorithm::Sha256).unwrap_err() {
            HashTreeError::MalformedRing { record, reason } => {
                assert_eq!(record, expected_record, "{text:?}");
                assert_eq!(reason, expected_reason, "{text:?}");
            }
            other => panic!("unexpected error for {text:?}: {other}"),
        }
    }
}

#[test]
fn save_and_load_through_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ring.toml");
    let ring = build_ring(
        [Chunk::from("text"), Chunk::from(vec![7u8, 8, 9]), Chunk::from(vec![1.5f32])],
        Some(HashAlgorithm::Sha3_256),
    )
    .unwrap();
    ring.save(&path).unwrap();
    let loaded = Ring::load(&path, HashAlgorithm::Sha3_256).unwrap();
    assert_eq!(loaded.len(), 3);
    for (a, b) in loaded.nodes().iter().zip(ring.nodes()) {
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.next_digest(), b.next_digest());
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Ring::load(dir.path().join("absent.toml"), HashAlgorithm::Sha256).unwrap_err();
    assert!(matches!(err, HashTreeError::Io(_)));
}

proptest! {
    #[test]
    fn text_rings_roundtrip(items in prop::collection::vec(any::<String>(), 1..12)) {
        let ring = build_ring(items, None).unwrap();
        let reloaded = Ring::deserialize(&ring.serialize(), HashAlgorithm::Sha256).unwrap();
        prop_assert_eq!(reloaded, ring);
    }

    #[test]
    fn byte_rings_keep_their_digests(items in prop::collection::vec(any::<Vec<u8>>(), 1..12)) {
        let ring = build_ring(items, Some(HashAlgorithm::Blake2s256)).unwrap();
        let reloaded = Ring::deserialize(&ring.serialize(), HashAlgorithm::Blake2s256).unwrap();
        prop_assert_eq!(reloaded, ring);
    }
}
