use std::path::Path;
use trustynp::consts::XSD_STRING;
use trustynp::trusty::{artifact_code, serialize_quad, verify};
use trustynp::util::read_file;
use trustynp::{
    trusty_hash, trusty_hash_with_order, HashOrder, Literal, NamedNode, Quad, Term, TrustyHasher,
};

const HELLO_HASH: &str = "RAOWLyvXF9cuzb-QVUySBOKj_WR6LTR-KRfm8KTJr2oOQ";

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn quad(s: &str, p: &str, o: Term, g: Option<&str>) -> Quad {
    Quad::new(
        Term::named(s).unwrap(),
        NamedNode::new(p).unwrap(),
        o,
        g.map(|g| Term::named(g).unwrap()),
    )
    .unwrap()
}

fn hello() -> Quad {
    quad(
        "http://example.org/a",
        "http://example.org/b",
        Term::literal("hello"),
        None,
    )
}

#[test]
fn test_conformance_vector_from_file() {
    let (quads, _) = read_file(&fixture("hello.nq")).unwrap();
    assert_eq!(quads, vec![hello()]);
    assert_eq!(trusty_hash(&quads), HELLO_HASH);
}

#[test]
fn test_hash_is_deterministic() {
    let (quads, _) = read_file(&fixture("mosquito.trig")).unwrap();
    let first = trusty_hash(&quads);
    for _ in 0..3 {
        assert_eq!(trusty_hash(&quads), first);
    }
    let (again, _) = read_file(&fixture("mosquito.trig")).unwrap();
    assert_eq!(trusty_hash(&again), first);
    assert!(first.starts_with("RA"));
    assert_eq!(first.len(), 45);
    assert_eq!(artifact_code(&first), Some(first.as_str()));
}

#[test]
fn test_hash_is_sensitive_to_every_position() {
    let base = trusty_hash([&hello()]);
    let variants = vec![
        quad("http://example.org/x", "http://example.org/b", Term::literal("hello"), None),
        quad("http://example.org/a", "http://example.org/x", Term::literal("hello"), None),
        quad("http://example.org/a", "http://example.org/b", Term::literal("hullo"), None),
        quad(
            "http://example.org/a",
            "http://example.org/b",
            Term::literal("hello"),
            Some("http://example.org/g"),
        ),
        quad(
            "http://example.org/a",
            "http://example.org/b",
            Literal::new_language_tagged("hello", "en").unwrap().into(),
            None,
        ),
        quad(
            "http://example.org/a",
            "http://example.org/b",
            Literal::new_typed("hello", "http://example.org/dt").unwrap().into(),
            None,
        ),
        quad(
            "http://example.org/a",
            "http://example.org/b",
            Term::named("hello").unwrap(),
            None,
        ),
        Quad::new(
            Term::blank("a").unwrap(),
            NamedNode::new("http://example.org/b").unwrap(),
            Term::literal("hello"),
            None,
        )
        .unwrap(),
    ];
    let mut seen = std::collections::HashSet::new();
    seen.insert(base);
    for variant in &variants {
        assert!(seen.insert(trusty_hash([variant])), "collision for {}", variant);
    }
}

#[test]
fn test_explicit_string_datatype_is_plain() {
    let typed = quad(
        "http://example.org/a",
        "http://example.org/b",
        Literal::new_typed("hello", XSD_STRING).unwrap().into(),
        None,
    );
    assert_eq!(trusty_hash([&typed]), HELLO_HASH);
}

#[test]
fn test_escaping() {
    let tricky = quad(
        "http://example.org/a",
        "http://example.org/b",
        Term::literal("line one\nback\\slash"),
        None,
    );
    let text = serialize_quad(&tricky);
    assert!(text.contains("line one\\nback\\\\slash\n"));
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn test_adjacent_duplicate_collapsing() {
    let q = hello();
    let r = quad(
        "http://example.org/a",
        "http://example.org/b",
        Term::literal("world"),
        None,
    );
    assert_eq!(trusty_hash([&q, &q]), trusty_hash([&q]));
    assert_eq!(trusty_hash([&q, &q, &q, &r, &r]), trusty_hash([&q, &r]));
    assert_ne!(trusty_hash([&q, &r, &q]), trusty_hash([&q, &r]));
}

#[test]
fn test_presentation_order_matters() {
    let (quads, _) = read_file(&fixture("mosquito.trig")).unwrap();
    let mut reversed = quads.clone();
    reversed.reverse();
    assert_ne!(trusty_hash(&quads), trusty_hash(&reversed));
    assert_eq!(
        trusty_hash_with_order(&quads, HashOrder::Canonical),
        trusty_hash_with_order(&reversed, HashOrder::Canonical)
    );
}

#[test]
fn test_incremental_hasher_matches() {
    let (quads, _) = read_file(&fixture("mosquito.trig")).unwrap();
    for order in [HashOrder::Presentation, HashOrder::Canonical] {
        let mut hasher = TrustyHasher::new(order);
        for q in &quads {
            hasher.update(q);
        }
        assert_eq!(hasher.finish(), trusty_hash_with_order(&quads, order));
    }
}

#[test]
fn test_verify_trusty_uri() {
    let quads = vec![hello()];
    let uri = format!("https://w3id.org/np/{}", HELLO_HASH);
    assert!(verify(&quads, &uri, HashOrder::Presentation).is_valid());
    // a single quad has only one order
    assert!(verify(&quads, &uri, HashOrder::Canonical).is_valid());
    assert!(!verify(&quads, "https://w3id.org/np/RA47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU", HashOrder::Presentation).is_valid());
}
