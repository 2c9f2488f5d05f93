use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use trustynp::{trusty_hash_with_order, HashOrder, Literal, NamedNode, Quad, QuadStore, Term};

/// Generate `n` quads spread over the four nanopublication graphs, with a mix
/// of IRIs, bnodes and literals (with and without lang/dt).
fn generate_quads(n: usize) -> Vec<Quad> {
    let graphs = ["Head", "assertion", "provenance", "pubinfo"];
    let mut quads = Vec::with_capacity(n);
    for t in 0..n {
        let subject = if t % 5 == 0 {
            Term::blank(format!("b{t}")).unwrap()
        } else {
            Term::named(format!("http://example.org/s/{t}")).unwrap()
        };
        let predicate = NamedNode::new(format!("http://example.org/p/{}", t % 20)).unwrap();
        let object: Term = match t % 4 {
            0 => Term::named(format!("http://example.org/o/{t}")).unwrap(),
            1 => Literal::new_simple(format!("value {t}")).into(),
            2 => Literal::new_typed(format!("{t}"), "http://www.w3.org/2001/XMLSchema#integer")
                .unwrap()
                .into(),
            _ => Literal::new_language_tagged(format!("hello {t}"), "en")
                .unwrap()
                .into(),
        };
        let graph = Term::named(format!("http://example.org/np#{}", graphs[t % 4])).unwrap();
        quads.push(Quad::new(subject, predicate, object, Some(graph)).unwrap());
    }
    quads
}

fn bench_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("trusty_hash");
    for &n in &[100usize, 1_000, 10_000] {
        let quads = generate_quads(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("presentation", n), &quads, |b, quads| {
            b.iter(|| trusty_hash_with_order(quads, HashOrder::Presentation))
        });
        group.bench_with_input(BenchmarkId::new("canonical", n), &quads, |b, quads| {
            b.iter(|| trusty_hash_with_order(quads, HashOrder::Canonical))
        });
    }
    group.finish();
}

fn bench_store_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_load");
    for &n in &[1_000usize, 10_000] {
        let quads = generate_quads(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &quads, |b, quads| {
            b.iter(|| quads.iter().cloned().collect::<QuadStore>())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hash, bench_store_load);
criterion_main!(benches);
