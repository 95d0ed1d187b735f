use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use studio_editor::document::{Document, Node};
use studio_editor::observer::{removed_image_srcs, Debouncer};
use studio_editor::transaction::Transaction;

/// Article with `images` images interleaved with paragraphs
fn article(images: usize) -> Document {
    let mut nodes = Vec::with_capacity(images * 2);
    for i in 0..images {
        nodes.push(Node::paragraph(format!("Paragraph {}", i)));
        nodes.push(Node::image(format!("/media/gallery/{}.png", i), ""));
    }
    Document::new(nodes)
}

/// Benchmark diffing image sources across a single delete
fn bench_removed_srcs(c: &mut Criterion) {
    let mut group = c.benchmark_group("removed_image_srcs");

    for &images in &[10, 100, 1_000] {
        let before = article(images);
        let applied = Transaction::new()
            .remove(vec![images])
            .apply(&before)
            .expect("remove middle node");

        group.bench_with_input(
            BenchmarkId::new("delete_one", images),
            &applied,
            |b, applied| {
                b.iter(|| {
                    black_box(removed_image_srcs(
                        black_box(&applied.before),
                        black_box(&applied.after),
                    ))
                })
            },
        );
    }

    group.finish();
}

/// Benchmark applying a delete transaction, including the document copy
fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_delete");

    for &images in &[10, 100, 1_000] {
        let doc = article(images);
        let tr = Transaction::new().remove(vec![1]);
        group.bench_with_input(BenchmarkId::new("images", images), &doc, |b, doc| {
            b.iter(|| black_box(tr.apply(black_box(doc))))
        });
    }

    group.finish();
}

/// Benchmark the guard with many distinct keys in flight
fn bench_debouncer(c: &mut Criterion) {
    let keys: Vec<String> = (0..1_000).map(|i| format!("/media/{}.png", i)).collect();

    c.bench_function("debouncer_1000_keys", |b| {
        b.iter(|| {
            let mut debouncer = Debouncer::new(std::time::Duration::from_secs(5));
            let now = tokio::time::Instant::now();
            for key in &keys {
                black_box(debouncer.should_fire_at(key, now));
            }
            black_box(debouncer.len())
        })
    });
}

criterion_group!(benches, bench_removed_srcs, bench_apply, bench_debouncer);
criterion_main!(benches);
