use catalog::CatalogSnapshot;
use common::Product;
use criterion::{Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;

fn products(count: i64, stock: u32) -> Vec<Product> {
    (0..count)
        .map(|id| Product::new(id, format!("Product {id}"), "", Decimal::new(999, 2), stock))
        .collect()
}

fn bench_replace_all(c: &mut Criterion) {
    let snapshot = products(1_000, 10);

    c.bench_function("catalog/replace_all_1000", |b| {
        b.iter(|| {
            let mut catalog = CatalogSnapshot::new();
            catalog.replace_all(snapshot.clone());
            catalog
        });
    });
}

fn bench_merge_partial_batch(c: &mut Criterion) {
    let base = CatalogSnapshot::from_products(products(1_000, 10));
    let batch = products(50, 3);

    c.bench_function("catalog/merge_50_into_1000", |b| {
        b.iter(|| {
            let mut catalog = base.clone();
            catalog.merge(&batch);
            catalog
        });
    });
}

criterion_group!(benches, bench_replace_all, bench_merge_partial_batch);
criterion_main!(benches);
