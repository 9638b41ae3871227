use cart::{CartAction, CartStore, CartView};
use catalog::CatalogSnapshot;
use common::{Product, ProductId};
use criterion::{Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;

fn bench_apply_actions(c: &mut Criterion) {
    let actions: Vec<CartAction> = (0..1_000)
        .map(|i| match i % 4 {
            0 | 1 => CartAction::AddToCart {
                id: ProductId::new(i % 50),
            },
            2 => CartAction::UpdateQuantity {
                id: ProductId::new(i % 50),
                quantity: i % 7 - 1,
            },
            _ => CartAction::RemoveFromCart {
                id: ProductId::new(i % 13),
            },
        })
        .collect();

    c.bench_function("cart/apply_1000_actions", |b| {
        b.iter(|| {
            let mut cart = CartStore::new();
            cart.apply_all(actions.iter().copied());
            cart
        });
    });
}

fn bench_join(c: &mut Criterion) {
    let catalog = CatalogSnapshot::from_products((0..1_000).map(|id| {
        Product::new(id, format!("Product {id}"), "", Decimal::new(1999, 2), 20)
    }));
    let mut cart = CartStore::new();
    for id in (0..1_000).step_by(10) {
        cart.update_quantity(ProductId::new(id), 3);
    }

    c.bench_function("cart/join_100_lines", |b| {
        b.iter(|| CartView::join(&cart, &catalog).grand_total());
    });
}

criterion_group!(benches, bench_apply_actions, bench_join);
criterion_main!(benches);
