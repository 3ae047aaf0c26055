use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use sim_ai::{business_advice, render_prompt, AdviceRequest, RuleBasedAdvisor};
use sim_core::GameState;

fn snapshot() -> AdviceRequest {
    let catalog = sim_econ::default_catalog();
    let mut state = GameState::initial(sim_econ::initial_cash());
    for product in &catalog.products {
        let _ = state.inventory.insert(product.id.clone(), 25);
    }
    state.cash = Decimal::new(1200, 0);
    AdviceRequest::from_state(&catalog, &state)
}

fn bench_prompt(c: &mut Criterion) {
    let request = snapshot();
    c.bench_function("render_prompt", |b| {
        b.iter(|| black_box(render_prompt(&request)))
    });
    c.bench_function("rule_based_advice", |b| {
        b.iter(|| black_box(business_advice(&RuleBasedAdvisor, &request)))
    });
}

criterion_group!(benches, bench_prompt);
criterion_main!(benches);
