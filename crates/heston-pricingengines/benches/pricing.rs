//! Benchmarks for heston-pricingengines.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use heston_instruments::OptionSpec;
use heston_models::HestonParameters;
use heston_pricingengines::{characteristic_function, AnalyticHestonEngine};
use heston_termstructures::MarketContext;
use num_complex::Complex64;

fn market() -> MarketContext {
    let today = NaiveDate::from_ymd_opt(2022, 7, 26).expect("valid date");
    MarketContext::with_flat_rates(100.0, today, 0.02, 0.0).expect("valid market")
}

fn benchmark_characteristic_function(c: &mut Criterion) {
    let params = HestonParameters::new(0.04, 1.0, 0.04, 0.3, -0.5);
    c.bench_function("characteristic_function", |b| {
        b.iter(|| characteristic_function(black_box(Complex64::new(7.5, -1.0)), &params, 1.0))
    });
}

fn benchmark_price_by_maturity(c: &mut Criterion) {
    let engine = AnalyticHestonEngine::new();
    let params = HestonParameters::new(0.04, 1.0, 0.04, 0.3, -0.5);
    let market = market();
    let mut group = c.benchmark_group("heston_call_by_maturity");

    for maturity in [1.0 / 365.0, 0.25, 1.0, 10.0] {
        let option = OptionSpec::european_call(100.0, maturity).expect("valid option");
        group.bench_with_input(
            BenchmarkId::from_parameter(maturity),
            &option,
            |b, option| b.iter(|| engine.price(black_box(&params), &market, option)),
        );
    }

    group.finish();
}

fn benchmark_strike_panel(c: &mut Criterion) {
    let engine = AnalyticHestonEngine::new();
    let params = HestonParameters::new(0.0105, 1.0, 0.04, 0.3, -0.6);
    let market = market();
    let options: Vec<OptionSpec> = [90.0, 95.0, 100.0, 105.0, 110.0]
        .into_iter()
        .map(|k| OptionSpec::european_call(k, 1.0).expect("valid option"))
        .collect();

    c.bench_function("heston_strike_panel_5", |b| {
        b.iter(|| {
            options
                .iter()
                .map(|o| engine.price(black_box(&params), &market, o))
                .collect::<Result<Vec<_>, _>>()
        })
    });
}

criterion_group!(
    benches,
    benchmark_characteristic_function,
    benchmark_price_by_maturity,
    benchmark_strike_panel
);
criterion_main!(benches);
