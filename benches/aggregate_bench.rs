//! Benchmarks for portfolio aggregation
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use netfolio::aggregate::{aggregate, Portfolio};
use netfolio::balance::BalanceRecord;
use netfolio::wallet::{address_queries, EvmChain, Wallet};

const SYMBOLS: [&str; 8] = ["ETH", "USDC", "USDT", "DAI", "WETH", "BNB", "MATIC", "ATOM"];

/// One balance list per wallet, each holding every symbol
fn create_sources(wallets: usize) -> Vec<Vec<BalanceRecord>> {
    (0..wallets)
        .map(|w| {
            SYMBOLS
                .iter()
                .enumerate()
                .map(|(i, symbol)| {
                    BalanceRecord::new(format!("0x{:040x}", w), *symbol, *symbol, (w + i) as f64)
                        .price(1.0 + i as f64)
                })
                .collect()
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for wallets in [10, 100, 1000] {
        let sources = create_sources(wallets);

        group.throughput(Throughput::Elements((wallets * SYMBOLS.len()) as u64));

        group.bench_function(format!("aggregate_{}", wallets), |b| {
            b.iter(|| aggregate(black_box(sources.clone())))
        });

        group.bench_function(format!("portfolio_{}", wallets), |b| {
            b.iter(|| {
                let portfolio = Portfolio::from_sources(black_box(sources.clone()), wallets);
                portfolio.allocation()
            })
        });
    }

    group.finish();
}

fn bench_address_queries(c: &mut Criterion) {
    let wallets: Vec<Wallet> = (0..500)
        .map(|i| Wallet::Evm {
            address: format!("0x{:040x}", i % 250),
            networks: EvmChain::all().iter().copied().collect(),
        })
        .collect();

    c.bench_function("address_queries_500", |b| {
        b.iter(|| address_queries(black_box(&wallets)))
    });
}

criterion_group!(benches, bench_aggregate, bench_address_queries);
criterion_main!(benches);
