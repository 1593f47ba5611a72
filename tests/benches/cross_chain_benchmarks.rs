//! # Mythos Multichain Benchmarks
//!
//! | Crate | Operation |
//! |-------|-----------|
//! | mc-01 Packed Pointer | JSON envelope write + read |
//! | mc-02 Address Translator | bech32 translate between chains |
//! | mc-05 Cross-Chain | cycle detection over the in-flight graph |
//! | mc-05 Cross-Chain | full deterministic query through the coordinator |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mc_01_packed_pointer::{read_json, write_json, GuestMemory};
use mc_02_address_translator::{AddressTranslation, AddressTranslator};
use mc_04_contract_handler::KvRequest;
use mc_05_cross_chain::{find_cycle, CrossChainApi, CrossChainCallRequest, DependencyEdges};
use mc_03_subchain_registry::MYTHOS_PREFIX;
use mc_tests::integration::scenario::{account, app, chain, mythos, Scenario, USER};

fn bench_packed_pointer(c: &mut Criterion) {
    let mut group = c.benchmark_group("mc-01-packed-pointer");
    let scenario = Scenario::new();
    let req = scenario.kv_request(KvRequest::Get { key: "k".into() });

    group.bench_function("json_envelope_round_trip", |b| {
        let mut memory = GuestMemory::new(1, 1024);
        b.iter(|| {
            memory.reset();
            let ptr = write_json(&mut memory, black_box(&req)).unwrap();
            let back: CrossChainCallRequest = read_json(&memory, ptr).unwrap();
            black_box(back)
        })
    });
    group.finish();
}

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("mc-02-address-translator");
    let scenario = Scenario::new();
    let translator = AddressTranslator::new(scenario.registry.clone());
    let address = account(MYTHOS_PREFIX, USER);

    group.bench_function("translate_acc", |b| {
        b.iter(|| {
            translator
                .translate(&mythos(), &app(), black_box(&address))
                .unwrap()
        })
    });
    group.finish();
}

fn bench_find_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("mc-05-cycle-detection");

    for chains in [8usize, 64, 256] {
        // A chain of in-flight calls c0 -> c1 -> ... -> cN.
        let ids: Vec<_> = (0..chains).map(|i| chain(&format!("c_{}-1", i + 1))).collect();
        let mut edges = DependencyEdges::new();
        for pair in ids.windows(2) {
            edges.entry(pair[0].clone()).or_default().insert(pair[1].clone());
        }
        let from = ids[chains - 1].clone();
        let target = [ids[0].clone()];

        group.bench_with_input(BenchmarkId::new("closing_edge", chains), &edges, |b, edges| {
            b.iter(|| find_cycle(black_box(&from), &target, &[], edges))
        });
    }
    group.finish();
}

fn bench_coordinator_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("mc-05-cross-chain");
    let scenario = Scenario::new();
    let ctx = scenario.query_ctx();

    group.bench_function("deterministic_query", |b| {
        b.iter(|| {
            let req = scenario.kv_request(KvRequest::Get { key: "k".into() });
            scenario
                .coordinator
                .execute_cross_chain_query(&ctx, req)
                .unwrap()
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_packed_pointer,
    bench_translate,
    bench_find_cycle,
    bench_coordinator_query
);
criterion_main!(benches);
