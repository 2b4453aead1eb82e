use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use patternkit::ordered::{insert, insert_in_place, insertion_index, insertion_sort};
use patternkit::router::Router;
use std::hint::black_box;

fn sorted_input(len: usize) -> Vec<i64> {
    (0..len as i64).map(|i| i * 2).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_insert");
    for len in [16usize, 256, 4096] {
        let seq = sorted_input(len);
        let middle = len as i64 + 1;

        group.bench_with_input(BenchmarkId::new("copy", len), &seq, |b, seq| {
            b.iter(|| black_box(insert(black_box(seq), black_box(middle))))
        });
        group.bench_with_input(BenchmarkId::new("index", len), &seq, |b, seq| {
            b.iter(|| black_box(insertion_index(black_box(seq), &middle)))
        });
        group.bench_with_input(BenchmarkId::new("in_place", len), &seq, |b, seq| {
            b.iter_batched(
                || seq.clone(),
                |mut v| {
                    insert_in_place(&mut v, middle);
                    black_box(v)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_insertion_sort(c: &mut Criterion) {
    let shuffled: Vec<i64> = (0..512).map(|i| (i * 7919) % 512).collect();
    c.bench_function("insertion_sort_512", |b| {
        b.iter(|| black_box(insertion_sort(black_box(shuffled.clone()))))
    });
}

fn bench_route_match(c: &mut Criterion) {
    let mut router = Router::new();
    router.add_route(Method::GET, "/", "home").unwrap();
    router.add_route(Method::GET, "/users/{id}", "get_user").unwrap();
    router
        .add_route(Method::GET, "/users/{id}/posts/{post_id}", "get_post")
        .unwrap();

    c.bench_function("route_match", |b| {
        let paths = ["/", "/users/42", "/users/42/posts/7", "/missing"];
        b.iter(|| {
            for path in paths.iter() {
                black_box(router.route(&Method::GET, path));
            }
        })
    });
}

criterion_group!(benches, bench_insert, bench_insertion_sort, bench_route_match);
criterion_main!(benches);
