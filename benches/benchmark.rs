// Performance benchmarks for ranking and embedding diagnostics
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use smartcart_core::{Catalog, Product, QueryContext, RecommendationEngine, RelevanceScorer};
use smartcart_eval::{EmbeddingAnalyzer, EmbeddingMatrix};

const WORDS: [&str; 12] = [
    "wireless", "noise", "cancelling", "laptop", "gaming", "camera", "pro", "ultra", "smart", "watch", "oled",
    "portable",
];

fn random_phrase(rng: &mut impl Rng, words: usize) -> String {
    (0..words)
        .map(|_| WORDS[rng.random_range(0..WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn generate_catalog(size: usize) -> Catalog {
    let mut rng = rand::rng();
    let products = (0..size)
        .map(|i| {
            Product::new(i as u64, random_phrase(&mut rng, 4), format!("Brand{}", i % 25), rng.random_range(10.0..3000.0))
                .with_categories([format!("Category{}", i % 12)])
                .with_description(random_phrase(&mut rng, 20))
                .with_features((0..5).map(|_| random_phrase(&mut rng, 2)).collect::<Vec<_>>())
                .with_rating(rng.random_range(1.0..5.0))
        })
        .collect();
    Catalog::new(products).unwrap()
}

fn generate_matrix(rows: usize, dim: usize) -> EmbeddingMatrix {
    let mut rng = rand::rng();
    let data: Vec<f32> = (0..rows * dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    EmbeddingMatrix::new(rows, dim, data).unwrap()
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");
    let engine = RecommendationEngine::default();

    for size in [100, 1000, 10000].iter() {
        let catalog = generate_catalog(*size);
        let with_query = QueryContext::new().with_query("wireless noise cancelling").with_max_price(1500.0);
        let browse = QueryContext::new().with_category("Category3");

        group.bench_with_input(BenchmarkId::new("query", size), &catalog, |b, catalog| {
            b.iter(|| engine.recommend(black_box(catalog), black_box(&with_query)));
        });
        group.bench_with_input(BenchmarkId::new("browse", size), &catalog, |b, catalog| {
            b.iter(|| engine.recommend(black_box(catalog), black_box(&browse)));
        });
    }

    group.finish();
}

fn benchmark_batch(c: &mut Criterion) {
    let catalog = generate_catalog(5000);
    let engine = RecommendationEngine::default();
    let mut rng = rand::rng();
    let requests: Vec<QueryContext> = (0..64)
        .map(|_| QueryContext::new().with_query(random_phrase(&mut rng, 2)))
        .collect();

    c.bench_function("recommend_batch_64", |b| {
        b.iter(|| engine.recommend_batch(black_box(&catalog), black_box(&requests)));
    });
}

fn benchmark_scoring(c: &mut Criterion) {
    let catalog = generate_catalog(1);
    let product = &catalog.products()[0];
    let scorer = RelevanceScorer::default();

    c.bench_function("score_single_product", |b| {
        b.iter(|| scorer.score(black_box(product), black_box("wireless noise cancelling headphones")));
    });
}

fn benchmark_diversity(c: &mut Criterion) {
    let mut group = c.benchmark_group("diversity");
    group.sample_size(10);

    for rows in [100, 500, 1000].iter() {
        let matrix = generate_matrix(*rows, 384);
        let analyzer = EmbeddingAnalyzer::default().with_seed(42);
        group.bench_with_input(BenchmarkId::new("dim384", rows), &matrix, |b, matrix| {
            b.iter(|| analyzer.diversity(black_box(matrix)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_recommend, benchmark_batch, benchmark_scoring, benchmark_diversity);
criterion_main!(benches);
