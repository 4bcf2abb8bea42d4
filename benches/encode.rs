//! Benchmarks for batch encoding, compression and request assembly.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use logservice_client::client::{
    ClientIdentity, Endpoint, RequestBuilder, Signer, compress, encode_batch,
};
use logservice_client::{CompressType, ContentType, LogBatch, LogRecord};

fn sample_batch(content_type: ContentType) -> LogBatch {
    let records = (0..1_000u32).map(|i| {
        LogRecord::new(1_700_000_000 + i)
            .with("level", "INFO")
            .with("logger", "app.http")
            .with("message", format!("request {i} served in {} ms", i % 97))
    });
    LogBatch::new("app")
        .with_topic("bench")
        .with_tag("env", "prod")
        .with_content_type(content_type)
        .with_records(records)
}

fn encode_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for (name, content_type) in [("binary", ContentType::Binary), ("json", ContentType::Json)] {
        let batch = sample_batch(content_type);
        group.bench_function(name, |b| {
            b.iter(|| encode_batch(black_box(&batch), "10.0.0.7", None))
        });
    }
    group.finish();

    let payload = encode_batch(&sample_batch(ContentType::Binary), "10.0.0.7", None)
        .expect("encode sample batch");
    let mut group = c.benchmark_group("compress");
    for (name, codec) in [("deflate", CompressType::Gzip), ("lz4", CompressType::Lz4)] {
        group.bench_function(name, |b| {
            b.iter(|| compress(codec, black_box(payload.clone())))
        });
    }
    group.finish();
}

fn request_benchmarks(c: &mut Criterion) {
    let endpoint = Endpoint::parse("https://logs.example.com").expect("endpoint");
    let mut identity = ClientIdentity::new(endpoint, "secret");
    identity.source_ip = "10.0.0.7".to_owned();
    let batch = sample_batch(ContentType::Binary);
    let signer = Signer::new("secret");

    c.bench_function("put_draft_and_sign", |b| {
        b.iter(|| {
            let draft = RequestBuilder::new(&identity)
                .put_logs(black_box(&batch))
                .expect("draft");
            let signed = draft
                .sign(&signer, "Mon, 03 Jan 2022 10:00:00 GMT")
                .map(|request| request.headers.len());
            black_box(signed.expect("sign"))
        })
    });
}

criterion_group!(benches, encode_benchmarks, request_benchmarks);
criterion_main!(benches);
