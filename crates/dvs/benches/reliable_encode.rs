use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dvs::{DataTypeSupport, Dtm, Registry, Version, VersionedCodec};
use serde::{Deserialize, Serialize};

const RECORD_V1: Dtm = 0;
const RECORD_V2: Dtm = 1;

#[derive(Serialize, Deserialize)]
struct RecordV1 {
    id: u64,
    tags: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize)]
struct Record {
    id: u64,
    tags: Vec<String>,
    weight: f64,
}

fn registry() -> Registry {
    Registry::new(vec![
        Version::<RecordV1, Record, ()>::new(
            DataTypeSupport::postcard(RECORD_V1),
            |old| {
                Ok(Record {
                    id: old.id,
                    tags: old.tags,
                    weight: 1.0,
                })
            },
            |record| {
                Ok(RecordV1 {
                    id: record.id,
                    tags: record.tags.clone(),
                })
            },
        )
        .into(),
        Version::<Record, Record, ()>::identity(DataTypeSupport::postcard(RECORD_V2)).into(),
    ])
}

fn record() -> Record {
    Record {
        id: 42,
        tags: (0..32).map(|i| format!("tag-{i}")).collect(),
        weight: 0.5,
    }
}

fn bench_encode(c: &mut Criterion) {
    let reg = registry();
    let codec = VersionedCodec::<Record, ()>::new(&reg);
    let record = record();

    c.bench_function("encode_fresh current", |b| {
        b.iter(|| black_box(codec.encode_fresh(RECORD_V2, &record).unwrap()))
    });

    c.bench_function("encode_reliably current, reused buffer", |b| {
        let mut scratch = vec![0u8; 4096];
        b.iter(|| {
            let (bs, n) = codec
                .encode_reliably(RECORD_V2, &record, std::mem::take(&mut scratch))
                .unwrap();
            black_box(n);
            scratch = bs;
        })
    });

    c.bench_function("encode_reliably current, empty buffer", |b| {
        b.iter(|| black_box(codec.encode_reliably(RECORD_V2, &record, Vec::new()).unwrap()))
    });

    c.bench_function("encode_fresh old version", |b| {
        b.iter(|| black_box(codec.encode_fresh(RECORD_V1, &record).unwrap()))
    });
}

fn bench_decode(c: &mut Criterion) {
    let reg = registry();
    let codec = VersionedCodec::<Record, ()>::new(&reg);
    let record = record();
    let (current, _) = codec.encode_fresh(RECORD_V2, &record).unwrap();
    let (old, _) = codec.encode_fresh(RECORD_V1, &record).unwrap();

    c.bench_function("decode current", |b| {
        b.iter(|| black_box(codec.decode(black_box(&current)).unwrap()))
    });

    c.bench_function("decode old version + migrate", |b| {
        b.iter(|| black_box(codec.decode(black_box(&old)).unwrap()))
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
