#![allow(unused)]
extern crate cilmeta;

use cilmeta::{MetadataView, TableId, TableStream};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

/// Builds a synthetic table stream with a large Field table for throughput measurement.
fn synthetic_table_stream(rows: u32) -> Vec<u8> {
    let valid: u64 = 1 << TableId::Field as u64;

    let mut stream = Vec::new();
    stream.extend_from_slice(&0_u32.to_le_bytes());
    stream.push(2);
    stream.push(0);
    stream.push(0);
    stream.push(1);
    stream.extend_from_slice(&valid.to_le_bytes());
    stream.extend_from_slice(&0_u64.to_le_bytes());
    stream.extend_from_slice(&rows.to_le_bytes());

    // Field rows: Flags(2) + Name(2) + Signature(2)
    for row in 0..rows {
        stream.extend_from_slice(&(row as u16).to_le_bytes());
        stream.extend_from_slice(&1_u16.to_le_bytes());
        stream.extend_from_slice(&1_u16.to_le_bytes());
    }

    stream
}

/// Benchmark the two-phase layout computation and full sequential row decode.
fn bench_table_stream(c: &mut Criterion) {
    const ROWS: u32 = 10_000;

    let data = synthetic_table_stream(ROWS);
    let size = data.len();

    let mut group = c.benchmark_group("table_stream");
    group.throughput(Throughput::Bytes(size as u64));

    group.bench_function("layout", |b| {
        b.iter(|| {
            let stream = TableStream::from(black_box(&data)).unwrap();
            black_box(stream.row_count(TableId::Field))
        });
    });

    group.bench_function("decode_all_rows", |b| {
        b.iter(|| {
            let stream = TableStream::from(black_box(&data)).unwrap();
            let table = stream.table(TableId::Field).unwrap();
            let mut flags = 0_u64;
            for row in table.iter() {
                flags += u64::from(row.cell(0).unwrap().raw);
            }
            black_box(flags)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_table_stream);
criterion_main!(benches);
