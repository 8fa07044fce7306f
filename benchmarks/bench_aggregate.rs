use std::hint::black_box;
use std::io::Cursor;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use csvtally::config::{CsvTallyConfig, ErrorReportStyle};
use csvtally::{analyze_rows, parse_record, PartialSummary, RawRow, RowSource};

const ROWS: usize = 100_000;

fn sample_csv(rows: usize) -> String {
    let mut content = String::from("id,value,label,timestamp\n");
    for i in 0..rows {
        content.push_str(&format!(
            "{},{}.5,label-{},2024-02-{:02}T{:02}:{:02}:00Z\n",
            i,
            i % 1000,
            i % 16,
            1 + i % 28,
            i % 24,
            i % 60
        ));
    }
    content
}

fn bench_parse_record(c: &mut Criterion) {
    let fields = ["42", "1234.5", "checkout", "2024-02-01T12:30:00+01:00"];
    c.bench_function("parse_record", |b| {
        b.iter(|| {
            black_box(parse_record(black_box(&fields))).ok();
        });
    });
}

fn bench_partial_summary(c: &mut Criterion) {
    let records: Vec<_> = (0..1000)
        .map(|i| {
            let row = RawRow::new(
                i + 2,
                vec![
                    i.to_string(),
                    format!("{}.25", i),
                    format!("l{}", i % 8),
                    "2024-02-01T00:00:00Z".to_string(),
                ],
            );
            parse_record(&row.fields).expect("benchmark rows are valid")
        })
        .collect();

    c.bench_function("partial_summary_1000", |b| {
        b.iter(|| black_box(PartialSummary::from_records(black_box(&records))));
    });
}

fn bench_end_to_end(c: &mut Criterion) {
    let content = sample_csv(ROWS);
    let mut group = c.benchmark_group("analyze_rows");
    group.throughput(Throughput::Elements(ROWS as u64));
    group.sample_size(20);

    for threads in [1usize, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, &threads| {
            b.iter(|| {
                let mut config = CsvTallyConfig::default();
                config.performance.threads = threads;
                config.processing.error_report.style = ErrorReportStyle::Off;

                let source = RowSource::from_reader(
                    "bench",
                    Box::new(Cursor::new(content.clone().into_bytes())),
                    b',',
                )
                .expect("benchmark input has a header");
                black_box(analyze_rows(source, &config).expect("benchmark run succeeds"));
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_record,
    bench_partial_summary,
    bench_end_to_end
);
criterion_main!(benches);
