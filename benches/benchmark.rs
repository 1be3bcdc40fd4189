//! パフォーマンスベンチマーク
//!
//! 問題集の読み込み、ページ生成、一括生成の処理時間を測定します。
//! 入力のワークブックはベンチマーク開始時にメモリ上で生成します。

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::fs;
use std::io::Cursor;
use xlsxquiz::QuizGeneratorBuilder;

/// 選択問題と穴埋め問題が半々の問題集を生成
fn generate_bank(rows: u32) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, header) in ["题干", "选项A", "选项B", "选项C", "选项D", "答案"]
        .iter()
        .enumerate()
    {
        worksheet.write_string(0, col as u16, *header)?;
    }
    for row in 1..=rows {
        worksheet.write_string(row, 0, &format!("question {}", row))?;
        if row % 2 == 0 {
            worksheet.write_string(row, 1, "alpha")?;
            worksheet.write_string(row, 2, "beta")?;
            worksheet.write_string(row, 3, "gamma")?;
            worksheet.write_string(row, 5, "A")?;
        } else {
            worksheet.write_string(row, 5, &format!("answer {}", row))?;
        }
    }
    workbook.save_to_buffer()
}

fn benchmark_load_questions(c: &mut Criterion) {
    let data = generate_bank(5_000).expect("failed to generate bench workbook");
    let generator = QuizGeneratorBuilder::new().build().unwrap();

    let mut group = c.benchmark_group("load_questions");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(20);

    group.bench_function("5000_rows", |b| {
        b.iter(|| {
            let outcome = generator
                .load_questions(Cursor::new(black_box(&data)))
                .unwrap();
            black_box(outcome)
        });
    });

    group.finish();
}

fn benchmark_generate_page(c: &mut Criterion) {
    let data = generate_bank(5_000).expect("failed to generate bench workbook");
    let generator = QuizGeneratorBuilder::new().build().unwrap();

    let mut group = c.benchmark_group("generate_page");
    group.sample_size(20);

    group.bench_function("5000_rows", |b| {
        b.iter(|| {
            let quiz = generator
                .generate(Cursor::new(black_box(&data)), "bench")
                .unwrap();
            black_box(quiz.html)
        });
    });

    group.finish();
}

fn benchmark_batch_processing(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let data = generate_bank(500).expect("failed to generate bench workbook");
    let sources: Vec<_> = (0..20)
        .map(|i| {
            let path = dir.path().join(format!("batch_{:02}.xlsx", i));
            fs::write(&path, &data).expect("failed to write bench workbook");
            path
        })
        .collect();
    let out_dir = dir.path().join("out");
    let generator = QuizGeneratorBuilder::new().build().unwrap();

    let mut group = c.benchmark_group("batch_processing");
    group.throughput(Throughput::Elements(sources.len() as u64));
    group.sample_size(10);

    group.bench_function("20_files", |b| {
        b.iter(|| {
            let report = generator
                .generate_batch(black_box(&sources), &out_dir)
                .unwrap();
            black_box(report.succeeded())
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(std::time::Duration::from_secs(10))
        .warm_up_time(std::time::Duration::from_secs(3));
    targets = benchmark_load_questions, benchmark_generate_page, benchmark_batch_processing
}

criterion_main!(benches);
