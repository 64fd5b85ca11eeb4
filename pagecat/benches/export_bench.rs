//! Export throughput.
//!
//! Run with: cargo bench

use std::hint::black_box;
use std::path::{Path, PathBuf};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lopdf::{Document, Object, Stream, dictionary};
use pagecat::config::{CompressionLevel, ExportOptions};
use pagecat::merge::{CancellationToken, MergeExporter};
use pagecat::source::SourceCache;
use pagecat::PageRef;
use tempfile::TempDir;

fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..pages)
        .map(|i| {
            let content = format!("BT /F1 12 Tf 72 720 Td ({name}-{i}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
            }))
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    SourceCache::normalize(&path)
}

fn write_png(dir: &Path, name: &str, side: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_fn(side, side, |x, y| image::Rgb([x as u8, y as u8, 128]))
        .save(&path)
        .unwrap();
    SourceCache::normalize(&path)
}

/// Interleave PDF pages and image pages, reversed, to exercise reordering.
fn mixed_sequence(pdf: &Path, png: &Path, pdf_pages: usize) -> Vec<PageRef> {
    let mut pages = Vec::with_capacity(pdf_pages * 2);
    for i in (0..pdf_pages).rev() {
        pages.push(PageRef::pdf(pdf, i));
        pages.push(PageRef::image(png));
    }
    pages
}

fn bench_assemble_scaling(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "source.pdf", 200);
    let png = write_png(dir.path(), "image.png", 256);
    let exporter = MergeExporter::default();

    let mut group = c.benchmark_group("assemble_scaling");
    for pdf_pages in [10, 50, 200] {
        let pages = mixed_sequence(&pdf, &png, pdf_pages);
        let mut cache = SourceCache::new();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_pages", pages.len())),
            &pages,
            |b, pages| {
                b.iter(|| {
                    exporter
                        .assemble(black_box(pages), &mut cache, &CancellationToken::new(), None)
                        .unwrap()
                });
            },
        );
    }
    group.finish();
}

fn bench_export_compression(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "source.pdf", 50);
    let png = write_png(dir.path(), "image.png", 128);
    let pages = mixed_sequence(&pdf, &png, 50);
    let output = dir.path().join("out.pdf");

    let mut group = c.benchmark_group("export_compression");
    for level in [
        CompressionLevel::None,
        CompressionLevel::Standard,
        CompressionLevel::Maximum,
    ] {
        let exporter = MergeExporter::new(ExportOptions {
            compression: level,
            ..Default::default()
        });
        let mut cache = SourceCache::new();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{level:?}")),
            &pages,
            |b, pages| {
                b.iter(|| {
                    exporter
                        .export(pages, &mut cache, &output, &CancellationToken::new(), None)
                        .unwrap()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_assemble_scaling, bench_export_compression);
criterion_main!(benches);
