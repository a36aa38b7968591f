//! Benchmarks for the PDF page writer.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use convert_output_pdf::metrics::wrap_text;
use convert_output_pdf::{PdfFont, PdfWriter, Rgb8};

const PARAGRAPH: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod \
    tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud \
    exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.";

fn png_band(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([250, 250, 250]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Write `pages` pages of wrapped body text.
fn text_document(pages: usize) -> usize {
    let mut writer = PdfWriter::new("Benchmark");
    for _ in 0..pages {
        writer.begin_page(595.28, 841.89);
        let mut y = 60.0;
        while y < 800.0 {
            for line in wrap_text(PARAGRAPH, 515.0, PdfFont::Regular, 12.0) {
                writer
                    .text(40.0, y, &line, PdfFont::Regular, 12.0, Rgb8::BLACK)
                    .unwrap();
                y += 13.8;
            }
        }
    }
    writer.number_pages(40.0).unwrap();
    writer.finish().unwrap().len()
}

fn bench_pdf_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("PdfWriter");
    group.sample_size(10);

    group.bench_function("10_text_pages", |b| b.iter(|| text_document(black_box(10))));
    group.bench_function("50_text_pages", |b| b.iter(|| text_document(black_box(50))));

    let band = png_band(1374, 2029);
    group.bench_function("10_bitmap_pages", |b| {
        b.iter(|| {
            let mut writer = PdfWriter::new("Bands");
            for _ in 0..10 {
                writer.begin_page(595.28, 841.89);
                writer.image(black_box(&band), 40.0, 40.0, 515.28, 761.89).unwrap();
            }
            writer.finish().unwrap().len()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pdf_writer);
criterion_main!(benches);
