//! Benchmarks for the table pipeline and term extraction.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use tablesmith::lexicon::Lexicon;
use tablesmith::search::TermExtractor;
use tablesmith::table::{parse_page_tables, process_fragment, render_fragment};

/// Synthesize a fragment with a header row and `rows` data rows of
/// clinical-shorthand-heavy text, the worst case for the extractor.
fn sample_fragment(rows: usize) -> String {
    let mut html = String::from(
        "<table class=\"table1\">\n\
         <tr><th>Marker</th><th>Association</th><th>Notes</th></tr>\n",
    );
    for i in 0..rows {
        html.push_str(&format!(
            "<tr><td>CD{i} (cluster {i})</td>\
             <td>t(9;22) bcr-abl fusion, chromosome {i}</td>\
             <td>seen with il-{i} elevation; 22q11.2 deletion syndrome</td></tr>\n"
        ));
    }
    html.push_str("</table>");
    html
}

// ============================================================================
// Table pipeline
// ============================================================================

fn bench_process_fragment(c: &mut Criterion) {
    let html = sample_fragment(100);
    c.bench_function("process_fragment_100_rows", |b| {
        b.iter(|| process_fragment(&html));
    });
}

fn bench_render_fragment(c: &mut Criterion) {
    let fragment = process_fragment(&sample_fragment(100));
    c.bench_function("render_fragment_100_rows", |b| {
        b.iter(|| render_fragment(&fragment));
    });
}

// ============================================================================
// Term extraction
// ============================================================================

fn bench_extract_terms(c: &mut Criterion) {
    let lexicon = Lexicon::default();
    let extractor = TermExtractor::new(&lexicon);
    let tables = parse_page_tables(&sample_fragment(100));

    c.bench_function("extract_terms_100_rows", |b| {
        b.iter(|| {
            for table in &tables {
                extractor.extract(table);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_process_fragment,
    bench_render_fragment,
    bench_extract_terms
);
criterion_main!(benches);
