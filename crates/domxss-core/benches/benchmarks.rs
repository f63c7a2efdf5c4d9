use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use domxss_core::config::{Config, ScanMode};
use domxss_core::{AnalysisEngine, HttpResponse, KnowledgeBase, ScriptExtractor};

fn generate_page(blocks: usize) -> String {
    let mut page = String::with_capacity(blocks * 400);
    page.push_str("<!DOCTYPE html>\n<html>\n<head><title>Bench</title></head>\n<body>\n");

    for i in 0..blocks {
        page.push_str(&format!(
            r#"<div class="item-{i}"><p>Paragraph {i} with some filler text.</p></div>
<script>
  var item{i} = document.getElementById('item-{i}');
  if (item{i}) {{
    item{i}.className = 'ready';
  }}
  document.write('<span>' + document.referrer + '</span>');
</script>
"#,
            i = i
        ));
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    for blocks in [1, 50, 500] {
        let page = generate_page(blocks);
        group.throughput(Throughput::Bytes(page.len() as u64));
        group.bench_with_input(BenchmarkId::new("all_scripts", blocks), &page, |b, page| {
            let extractor = ScriptExtractor::new(ScanMode::All);
            b.iter(|| extractor.extract(black_box(page)).count())
        });
    }

    group.finish();
}

fn bench_grep(c: &mut Criterion) {
    let mut group = c.benchmark_group("grep");

    let mut config = Config::default();
    config.scan.scripts = ScanMode::All;
    config.scan.calls = ScanMode::All;
    let engines = [
        ("first", AnalysisEngine::new()),
        ("all", AnalysisEngine::with_config(&config).expect("valid config")),
    ];

    for blocks in [1, 50, 500] {
        let response = HttpResponse::html("http://bench.local/", 1, &generate_page(blocks));
        for (mode, engine) in &engines {
            group.bench_with_input(
                BenchmarkId::new(*mode, blocks),
                &response,
                |b, response| {
                    b.iter(|| {
                        let kb = KnowledgeBase::new();
                        engine.grep(black_box(response), &kb);
                        engine.end(&kb).len()
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_extraction, bench_grep);
criterion_main!(benches);
