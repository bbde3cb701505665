use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use cql_highlight_engine::{CorpusSchema, Highlighter, QueryDialect};

fn schema() -> CorpusSchema {
    CorpusSchema::new(["word", "lemma", "tag"])
        .with_tag_attribute("tag")
        .with_structure("s", ["type"])
        .with_structure("doc", ["id", "year"])
}

fn bench_highlight(c: &mut Criterion) {
    let mut group = c.benchmark_group("highlight");
    group.sample_size(50);

    let schema = schema();
    let highlighter = Highlighter::new(QueryDialect::BasicExpression).with_long_wrap(true);

    let typical = r#"[lemma="dog"] []{0,2} [tag="V.*"] within <s type="q"/>"#;
    group.bench_function("typical", |b| {
        b.iter(|| {
            let markup = highlighter.highlight(black_box(typical), Some(&schema), |_| {});
            black_box(markup);
        });
    });

    let long = format!("{}within <doc/>", r#"[word="abcdefgh"] "#.repeat(40));
    group.bench_function("long", |b| {
        b.iter(|| {
            let markup = highlighter.highlight(black_box(&long), Some(&schema), |_| {});
            black_box(markup);
        });
    });

    let broken = r#"[lemma="dog" ~~ [tag="N "#;
    group.bench_function("recovery", |b| {
        b.iter(|| {
            let markup = highlighter.highlight(black_box(broken), Some(&schema), |_| {});
            black_box(markup);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_highlight);
criterion_main!(benches);
