//! Validator throughput benchmarks.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use mx_validate::validate;

fn synthetic_docstring(sections: usize) -> String {
    let mut text = String::new();
    for i in 0..sections {
        text.push_str(&format!(
            "Insert rows into table number {i}.\n\n\
             Accepts a list of dictionaries mapping column names to values;\n\
             see `insert` for the single-row variant.\n\n\
             ```python\n\
             t = pxt.get_table('films_{i}')\n\
             t.insert([{{'title': 'Example', 'year': 2024}}])\n\
             ```\n\n"
        ));
    }
    text
}

fn bench_validate(c: &mut Criterion) {
    let clean = synthetic_docstring(20);
    let mut hazardous = synthetic_docstring(10);
    hazardous.push_str(">>> t.count()\nan `odd tick\nresult = f(x)```\n");

    c.bench_function("validate_clean_20_sections", |b| {
        b.iter(|| validate(black_box("pkg.entry"), black_box(&clean)));
    });

    c.bench_function("validate_hazardous", |b| {
        b.iter(|| validate(black_box("pkg.entry"), black_box(&hazardous)));
    });
}

criterion_group!(benches, bench_validate);
criterion_main!(benches);
