use criterion::{Criterion, black_box, criterion_group, criterion_main};

use blockdown_engine::{BlockConverter, map_index};

fn document_text() -> String {
    let mut text = String::new();
    for section in 0..20 {
        text.push_str(&format!("## Section {section}\n\n"));
        text.push_str("A paragraph with **bold**, *emphasis* and `code`.\n\n");
        text.push_str("- first item\n- second item\n- third item\n\n");
        text.push_str("> a quoted line\n\n");
    }
    text
}

fn bench_convert(c: &mut Criterion) {
    let converter = BlockConverter::default();
    let text = document_text();

    c.bench_function("convert_document", |b| {
        b.iter(|| converter.convert(black_box(&text)))
    });

    c.bench_function("convert_single_list", |b| {
        b.iter(|| converter.convert(black_box("- a\n- b\n- c\n- d\n- e")))
    });
}

fn bench_map_index(c: &mut Criterion) {
    let long = "**some** _formatted_ [text](with://markers) repeated ".repeat(50);
    let short: String = long
        .chars()
        .filter(|c| !"*_[]()".contains(*c))
        .collect();

    c.bench_function("map_index_full_length", |b| {
        b.iter(|| map_index(black_box(&long), black_box(&short), None))
    });
}

criterion_group!(benches, bench_convert, bench_map_index);
criterion_main!(benches);
