use criterion::{criterion_group, criterion_main, Criterion};

use sundown::{html, Buffer, Extensions, Markdown};

fn synthetic_document() -> String {
    let mut doc = String::new();
    for i in 0..100 {
        doc.push_str(&format!(
            "# Section {i}\n\n\
             Some *emphasis*, `code` and [a link](http://example.com/{i}).\n\n\
             - item one\n- item two\n\n\
             > quoted text with www.example.com inside\n\n\
             ```\nlet x = {i};\n```\n\n"
        ));
    }
    doc
}

fn bench_render(c: &mut Criterion) {
    let doc = synthetic_document();
    let ext = Extensions::TABLES
        | Extensions::FENCED_CODE
        | Extensions::AUTOLINK
        | Extensions::STRIKETHROUGH;

    c.bench_function("render_document", |b| {
        let (callbacks, renderer) = html::renderer(html::HtmlFlags::empty());
        let mut md = Markdown::new(ext, 16, callbacks, renderer);
        b.iter(|| {
            let mut ob = Buffer::new(64);
            md.render(&mut ob, doc.as_bytes());
            ob.len()
        });
    });

    c.bench_function("smartypants", |b| {
        let (callbacks, renderer) = html::renderer(html::HtmlFlags::empty());
        let mut md = Markdown::new(ext, 16, callbacks, renderer);
        let mut rendered = Buffer::new(64);
        md.render(&mut rendered, doc.as_bytes());
        b.iter(|| {
            let mut ob = Buffer::new(64);
            sundown::smartypants::smartypants(&mut ob, &rendered);
            ob.len()
        });
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
