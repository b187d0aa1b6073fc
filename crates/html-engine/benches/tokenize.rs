use html_engine::{parse_document, EncodingConfidence, IgnoreErrors, Utf8Decoder};

fn main() {
    divan::main();
}

/// A few thousand paragraphs with nested emphasis and attributes, large
/// enough to put the tokenizer and tree constructor on the hot path
/// instead of measuring one-shot setup cost.
fn sample_document() -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>bench</title></head><body>");
    for i in 0..4000 {
        html.push_str(&format!(
            r#"<p class="item item-{i}" data-index="{i}">Paragraph <em>number</em> {i} with <strong>emphasis</strong>.</p>"#
        ));
    }
    html.push_str("</body></html>");
    html
}

#[divan::bench]
fn bench_parse_document(bencher: divan::Bencher) {
    let input = sample_document();
    bencher.bench(|| {
        let mut errors = IgnoreErrors;
        let mut decoder = Utf8Decoder;
        parse_document(input.as_bytes(), EncodingConfidence::Irrelevant, &mut decoder, &mut errors)
    });
}
