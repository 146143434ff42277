// Reference-table behavior and whole-pipeline properties.

use sundown::{html, Buffer, Callbacks, Extensions, Markdown};

fn render(input: &[u8]) -> String {
    let (callbacks, renderer) = html::renderer(html::HtmlFlags::empty());
    let mut md = Markdown::new(Extensions::empty(), 16, callbacks, renderer);
    let mut ob = Buffer::new(64);
    md.render(&mut ob, input);
    String::from_utf8(ob.as_slice().to_vec()).unwrap()
}

#[test]
fn definitions_leave_no_output() {
    assert_eq!(render(b"[id]: http://e.com \"t\"\n"), "");
}

#[test]
fn definitions_resolve_in_either_order() {
    let early = render(b"[x]: /url\n\n[link][x]\n");
    let late = render(b"[link][x]\n\n[x]: /url\n");
    assert_eq!(early, "<p><a href=\"/url\">link</a></p>\n");
    assert_eq!(early, late);
}

#[test]
fn definitions_clear_between_renders() {
    let (callbacks, renderer) = html::renderer(html::HtmlFlags::empty());
    let mut md = Markdown::new(Extensions::empty(), 16, callbacks, renderer);

    let mut ob = Buffer::new(64);
    md.render(&mut ob, b"[x]: /url\n\n[a][x]\n");
    assert_eq!(ob.as_slice(), b"<p><a href=\"/url\">a</a></p>\n");

    // the same label is gone in the next document
    let mut ob = Buffer::new(64);
    md.render(&mut ob, b"[a][x]\n");
    assert_eq!(ob.as_slice(), b"<p>[a][x]</p>\n");
}

#[test]
fn rerendering_is_deterministic() {
    let (callbacks, renderer) = html::renderer(html::HtmlFlags::empty());
    let mut md = Markdown::new(Extensions::empty(), 16, callbacks, renderer);
    let doc: &[u8] = b"# t\n\n- a\n- b\n\n> q\n\n[x]: /u\n\n[y][x]\n";

    let mut first = Buffer::new(64);
    md.render(&mut first, doc);
    let mut second = Buffer::new(64);
    md.render(&mut second, doc);
    assert_eq!(first.as_slice(), second.as_slice());
}

#[test]
fn bom_is_transparent() {
    assert_eq!(render(b"\xEF\xBB\xBF# hi\n"), render(b"# hi\n"));
}

#[test]
fn tabs_expand_to_four_column_stops() {
    assert_eq!(render(b"a\tb\n"), "<p>a   b</p>\n");
    assert_eq!(render(b"abcd\tb\n"), "<p>abcd    b</p>\n");
}

#[test]
fn escaped_active_bytes_are_plain_text() {
    assert_eq!(
        render(b"\\*a\\* \\[b\\] \\`c\\`\n"),
        "<p>*a* [b] `c`</p>\n"
    );
}

#[test]
fn inactive_text_passes_straight_through() {
    // with a bare callback table, text flows header -> normal_text -> footer
    let callbacks: Callbacks<Vec<u8>> = Callbacks {
        doc_header: Some(|ob, _log: &mut Vec<u8>| ob.put_str("{")),
        doc_footer: Some(|ob, _log: &mut Vec<u8>| ob.put_str("}")),
        paragraph: Some(|ob, text, _log| ob.put(text)),
        normal_text: Some(|ob, text, log: &mut Vec<u8>| {
            log.extend_from_slice(text);
            ob.put(text);
        }),
        ..Callbacks::default()
    };

    let mut md = Markdown::new(Extensions::empty(), 16, callbacks, Vec::new());
    let mut ob = Buffer::new(64);
    md.render(&mut ob, b"plain text 123\n");

    assert_eq!(ob.as_slice(), b"{plain text 123}");
    assert_eq!(md.renderer().as_slice(), b"plain text 123");
}
