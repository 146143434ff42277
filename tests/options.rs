// Tests for extension flags and HTML render flags.

use sundown::{html, Buffer, Extensions, Markdown};

fn render_ext(input: &str, ext: Extensions, flags: html::HtmlFlags) -> String {
    let (callbacks, renderer) = html::renderer(flags);
    let mut md = Markdown::new(ext, 16, callbacks, renderer);
    let mut ob = Buffer::new(64);
    md.render(&mut ob, input.as_bytes());
    String::from_utf8(ob.as_slice().to_vec()).unwrap()
}

#[test]
fn strikethrough_toggle() {
    assert_eq!(
        render_ext("~~x~~\n", Extensions::STRIKETHROUGH, html::HtmlFlags::empty()),
        "<p><del>x</del></p>\n"
    );
    assert_eq!(
        render_ext("~~x~~\n", Extensions::empty(), html::HtmlFlags::empty()),
        "<p>~~x~~</p>\n"
    );
    // a single tilde is inert even with the extension
    assert_eq!(
        render_ext("~x~\n", Extensions::STRIKETHROUGH, html::HtmlFlags::empty()),
        "<p>~x~</p>\n"
    );
}

#[test]
fn superscript_toggle() {
    let ext = Extensions::SUPERSCRIPT;
    assert_eq!(
        render_ext("2^10\n", ext, html::HtmlFlags::empty()),
        "<p>2<sup>10</sup></p>\n"
    );
    assert_eq!(
        render_ext("2^(a b)\n", ext, html::HtmlFlags::empty()),
        "<p>2<sup>a b</sup></p>\n"
    );
    assert_eq!(
        render_ext("2^10\n", Extensions::empty(), html::HtmlFlags::empty()),
        "<p>2^10</p>\n"
    );
}

#[test]
fn space_headers_toggle() {
    assert_eq!(
        render_ext("#hi\n", Extensions::empty(), html::HtmlFlags::empty()),
        "<h1>hi</h1>\n"
    );
    assert_eq!(
        render_ext("#hi\n", Extensions::SPACE_HEADERS, html::HtmlFlags::empty()),
        "<p>#hi</p>\n"
    );
}

#[test]
fn autolink_url() {
    let ext = Extensions::AUTOLINK;
    assert_eq!(
        render_ext("go to http://example.com now\n", ext, html::HtmlFlags::empty()),
        "<p>go to <a href=\"http://example.com\">http://example.com</a> now</p>\n"
    );
    // trailing punctuation stays outside the link
    assert_eq!(
        render_ext("see http://example.com/a.\n", ext, html::HtmlFlags::empty()),
        "<p>see <a href=\"http://example.com/a\">http://example.com/a</a>.</p>\n"
    );
}

#[test]
fn autolink_www_and_email() {
    let ext = Extensions::AUTOLINK;
    assert_eq!(
        render_ext("see www.example.com now\n", ext, html::HtmlFlags::empty()),
        "<p>see <a href=\"http://www.example.com\">www.example.com</a> now</p>\n"
    );
    assert_eq!(
        render_ext("mail me@example.com now\n", ext, html::HtmlFlags::empty()),
        "<p>mail <a href=\"mailto:me@example.com\">me@example.com</a> now</p>\n"
    );
}

#[test]
fn no_intra_emphasis() {
    assert_eq!(
        render_ext("foo_bar_baz\n", Extensions::NO_INTRA_EMPHASIS, html::HtmlFlags::empty()),
        "<p>foo_bar_baz</p>\n"
    );
    assert_eq!(
        render_ext("foo_bar_baz\n", Extensions::empty(), html::HtmlFlags::empty()),
        "<p>foo<em>bar</em>baz</p>\n"
    );
}

#[test]
fn lax_spacing_lets_fences_interrupt() {
    let ext = Extensions::FENCED_CODE | Extensions::LAX_SPACING;
    assert_eq!(
        render_ext("para\n```\nx\n```\n", ext, html::HtmlFlags::empty()),
        "<p>para</p>\n\n<pre><code>x\n</code></pre>\n"
    );
}

#[test]
fn xhtml_forms() {
    let flags = html::HtmlFlags::USE_XHTML;
    assert_eq!(
        render_ext("a  \nb\n", Extensions::empty(), flags),
        "<p>a<br/>\nb</p>\n"
    );
    assert_eq!(render_ext("***\n", Extensions::empty(), flags), "<hr/>\n");
    assert_eq!(
        render_ext("![a](/i.png)\n", Extensions::empty(), flags),
        "<p><img src=\"/i.png\" alt=\"a\"/></p>\n"
    );
}

#[test]
fn hard_wrap() {
    assert_eq!(
        render_ext("a\nb\n", Extensions::empty(), html::HtmlFlags::HARD_WRAP),
        "<p>a<br>\nb</p>\n"
    );
}

#[test]
fn escape_overrides_html() {
    assert_eq!(
        render_ext("a <em>b</em>\n", Extensions::empty(), html::HtmlFlags::ESCAPE),
        "<p>a &lt;em&gt;b&lt;/em&gt;</p>\n"
    );
}

#[test]
fn skip_html_drops_tags() {
    assert_eq!(
        render_ext("a <em>b</em>\n", Extensions::empty(), html::HtmlFlags::SKIP_HTML),
        "<p>a b</p>\n"
    );
}

#[test]
fn safe_link_rejects_bad_schemes() {
    assert_eq!(
        render_ext(
            "[x](javascript:alert)\n",
            Extensions::empty(),
            html::HtmlFlags::SAFELINK
        ),
        "<p>[x](javascript:alert)</p>\n"
    );
    assert_eq!(
        render_ext("[x](/ok)\n", Extensions::empty(), html::HtmlFlags::SAFELINK),
        "<p><a href=\"/ok\">x</a></p>\n"
    );
}

#[test]
fn toc_renderer_builds_outline() {
    let (callbacks, renderer) = html::toc_renderer();
    let mut md = Markdown::new(Extensions::empty(), 16, callbacks, renderer);
    let mut ob = Buffer::new(64);
    md.render(&mut ob, b"# A\n## B\n# C\n");
    assert_eq!(
        String::from_utf8(ob.as_slice().to_vec()).unwrap(),
        "<ul>\n<li>\n<a href=\"#toc_0\">A</a>\n\
         <ul>\n<li>\n<a href=\"#toc_1\">B</a>\n</li>\n</ul>\n</li>\n\
         <li>\n<a href=\"#toc_2\">C</a>\n</li>\n</ul>\n"
    );
}
