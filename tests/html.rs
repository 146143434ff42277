// Tests for the standard HTML renderer.

use sundown::{html, Buffer, Extensions, Markdown};

fn render_ext(input: &str, ext: Extensions, flags: html::HtmlFlags) -> String {
    let (callbacks, renderer) = html::renderer(flags);
    let mut md = Markdown::new(ext, 16, callbacks, renderer);
    let mut ob = Buffer::new(64);
    md.render(&mut ob, input.as_bytes());
    String::from_utf8(ob.as_slice().to_vec()).unwrap()
}

fn render(input: &str) -> String {
    render_ext(input, Extensions::empty(), html::HtmlFlags::empty())
}

#[test]
fn atx_header() {
    assert_eq!(render("# hi\n"), "<h1>hi</h1>\n");
    assert_eq!(render("### deep ###\n"), "<h3>deep</h3>\n");
    assert_eq!(render("####### seven\n"), "<h6># seven</h6>\n");
}

#[test]
fn emphasis_forms() {
    assert_eq!(
        render("*a* _b_ **c** __d__ ***e***\n"),
        "<p><em>a</em> <em>b</em> <strong>c</strong> <strong>d</strong> \
         <strong><em>e</em></strong></p>\n"
    );
}

#[test]
fn emphasis_opening_rules() {
    // an opening delimiter may not be followed by whitespace
    assert_eq!(render("* not emphasis *x\n"), "<ul>\n<li>not emphasis *x</li>\n</ul>\n");
    assert_eq!(render("a * b * c\n"), "<p>a * b * c</p>\n");
}

#[test]
fn paragraphs() {
    assert_eq!(render("hello\n"), "<p>hello</p>\n");
    assert_eq!(render("hello\n\nworld\n"), "<p>hello</p>\n\n<p>world</p>\n");
    assert_eq!(render("a\nb\n"), "<p>a\nb</p>\n");
}

#[test]
fn setext_headers() {
    assert_eq!(render("Title\n=====\n"), "<h1>Title</h1>\n");
    assert_eq!(render("Title\n-----\n"), "<h2>Title</h2>\n");
    assert_eq!(
        render("para\nText\n----\n"),
        "<p>para</p>\n\n<h2>Text</h2>\n"
    );
}

#[test]
fn horizontal_rules() {
    assert_eq!(render("***\n"), "<hr>\n");
    assert_eq!(render("- - -\n"), "<hr>\n");
    assert_eq!(render("a\n\n___\n"), "<p>a</p>\n\n<hr>\n");
}

#[test]
fn blockquote() {
    assert_eq!(
        render("> quoted\n"),
        "<blockquote>\n<p>quoted</p>\n</blockquote>\n"
    );
    assert_eq!(
        render("> a\n> b\n"),
        "<blockquote>\n<p>a\nb</p>\n</blockquote>\n"
    );
}

#[test]
fn nested_blockquote() {
    assert_eq!(
        render("> > deep\n"),
        "<blockquote>\n<blockquote>\n<p>deep</p>\n</blockquote>\n</blockquote>\n"
    );
}

#[test]
fn indented_code() {
    assert_eq!(
        render("    code\n"),
        "<pre><code>code\n</code></pre>\n"
    );
    assert_eq!(
        render("    a < b\n"),
        "<pre><code>a &lt; b\n</code></pre>\n"
    );
}

#[test]
fn fenced_code() {
    let ext = Extensions::FENCED_CODE;
    assert_eq!(
        render_ext("```cpp\nint x=1;\n```\n", ext, html::HtmlFlags::empty()),
        "<pre><code class=\"cpp\">int x=1;\n</code></pre>\n"
    );
    assert_eq!(
        render_ext("~~~\nplain\n~~~\n", ext, html::HtmlFlags::empty()),
        "<pre><code>plain\n</code></pre>\n"
    );
    // without the extension, the backtick runs pair up as a code span
    assert_eq!(render("```\nx\n```\n"), "<p><code>\nx\n</code></p>\n");
}

#[test]
fn unordered_list() {
    assert_eq!(
        render("- a\n- b\n"),
        "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n"
    );
}

#[test]
fn ordered_list() {
    assert_eq!(
        render("1. a\n2. b\n"),
        "<ol>\n<li>a</li>\n<li>b</li>\n</ol>\n"
    );
}

#[test]
fn loose_list_items_are_block_mode() {
    assert_eq!(
        render("- a\n\n- b\n"),
        "<ul>\n<li><p>a</p></li>\n<li><p>b</p></li>\n</ul>\n"
    );
}

#[test]
fn nested_list() {
    assert_eq!(
        render("- a\n  - b\n"),
        "<ul>\n<li>a\n\n<ul>\n<li>b</li>\n</ul></li>\n</ul>\n"
    );
}

#[test]
fn marker_switch_ends_list() {
    assert_eq!(
        render("- a\n\n1. b\n"),
        "<ul>\n<li>a</li>\n</ul>\n\n<ol>\n<li>b</li>\n</ol>\n"
    );
}

#[test]
fn code_spans() {
    assert_eq!(render("`x`\n"), "<p><code>x</code></p>\n");
    assert_eq!(render("` x `\n"), "<p><code>x</code></p>\n");
    assert_eq!(render("``a `b` c``\n"), "<p><code>a `b` c</code></p>\n");
    assert_eq!(render("`unclosed\n"), "<p>`unclosed</p>\n");
}

#[test]
fn escapes() {
    assert_eq!(render("\\*not\\*\n"), "<p>*not*</p>\n");
    assert_eq!(render("\\\\\n"), "<p>\\</p>\n");
    // a backslash before a non-escapable byte stays
    assert_eq!(render("a\\z\n"), "<p>a\\z</p>\n");
}

#[test]
fn entities() {
    assert_eq!(render("AT&amp;T\n"), "<p>AT&amp;T</p>\n");
    assert_eq!(render("&#169;\n"), "<p>&#169;</p>\n");
    // a lone ampersand is escaped as text
    assert_eq!(render("a & b\n"), "<p>a &amp; b</p>\n");
}

#[test]
fn hard_linebreak() {
    assert_eq!(render("a  \nb\n"), "<p>a<br>\nb</p>\n");
    // a single trailing space is not a break
    assert_eq!(render("a \nb\n"), "<p>a \nb</p>\n");
}

#[test]
fn inline_links() {
    assert_eq!(
        render("[x](http://e.com)\n"),
        "<p><a href=\"http://e.com\">x</a></p>\n"
    );
    assert_eq!(
        render("[x](http://e.com \"t\")\n"),
        "<p><a href=\"http://e.com\" title=\"t\">x</a></p>\n"
    );
    assert_eq!(
        render("[x](<http://e.com>)\n"),
        "<p><a href=\"http://e.com\">x</a></p>\n"
    );
}

#[test]
fn reference_links() {
    assert_eq!(
        render("[x][y]\n\n[y]: http://e.com \"t\"\n"),
        "<p><a href=\"http://e.com\" title=\"t\">x</a></p>\n"
    );
    // definition first, use later
    assert_eq!(
        render("[y]: /url\n\n[x][y]\n"),
        "<p><a href=\"/url\">x</a></p>\n"
    );
    // unresolved references fall back to verbatim text
    assert_eq!(render("[x][nope]\n"), "<p>[x][nope]</p>\n");
}

#[test]
fn shortcut_links() {
    assert_eq!(
        render("[x]\n\n[x]: /url\n"),
        "<p><a href=\"/url\">x</a></p>\n"
    );
    assert_eq!(
        render("[x][]\n\n[x]: /url\n"),
        "<p><a href=\"/url\">x</a></p>\n"
    );
}

#[test]
fn images() {
    assert_eq!(
        render("![alt](http://e.com/i.png \"t\")\n"),
        "<p><img src=\"http://e.com/i.png\" alt=\"alt\" title=\"t\"></p>\n"
    );
    assert_eq!(
        render("![alt](/i.png)\n"),
        "<p><img src=\"/i.png\" alt=\"alt\"></p>\n"
    );
}

#[test]
fn raw_inline_html() {
    assert_eq!(render("a <em>b</em>\n"), "<p>a <em>b</em></p>\n");
    // an unclosed angle bracket is plain text
    assert_eq!(render("a < b\n"), "<p>a &lt; b</p>\n");
}

#[test]
fn html_block() {
    assert_eq!(
        render("<div>\nfoo\n</div>\n\npara\n"),
        "<div>\nfoo\n</div>\n\n<p>para</p>\n"
    );
}

#[test]
fn html_comment_block() {
    assert_eq!(
        render("<!-- c -->\n\nx\n"),
        "<!-- c -->\n\n<p>x</p>\n"
    );
}

#[test]
fn angle_autolinks() {
    assert_eq!(
        render("<http://e.com/>\n"),
        "<p><a href=\"http://e.com/\">http://e.com/</a></p>\n"
    );
    assert_eq!(
        render("<a@b.com>\n"),
        "<p><a href=\"mailto:a@b.com\">a@b.com</a></p>\n"
    );
}

#[test]
fn tables() {
    assert_eq!(
        render_ext("| h |\n|---|\n| c |\n", Extensions::TABLES, html::HtmlFlags::empty()),
        "<table><thead>\n<tr>\n<th>h</th>\n</tr>\n</thead><tbody>\n\
         <tr>\n<td>c</td>\n</tr>\n</tbody></table>\n"
    );
}

#[test]
fn table_alignment() {
    assert_eq!(
        render_ext(
            "| a | b | c |\n|:---|---:|:---:|\n| 1 | 2 | 3 |\n",
            Extensions::TABLES,
            html::HtmlFlags::empty()
        ),
        "<table><thead>\n<tr>\n\
         <th align=\"left\">a</th>\n<th align=\"right\">b</th>\n<th align=\"center\">c</th>\n\
         </tr>\n</thead><tbody>\n<tr>\n\
         <td align=\"left\">1</td>\n<td align=\"right\">2</td>\n<td align=\"center\">3</td>\n\
         </tr>\n</tbody></table>\n"
    );
}

#[test]
fn mixed_document() {
    let input = "# Title\n\nintro text\n\n    let x = 1;\n\n- one\n- two\n";
    let expected = "<h1>Title</h1>\n\n<p>intro text</p>\n\n\
                    <pre><code>let x = 1;\n</code></pre>\n\n\
                    <ul>\n<li>one</li>\n<li>two</li>\n</ul>\n";
    assert_eq!(render(input), expected);
}
