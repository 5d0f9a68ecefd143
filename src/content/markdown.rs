use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use htmd::{Element, HtmlToMarkdown};
use lazy_static::lazy_static;
use markup5ever_rcdom::{Node, NodeData};
use regex::Regex;
use spdlog::{debug, error, warn};
use url::Url;

use crate::content::assets::{AssetContext, AssetWriter};

const PNG_DATA_PREFIX: &str = "data:image/png;base64,";

const BASE64_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

lazy_static! {
    static ref NOT_BASE64_REGEX: Regex = Regex::new(r"[^A-Za-z0-9+/=]").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortcodeOptions {
    pub title: String,
    pub size: String,
}

impl Default for ShortcodeOptions {
    fn default() -> Self {
        ShortcodeOptions {
            title: "Image".to_string(),
            size: "500x500".to_string(),
        }
    }
}

impl ShortcodeOptions {
    pub fn render(&self, file_name: &str) -> String {
        format!(r#"{{{{<imglink title="{}" src="{}" size="{}">}}}}"#, self.title, file_name, self.size)
    }
}

/// Image work found while walking one document, handed to the `AssetWriter` afterwards
enum AssetJob {
    Save { path: PathBuf, bytes: Vec<u8> },
    Download { url: String, path: PathBuf },
}

struct Extraction {
    assets: AssetContext,
    jobs: Vec<AssetJob>,
}

type SharedExtraction = Arc<Mutex<Extraction>>;

fn lock(state: &SharedExtraction) -> MutexGuard<'_, Extraction> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Converts post and comment bodies from HTML to GitHub flavoured Markdown.
///
/// On top of the generic htmd rules: `<pre>` becomes a fenced block, embedded PNGs and
/// images wrapped in links are extracted to files next to the post and replaced by a shortcode,
/// and tables, strikethrough and task list checkboxes are kept.
pub struct MarkdownConverter {
    shortcode: ShortcodeOptions,
}

impl MarkdownConverter {
    pub fn new(shortcode: ShortcodeOptions) -> MarkdownConverter {
        MarkdownConverter {
            shortcode,
        }
    }

    pub fn convert(&self, html: &str, assets: &mut AssetContext, writer: &mut AssetWriter) -> io::Result<String> {
        let state = Arc::new(Mutex::new(Extraction {
            assets: assets.clone(),
            jobs: vec![],
        }));

        let markdown = self.converter_for(&state).convert(html)?;

        let mut extraction = lock(&state);
        *assets = extraction.assets.clone();
        for job in extraction.jobs.drain(..) {
            match job {
                AssetJob::Save { path, bytes } => writer.save(path, bytes),
                AssetJob::Download { url, path } => writer.download(url, path),
            }
        }

        Ok(markdown.trim().to_string())
    }

    /// Handlers registered later win over the htmd defaults for the same tag
    fn converter_for(&self, state: &SharedExtraction) -> HtmlToMarkdown {
        let img_state = Arc::clone(state);
        let img_shortcode = self.shortcode.clone();
        let a_state = Arc::clone(state);
        let a_shortcode = self.shortcode.clone();

        HtmlToMarkdown::builder()
            .skip_tags(vec!["script", "style"])
            .add_handler(vec!["pre"], pre_handler)
            .add_handler(vec!["del", "s", "strike"], strikethrough_handler)
            .add_handler(vec!["input"], checkbox_handler)
            .add_handler(vec!["table"], table_handler)
            .add_handler(vec!["tr"], row_handler)
            .add_handler(vec!["th", "td"], cell_handler)
            .add_handler(vec!["img"], move |element: Element| {
                Some(image_handler(&element, &img_state, &img_shortcode))
            })
            .add_handler(vec!["a"], move |element: Element| {
                Some(anchor_handler(&element, &a_state, &a_shortcode))
            })
            .build()
    }
}

fn attr(element: &Element, name: &str) -> Option<String> {
    element.attrs.iter()
        .find(|attr| &attr.name.local == name)
        .map(|attr| attr.value.to_string())
}

fn is_element(node: &Rc<Node>, tag: &str) -> bool {
    matches!(node.data, NodeData::Element { ref name, .. } if &name.local == tag)
}

fn has_descendant(node: &Rc<Node>, tag: &str) -> bool {
    node.children.borrow().iter()
        .any(|child| is_element(child, tag) || has_descendant(child, tag))
}

fn parent_of(node: &Rc<Node>) -> Option<Rc<Node>> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|parent| parent.upgrade());
    node.parent.set(weak);
    parent
}

/// `(leading whitespace, text, trailing whitespace)`
fn split_edges(content: &str) -> (&str, &str, &str) {
    let start = content.len() - content.trim_start().len();
    let end = content.trim_end().len().max(start);
    (&content[..start], &content[start..end], &content[end..])
}

fn escape_link(link: &str) -> String {
    let link = link.replace('(', "\\(").replace(')', "\\)");
    if link.contains(' ') {
        format!("<{}>", link)
    } else {
        link
    }
}

fn link_title(element: &Element) -> String {
    attr(element, "title")
        .map(|title| format!(" \"{}\"", title.trim().replace('"', "\\\"")))
        .unwrap_or_default()
}

fn markdown_image(element: &Element, src: &str) -> String {
    let alt = attr(element, "alt").unwrap_or_default();
    format!("![{}]({}{})", alt.trim(), escape_link(src), link_title(element))
}

fn markdown_link(element: &Element, href: &str) -> String {
    let (leading, text, trailing) = split_edges(element.content);
    format!("{}[{}]({}{}){}", leading, text, escape_link(href), link_title(element), trailing)
}

fn file_name_of(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Text after the last dot of the URL path, `jpg` when the path has none
fn image_extension(url: &Url) -> String {
    let last_segment = url.path().rsplit('/').next().unwrap_or("");
    match last_segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => ext.to_string(),
        _ => "jpg".to_string(),
    }
}

fn image_handler(element: &Element, state: &SharedExtraction, shortcode: &ShortcodeOptions) -> String {
    let Some(src) = attr(element, "src") else {
        return String::new();
    };

    let Some(data) = src.strip_prefix(PNG_DATA_PREFIX) else {
        return markdown_image(element, &src);
    };

    let data = NOT_BASE64_REGEX.replace_all(data, "");
    let bytes = match BASE64_LENIENT.decode(data.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Error decoding embedded image: {}", e);
            return markdown_image(element, &src);
        }
    };

    let mut extraction = lock(state);
    let path = extraction.assets.next_path("png");
    let file_name = file_name_of(&path);
    debug!("Extracting embedded image to {}", path.display());
    extraction.jobs.push(AssetJob::Save { path, bytes });
    shortcode.render(&file_name)
}

/// Runs after the images inside the link were handled, so their sequence numbers come first
fn anchor_handler(element: &Element, state: &SharedExtraction, shortcode: &ShortcodeOptions) -> String {
    let Some(href) = attr(element, "href") else {
        return element.content.to_string();
    };

    if !has_descendant(element.node, "img") {
        return markdown_link(element, &href);
    }

    let url = match Url::parse(&href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => url,
        Ok(url) => {
            warn!("Not downloading linked image with unsupported scheme {}: {}", url.scheme(), href);
            return markdown_link(element, &href);
        }
        Err(e) => {
            warn!("Not downloading linked image with invalid URL {}: {}", href, e);
            return markdown_link(element, &href);
        }
    };

    let extension = image_extension(&url);
    let mut extraction = lock(state);
    let path = extraction.assets.next_path(&extension);
    let file_name = file_name_of(&path);
    extraction.jobs.push(AssetJob::Download { url: href, path });
    shortcode.render(&file_name)
}

fn collect_pre_text(node: &Rc<Node>, buf: &mut String) {
    for child in node.children.borrow().iter() {
        match child.data {
            NodeData::Text { ref contents } => buf.push_str(&contents.borrow()),
            NodeData::Element { ref name, .. } if &name.local == "br" => buf.push('\n'),
            NodeData::Element { .. } => collect_pre_text(child, buf),
            _ => {}
        }
    }
}

fn fenced_block(text: &str) -> String {
    let text = text.trim_matches(|c| c == '\n' || c == '\r');
    let fence = if text.contains("```") { "````" } else { "```" };
    format!("{}\n{}\n{}", fence, text, fence)
}

/// Only text and line breaks survive; every other tag inside the block is dropped
fn pre_handler(element: Element) -> Option<String> {
    let mut text = String::new();
    collect_pre_text(element.node, &mut text);
    Some(format!("\n\n{}\n\n", fenced_block(&text)))
}

fn strikethrough_handler(element: Element) -> Option<String> {
    let (leading, text, trailing) = split_edges(element.content);
    if text.is_empty() {
        return Some(element.content.to_string());
    }
    Some(format!("{}~~{}~~{}", leading, text, trailing))
}

fn checkbox_handler(element: Element) -> Option<String> {
    let is_checkbox = attr(&element, "type")
        .is_some_and(|kind| kind.eq_ignore_ascii_case("checkbox"));
    if !is_checkbox {
        return Some(element.content.to_string());
    }

    let mark = if attr(&element, "checked").is_some() { "[x] " } else { "[ ] " };
    Some(mark.to_string())
}

fn table_handler(element: Element) -> Option<String> {
    Some(format!("\n\n{}\n\n", element.content.trim()))
}

fn enclosing_table(node: &Rc<Node>) -> Option<Rc<Node>> {
    let mut current = parent_of(node);
    while let Some(node) = current {
        if is_element(&node, "table") {
            return Some(node);
        }
        current = parent_of(&node);
    }
    None
}

fn first_row(node: &Rc<Node>) -> Option<Rc<Node>> {
    for child in node.children.borrow().iter() {
        if is_element(child, "tr") {
            return Some(Rc::clone(child));
        }
        if is_element(child, "table") {
            continue;
        }
        if let Some(row) = first_row(child) {
            return Some(row);
        }
    }
    None
}

/// The first row is the header row, with or without `<th>` cells
fn row_handler(element: Element) -> Option<String> {
    let mut row = format!("|{}", element.content.trim_matches('\n'));

    let is_header = enclosing_table(element.node)
        .and_then(|table| first_row(&table))
        .is_some_and(|first| Rc::ptr_eq(&first, element.node));

    if is_header {
        let cells = element.node.children.borrow().iter()
            .filter(|child| is_element(child, "th") || is_element(child, "td"))
            .count();
        row.push_str("\n|");
        row.push_str(&" --- |".repeat(cells));
    }

    Some(format!("\n{}\n", row))
}

fn cell_handler(element: Element) -> Option<String> {
    let cell = element.content.trim()
        .replace('\n', " ")
        .replace('|', "\\|");
    Some(format!(" {} |", cell))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tokio::runtime::Runtime;

    use crate::content::assets::AssetReport;

    use super::*;

    // PNG signature
    const PNG_B64: &str = "iVBORw0KGgo=";

    fn convert_in(dir: &Path, html: &str) -> (String, AssetContext, AssetReport) {
        let runtime = Runtime::new().unwrap();
        let mut writer = AssetWriter::new(runtime.handle().clone());
        let mut assets = AssetContext::for_post_file(&dir.join("my-post.md"));
        let converter = MarkdownConverter::new(ShortcodeOptions::default());
        let markdown = converter.convert(html, &mut assets, &mut writer).unwrap();
        let report = runtime.block_on(writer.finish());
        (markdown, assets, report)
    }

    #[test]
    fn test_basic_html() {
        let dir = tempfile::tempdir().unwrap();
        let (markdown, assets, report) = convert_in(dir.path(), r#"<div><p>Hello <strong>world</strong></p><p>See <a href="https://www.rust-lang.org">Rust</a></p></div>"#);
        assert!(markdown.contains("Hello **world**"), "{}", markdown);
        assert!(markdown.contains("See [Rust](https://www.rust-lang.org)"), "{}", markdown);
        assert_eq!(assets.sequence(), 0);
        assert_eq!(report, AssetReport::default());
    }

    #[test]
    fn test_pre_block() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<p>Code:</p><pre class="code"><span>fn main() {</span><br>    println!("&lt;hi&gt;");<br/>}</pre><p>done</p>"#;
        let (markdown, _, _) = convert_in(dir.path(), html);
        assert!(markdown.contains("```\nfn main() {\n    println!(\"<hi>\");\n}\n```"), "{}", markdown);
        assert!(markdown.starts_with("Code:"), "{}", markdown);
        assert!(markdown.ends_with("done"), "{}", markdown);
    }

    #[test]
    fn test_pre_block_stays_in_quote() {
        let dir = tempfile::tempdir().unwrap();
        let (markdown, _, _) = convert_in(dir.path(), "<blockquote><p>quote</p><pre>a\nb</pre></blockquote>");
        assert!(markdown.starts_with("> quote"), "{}", markdown);
        assert!(markdown.contains("> ```\n> a\n> b\n> ```"), "{}", markdown);
    }

    #[test]
    fn test_text_looking_like_markup_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let (markdown, _, _) = convert_in(dir.path(), "<p>mention blogmdslot0x here</p><pre>code</pre>");
        assert!(markdown.starts_with("mention blogmdslot0x here"), "{}", markdown);
        assert_eq!(markdown.matches("```\ncode\n```").count(), 1, "{}", markdown);
    }

    #[test]
    fn test_table() {
        let dir = tempfile::tempdir().unwrap();
        let html = "<table><tr><th>a</th><th>b</th></tr><tr><td>1</td><td>x | y</td></tr></table>";
        let (markdown, _, _) = convert_in(dir.path(), html);
        assert_eq!(markdown, "| a | b |\n| --- | --- |\n| 1 | x \\| y |");
    }

    #[test]
    fn test_table_without_header_cells() {
        let dir = tempfile::tempdir().unwrap();
        let html = "<p>before</p><table>\n<tbody>\n<tr>\n<td>1</td>\n<td>2</td>\n</tr>\n<tr><td>3</td><td>4</td></tr>\n</tbody>\n</table><p>after</p>";
        let (markdown, _, _) = convert_in(dir.path(), html);
        assert_eq!(markdown, "before\n\n| 1 | 2 |\n| --- | --- |\n| 3 | 4 |\n\nafter");
    }

    #[test]
    fn test_strikethrough() {
        let dir = tempfile::tempdir().unwrap();
        let (markdown, _, _) = convert_in(dir.path(), "<p><del>gone</del> <s>x</s> and <strike>old</strike></p>");
        assert_eq!(markdown, "~~gone~~ ~~x~~ and ~~old~~");
    }

    #[test]
    fn test_task_list() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<ul><li><input type="checkbox" checked> done</li><li><input type=checkbox> todo</li></ul>"#;
        let (markdown, _, _) = convert_in(dir.path(), html);
        assert!(markdown.contains("[x] done"), "{}", markdown);
        assert!(markdown.contains("[ ] todo"), "{}", markdown);
    }

    #[test]
    fn test_two_embedded_images() {
        let dir = tempfile::tempdir().unwrap();
        let html = format!(r#"<p>one <img src="data:image/png;base64,{0}"></p><p>two <img alt="x" src="data:image/png;base64,{0}" /></p>"#, PNG_B64);
        let (markdown, assets, report) = convert_in(dir.path(), &html);

        let first = markdown.find(r#"{{<imglink title="Image" src="my-post1.png" size="500x500">}}"#).unwrap();
        let second = markdown.find(r#"{{<imglink title="Image" src="my-post2.png" size="500x500">}}"#).unwrap();
        assert!(first < second);
        assert_eq!(assets.sequence(), 2);
        assert_eq!(report, AssetReport { saved: 2, failed: 0 });

        let png = std::fs::read(dir.path().join("my-post1.png")).unwrap();
        assert_eq!(png, [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
        assert!(dir.path().join("my-post2.png").exists());
    }

    #[test]
    fn test_linked_image_is_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<p><a href="http://127.0.0.1:1/photos/cat.JPG"><img src="http://127.0.0.1:1/photos/s320/cat.JPG"></a></p>"#;
        let (markdown, assets, report) = convert_in(dir.path(), html);
        assert_eq!(markdown, r#"{{<imglink title="Image" src="my-post1.JPG" size="500x500">}}"#);
        assert_eq!(assets.sequence(), 1);
        assert_eq!(report, AssetReport { saved: 0, failed: 1 });
    }

    #[test]
    fn test_linked_image_with_angle_bracket_in_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<p><a title="a > b" href="http://127.0.0.1:1/big.jpg"><img src="http://127.0.0.1:1/s.jpg"></a></p>"#;
        let (markdown, assets, report) = convert_in(dir.path(), html);
        assert_eq!(markdown, r#"{{<imglink title="Image" src="my-post1.jpg" size="500x500">}}"#);
        assert_eq!(assets.sequence(), 1);
        assert_eq!(report, AssetReport { saved: 0, failed: 1 });
    }

    #[test]
    fn test_link_around_embedded_image() {
        let dir = tempfile::tempdir().unwrap();
        let html = format!(r#"<p><a href="http://127.0.0.1:1/big.png"><img src="data:image/png;base64,{}"></a></p>"#, PNG_B64);
        let (markdown, assets, report) = convert_in(dir.path(), &html);
        assert_eq!(markdown, r#"{{<imglink title="Image" src="my-post2.png" size="500x500">}}"#);
        assert_eq!(assets.sequence(), 2);
        assert_eq!(report, AssetReport { saved: 1, failed: 1 });
        assert!(dir.path().join("my-post1.png").exists());
    }

    #[test]
    fn test_data_src_is_not_src() {
        let dir = tempfile::tempdir().unwrap();
        let html = format!(r#"<p><img data-src="data:image/png;base64,{}" src="http://e.com/x.png"></p>"#, PNG_B64);
        let (markdown, assets, report) = convert_in(dir.path(), &html);
        assert_eq!(markdown, "![](http://e.com/x.png)");
        assert_eq!(assets.sequence(), 0);
        assert_eq!(report, AssetReport::default());
    }

    #[test]
    fn test_plain_images_and_relative_links() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<p><img alt="a cat" src="http://example.com/cat.png"></p><p><a href="/local/page"><img src="x.gif"></a></p>"#;
        let (markdown, assets, report) = convert_in(dir.path(), html);
        assert!(markdown.contains("![a cat](http://example.com/cat.png)"), "{}", markdown);
        assert!(markdown.contains("[![](x.gif)](/local/page)"), "{}", markdown);
        assert_eq!(assets.sequence(), 0);
        assert_eq!(report, AssetReport::default());
    }

    #[test]
    fn test_sequence_continues_across_conversions() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new().unwrap();
        let mut writer = AssetWriter::new(runtime.handle().clone());
        let mut assets = AssetContext::for_post_file(&dir.path().join("p.md"));
        let converter = MarkdownConverter::new(ShortcodeOptions { title: "Pic".to_string(), size: "100x100".to_string() });

        let html = format!(r#"<img src="data:image/png;base64,{}">"#, PNG_B64);
        converter.convert(&html, &mut assets, &mut writer).unwrap();
        let markdown = converter.convert(&html, &mut assets, &mut writer).unwrap();
        assert_eq!(markdown, r#"{{<imglink title="Pic" src="p2.png" size="100x100">}}"#);
        runtime.block_on(writer.finish());
    }

    #[test]
    fn test_image_extension() {
        let ext = |s: &str| image_extension(&Url::parse(s).unwrap());
        assert_eq!(ext("http://a.b/img/photo.jpeg?w=100"), "jpeg");
        assert_eq!(ext("http://a.b/img/s1600/Photo.PNG"), "PNG");
        assert_eq!(ext("http://a.b/img/photo"), "jpg");
        assert_eq!(ext("http://a.b/"), "jpg");
    }
}
