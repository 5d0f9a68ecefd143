use std::io;

use lazy_static::lazy_static;
use regex::Regex;
use spdlog::{debug, error, info};

use crate::content::assets::AssetContext;
use crate::file_name::{sanitize_file_name, slug_from_title};
use crate::import::{BodyConverter, Extracted, ImportError, ImportOptions};
use crate::output::post_paths;
use crate::post::{escape_title, Author, Comment, Post, PostId};
use crate::text_utils::{frontmatter_date, is_valid_date};
use crate::xml_tree::XmlElement;

const HIDDEN_STATUSES: [&str; 2] = ["private", "inherit"];

/// WordPress bookkeeping objects that share the `item` element with real content
const INTERNAL_POST_TYPES: [&str; 7] = [
    "attachment", "nav_menu_item", "revision", "custom_css",
    "customize_changeset", "wp_global_styles", "wp_navigation",
];

fn text<'a>(item: &'a XmlElement, name: &str) -> &'a str {
    item.child_text(name).map(|t| t.trim()).unwrap_or("")
}

fn is_exported(item: &XmlElement) -> bool {
    let status = text(item, "wp:status");
    let post_type = text(item, "wp:post_type");
    !HIDDEN_STATUSES.contains(&status) && !INTERNAL_POST_TYPES.contains(&post_type)
}

/// Wraps a body stored as bare text into paragraphs, one per blank-line separated block.
/// Bodies that already have a `<p>` are left alone.
pub fn paragraph_fix(content: &str) -> String {
    lazy_static! {
        static ref P_TAG_REGEX: Regex = Regex::new(r"(?i)<p>").unwrap();
        static ref BLANK_LINE_REGEX: Regex = Regex::new(r"\r?\n\r?\n").unwrap();
    }

    if P_TAG_REGEX.is_match(content) {
        return content.to_string();
    }

    format!("<p>{}</p>", BLANK_LINE_REGEX.replace_all(content, "</p>\n\n<p>"))
}

/// `pubDate` when it is a real date, otherwise the local `wp:post_date`
fn published(item: &XmlElement) -> String {
    let pub_date = text(item, "pubDate");
    if is_valid_date(pub_date) {
        return frontmatter_date(pub_date);
    }

    let post_date = text(item, "wp:post_date");
    if is_valid_date(post_date) {
        return frontmatter_date(post_date);
    }

    pub_date.to_string()
}

fn post_slug(item: &XmlElement, title: &str) -> String {
    let post_name = text(item, "wp:post_name");
    let decoded = match urlencoding::decode(post_name) {
        Ok(name) => name.into_owned(),
        Err(_) => post_name.to_string(),
    };

    let slug = sanitize_file_name(&decoded);
    if !slug.is_empty() {
        return slug;
    }

    let slug = sanitize_file_name(text(item, "wp:post_id"));
    if !slug.is_empty() {
        return slug;
    }

    slug_from_title(title)
}

fn build_comment(comment: &XmlElement, assets: &mut AssetContext, body: &mut BodyConverter) -> Comment {
    let content = match comment.child_text("wp:comment_content") {
        Some(html) => body.to_markdown(&format!("<div>{}</div>", html), assets),
        None => String::new(),
    };

    Comment {
        title: None,
        author: Author {
            name: text(comment, "wp:comment_author").to_string(),
            email: text(comment, "wp:comment_author_email").to_string(),
            url: text(comment, "wp:comment_author_url").to_string(),
        },
        published: text(comment, "wp:comment_date").to_string(),
        content,
    }
}

fn build_post(item: &XmlElement, options: &ImportOptions, body: &mut BodyConverter) -> io::Result<Post> {
    let raw_title = text(item, "title");
    let title = escape_title(raw_title);
    let draft = text(item, "wp:status") == "draft";
    let published = published(item);
    let slug = post_slug(item, raw_title);

    info!("title: '{}'", title);
    debug!("published: '{}', draft: {}, file: {}", published, draft, slug);

    let paths = post_paths(&options.output_dir, &slug, options.page_bundles)?;
    let mut assets = AssetContext::for_post_file(&paths.post_file);

    let content = match item.child_text("content:encoded") {
        Some(html) => {
            let html = if options.paragraph_fix {
                paragraph_fix(html)
            } else {
                html.to_string()
            };
            // a wrapper element keeps plain text bodies convertible
            body.to_markdown(&format!("<div>{}</div>", html), &mut assets)
        }
        None => String::new(),
    };

    let mut post = Post {
        id: PostId(text(item, "wp:post_id").to_string()),
        title,
        published,
        draft,
        alias: None,
        tags: vec![],
        content,
        comments: vec![],
        paths,
        assets,
    };

    for category in item.children("category") {
        post.add_tag(&category.text);
    }

    for comment in item.children("wp:comment") {
        if text(comment, "wp:comment_approved") != "1" {
            continue;
        }
        let comment = build_comment(comment, &mut post.assets, body);
        post.comments.push(comment);
    }

    if !post.comments.is_empty() {
        info!("comments: '{}'", post.comments.len());
    }

    Ok(post)
}

/// Comments live inside their post's `item`, so no cross-referencing is needed
pub fn extract(rss: &XmlElement, options: &ImportOptions, body: &mut BodyConverter) -> Result<Extracted, ImportError> {
    let channel = match (rss.name.as_str(), rss.find(&["channel"])) {
        ("rss", Some(channel)) => channel,
        _ => return Err(ImportError::UnexpectedRoot { expected: "rss", found: rss.name.clone() }),
    };

    let items: Vec<&XmlElement> = channel.children("item").collect();
    info!("Total Post count: {}", items.len());

    let (items, hidden): (Vec<&XmlElement>, Vec<&XmlElement>) = items.into_iter()
        .partition(|item| is_exported(item));
    info!("Post count: {}", items.len());

    let mut extracted = Extracted {
        skipped: hidden.len(),
        ..Extracted::default()
    };

    for item in items {
        match build_post(item, options, body) {
            Ok(post) => extracted.posts.push(post),
            Err(e) => {
                error!("Skipping post {}: {}", text(item, "wp:post_id"), e);
                extracted.skipped += 1;
            }
        }
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use tokio::runtime::Runtime;

    use crate::content::assets::AssetWriter;
    use crate::content::markdown::{MarkdownConverter, ShortcodeOptions};
    use crate::output::CommentMode;
    use crate::test_data::WORDPRESS_EXPORT;
    use crate::xml_tree::parse_document;

    use super::*;

    fn extract_sample(output_dir: &std::path::Path, paragraph_fix: bool) -> Extracted {
        let runtime = Runtime::new().unwrap();
        let mut assets = AssetWriter::new(runtime.handle().clone());
        let converter = MarkdownConverter::new(ShortcodeOptions::default());
        let mut body = BodyConverter { converter: &converter, assets: &mut assets };
        let options = ImportOptions {
            output_dir: output_dir.to_path_buf(),
            comment_mode: CommentMode::Separate,
            paragraph_fix,
            page_bundles: false,
        };
        let root = parse_document(WORDPRESS_EXPORT).unwrap();
        let extracted = extract(&root, &options, &mut body).unwrap();
        runtime.block_on(assets.finish());
        extracted
    }

    #[test]
    fn test_paragraph_fix() {
        assert_eq!(paragraph_fix("one\n\ntwo\r\n\r\nthree"), "<p>one</p>\n\n<p>two</p>\n\n<p>three</p>");
        assert_eq!(paragraph_fix("single line"), "<p>single line</p>");
        assert_eq!(paragraph_fix("<P>kept</P>\n\nas is"), "<P>kept</P>\n\nas is");
    }

    #[test]
    fn test_hidden_posts_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let extracted = extract_sample(dir.path(), false);

        let ids: Vec<&str> = extracted.posts.iter().map(|p| p.id.0.as_str()).collect();
        assert_eq!(ids, ["11", "12"]);
        assert_eq!(extracted.skipped, 4);
    }

    #[test]
    fn test_post_fields() {
        let dir = tempfile::tempdir().unwrap();
        let extracted = extract_sample(dir.path(), false);

        let post = &extracted.posts[0];
        assert_eq!(post.title, "Fish & Chips");
        assert_eq!(post.published, "2018-01-02T05:06:07+00:00");
        assert!(!post.draft);
        assert_eq!(post.alias, None);
        assert_eq!(post.tags, ["Food", "UK"]);
        assert_eq!(post.paths.post_file, dir.path().join("fish-&-chips.md"));
        assert!(post.content.contains("[a link](https://example.com)"), "{}", post.content);

        let draft = &extracted.posts[1];
        assert!(draft.draft);
        assert_eq!(draft.published, "2018-02-01T09:30:00");
        assert_eq!(draft.paths.post_file, dir.path().join("12.md"));
        assert_eq!(draft.content, "Draft body");
    }

    #[test]
    fn test_only_approved_comments() {
        let dir = tempfile::tempdir().unwrap();
        let extracted = extract_sample(dir.path(), false);

        let comments = &extracted.posts[0].comments;
        let authors: Vec<&str> = comments.iter().map(|c| c.author.name.as_str()).collect();
        assert_eq!(authors, ["Ann", "Bob"]);
        assert_eq!(comments[0].author.email, "ann@example.com");
        assert_eq!(comments[0].author.url, "http://ann.example.com");
        assert_eq!(comments[0].published, "2018-01-03 10:00:00");
        assert_eq!(comments[0].content, "Yum **yum**");
        assert_eq!(comments[0].title, None);
        assert!(extracted.posts[1].comments.is_empty());
    }

    #[test]
    fn test_paragraph_fix_splits_plain_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let extracted = extract_sample(dir.path(), true);

        let content = &extracted.posts[0].content;
        assert!(content.starts_with("First paragraph\n\nSecond paragraph"), "{}", content);
    }
}
