use std::collections::HashMap;
use std::io;

use lazy_static::lazy_static;
use regex::Regex;
use spdlog::{debug, error, info};

use crate::content::assets::AssetContext;
use crate::file_name::{sanitize_file_name, slug_from_title};
use crate::import::{BodyConverter, Extracted, ImportError, ImportOptions};
use crate::output::post_paths;
use crate::post::{escape_title, Author, Comment, Post, PostId};
use crate::text_utils::frontmatter_date;
use crate::xml_tree::XmlElement;

/// Categories under this prefix describe the entry kind, not a label
const BLOGGER_SCHEMA_PREFIX: &str = "http://schemas.google";

fn entry_id(entry: &XmlElement) -> &str {
    entry.child_text("id").map(|id| id.trim()).unwrap_or("")
}

fn is_post_or_comment(entry: &XmlElement) -> bool {
    entry_id(entry).contains(".post-")
}

fn is_comment(entry: &XmlElement) -> bool {
    entry.has_child("thr:in-reply-to")
}

/// `tag:blogger.com,1999:blog-123.post-456` has the post ID `456`
fn post_id(id: &str) -> PostId {
    PostId(id.rsplit('-').next().unwrap_or(id).to_string())
}

/// The post a comment replies to: last path segment of `source`, or the ID inside `ref`
fn comment_target(entry: &XmlElement) -> Option<PostId> {
    let reply = entry.child("thr:in-reply-to")?;

    if let Some(source) = reply.attr("source") {
        let last = source.trim_end_matches('/').rsplit('/').next().unwrap_or("");
        if !last.is_empty() {
            return Some(PostId(last.to_string()));
        }
    }

    reply.attr("ref")
        .filter(|r| !r.is_empty())
        .map(post_id)
}

/// Host-relative path of the public post URL, e.g. `/2011/04/my-post.html`
fn post_alias(entry: &XmlElement) -> Option<String> {
    lazy_static! {
        static ref HOST_REGEX: Regex = Regex::new(r"^.*//[^/]+").unwrap();
    }

    let href = entry.children("link")
        .find(|link| link.attr("rel") == Some("alternate") && link.attr("type") == Some("text/html"))
        .and_then(|link| link.attr("href"))?;

    let alias = HOST_REGEX.replace(href, "").to_string();
    if alias.is_empty() {
        None
    } else {
        Some(alias)
    }
}

fn is_draft(entry: &XmlElement) -> bool {
    entry.child("app:control")
        .and_then(|control| control.child_text("app:draft"))
        .map(|draft| draft.trim() == "yes")
        .unwrap_or(false)
}

fn build_post(entry: &XmlElement, options: &ImportOptions, body: &mut BodyConverter) -> io::Result<Post> {
    let id = post_id(entry_id(entry));
    let raw_title = entry.child_text("title").unwrap_or("");
    let title = escape_title(raw_title);
    let published = frontmatter_date(entry.child_text("published").unwrap_or(""));
    let draft = is_draft(entry);

    info!("title: \"{}\"", title);
    debug!("date: {}, draft: {}", published, draft);

    let mut slug = slug_from_title(raw_title);
    if slug.is_empty() {
        slug = sanitize_file_name(&id.0);
    }

    let paths = post_paths(&options.output_dir, &slug, options.page_bundles)?;
    let mut assets = AssetContext::for_post_file(&paths.post_file);

    let content = match entry.child_text("content") {
        Some(html) if !html.trim().is_empty() => body.to_markdown(html, &mut assets),
        _ => String::new(),
    };

    let mut post = Post {
        id,
        title,
        published,
        draft,
        alias: post_alias(entry),
        tags: vec![],
        content,
        comments: vec![],
        paths,
        assets,
    };

    for category in entry.children("category") {
        match category.attr("term") {
            Some(term) if !term.contains(BLOGGER_SCHEMA_PREFIX) => post.add_tag(term),
            _ => {}
        }
    }
    debug!("tags: {:?}", post.tags);

    Ok(post)
}

fn build_comment(entry: &XmlElement, assets: &mut AssetContext, body: &mut BodyConverter) -> Comment {
    let title = match entry.child_text("title") {
        Some(title) if !title.trim().is_empty() => Some(body.to_markdown(title, assets)),
        _ => None,
    };

    let content = match entry.child_text("content") {
        Some(html) if !html.trim().is_empty() => body.to_markdown(html, assets),
        _ => String::new(),
    };

    let author = match entry.child("author") {
        Some(author) => Author {
            name: author.child_text("name").unwrap_or("").trim().to_string(),
            email: author.child_text("email").unwrap_or("").trim().to_string(),
            url: author.child_text("uri").unwrap_or("").trim().to_string(),
        },
        None => Author::default(),
    };

    Comment {
        title,
        author,
        published: entry.child_text("published").unwrap_or("").trim().to_string(),
        content,
    }
}

/// Posts first, then comments attached to them by post ID
pub fn extract(feed: &XmlElement, options: &ImportOptions, body: &mut BodyConverter) -> Result<Extracted, ImportError> {
    if feed.name != "feed" {
        return Err(ImportError::UnexpectedRoot { expected: "feed", found: feed.name.clone() });
    }

    let entries: Vec<&XmlElement> = feed.children("entry").collect();
    info!("Total no. of entries found : {}", entries.len());

    let (comments, posts): (Vec<&XmlElement>, Vec<&XmlElement>) = entries.into_iter()
        .filter(|entry| is_post_or_comment(entry))
        .partition(|entry| is_comment(entry));

    info!("Content-posts {}", posts.len());
    info!("Content-Comments {}", comments.len());

    let mut extracted = Extracted::default();
    let mut by_id: HashMap<PostId, usize> = HashMap::new();

    for entry in posts {
        match build_post(entry, options, body) {
            Ok(post) => {
                by_id.insert(post.id.clone(), extracted.posts.len());
                extracted.posts.push(post);
            }
            Err(e) => {
                error!("Skipping post {}: {}", entry_id(entry), e);
                extracted.skipped += 1;
            }
        }
    }

    for entry in comments {
        let target = comment_target(entry);
        let idx = target.as_ref().and_then(|id| by_id.get(id)).copied();
        let Some(idx) = idx else {
            let err = ImportError::OrphanComment {
                comment: entry_id(entry).to_string(),
                post: target.unwrap_or_else(|| PostId(String::new())),
            };
            error!("{}", err);
            extracted.orphan_comments += 1;
            continue;
        };

        let post = &mut extracted.posts[idx];
        let comment = build_comment(entry, &mut post.assets, body);
        post.comments.push(comment);
    }

    Ok(extracted)
}
