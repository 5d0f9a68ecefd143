use std::collections::HashSet;
use std::fmt::Write;
use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use spdlog::{debug, error, info, warn};

use crate::post::{escape_title, Comment, Post};
use crate::text_utils::readable_date;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommentMode {
    /// Comments are appended to the post file
    Merge,
    /// Comments go to their own file next to the post
    Separate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostPaths {
    pub post_file: PathBuf,
    pub comments_file: PathBuf,
}

/// Flat layout: `<out>/<slug>.md` and `<out>/<slug>-comments.md`.
/// Page bundles: `<out>/<slug>/index.md` and `<out>/<slug>/comments.md`.
pub fn post_paths(output_dir: &Path, slug: &str, page_bundles: bool) -> io::Result<PostPaths> {
    let entry_dir = if page_bundles {
        output_dir.join(slug)
    } else {
        output_dir.to_path_buf()
    };

    if !entry_dir.exists() {
        fs::create_dir_all(&entry_dir)?;
    }

    let paths = if page_bundles {
        PostPaths {
            post_file: entry_dir.join("index.md"),
            comments_file: entry_dir.join("comments.md"),
        }
    } else {
        PostPaths {
            post_file: entry_dir.join(format!("{}.md", slug)),
            comments_file: entry_dir.join(format!("{}-comments.md", slug)),
        }
    };

    Ok(paths)
}

pub fn render_frontmatter(post: &Post) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "---");
    let _ = writeln!(&mut buf, "title: '{}'", post.title);
    let _ = writeln!(&mut buf, "date: {}", post.published);
    let _ = writeln!(&mut buf, "draft: {}", post.draft);
    if let Some(ref alias) = post.alias {
        let _ = writeln!(&mut buf, "url: {}", alias);
    }
    if !post.tags.is_empty() {
        let _ = writeln!(&mut buf, "tags:");
        for tag in post.tags.iter() {
            let _ = writeln!(&mut buf, "- '{}'", escape_title(tag));
        }
    }
    let _ = writeln!(&mut buf, "---");
    buf
}

pub fn render_post(post: &Post) -> String {
    format!("{}\n{}\n", render_frontmatter(post), post.content)
}

pub fn render_comments(comments: &[Comment], date_format: &str) -> String {
    let mut buf = String::new();

    for comment in comments {
        let date = readable_date(&comment.published, date_format);
        let author = &comment.author;
        let by_line = format!("[{}]({} \"{}\") - {}", author.name, author.url, author.email, date);

        match comment.title {
            Some(ref title) if !title.is_empty() => {
                let _ = writeln!(&mut buf, "#### {}", title);
                let _ = writeln!(&mut buf, "{}", by_line);
            }
            _ => {
                let _ = writeln!(&mut buf, "#### {}", by_line);
            }
        }
        let _ = writeln!(&mut buf);
        let _ = writeln!(&mut buf, "{}", comment.content);
        let _ = writeln!(&mut buf, "<hr />");
    }

    buf
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct WriteStats {
    pub posts: usize,
    pub comment_files: usize,
    pub failures: usize,
}

/// Writes posts and their comments. Failures are logged and counted, never returned.
pub struct OutputWriter {
    comment_mode: CommentMode,
    date_format: String,
    written: HashSet<PathBuf>,
    stats: WriteStats,
}

impl OutputWriter {
    pub fn new(comment_mode: CommentMode, date_format: &str) -> OutputWriter {
        OutputWriter {
            comment_mode,
            date_format: date_format.to_string(),
            written: HashSet::new(),
            stats: WriteStats::default(),
        }
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    pub fn write_post(&mut self, post: &Post) {
        debug!("Writing post {}", post);
        if self.write_file(&post.paths.post_file, &render_post(post)) {
            self.stats.posts += 1;
        }

        if post.comments.is_empty() {
            return;
        }

        info!("Post {} has {} comments", post.id, post.comments.len());
        let comments = render_comments(&post.comments, &self.date_format);
        match self.comment_mode {
            CommentMode::Merge => {
                let content = format!("\n---\n### Comments:\n{}", comments);
                self.append_file(&post.paths.post_file, &content);
            }
            CommentMode::Separate => {
                let content = format!("{}\n{}", render_frontmatter(post), comments);
                if self.write_file(&post.paths.comments_file, &content) {
                    self.stats.comment_files += 1;
                }
            }
        }
    }

    fn write_file(&mut self, file_name: &Path, content: &str) -> bool {
        if !self.written.insert(file_name.to_path_buf()) {
            warn!("{} was already written in this run and will be overwritten", file_name.display());
        }

        debug!("Going to write to {}", file_name.display());
        match fs::write(file_name, content) {
            Ok(_) => {
                info!("Successfully written to {}", file_name.display());
                true
            }
            Err(e) => {
                error!("Error while writing to {} - {}", file_name.display(), e);
                self.stats.failures += 1;
                false
            }
        }
    }

    fn append_file(&mut self, file_name: &Path, content: &str) -> bool {
        use std::io::Write;

        debug!("Going to append to {}", file_name.display());
        let res = OpenOptions::new()
            .append(true)
            .create(true)
            .open(file_name)
            .and_then(|mut file| file.write_all(content.as_bytes()));

        match res {
            Ok(_) => {
                info!("Successfully appended to {}", file_name.display());
                true
            }
            Err(e) => {
                error!("Error while appending to {} - {}", file_name.display(), e);
                self.stats.failures += 1;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::content::assets::AssetContext;
    use crate::post::{Author, PostId};

    use super::*;

    fn sample_post(paths: PostPaths) -> Post {
        Post {
            id: PostId("42".to_string()),
            title: "It''s here".to_string(),
            published: "2011-04-05T21:13:00.001-07:00".to_string(),
            draft: true,
            alias: Some("/2011/04/its-here.html".to_string()),
            tags: vec!["rust".to_string(), "blogging".to_string()],
            content: "Body **text**".to_string(),
            comments: vec![],
            assets: AssetContext::for_post_file(&paths.post_file),
            paths,
        }
    }

    fn sample_comment(title: Option<&str>, name: &str) -> Comment {
        Comment {
            title: title.map(|t| t.to_string()),
            author: Author {
                name: name.to_string(),
                email: "noreply@blogger.com".to_string(),
                url: "http://example.com".to_string(),
            },
            published: "2011-04-06T08:00:00.000-07:00".to_string(),
            content: "Nice post".to_string(),
        }
    }

    #[test]
    fn test_post_paths() {
        let dir = tempfile::tempdir().unwrap();

        let paths = post_paths(dir.path(), "hello-world", false).unwrap();
        assert_eq!(paths.post_file, dir.path().join("hello-world.md"));
        assert_eq!(paths.comments_file, dir.path().join("hello-world-comments.md"));

        let paths = post_paths(dir.path(), "hello-world", true).unwrap();
        assert_eq!(paths.post_file, dir.path().join("hello-world").join("index.md"));
        assert_eq!(paths.comments_file, dir.path().join("hello-world").join("comments.md"));
        assert!(dir.path().join("hello-world").is_dir());
    }

    #[test]
    fn test_render_frontmatter() {
        let post = sample_post(PostPaths {
            post_file: PathBuf::from("out/x.md"),
            comments_file: PathBuf::from("out/x-comments.md"),
        });
        assert_eq!(render_frontmatter(&post), r#"---
title: 'It''s here'
date: 2011-04-05T21:13:00.001-07:00
draft: true
url: /2011/04/its-here.html
tags:
- 'rust'
- 'blogging'
---
"#);
    }

    #[test]
    fn test_render_frontmatter_quotes_tags() {
        let mut post = sample_post(PostPaths {
            post_file: PathBuf::from("x.md"),
            comments_file: PathBuf::from("x-comments.md"),
        });
        post.tags = vec!["Tips: Rust".to_string(), "#rust".to_string(), "&more".to_string(), "Bob's".to_string()];
        let frontmatter = render_frontmatter(&post);
        assert!(frontmatter.ends_with("tags:\n- 'Tips: Rust'\n- '#rust'\n- '&more'\n- 'Bob''s'\n---\n"), "{}", frontmatter);
    }

    #[test]
    fn test_render_frontmatter_without_optional_fields() {
        let mut post = sample_post(PostPaths {
            post_file: PathBuf::from("x.md"),
            comments_file: PathBuf::from("x-comments.md"),
        });
        post.alias = None;
        post.tags.clear();
        post.draft = false;
        assert_eq!(render_frontmatter(&post), "---\ntitle: 'It''s here'\ndate: 2011-04-05T21:13:00.001-07:00\ndraft: false\n---\n");
    }

    #[test]
    fn test_render_comments() {
        let comments = vec![sample_comment(Some("Great"), "Ann"), sample_comment(None, "Bob")];
        let rendered = render_comments(&comments, "%b %-d, %Y");
        assert_eq!(rendered, r#"#### Great
[Ann](http://example.com "noreply@blogger.com") - <time datetime="2011-04-06T08:00:00.000-07:00">Apr 6, 2011</time>

Nice post
<hr />
#### [Bob](http://example.com "noreply@blogger.com") - <time datetime="2011-04-06T08:00:00.000-07:00">Apr 6, 2011</time>

Nice post
<hr />
"#);
    }

    #[test]
    fn test_write_separate_comments() {
        let dir = tempfile::tempdir().unwrap();
        let mut post = sample_post(post_paths(dir.path(), "its-here", true).unwrap());
        post.comments.push(sample_comment(None, "Bob"));

        let mut writer = OutputWriter::new(CommentMode::Separate, "%Y");
        writer.write_post(&post);

        let body = fs::read_to_string(dir.path().join("its-here/index.md")).unwrap();
        assert!(body.ends_with("---\n\nBody **text**\n"));
        assert!(!body.contains("### Comments:"));

        let comments = fs::read_to_string(dir.path().join("its-here/comments.md")).unwrap();
        assert!(comments.starts_with("---\ntitle: 'It''s here'\n"));
        assert!(comments.contains("---\n\n#### [Bob]"));
        assert_eq!(writer.stats(), WriteStats { posts: 1, comment_files: 1, failures: 0 });
    }

    #[test]
    fn test_write_merged_comments() {
        let dir = tempfile::tempdir().unwrap();
        let mut post = sample_post(post_paths(dir.path(), "its-here", false).unwrap());
        post.comments.push(sample_comment(Some("first"), "Ann"));
        post.comments.push(sample_comment(Some("second"), "Bob"));

        let mut writer = OutputWriter::new(CommentMode::Merge, "%Y");
        writer.write_post(&post);

        let body = fs::read_to_string(dir.path().join("its-here.md")).unwrap();
        let heading = body.find("\n---\n### Comments:\n").unwrap();
        let first = body.find("#### first").unwrap();
        let second = body.find("#### second").unwrap();
        assert!(body.find("Body **text**").unwrap() < heading);
        assert!(heading < first && first < second);
        assert!(!dir.path().join("its-here-comments.md").exists());
        assert_eq!(writer.stats(), WriteStats { posts: 1, comment_files: 0, failures: 0 });
    }

    #[test]
    fn test_write_failure_is_counted() {
        let dir = tempfile::tempdir().unwrap();
        let post = sample_post(PostPaths {
            post_file: dir.path().join("missing").join("x.md"),
            comments_file: dir.path().join("missing").join("x-comments.md"),
        });

        let mut writer = OutputWriter::new(CommentMode::Separate, "%Y");
        writer.write_post(&post);
        assert_eq!(writer.stats(), WriteStats { posts: 0, comment_files: 0, failures: 1 });
    }
}
