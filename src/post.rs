use std::fmt;
use std::fmt::{Display, Formatter};

use crate::content::assets::AssetContext;
use crate::output::PostPaths;

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct PostId(pub String);

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Only Blogger comments carry a title
    pub title: Option<String>,
    pub author: Author,
    pub published: String,
    pub content: String,
}

#[derive(Debug)]
pub struct Post {
    pub id: PostId,
    /// Already escaped for a single-quoted frontmatter value
    pub title: String,
    pub published: String,
    pub draft: bool,
    /// Host-relative URL of the original post (Blogger only)
    pub alias: Option<String>,
    pub tags: Vec<String>,
    pub content: String,
    pub comments: Vec<Comment>,
    pub paths: PostPaths,
    pub assets: AssetContext,
}

impl Post {
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return;
        }
        self.tags.push(tag.to_string());
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, date={}, draft={}, tags=[{}], comments={}, title='{}'",
               self.id,
               self.published,
               self.draft,
               self.tags.join(", "),
               self.comments.len(),
               self.title,
        )
    }
}

/// Single quotes are doubled so the title survives inside `title: '...'`
pub fn escape_title(title: &str) -> String {
    title.trim().replace('\'', "''")
}
