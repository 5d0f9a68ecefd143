use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::{fmt, io};

use clap::ValueEnum;
use spdlog::{error, info};

use crate::content::assets::{AssetContext, AssetWriter};
use crate::content::markdown::MarkdownConverter;
use crate::output::{CommentMode, OutputWriter, WriteStats};
use crate::post::{Post, PostId};
use crate::xml_tree::parse_document;

pub mod blogger;
pub mod wordpress;

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum Source {
    /// Blogger Atom export
    #[value(name = "b")]
    Blogger,
    /// WordPress WXR export
    #[value(name = "w")]
    WordPress,
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub output_dir: PathBuf,
    pub comment_mode: CommentMode,
    pub paragraph_fix: bool,
    pub page_bundles: bool,
}

pub const PARAGRAPH_FIX_FLAG: &str = "paragraph-fix";
pub const PAGE_BUNDLES_FLAG: &str = "create-page-bundles";

impl ImportOptions {
    /// Reads the words after the output directory: `[m|s] [paragraph-fix] [create-page-bundles]`.
    /// Only the first word selects the comment mode; the keywords may appear anywhere.
    /// Returns the words that meant nothing.
    pub fn from_flags(output_dir: PathBuf, flags: &[String]) -> (ImportOptions, Vec<String>) {
        let comment_mode = match flags.first().map(|f| f.as_str()) {
            Some("m") => CommentMode::Merge,
            _ => CommentMode::Separate,
        };

        let paragraph_fix = flags.iter().any(|f| f == PARAGRAPH_FIX_FLAG);
        let page_bundles = flags.iter().any(|f| f == PAGE_BUNDLES_FLAG);

        let unknown = flags.iter()
            .enumerate()
            .filter(|(idx, f)| !(*idx == 0 && (f.as_str() == "m" || f.as_str() == "s")))
            .filter(|(_, f)| f.as_str() != PARAGRAPH_FIX_FLAG && f.as_str() != PAGE_BUNDLES_FLAG)
            .map(|(_, f)| f.clone())
            .collect();

        let options = ImportOptions {
            output_dir,
            comment_mode,
            paragraph_fix,
            page_bundles,
        };

        (options, unknown)
    }
}

#[derive(Debug)]
pub enum ImportError {
    Parse(io::Error),
    UnexpectedRoot { expected: &'static str, found: String },
    OrphanComment { comment: String, post: PostId },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Parse(e) => write!(f, "Error parsing xml file: {}", e),
            ImportError::UnexpectedRoot { expected, found } => {
                write!(f, "Expected a <{}> document but found <{}>", expected, found)
            }
            ImportError::OrphanComment { comment, post } => {
                write!(f, "Comment {} replies to post {} which is not in the export", comment, post)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Posts pulled out of one export, ready to be written
#[derive(Debug, Default)]
pub struct Extracted {
    pub posts: Vec<Post>,
    pub skipped: usize,
    pub orphan_comments: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ImportSummary {
    pub posts: usize,
    pub skipped: usize,
    pub orphan_comments: usize,
    pub written: WriteStats,
}

/// HTML to Markdown for bodies and comments, routing extracted images to the writer
pub struct BodyConverter<'a> {
    pub converter: &'a MarkdownConverter,
    pub assets: &'a mut AssetWriter,
}

impl BodyConverter<'_> {
    pub fn to_markdown(&mut self, html: &str, ctx: &mut AssetContext) -> String {
        match self.converter.convert(html, ctx, self.assets) {
            Ok(markdown) => markdown,
            Err(e) => {
                error!("Error converting HTML to Markdown: {}", e);
                String::new()
            }
        }
    }
}

/// Parses the export, converts every post and writes the results.
/// Only a document that cannot be read as the selected format is an error.
pub fn run_import(source: Source, xml: &str, options: &ImportOptions, body: &mut BodyConverter,
                  writer: &mut OutputWriter) -> Result<ImportSummary, ImportError> {
    let root = parse_document(xml).map_err(ImportError::Parse)?;

    let extracted = match source {
        Source::Blogger => blogger::extract(&root, options, body)?,
        Source::WordPress => wordpress::extract(&root, options, body)?,
    };

    for post in extracted.posts.iter() {
        writer.write_post(post);
    }

    let summary = ImportSummary {
        posts: extracted.posts.len(),
        skipped: extracted.skipped,
        orphan_comments: extracted.orphan_comments,
        written: writer.stats(),
    };
    info!("Import finished: {} posts, {} skipped, {} orphan comments", summary.posts, summary.skipped, summary.orphan_comments);

    Ok(summary)
}
