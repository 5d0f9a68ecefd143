use std::path::Path;
use std::{fs, io};

use spdlog::{error, info, warn};

use crate::config::Config;
use crate::content::assets::{AssetReport, AssetWriter};
use crate::content::markdown::MarkdownConverter;
use crate::import::{run_import, BodyConverter, ImportOptions, ImportSummary, Source};
use crate::output::{CommentMode, OutputWriter};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunReport {
    /// None when the export could not be read as the selected format
    pub import: Option<ImportSummary>,
    pub images: AssetReport,
}

/// An existing directory is reused and its files may be overwritten
pub fn prepare_output_dir(output_dir: &Path) -> io::Result<()> {
    if output_dir.exists() {
        warn!("Directory {} already exists, files may be overwritten", output_dir.display());
        return Ok(());
    }

    match fs::create_dir_all(output_dir) {
        Ok(_) => {
            info!("Created output directory {}", output_dir.display());
            Ok(())
        }
        Err(e) => Err(io::Error::new(e.kind(), format!("Error creating output directory {}: {}", output_dir.display(), e))),
    }
}

/// Converts one export file into the output directory.
/// Reading the input and creating the output directory are fatal; everything after is logged and counted.
pub fn import_run(source: Source, input: &Path, options: &ImportOptions, config: &Config) -> io::Result<RunReport> {
    prepare_output_dir(&options.output_dir)?;

    match options.comment_mode {
        CommentMode::Merge => info!("Comments requested to be merged along with posts. (m)"),
        CommentMode::Separate => info!("Comments go to separate files. Pass m to merge them into the posts"),
    }

    let xml = match fs::read_to_string(input) {
        Ok(xml) => xml,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error reading {}: {}", input.display(), e))),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mut assets = AssetWriter::new(runtime.handle().clone());
    let converter = MarkdownConverter::new(config.images.shortcode());
    let mut writer = OutputWriter::new(options.comment_mode, &config.comments.date_format);

    let result = {
        let mut body = BodyConverter { converter: &converter, assets: &mut assets };
        run_import(source, &xml, options, &mut body, &mut writer)
    };

    let import = match result {
        Ok(summary) => Some(summary),
        Err(e) => {
            error!("{}", e);
            None
        }
    };

    if assets.pending() > 0 {
        info!("Waiting for {} images", assets.pending());
    }
    let images = runtime.block_on(assets.finish());

    Ok(RunReport { import, images })
}
