use std::path::{Path, PathBuf};

use anyhow::Result;
use spdlog::{debug, error, info};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Where the images of one post go: `<post file without .md><sequence>.<ext>`.
/// The sequence starts at 0 for every post and grows with every extracted image.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetContext {
    prefix: PathBuf,
    sequence: u32,
}

impl AssetContext {
    pub fn for_post_file(post_file: &Path) -> AssetContext {
        AssetContext {
            prefix: post_file.with_extension(""),
            sequence: 0,
        }
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn next_path(&mut self, extension: &str) -> PathBuf {
        self.sequence += 1;
        let mut name = self.prefix.clone().into_os_string();
        name.push(format!("{}.{}", self.sequence, extension));
        PathBuf::from(name)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AssetReport {
    pub saved: usize,
    pub failed: usize,
}

/// Schedules image writes and downloads without blocking the caller.
/// Nothing is guaranteed on disk until `finish` has been awaited.
pub struct AssetWriter {
    runtime: Handle,
    client: reqwest::Client,
    pending: Vec<JoinHandle<bool>>,
}

impl AssetWriter {
    pub fn new(runtime: Handle) -> AssetWriter {
        AssetWriter {
            runtime,
            client: reqwest::Client::new(),
            pending: vec![],
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn save(&mut self, path: PathBuf, bytes: Vec<u8>) {
        debug!("Scheduling write of {} bytes to {}", bytes.len(), path.display());
        let task = self.runtime.spawn(async move {
            match tokio::fs::write(&path, &bytes).await {
                Ok(_) => {
                    info!("Image written to {}", path.display());
                    true
                }
                Err(e) => {
                    error!("Error writing image {} - {}", path.display(), e);
                    false
                }
            }
        });
        self.pending.push(task);
    }

    pub fn download(&mut self, url: String, path: PathBuf) {
        debug!("Scheduling download of {} to {}", url, path.display());
        let client = self.client.clone();
        let task = self.runtime.spawn(async move {
            match fetch_to_file(&client, &url, &path).await {
                Ok(size) => {
                    info!("File downloaded! {} -> {} ({} bytes)", url, path.display(), size);
                    true
                }
                Err(e) => {
                    error!("Error downloading {} - {}", url, e);
                    false
                }
            }
        });
        self.pending.push(task);
    }

    pub async fn finish(self) -> AssetReport {
        let mut report = AssetReport::default();
        for task in self.pending {
            match task.await {
                Ok(true) => report.saved += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    error!("Image task did not complete: {}", e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}

async fn fetch_to_file(client: &reqwest::Client, url: &str, path: &Path) -> Result<usize> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    tokio::fs::write(path, &bytes).await?;
    Ok(bytes.len())
}
