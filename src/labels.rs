//! Label batching and the print queue.
//!
//! The backend renders every label document; this module only decides
//! membership and sequencing. A selection destined for 4-up sheets is
//! partitioned into groups of four in selection order. Each sheet in a
//! print run is fetched independently, spooled to disk as HTML, and
//! handed to the platform viewer; its success or failure is reported on
//! its own, so one blocked sheet never aborts the rest of the run.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, warn};

use crate::api::ApiClient;

/// Labels per 4-up sheet - the physical page holds four address labels.
pub const SHEET_SIZE: usize = 4;

/// Delay between successive sheet openings in a print-all run.
/// Opening viewers back-to-back races the previous launch on some
/// desktops; 800ms apart keeps every sheet visible.
pub const SHEET_STAGGER: Duration = Duration::from_millis(800);

/// Subdirectory of the data dir where fetched label documents land
const SPOOL_DIR: &str = "labels";

/// Which server-side label layout to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelType {
    /// Small A6 label for plain envelopes
    Minimal,
    /// Full-page A4 label
    Single,
    /// Four labels per A4 page
    FourUp,
}

impl LabelType {
    /// Wire spelling used by the bulk label endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelType::Minimal => "minimal",
            LabelType::Single => "single",
            LabelType::FourUp => "4up",
        }
    }
}

impl std::fmt::Display for LabelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelType::Minimal => write!(f, "Minimal (A6)"),
            LabelType::Single => write!(f, "Full page (A4)"),
            LabelType::FourUp => write!(f, "4-up (A4)"),
        }
    }
}

/// Partition a selection into 4-up sheet batches, preserving selection
/// order. The last batch may be short.
pub fn partition_batches(ids: &[String]) -> Vec<Vec<String>> {
    ids.chunks(SHEET_SIZE).map(|chunk| chunk.to_vec()).collect()
}

/// Result of one sheet in a print run, reported independently.
#[derive(Debug)]
pub struct SheetOutcome {
    /// 1-based sheet number within the run
    pub index: usize,
    /// Total sheets in the run
    pub total: usize,
    /// Spooled document path on success, user-facing message on failure
    pub result: Result<PathBuf, String>,
}

/// Fetch one 4-up sheet, spool it, and open the viewer. Never returns
/// an Err - the outcome carries the failure so the caller can report it
/// per-sheet and keep the run going.
pub async fn print_sheet(
    api: &ApiClient,
    ids: &[String],
    data_dir: &Path,
    index: usize,
    total: usize,
) -> SheetOutcome {
    let result = fetch_and_open_sheet(api, ids, data_dir, index).await;
    if let Err(ref e) = result {
        warn!(sheet = index, total, error = %e, "Label sheet failed");
    }
    SheetOutcome {
        index,
        total,
        result: result.map_err(|e| format!("Sheet {}/{}: {:#}", index, total, e)),
    }
}

async fn fetch_and_open_sheet(
    api: &ApiClient,
    ids: &[String],
    data_dir: &Path,
    index: usize,
) -> Result<PathBuf> {
    let html = api.fetch_label_sheet(ids).await?;
    let path = spool_document(data_dir, &format!("sheet-{}", index), &html)?;
    open_viewer(&path)?;
    Ok(path)
}

/// Fetch the document for a selection that does not need partitioning:
/// one record uses the single-record endpoint, several use the bulk
/// endpoint (one document, server-side layout), and a 4-up request for
/// up to four records uses the sheet endpoint.
pub async fn render_selection(
    api: &ApiClient,
    ids: &[String],
    label_type: LabelType,
) -> Result<String> {
    match label_type {
        LabelType::FourUp => api.fetch_label_sheet(ids).await,
        LabelType::Minimal | LabelType::Single => {
            if ids.len() == 1 {
                api.fetch_label(label_type, &ids[0]).await
            } else {
                api.fetch_labels_bulk(ids, label_type).await
            }
        }
    }
}

/// Write a label document to the spool directory and return its path
pub fn spool_document(data_dir: &Path, file_stem: &str, html: &str) -> Result<PathBuf> {
    let spool = data_dir.join(SPOOL_DIR);
    std::fs::create_dir_all(&spool).context("Failed to create label spool directory")?;

    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let path = spool.join(format!("{}-{}.html", stamp, file_stem));
    std::fs::write(&path, html)
        .with_context(|| format!("Failed to write label document {}", path.display()))?;

    debug!(path = %path.display(), "Label document spooled");
    Ok(path)
}

/// Hand a spooled document to the platform viewer for printing
pub fn open_viewer(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = Command::new("open");
        c.arg(path);
        c
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    };

    command
        .spawn()
        .with_context(|| format!("Could not open viewer for {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("id{}", i)).collect()
    }

    #[test]
    fn test_partition_ten_gives_4_4_2() {
        let batches = partition_batches(&ids(10));
        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_partition_group_count_and_sizes() {
        for n in 0..=25 {
            let batches = partition_batches(&ids(n));
            assert_eq!(batches.len(), n.div_ceil(SHEET_SIZE));
            for (i, batch) in batches.iter().enumerate() {
                if i + 1 < batches.len() {
                    assert_eq!(batch.len(), SHEET_SIZE);
                } else {
                    assert!(batch.len() <= SHEET_SIZE);
                    assert!(!batch.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_partition_multiple_of_four_has_full_last_group() {
        let batches = partition_batches(&ids(8));
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].len(), 4);
    }

    #[test]
    fn test_partition_preserves_selection_order() {
        let input = ids(9);
        let batches = partition_batches(&input);
        let flattened: Vec<String> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, input);
    }

    #[test]
    fn test_partition_small_selection_is_one_group() {
        for n in 1..=4 {
            assert_eq!(partition_batches(&ids(n)).len(), 1);
        }
        assert!(partition_batches(&ids(0)).is_empty());
    }

    #[test]
    fn test_spool_document_writes_html() {
        let dir = std::env::temp_dir().join(format!("cardtrack-test-{}", std::process::id()));
        let path = spool_document(&dir, "sheet-1", "<html>labels</html>").unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "<html>labels</html>");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
