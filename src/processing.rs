//! Batch flattening of persisted responses into pipe-delimited lines.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cell::{render_header, render_row, Cell};
use crate::db_storage::DataBlockStorage;
use crate::errors::{AppError, ResultExt};
use crate::identity_resolution::{idr_header, idr_row, IdrResponse};
use crate::layout::{AssembledRow, ColumnPlan};
use crate::models::DataBlocks;

/// File name fragments of products that are not data blocks responses.
pub const NON_DATA_BLOCK_PRODUCTS: [&str; 3] = ["dnb_dpl_cmpbo", "dnb_dpl_full_fam", "dpl_idr"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub data_rows: usize,
    pub error_rows: usize,
    /// Documents that could not be decoded or had an empty body.
    pub skipped: usize,
}

/// `*.json` files in `dir` accepted by `include`, sorted by file name.
pub fn json_files(dir: &Path, include: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, AppError> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("reading directory {}", dir.display()))?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".json") && include(name) {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

fn is_data_blocks_file(name: &str) -> bool {
    !NON_DATA_BLOCK_PRODUCTS
        .iter()
        .any(|product| name.contains(product))
}

/// Writes the header once, ahead of the first row.
struct RowWriter<W: Write> {
    out: W,
    header: Vec<String>,
    header_written: bool,
    summary: ProcessSummary,
}

impl<W: Write> RowWriter<W> {
    fn new(out: W, header: Vec<String>) -> Self {
        Self {
            out,
            header,
            header_written: false,
            summary: ProcessSummary::default(),
        }
    }

    fn write_cells(&mut self, cells: &[Cell]) -> Result<(), AppError> {
        if !self.header_written {
            writeln!(self.out, "{}", render_header(&self.header))?;
            self.header_written = true;
        }
        writeln!(self.out, "{}", render_row(cells))?;

        Ok(())
    }

    fn write_document(&mut self, plan: &ColumnPlan, dbs: &DataBlocks) -> Result<(), AppError> {
        match plan.assemble(dbs) {
            Some(AssembledRow::Data(cells)) => {
                self.write_cells(&cells)?;
                self.summary.data_rows += 1;
            }
            Some(AssembledRow::Error(cells)) => {
                self.write_cells(&cells)?;
                self.summary.error_rows += 1;
            }
            None => {
                tracing::warn!("⚠ Document without organization or error, skipped");
                self.summary.skipped += 1;
            }
        }

        Ok(())
    }

    fn skip(&mut self, source: &str, err: &AppError) {
        tracing::error!("❌ {}: {}", source, err);
        self.summary.skipped += 1;
    }

    fn finish(mut self) -> Result<ProcessSummary, AppError> {
        self.out.flush()?;
        tracing::info!(
            "✓ {} data rows, {} error rows, {} skipped",
            self.summary.data_rows,
            self.summary.error_rows,
            self.summary.skipped
        );

        Ok(self.summary)
    }
}

/// Flattens every data blocks file in `dir` through `plan`.
///
/// Files of other products are ignored. Undecodable files are logged and
/// skipped; I/O failures on `out` abort.
pub fn process_directory<W: Write>(
    dir: &Path,
    plan: &ColumnPlan,
    out: W,
) -> Result<ProcessSummary, AppError> {
    let files = json_files(dir, is_data_blocks_file)?;
    if files.is_empty() {
        tracing::warn!("⚠ No data blocks files available in {}", dir.display());
    }

    let mut writer = RowWriter::new(out, plan.header());

    for path in files {
        let decoded = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))
            .and_then(|json| DataBlocks::from_json(&json));

        match decoded {
            Ok(dbs) => writer.write_document(plan, &dbs)?,
            Err(e) => writer.skip(&path.display().to_string(), &e),
        }
    }

    writer.finish()
}

/// Flattens every response stored in `products_dnb` through `plan`.
pub async fn process_store<W: Write>(
    storage: &DataBlockStorage,
    plan: &ColumnPlan,
    out: W,
) -> Result<ProcessSummary, AppError> {
    let products = storage.fetch_all().await?;
    let mut writer = RowWriter::new(out, plan.header());

    for product in products {
        let Some(dbs) = product.dbs else {
            writer.skip(
                &product.duns,
                &AppError::ParseError("no data blocks stored".to_string()),
            );
            continue;
        };

        match DataBlocks::from_value(dbs) {
            Ok(dbs) => writer.write_document(plan, &dbs)?,
            Err(e) => writer.skip(&product.duns, &e),
        }
    }

    writer.finish()
}

/// Flattens every identity resolution response file in `dir`.
pub fn process_idr_directory<W: Write>(dir: &Path, out: W) -> Result<ProcessSummary, AppError> {
    let files = json_files(dir, |name| name.contains("dpl_idr"))?;
    let mut writer = RowWriter::new(out, idr_header());

    for path in files {
        let decoded = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))
            .and_then(|json| IdrResponse::from_json(&json));

        match decoded {
            Ok(resp) => {
                writer.write_cells(&idr_row(&resp))?;
                if resp.match_candidates.is_empty() && resp.error.is_some() {
                    writer.summary.error_rows += 1;
                } else {
                    writer.summary.data_rows += 1;
                }
            }
            Err(e) => writer.skip(&path.display().to_string(), &e),
        }
    }

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_filter() {
        assert!(is_data_blocks_file("dnb_dpl_ci_L2_123456789_2024-05-01.json"));
        assert!(!is_data_blocks_file("dnb_dpl_cmpbol_123456789_2024-05-01.json"));
        assert!(!is_data_blocks_file("dnb_dpl_full_fam_tree_123456789_2024-05-01.json"));
        assert!(!is_data_blocks_file("dpl_idr_row_1.json"));
    }
}
