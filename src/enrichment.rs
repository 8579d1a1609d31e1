/// D&B Direct+ enrichment of a list of DUNS
///
/// This module drives the fetch side of the tool:
/// 1. Request the configured product for every DUNS (rate limited by the client)
/// 2. Name the response after product, DUNS, date and (non-200) status
/// 3. Persist the raw body to the output directory and/or Postgres
///
/// A failing DUNS is logged and counted, it never stops the batch.
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::db_storage::DataBlockStorage;
use crate::dnb_client::{ApiResponse, DnbDplClient};
use crate::errors::{AppError, ResultExt};
use crate::input::Criteria;

/// Prefix of every D&B Direct+ product file.
pub const FILE_PREFIX: &str = "dnb_dpl_";
/// Prefix of identity resolution response files.
pub const IDR_FILE_PREFIX: &str = "dpl_idr_";

/// What to request for each DUNS.
#[derive(Debug, Clone, PartialEq)]
pub enum Product {
    DataBlocks {
        block_ids: Vec<String>,
        trade_up: Option<String>,
    },
    /// `cmpbol` or `cmpbos`.
    BeneficialOwner {
        product_id: String,
        ownership_percentage: f64,
    },
    FullFamilyTree {
        exclude_branches: bool,
    },
}

/// Where responses go.
#[derive(Default)]
pub struct Destination<'a> {
    pub out_dir: Option<&'a Path>,
    pub storage: Option<&'a DataBlockStorage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub requested: usize,
    /// 2xx responses.
    pub succeeded: usize,
    /// Non-2xx responses (persisted as well).
    pub rejected: usize,
    /// Transport or persistence failures.
    pub failed: usize,
}

impl FetchSummary {
    /// True when requests were made and none of them got a response.
    pub fn all_failed(&self) -> bool {
        self.requested > 0 && self.failed == self.requested
    }
}

/// Two-letter code of a data block in file names, e.g. `ci` for `companyinfo`.
pub fn block_short_name(block: &str) -> Option<&'static str> {
    let short = match block {
        "companyinfo" => "ci",
        "principalscontacts" => "pc",
        "hierarchyconnections" => "hc",
        "financialstrengthinsight" => "fs",
        "paymentinsight" => "pi",
        "eventfilings" => "ef",
        "companyfinancials" => "cf",
        "globalfinancials" => "gf",
        "esginsight" => "ei",
        "ownershipinsight" => "oi",
        "globalbusinessranking" => "br",
        "businessactivityinsight" => "ba",
        "diversityinsight" => "di",
        "dtri" => "dt",
        "externaldisruptioninsight" => "ed",
        "inquiryinsight" => "ii",
        "salesmarketinginsight" => "sm",
        "shippinginsight" => "si",
        _ => return None,
    };

    Some(short)
}

/// `ci_L2_pc_L2_hc_L1` for `companyinfo_L2_v1,principalscontacts_L2_v2,...`.
fn blocks_file_part(block_ids: &[String]) -> String {
    block_ids
        .iter()
        .map(|block_id| {
            let mut parts = block_id.split('_');
            let name = parts.next().unwrap_or_default();
            let short = block_short_name(name).unwrap_or(name);
            match parts.next() {
                Some(level) => format!("{}_{}", short, level),
                None => short.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("_")
}

fn with_status(base: String, status: u16) -> String {
    if status == 200 {
        format!("{}.json", base)
    } else {
        format!("{}_{}.json", base, status)
    }
}

/// File name of a product response, e.g.
/// `dnb_dpl_ci_L2_hc_L1_123456789_2024-05-01.json`. A status other than
/// 200 is appended before the extension.
pub fn product_file_name(product: &Product, duns: &str, date: &str, status: u16) -> String {
    let product_part = match product {
        Product::DataBlocks { block_ids, .. } => blocks_file_part(block_ids),
        Product::BeneficialOwner { product_id, .. } => product_id.clone(),
        Product::FullFamilyTree { .. } => "full_fam_tree".to_string(),
    };

    with_status(
        format!("{}{}_{}_{}", FILE_PREFIX, product_part, duns, date),
        status,
    )
}

/// File name of an identity resolution response.
pub fn idr_file_name(reference: &str, status: u16) -> String {
    with_status(format!("{}{}", IDR_FILE_PREFIX, reference), status)
}

async fn request(
    client: &DnbDplClient,
    product: &Product,
    duns: &str,
) -> Result<ApiResponse, AppError> {
    match product {
        Product::DataBlocks {
            block_ids,
            trade_up,
        } => client.data_blocks(duns, block_ids, trade_up.as_deref()).await,
        Product::BeneficialOwner {
            product_id,
            ownership_percentage,
        } => {
            client
                .beneficial_owner(duns, product_id, *ownership_percentage)
                .await
        }
        Product::FullFamilyTree { exclude_branches } => {
            client.full_family_tree(duns, *exclude_branches).await
        }
    }
}

async fn write_file(out_dir: &Path, file_name: &str, body: &str) -> Result<PathBuf, AppError> {
    let path = out_dir.join(file_name);
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    Ok(path)
}

async fn persist(
    dest: &Destination<'_>,
    product: &Product,
    duns: &str,
    date: &str,
    response: &ApiResponse,
) -> Result<(), AppError> {
    if let Some(out_dir) = dest.out_dir {
        let file_name = product_file_name(product, duns, date, response.status);
        let path = write_file(out_dir, &file_name, &response.body).await?;
        tracing::debug!("✓ Wrote {}", path.display());
    }

    if let Some(storage) = dest.storage {
        let dbs = serde_json::from_str(&response.body)
            .unwrap_or_else(|_| Value::String(response.body.clone()));
        let status = i16::try_from(response.status).unwrap_or(i16::MAX);
        storage
            .upsert(duns, &dbs, Utc::now().timestamp_millis(), status)
            .await?;
    }

    Ok(())
}

/// Requests `product` for every DUNS and persists each response.
pub async fn fetch_products(
    client: &DnbDplClient,
    product: &Product,
    duns_list: &[String],
    dest: &Destination<'_>,
) -> FetchSummary {
    let date = Utc::now().format("%Y-%m-%d").to_string();
    let mut summary = FetchSummary::default();

    for duns in duns_list {
        summary.requested += 1;

        let response = match request(client, product, duns).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("❌ DUNS {}: {}", duns, e);
                summary.failed += 1;
                continue;
            }
        };

        tracing::info!("DUNS: {} ➡️ status: {}", duns, response.status);

        if let Err(e) = persist(dest, product, duns, &date, &response).await {
            tracing::error!("❌ DUNS {}: {}", duns, e);
            summary.failed += 1;
            continue;
        }

        if response.is_success() {
            summary.succeeded += 1;
        } else {
            summary.rejected += 1;
        }
    }

    tracing::info!(
        "✓ Fetched {} DUNS: {} ok, {} rejected, {} failed",
        summary.requested,
        summary.succeeded,
        summary.rejected,
        summary.failed
    );

    summary
}

/// Runs identity resolution for every criteria row, writing one file per
/// row named after `customerReference5` (or `row_<n>`).
pub async fn fetch_identity_resolution(
    client: &DnbDplClient,
    rows: &[Criteria],
    out_dir: &Path,
) -> FetchSummary {
    let mut summary = FetchSummary::default();

    for (idx, criteria) in rows.iter().enumerate() {
        summary.requested += 1;

        let reference = criteria
            .iter()
            .find(|(name, value)| name == "customerReference5" && !value.is_empty())
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| format!("row_{}", idx + 1));

        let response = match client.cleanse_match(criteria).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("❌ Identity resolution {}: {}", reference, e);
                summary.failed += 1;
                continue;
            }
        };

        let file_name = idr_file_name(&reference, response.status);
        match write_file(out_dir, &file_name, &response.body).await {
            Ok(_) => {
                tracing::info!("✓ Wrote file {}", file_name);
                if response.is_success() {
                    summary.succeeded += 1;
                } else {
                    summary.rejected += 1;
                }
            }
            Err(e) => {
                tracing::error!("❌ {}", e);
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_ids() -> Vec<String> {
        vec![
            "companyinfo_L2_v1".to_string(),
            "principalscontacts_L2_v2".to_string(),
            "hierarchyconnections_L1_v1".to_string(),
        ]
    }

    #[test]
    fn test_data_blocks_file_name() {
        let product = Product::DataBlocks {
            block_ids: block_ids(),
            trade_up: None,
        };
        assert_eq!(
            product_file_name(&product, "123456789", "2024-05-01", 200),
            "dnb_dpl_ci_L2_pc_L2_hc_L1_123456789_2024-05-01.json"
        );
        assert_eq!(
            product_file_name(&product, "123456789", "2024-05-01", 404),
            "dnb_dpl_ci_L2_pc_L2_hc_L1_123456789_2024-05-01_404.json"
        );
    }

    #[test]
    fn test_other_product_file_names() {
        let bo = Product::BeneficialOwner {
            product_id: "cmpbol".to_string(),
            ownership_percentage: 2.5,
        };
        assert_eq!(
            product_file_name(&bo, "123456789", "2024-05-01", 200),
            "dnb_dpl_cmpbol_123456789_2024-05-01.json"
        );
        let tree = Product::FullFamilyTree {
            exclude_branches: false,
        };
        assert_eq!(
            product_file_name(&tree, "123456789", "2024-05-01", 200),
            "dnb_dpl_full_fam_tree_123456789_2024-05-01.json"
        );
        assert_eq!(idr_file_name("row_3", 200), "dpl_idr_row_3.json");
    }

    #[test]
    fn test_all_failed_summary() {
        let mut summary = FetchSummary {
            requested: 2,
            failed: 2,
            ..Default::default()
        };
        assert!(summary.all_failed());

        summary.failed = 1;
        summary.rejected = 1;
        assert!(!summary.all_failed());

        assert!(!FetchSummary::default().all_failed());
    }
}
