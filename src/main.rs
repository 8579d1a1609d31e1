use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dnb_dpl_utils::config::Config;
use dnb_dpl_utils::db::Database;
use dnb_dpl_utils::db_storage::DataBlockStorage;
use dnb_dpl_utils::dnb_client::{DnbDplClient, GleifClient, RequestLimiter};
use dnb_dpl_utils::enrichment::{self, Destination, FetchSummary, Product};
use dnb_dpl_utils::input::{read_input_file, InputFile};
use dnb_dpl_utils::layout::Layout;
use dnb_dpl_utils::processing;
use dnb_dpl_utils::reference_data::{category_lines, code_lines, ReferenceDataResponse};

#[derive(Parser)]
#[command(name = "dnb-dpl", about = "D&B Direct+ fetch and flatten utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Flatten data blocks responses to pipe-delimited rows on stdout
    Flatten {
        #[arg(long, value_enum, default_value_t = Layout::AnaCredit)]
        layout: Layout,
        /// Directory holding the responses (defaults to DNB_DPL_OUT_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Read the responses from Postgres instead of files
        #[arg(long)]
        from_db: bool,
    },
    /// Flatten identity resolution responses to stdout
    FlattenIdr {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Request a product for every DUNS of the input file
    Fetch {
        #[arg(long, value_enum, default_value_t = ProductKind::DataBlocks)]
        product: ProductKind,
        /// DUNS list (defaults to DUNS.txt in DNB_DPL_IN_DIR)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Beneficial ownership product, cmpbol or cmpbos
        #[arg(long, default_value = "cmpbol")]
        product_id: String,
        #[arg(long, default_value_t = 2.5)]
        ownership_percentage: f64,
        #[arg(long)]
        exclude_branches: bool,
        /// Upsert the responses into products_dnb
        #[arg(long)]
        to_db: bool,
        /// Skip writing response files
        #[arg(long)]
        no_files: bool,
    },
    /// Run identity resolution for every row of the criteria file
    Idr {
        /// Criteria table (defaults to IDR.txt in DNB_DPL_IN_DIR)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Download LEI records from Gleif
    Lei {
        #[arg(long)]
        country: String,
        /// Registration authority entity id, e.g. RA000463
        #[arg(long)]
        registered_as: String,
        #[arg(long, default_value_t = 100)]
        page_size: u32,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List reference data categories, or the codes of one category
    RefData {
        #[arg(long)]
        category: Option<String>,
    },
    /// Manage the products_dnb table
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    Create,
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProductKind {
    DataBlocks,
    BeneficialOwner,
    FamilyTree,
}

fn duns_list(path: &Path) -> anyhow::Result<Vec<String>> {
    match read_input_file(path)? {
        InputFile::Duns(duns) => Ok(duns),
        InputFile::Criteria(_) => anyhow::bail!(
            "{} is not a DUNS list, its first line must be duns",
            path.display()
        ),
    }
}

/// Fails the run when no request got a response at all.
fn check_summary(summary: &FetchSummary) -> anyhow::Result<()> {
    tracing::info!(
        "✓ {} requested, {} succeeded, {} rejected, {} failed",
        summary.requested,
        summary.succeeded,
        summary.rejected,
        summary.failed
    );

    if summary.all_failed() {
        anyhow::bail!("all {} requests failed", summary.requested);
    }
    if summary.failed > 0 {
        tracing::warn!("⚠ {} of {} requests failed", summary.failed, summary.requested);
    }

    Ok(())
}

async fn storage(config: &Config) -> anyhow::Result<DataBlockStorage> {
    let db = Database::new(config.require_database_url()?).await?;
    Ok(DataBlockStorage::new(db.pool))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the rows, logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dnb_dpl_utils=info,dnb_dpl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Flatten {
            layout,
            dir,
            from_db,
        } => {
            let plan = layout.plan();
            if from_db {
                let storage = storage(&config).await?;
                processing::process_store(&storage, &plan, std::io::stdout()).await?;
            } else {
                let dir = dir.unwrap_or_else(|| config.out_dir.clone());
                processing::process_directory(&dir, &plan, std::io::stdout().lock())?;
            }
        }
        Command::FlattenIdr { dir } => {
            let dir = dir.unwrap_or_else(|| config.out_dir.clone());
            processing::process_idr_directory(&dir, std::io::stdout().lock())?;
        }
        Command::Fetch {
            product,
            input,
            product_id,
            ownership_percentage,
            exclude_branches,
            to_db,
            no_files,
        } => {
            let input = input.unwrap_or_else(|| config.in_dir.join("DUNS.txt"));
            let duns = duns_list(&input)?;
            tracing::info!("Fetching {} DUNS from {}", duns.len(), input.display());

            let product = match product {
                ProductKind::DataBlocks => Product::DataBlocks {
                    block_ids: config.block_ids.clone(),
                    trade_up: config.trade_up.clone(),
                },
                ProductKind::BeneficialOwner => Product::BeneficialOwner {
                    product_id,
                    ownership_percentage,
                },
                ProductKind::FamilyTree => Product::FullFamilyTree { exclude_branches },
            };

            let client =
                DnbDplClient::from_config(&config, RequestLimiter::per_second(config.rate_limit)?)?;

            if !no_files {
                tokio::fs::create_dir_all(&config.out_dir).await?;
            }
            let storage = if to_db {
                let storage = storage(&config).await?;
                storage.create_table().await?;
                Some(storage)
            } else {
                None
            };

            let dest = Destination {
                out_dir: (!no_files).then_some(config.out_dir.as_path()),
                storage: storage.as_ref(),
            };
            let summary = enrichment::fetch_products(&client, &product, &duns, &dest).await;
            check_summary(&summary)?;
        }
        Command::Idr { input } => {
            let input = input.unwrap_or_else(|| config.in_dir.join("IDR.txt"));
            let rows = match read_input_file(&input)? {
                InputFile::Criteria(rows) => rows,
                InputFile::Duns(_) => {
                    anyhow::bail!("{} holds DUNS, not match criteria", input.display())
                }
            };

            let client =
                DnbDplClient::from_config(&config, RequestLimiter::per_second(config.rate_limit)?)?;
            tokio::fs::create_dir_all(&config.out_dir).await?;
            let summary =
                enrichment::fetch_identity_resolution(&client, &rows, &config.out_dir).await;
            check_summary(&summary)?;
        }
        Command::Lei {
            country,
            registered_as,
            page_size,
            page,
        } => {
            let client = GleifClient::new(
                &config.gleif_base_url,
                RequestLimiter::per_second(config.rate_limit)?,
            );
            let response = client
                .lei_records(&country, &registered_as, page_size, page)
                .await?;
            if !response.is_success() {
                anyhow::bail!("Gleif returned status {}", response.status);
            }
            writeln!(&mut std::io::stdout(), "{}", response.body)?;
        }
        Command::RefData { category } => {
            let client =
                DnbDplClient::from_config(&config, RequestLimiter::per_second(config.rate_limit)?)?;
            let response = match category.as_deref() {
                Some(id) => client.reference_category(id).await?,
                None => client.reference_categories().await?,
            };
            if !response.is_success() {
                anyhow::bail!("D&B Direct+ returned status {}", response.status);
            }

            let resp = ReferenceDataResponse::from_json(&response.body)?;
            let lines = match category {
                Some(_) => code_lines(&resp),
                None => category_lines(&resp),
            };
            let mut out = std::io::stdout().lock();
            for line in lines {
                writeln!(out, "{}", line)?;
            }
        }
        Command::Store { action } => {
            let storage = storage(&config).await?;
            match action {
                StoreAction::Create => {
                    storage.create_table().await?;
                    tracing::info!("✓ Table products_dnb available");
                }
                StoreAction::Clear => {
                    let deleted = storage.delete_all().await?;
                    tracing::info!("✓ Deleted {} stored responses", deleted);
                }
            }
        }
    }

    Ok(())
}
