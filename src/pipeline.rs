//! Runs a whole consolidation: load references, find sales files, aggregate, write reports

use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::{
    errors::Error,
    io::{self, FileOutcome},
    report::{self, format_amount},
    types::{Catalog, Salespeople},
};

/// Where the pipeline reads its inputs and writes its reports.
///
/// Relative file names are resolved against `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the inputs and receiving the reports
    pub data_dir: PathBuf,
    /// Products reference file
    pub products_file: PathBuf,
    /// Salespeople reference file
    pub salespeople_file: PathBuf,
    /// Transaction files are the files in `data_dir` whose names start with this
    pub sales_prefix: String,
    /// Salesperson report output
    pub salesperson_report: PathBuf,
    /// Product report output
    pub product_report: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./"),
            products_file: PathBuf::from("productos.txt"),
            salespeople_file: PathBuf::from("salesmenInfo.txt"),
            sales_prefix: String::from("ventas_"),
            salesperson_report: PathBuf::from("ReporteVendedores.csv"),
            product_report: PathBuf::from("ReporteProductos.csv"),
        }
    }
}

impl Config {
    /// The default file names, inside another directory
    #[must_use]
    pub fn with_data_dir<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Resolves a configured file name against the data directory
    #[must_use]
    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Scans the data directory for transaction files
    #[must_use]
    pub fn sales_files(&self) -> PrefixScan {
        PrefixScan::new(&self.data_dir, &self.sales_prefix)
    }
}

/// Somewhere to get the list of transaction files from
pub trait SalesFileSource {
    /// Lists the transaction files to aggregate, in processing order
    fn sales_files(&self) -> Result<Vec<PathBuf>, Error>;
}

/// A fixed list of transaction files
impl SalesFileSource for [PathBuf] {
    fn sales_files(&self) -> Result<Vec<PathBuf>, Error> {
        Ok(self.to_vec())
    }
}

impl SalesFileSource for Vec<PathBuf> {
    fn sales_files(&self) -> Result<Vec<PathBuf>, Error> {
        Ok(self.clone())
    }
}

/// Finds regular files in a directory whose names start with a prefix.
///
/// Files are returned sorted by name so runs over the same directory are repeatable.
#[derive(Debug, Clone)]
pub struct PrefixScan {
    dir: PathBuf,
    prefix: String,
}

impl PrefixScan {
    /// Creates a scan of `dir` for names starting with `prefix`
    #[must_use]
    pub fn new<P: Into<PathBuf>, S: Into<String>>(dir: P, prefix: S) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }
}

impl SalesFileSource for PrefixScan {
    fn sales_files(&self) -> Result<Vec<PathBuf>, Error> {
        let discover_error = |source: std::io::Error| Error::Discover {
            dir: self.dir.clone(),
            source,
        };
        let mut files = vec![];
        for entry in fs::read_dir(&self.dir).map_err(discover_error)? {
            let entry = entry.map_err(discover_error)?;
            let matches_prefix = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(&self.prefix));
            if matches_prefix && entry.path().is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Steps of a run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading the products and salespeople files
    LoadReferences,
    /// Listing the transaction files
    DiscoverFiles,
    /// Folding transaction files into the reference tables
    Aggregate,
    /// Writing both reports
    BuildReports,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::LoadReferences => "loading reference files",
            Stage::DiscoverFiles => "discovering sales files",
            Stage::Aggregate => "aggregating sales",
            Stage::BuildReports => "building reports",
        };
        f.write_str(name)
    }
}

/// Tags a fatal error with the stage it stopped
fn at(stage: Stage) -> impl FnOnce(Error) -> Error {
    move |source| Error::Stage {
        stage,
        source: Box::new(source),
    }
}

/// What a successful run did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Salespeople loaded from the reference file
    pub salespeople: usize,
    /// Products loaded from the reference file
    pub products: usize,
    /// Transaction files whose lines were applied
    pub files_aggregated: usize,
    /// Transaction files skipped as empty or headerless
    pub files_skipped: usize,
    /// Transaction files that failed to open or read
    pub files_failed: usize,
    /// Value of every unit sold at its unit price, or `None` if it is too large to total
    pub value_sold: Option<Decimal>,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} salespeople, {} products, {} sales files aggregated ({} skipped, {} failed), ",
            self.salespeople,
            self.products,
            self.files_aggregated,
            self.files_skipped,
            self.files_failed
        )?;
        match self.value_sold {
            Some(value) => write!(f, "{} sold", format_amount(value)),
            None => f.write_str("value sold too large to total"),
        }
    }
}

/// Folds every file into the tables. A failing file is logged and counted, never fatal.
fn aggregate_all(
    files: &[PathBuf],
    salespeople: &mut Salespeople,
    catalog: &mut Catalog,
    summary: &mut RunSummary,
) {
    for path in files {
        match io::aggregate_sales_file(path, salespeople, catalog) {
            Ok(FileOutcome::Aggregated(file)) => {
                info!(
                    "{}: {} sales applied, {} unknown products, {} malformed lines",
                    path.display(),
                    file.sales_applied,
                    file.unknown_products,
                    file.malformed_lines
                );
                summary.files_aggregated += 1;
            }
            Ok(FileOutcome::Skipped(reason)) => {
                warn!("{}: skipped, {reason:?}", path.display());
                summary.files_skipped += 1;
            }
            Err(err) => {
                warn!("{}: {err}", path.display());
                summary.files_failed += 1;
            }
        }
    }
}

/// Runs the pipeline, finding transaction files with `source`.
///
/// # Errors
/// [`Error::Stage`] if a reference file can't be read, the file list can't be built, or a
/// report can't be written. Problems with individual transaction files are only logged.
pub fn run_with_source<S>(config: &Config, source: &S) -> Result<RunSummary, Error>
where
    S: SalesFileSource + ?Sized,
{
    let mut summary = RunSummary::default();

    debug!("{}", Stage::LoadReferences);
    let mut salespeople = io::load_salespeople(config.resolve(&config.salespeople_file))
        .map_err(at(Stage::LoadReferences))?;
    let mut catalog = io::load_products(config.resolve(&config.products_file))
        .map_err(at(Stage::LoadReferences))?;
    summary.salespeople = salespeople.len();
    summary.products = catalog.len();

    debug!("{}", Stage::DiscoverFiles);
    let files = source.sales_files().map_err(at(Stage::DiscoverFiles))?;

    debug!("{} from {} files", Stage::Aggregate, files.len());
    aggregate_all(&files, &mut salespeople, &mut catalog, &mut summary);
    summary.value_sold = catalog
        .iter()
        .try_fold(Decimal::ZERO, |value, product| {
            value.checked_add(product.total_sold()?)
        });

    debug!("{}", Stage::BuildReports);
    report::write_salesperson_report_to(config.resolve(&config.salesperson_report), &salespeople)
        .map_err(at(Stage::BuildReports))?;
    report::write_product_report_to(config.resolve(&config.product_report), &catalog)
        .map_err(at(Stage::BuildReports))?;

    info!("{summary}");
    Ok(summary)
}

/// Runs the pipeline over the transaction files found in the data directory.
///
/// # Errors
/// See [`run_with_source`]
pub fn run(config: &Config) -> Result<RunSummary, Error> {
    run_with_source(config, &config.sales_files())
}
