//! Consolidated export of every stored order.
//!
//! The export is a snapshot: one line per order across all date partitions,
//! each tagged with its source date, no header. The whole file is built in
//! memory and committed with a single rename, so a failed run leaves any
//! previous export untouched.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use flooring_orders::marshal_for_export;

use crate::fs::write_atomically;
use crate::order_store::{OrderStore, StoreError};

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Date partitions read.
    pub partitions: usize,
    /// Orders written.
    pub orders: usize,
    pub target: PathBuf,
}

/// Export every order in `store` to `target`, replacing any previous export.
///
/// Fails fast: the first partition that cannot be read aborts the export
/// before anything is written.
pub fn export_all<S>(store: &S, target: impl AsRef<Path>) -> Result<ExportSummary, StoreError>
where
    S: OrderStore + ?Sized,
{
    let target = target.as_ref();
    let dates = store.dates()?;

    let mut buf = String::new();
    let mut orders = 0usize;
    for &date in &dates {
        let partition = store.read_all(date)?;
        debug!(%date, orders = partition.len(), "exporting partition");
        for order in &partition {
            buf.push_str(&marshal_for_export(order, date));
            buf.push('\n');
        }
        orders += partition.len();
    }

    write_atomically(target, buf.as_bytes())
        .map_err(|e| StoreError::persistence(format!("writing export {}", target.display()), e))?;

    let summary = ExportSummary {
        partitions: dates.len(),
        orders,
        target: target.to_path_buf(),
    };
    info!(
        partitions = summary.partitions,
        orders = summary.orders,
        target = %target.display(),
        "export written"
    );
    Ok(summary)
}
