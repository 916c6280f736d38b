use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, instrument};

use crate::application::AppError;
use crate::domain::{Ledger, Transaction};

/// Default data file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "ledger_data.json";

/// File-backed store for a ledger: one JSON array of transactions.
///
/// Saves go to a sibling temporary file that is then renamed over the data
/// file, so the file on disk is always either the old or the new ledger.
pub struct JsonStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        Self {
            path,
            tmp_path: PathBuf::from(tmp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger. A missing file is an empty ledger; an unreadable or
    /// malformed file is an error.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Ledger, AppError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No data file found, starting with an empty ledger");
                return Ok(Ledger::new());
            }
            Err(err) => return Err(AppError::io(&self.path, err)),
        };

        let transactions =
            read_transactions(BufReader::new(file)).map_err(|e| AppError::malformed(&self.path, e))?;
        let ledger = Ledger::from_transactions(transactions)?;

        debug!(count = ledger.len(), "Ledger loaded");
        Ok(ledger)
    }

    /// Overwrite the data file with the full ledger.
    #[instrument(skip(self, ledger), fields(path = %self.path.display()))]
    pub fn save(&self, ledger: &Ledger) -> Result<(), AppError> {
        let file = File::create(&self.tmp_path).map_err(|e| AppError::io(&self.tmp_path, e))?;
        let mut writer = BufWriter::new(file);

        write_transactions(&mut writer, ledger.transactions()).map_err(|e| {
            AppError::io(&self.tmp_path, std::io::Error::from(e))
        })?;
        writer
            .flush()
            .and_then(|_| writer.get_ref().sync_all())
            .map_err(|e| AppError::io(&self.tmp_path, e))?;

        fs::rename(&self.tmp_path, &self.path).map_err(|e| AppError::io(&self.path, e))?;

        debug!(count = ledger.len(), "Ledger saved");
        Ok(())
    }
}

/// Write transactions as a pretty-printed JSON array (4-space indent), in order.
pub fn write_transactions<W: Write>(
    mut writer: W,
    transactions: &[Transaction],
) -> serde_json::Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    transactions.serialize(&mut serializer)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)
}

/// Read a JSON array of transactions, keeping file order.
pub fn read_transactions<R: Read>(reader: R) -> serde_json::Result<Vec<Transaction>> {
    serde_json::from_reader(reader)
}
