//! Append-only audit trail of balance mutations
//!
//! Every balance mutation with a non-zero delta and a production reason
//! produces one JSON line; a coarser per-validator summary is emitted once
//! per accounting scope. The destination sits behind a small capability
//! trait so additional sinks can be added without touching ledger logic.
//!
//! # Wire format
//!
//! Mutation record, one per balance change:
//!
//! ```text
//! {"epoch":3,"slot":96,"parentRoot":"0x…","key":"0x…","delta":-42,"reason":"validatorSlashing"}
//! ```
//!
//! Summary record, one per validator per scope, netted total first, then
//! each non-zero per-reason delta in ordinal order:
//!
//! ```text
//! {"epoch":3,"slot":96,"index":"7","delta":58,"attesterAttestation":100,"validatorSlashing":-42}
//! ```

use crate::error::{Error, Result};
use crate::state::{Epoch, Slot, ValidatorIndex};
use balance_update::{BalanceUpdate, Breakdown, Reason};
use parking_lot::Mutex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

/// One audit line.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AuditRecord {
    /// Fine-grained record, one per balance mutation
    Mutation(MutationRecord),
    /// Per-validator netted summary, one per accounting scope
    Summary(SummaryRecord),
}

impl AuditRecord {
    /// Wire form, one JSON object with a trailing newline.
    pub fn to_json_line(&self) -> Result<String> {
        let mut line =
            serde_json::to_string(self).map_err(|e| Error::AuditWrite(e.to_string()))?;
        line.push('\n');
        Ok(line)
    }
}

/// Single balance mutation attributed to a reason.
#[derive(Debug, Clone, Serialize)]
pub struct MutationRecord {
    /// Epoch of the mutation
    pub epoch: Epoch,
    /// Slot of the mutation
    pub slot: Slot,
    /// Parent root of the latest block header, 0x-prefixed
    #[serde(rename = "parentRoot")]
    pub parent_root: String,
    /// Validator public key, 0x-prefixed
    pub key: String,
    /// Signed delta in Gwei
    pub delta: i128,
    /// Stable reason identifier
    pub reason: Reason,
}

/// Netted per-validator summary with per-reason breakdown.
#[derive(Debug, Clone)]
pub struct SummaryRecord {
    /// Epoch the scope closed at
    pub epoch: Epoch,
    /// Slot the scope closed at
    pub slot: Slot,
    /// Validator index
    pub index: ValidatorIndex,
    /// Per-reason deltas accumulated over the scope
    pub breakdown: Breakdown,
}

fn signed(bu: BalanceUpdate) -> i128 {
    if bu.decrease != 0 {
        -(bu.decrease as i128)
    } else {
        bu.increase as i128
    }
}

impl Serialize for SummaryRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("epoch", &self.epoch)?;
        map.serialize_entry("slot", &self.slot)?;
        map.serialize_entry("index", &self.index.to_string())?;
        map.serialize_entry("delta", &signed(self.breakdown.total()))?;
        for (reason, bu) in self.breakdown.iter_non_zero() {
            map.serialize_entry(reason.id(), &signed(bu))?;
        }
        map.end()
    }
}

/// Destination for audit records.
///
/// Implementations serialize concurrent appends internally. Callers treat
/// append failure as non-fatal: the balance mutation that produced the
/// record proceeds regardless.
pub trait AuditSink: Send + Sync {
    /// Append one record.
    fn append(&self, record: &AuditRecord) -> Result<()>;

    /// Flush and close the sink.
    ///
    /// Idempotent; the host process calls this during its own teardown.
    /// The crate never installs signal handlers itself.
    fn shutdown(&self) -> Result<()>;
}

/// JSON-lines file sink.
///
/// Opened once, positioned at end of file, kept open for the process
/// lifetime. One mutex serializes every write and the single close, so a
/// shutdown can never race an in-flight append.
pub struct JsonlSink {
    file: Mutex<Option<File>>,
}

impl JsonlSink {
    /// Open the log at `path`, creating it if absent, and seek to the end.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let mut file = OpenOptions::new().write(true).create(true).open(path)?;
        // Append semantics even though the open mode does not guarantee it.
        file.seek(SeekFrom::End(0))?;

        tracing::info!(path = %path.display(), "Opened audit log");

        Ok(Self {
            file: Mutex::new(Some(file)),
        })
    }
}

impl AuditSink for JsonlSink {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        let line = record.to_json_line()?;
        let mut guard = self.file.lock();
        let file = guard
            .as_mut()
            .ok_or_else(|| Error::AuditWrite("sink already shut down".into()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| Error::AuditWrite(e.to_string()))
    }

    fn shutdown(&self) -> Result<()> {
        let mut guard = self.file.lock();
        if let Some(file) = guard.take() {
            tracing::info!("Closing audit log");
            file.sync_all().map_err(|e| Error::AuditWrite(e.to_string()))?;
        }
        Ok(())
    }
}

/// Sink that drops every record; used when auditing is disabled.
#[derive(Debug, Default)]
pub struct NullSink;

impl AuditSink for NullSink {
    fn append(&self, _record: &AuditRecord) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
