//! Core error types for vmfleet-core

use std::path::PathBuf;

use thiserror::Error;
use vmfleet_client::{ClientError, DocumentError};

/// Errors that escape a whole operation
///
/// Per-host remote failures inside a batch never become a `CoreError`; they
/// are recorded as outcomes instead.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Host list could not be read
    #[error("cannot read host list {path}: {source}")]
    HostListRead {
        /// Path that was opened
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Host list line is malformed
    #[error("host list line {line}: {reason}")]
    HostListSyntax {
        /// 1-based line number
        line: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Remote call failed outside of a batch
    #[error(transparent)]
    Remote(#[from] ClientError),

    /// Required inventory field missing or unusable
    #[error("vm {vm}: {reason}")]
    Extraction {
        /// VM id or name the field belongs to
        vm: String,
        /// What could not be extracted
        reason: String,
    },

    /// Writing output failed
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

impl CoreError {
    /// Extraction error for a VM from a strict document lookup
    pub(crate) fn extraction(vm: impl Into<String>, err: DocumentError) -> Self {
        CoreError::Extraction {
            vm: vm.into(),
            reason: err.to_string(),
        }
    }
}
