//! The outbound record-store contract.
//!
//! The gateway only interprets success, failure and status classification of
//! record-store calls; rows are passed through untouched.

use crate::request::GatewayRequest;
use serde::Serialize;
use std::collections::BTreeMap;

/// One row returned by the record store.
pub type Record = BTreeMap<String, String>;

/// A query sent to the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordQuery {
    pub operation: String,
    pub params: BTreeMap<String, String>,
}

impl From<&GatewayRequest> for RecordQuery {
    fn from(request: &GatewayRequest) -> Self {
        Self {
            operation: request.operation.clone(),
            params: request.params.clone(),
        }
    }
}

/// One page of records plus the total number of matching rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordPage {
    pub rows: Vec<Record>,
    pub total: u64,
}

impl RecordPage {
    pub fn new(rows: Vec<Record>, total: u64) -> Self {
        Self { rows, total }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
