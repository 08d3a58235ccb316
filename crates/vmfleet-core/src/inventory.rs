//! Fleet inventory listing
//!
//! One request for the whole VM collection. Unlike batch actions there is no
//! per-item isolation: a failed fetch or an unusable CPU topology fails the
//! listing.

use std::io::Write;

use tracing::{debug, info, instrument};
use vmfleet_client::{Document, Node, RemoteApi};

use crate::error::CoreError;

/// How the inventory is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InventoryFormat {
    /// One tab-delimited row per VM
    #[default]
    Rows,
    /// The API document, pretty-printed
    Xml,
}

/// Projected inventory row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRecord {
    /// VM name
    pub name: String,
    /// VM id
    pub id: String,
    /// Memory as reported by the API (bytes)
    pub memory: String,
    /// Virtual CPUs, sockets times cores
    pub cpus: u32,
    /// Free-form description
    pub description: String,
}

impl VmRecord {
    /// Project a `<vm>` element
    ///
    /// `name`, `memory` and `description` default to empty strings; the `id`
    /// attribute and the `cpu/topology` sockets and cores are required.
    ///
    /// # Errors
    /// Returns [`CoreError::Extraction`] naming the VM when a required field
    /// is missing or not a number.
    pub fn from_node(vm: Node<'_>) -> Result<Self, CoreError> {
        let name = vm.text_at("name");
        let label: &str = if name.is_empty() { "<unnamed>" } else { &name };

        let id = vm
            .require_attr("id")
            .map_err(|e| CoreError::extraction(label, e))?
            .to_string();

        let topology = vm
            .require("cpu.topology")
            .map_err(|e| CoreError::extraction(&id, e))?;
        let sockets = parse_count(&id, topology, "sockets")?;
        let cores = parse_count(&id, topology, "cores")?;
        let cpus = sockets
            .checked_mul(cores)
            .ok_or_else(|| CoreError::Extraction {
                vm: id.clone(),
                reason: format!("cpu count overflows: {sockets} sockets x {cores} cores"),
            })?;

        Ok(Self {
            memory: vm.text_at("memory"),
            description: vm.text_at("description"),
            name,
            id,
            cpus,
        })
    }

    /// Fields in output column order
    #[must_use]
    pub fn fields(&self) -> [String; 5] {
        [
            self.name.clone(),
            self.id.clone(),
            self.memory.clone(),
            self.cpus.to_string(),
            self.description.clone(),
        ]
    }
}

/// Read a numeric topology attribute
fn parse_count(vm: &str, topology: Node<'_>, attribute: &str) -> Result<u32, CoreError> {
    let raw = topology
        .require_attr(attribute)
        .map_err(|e| CoreError::extraction(vm, e))?;
    raw.trim().parse().map_err(|_| CoreError::Extraction {
        vm: vm.to_string(),
        reason: format!("topology {attribute} is not a number: {raw:?}"),
    })
}

/// Project every `<vm>` in a collection document
///
/// # Errors
/// Fails on the first VM whose required fields cannot be extracted.
pub fn project_inventory(doc: &Document) -> Result<Vec<VmRecord>, CoreError> {
    doc.find_all("vm")
        .into_iter()
        .map(VmRecord::from_node)
        .collect()
}

/// Write records as tab-delimited rows
///
/// # Errors
/// Returns an error if the writer fails.
pub fn write_rows<W: Write>(records: &[VmRecord], mut writer: W) -> std::io::Result<()> {
    for record in records {
        let row = record
            .fields()
            .iter()
            .map(String::as_str)
            .map(quote_field)
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(writer, "{row}")?;
    }
    writer.flush()
}

/// Quote a field holding the delimiter, a line break or a quote
fn quote_field(field: &str) -> String {
    if field.contains(['\t', '\n', '\r', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Fetch the VM collection
///
/// # Errors
/// Returns [`CoreError::Remote`] if the request fails.
#[instrument(skip(api))]
pub async fn fetch_inventory(api: &dyn RemoteApi) -> Result<Document, CoreError> {
    let doc = api.fetch("").await?;
    debug!(root = doc.root().name(), "inventory fetched");
    Ok(doc)
}

/// Fetch the inventory and write it in `format`, returning the VM count
///
/// # Errors
/// Returns an error if the fetch fails, a VM cannot be projected, or the
/// writer fails. Nothing is written when projection fails.
pub async fn list_inventory<W: Write>(
    api: &dyn RemoteApi,
    format: InventoryFormat,
    mut writer: W,
) -> Result<usize, CoreError> {
    let doc = fetch_inventory(api).await?;

    let count = match format {
        InventoryFormat::Xml => {
            doc.write_pretty(&mut writer)
                .map_err(|e| CoreError::Output(std::io::Error::other(e.to_string())))?;
            writeln!(writer)?;
            writer.flush()?;
            doc.find_all("vm").len()
        }
        InventoryFormat::Rows => {
            let records = project_inventory(&doc)?;
            write_rows(&records, &mut writer)?;
            records.len()
        }
    };

    info!(vms = count, ?format, "inventory written");
    Ok(count)
}

/// One-line summary of a finished listing
#[must_use]
pub fn inventory_summary(format: InventoryFormat, count: usize, destination: &str) -> String {
    match format {
        InventoryFormat::Rows => format!("wrote {count} vms to {destination}"),
        InventoryFormat::Xml => format!("wrote inventory document to {destination}"),
    }
}
