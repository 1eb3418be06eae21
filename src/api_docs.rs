//! OpenAPI document export for the storefront's backend services.
//!
//! Each known service exposes its document at `http://localhost:<port>/api-docs`.
//! The export fetches it once, writes it verbatim, and writes a second copy
//! that keeps only the paths tagged with the service's tag. Tag matching is
//! exact and case-sensitive. All top-level keys other than `paths` are kept
//! so the filtered copy still validates as a document.
//!
//! The fetch needs the `api-docs` feature; the table and filter do not.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// A backend service whose API document can be exported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceTarget {
    pub name: &'static str,
    pub port: u16,
    /// Operation tag selecting this service's paths.
    pub tag: &'static str,
}

impl ServiceTarget {
    pub fn docs_url(&self) -> String {
        format!("http://localhost:{}/api-docs", self.port)
    }
}

pub const SERVICES: &[ServiceTarget] = &[
    ServiceTarget {
        name: "product",
        port: 8081,
        tag: "Product",
    },
    ServiceTarget {
        name: "order",
        port: 8082,
        tag: "Order",
    },
    ServiceTarget {
        name: "coupon",
        port: 8083,
        tag: "Coupon",
    },
    ServiceTarget {
        name: "shipping",
        port: 8084,
        tag: "Shipping",
    },
    ServiceTarget {
        name: "settlement",
        port: 8085,
        tag: "Settlement",
    },
    ServiceTarget {
        name: "search",
        port: 8086,
        tag: "SearchKeyword",
    },
    ServiceTarget {
        name: "member",
        port: 8087,
        tag: "Member",
    },
];

/// Look up a service by name.
///
/// # Errors
/// Returns `Error::ConfigError` listing the known names if there is no match.
pub fn resolve(name: &str) -> Result<&'static ServiceTarget> {
    SERVICES.iter().find(|s| s.name == name).ok_or_else(|| {
        let known: Vec<&str> = SERVICES.iter().map(|s| s.name).collect();
        Error::ConfigError(format!(
            "unknown service '{}' (known: {})",
            name,
            known.join(", ")
        ))
    })
}

/// Whether any operation of a path item carries `tag`.
fn path_has_tag(item: &Value, tag: &str) -> bool {
    let Some(ops) = item.as_object() else {
        return false;
    };
    ops.values().any(|op| {
        op.get("tags")
            .and_then(Value::as_array)
            .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(tag)))
    })
}

/// Copy of `doc` whose `paths` holds only items with an operation tagged `tag`.
///
/// A document without `paths` gets an empty `paths` object.
pub fn filter_by_tag(doc: &Value, tag: &str) -> Value {
    let paths: Map<String, Value> = doc
        .get("paths")
        .and_then(Value::as_object)
        .map(|paths| {
            paths
                .iter()
                .filter(|(_, item)| path_has_tag(item, tag))
                .map(|(path, item)| (path.clone(), item.clone()))
                .collect()
        })
        .unwrap_or_default();

    let mut filtered = doc.clone();
    if let Some(obj) = filtered.as_object_mut() {
        obj.insert("paths".to_string(), Value::Object(paths));
    }
    filtered
}

/// Files written by an export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportPaths {
    pub full: PathBuf,
    pub filtered: PathBuf,
}

impl ExportPaths {
    pub fn for_service(out_dir: &Path, service: &str) -> Self {
        ExportPaths {
            full: out_dir.join(format!("{}-api-docs.json", service)),
            filtered: out_dir.join(format!("{}-api-docs.filtered.json", service)),
        }
    }
}

/// Write the full and filtered documents as pretty JSON.
///
/// # Errors
/// Returns `Error::BackendError` if a file cannot be written.
pub fn write_outputs(
    out_dir: &Path,
    target: &ServiceTarget,
    doc: &Value,
) -> Result<ExportPaths> {
    let paths = ExportPaths::for_service(out_dir, target.name);
    let filtered = filter_by_tag(doc, target.tag);

    std::fs::write(&paths.full, serde_json::to_vec_pretty(doc)?)?;
    std::fs::write(&paths.filtered, serde_json::to_vec_pretty(&filtered)?)?;

    let kept = filtered
        .get("paths")
        .and_then(Value::as_object)
        .map_or(0, Map::len);
    info!(
        "✓ {}: wrote {} and {} ({} paths tagged {})",
        target.name,
        paths.full.display(),
        paths.filtered.display(),
        kept,
        target.tag
    );
    Ok(paths)
}

/// Fetch a service's API document with one blocking GET.
///
/// # Errors
/// Returns `Error::RemoteError` on a transport error, a non-200 status, or a
/// body that is not JSON.
#[cfg(feature = "api-docs")]
pub fn fetch_document(url: &str) -> Result<Value> {
    debug!("» GET {}", url);
    let response = reqwest::blocking::get(url)?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(Error::RemoteError(format!("GET {} returned {}", url, status)));
    }

    let body = response.text()?;
    serde_json::from_str(&body)
        .map_err(|e| Error::RemoteError(format!("GET {} returned invalid JSON: {}", url, e)))
}

/// Fetch, filter and write the documents of the named service.
///
/// # Errors
/// Any error from [`resolve`], [`fetch_document`] or [`write_outputs`].
#[cfg(feature = "api-docs")]
pub fn export(service: &str, out_dir: &Path) -> Result<ExportPaths> {
    let target = resolve(service)?;
    let doc = fetch_document(&target.docs_url())?;
    write_outputs(out_dir, target, &doc)
}
