//! Extension lookup by identifier.
//!
//! # Responsibility
//! - Run one enumerate-match-release pass per lookup.
//! - Perform the single signature cast from raw to typed handle.
//!
//! # Invariants
//! - The catalog is fully released before a lookup returns, on every path.
//! - `Discovery` and `NotFound` are never conflated.
//! - With duplicate identifiers, the first in host order wins.

use crate::error::{ExtensionError, ExtensionResult};
use crate::extension::catalog::{ExtensionCatalog, ExtensionSummary};
use crate::extension::function::{ExtensionFunction, RawExtensionFn};
use crate::extension::id::CapabilityId;
use crate::host::ExtensionHost;
use log::{debug, warn};

/// Finds the untyped entry point registered under `id`.
///
/// # Errors
/// - `ExtensionError::Discovery` when enumeration fails.
/// - `ExtensionError::NotFound` when no descriptor matches, or the match has a
///   null entry point.
pub fn resolve_raw<H>(host: &H, id: &CapabilityId) -> ExtensionResult<RawExtensionFn>
where
    H: ExtensionHost + ?Sized,
{
    let catalog = ExtensionCatalog::enumerate(host)?;
    let found = match catalog.find(id) {
        Some(descriptor) => {
            let func = descriptor.raw_function();
            if func.is_none() {
                warn!(
                    "event=extension_resolve module=catalog status=warn reason=null_entry id={id}"
                );
            }
            func
        }
        None => None,
    };
    let entries = catalog.len();
    drop(catalog);

    match found {
        Some(func) => {
            debug!(
                "event=extension_resolve module=catalog status=ok id={id} entries={entries}"
            );
            Ok(func)
        }
        None => {
            debug!(
                "event=extension_resolve module=catalog status=not_found id={id} entries={entries}"
            );
            Err(ExtensionError::NotFound(id.to_string()))
        }
    }
}

/// Resolves `id` and views it as extension signature `F`.
///
/// Used when a host registers a function with `F`'s signature under an
/// identifier other than `F::ID`.
///
/// # Safety
/// The extension registered under `id` must have `F`'s signature.
pub unsafe fn resolve_as<F, H>(host: &H, id: &CapabilityId) -> ExtensionResult<F>
where
    F: ExtensionFunction,
    H: ExtensionHost + ?Sized,
{
    let raw = resolve_raw(host, id)?;
    Ok(F::from_raw(raw))
}

/// Resolves the typed extension `F` under its registered identifier.
pub fn resolve<F, H>(host: &H) -> ExtensionResult<F>
where
    F: ExtensionFunction,
    H: ExtensionHost + ?Sized,
{
    let id = CapabilityId::new(F::ID)?;
    // SAFETY: `F::ID` names the extension whose signature `F` declares.
    unsafe { resolve_as::<F, H>(host, &id) }
}

/// Snapshots metadata for every extension the host currently exposes.
///
/// # Errors
/// - `ExtensionError::Discovery` when enumeration fails.
pub fn list_extensions<H>(host: &H) -> ExtensionResult<Vec<ExtensionSummary>>
where
    H: ExtensionHost + ?Sized,
{
    let catalog = ExtensionCatalog::enumerate(host)?;
    Ok(catalog.summaries())
}
