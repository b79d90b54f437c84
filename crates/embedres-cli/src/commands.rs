//! Subcommand implementations. Each writes its result to `out`.

use crate::source::BundleSource;
use anyhow::{Context, Result};
use embedres::ResourceFlags;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct Details<'a> {
    path: &'a str,
    size: usize,
    compressed: bool,
    flags: ResourceFlags,
}

/// Every resource path, one per line or as a JSON array.
pub fn list(source: &BundleSource, json: bool, out: &mut impl Write) -> Result<()> {
    let paths = source.leaf_paths()?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &paths)?;
        writeln!(out)?;
    } else {
        for path in paths {
            writeln!(out, "{}", path)?;
        }
    }
    Ok(())
}

pub fn details(source: &BundleSource, path: &str, json: bool, out: &mut impl Write) -> Result<()> {
    let info = source
        .get_info(path)
        .with_context(|| format!("Failed to read details of {}", path))?;
    let details = Details {
        path,
        size: info.size,
        compressed: info.flags.is_compressed(),
        flags: info.flags,
    };

    if json {
        serde_json::to_writer_pretty(&mut *out, &details)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", details.path)?;
        writeln!(out, "  size:       {}", details.size)?;
        writeln!(out, "  compressed: {}", details.compressed)?;
    }
    Ok(())
}

pub fn children(source: &BundleSource, path: &str, out: &mut impl Write) -> Result<()> {
    let children = source
        .enumerate_children(path)
        .with_context(|| format!("Failed to list children of {}", path))?;
    for child in children {
        writeln!(out, "{}", child)?;
    }
    Ok(())
}

/// Raw payload bytes, inflated if stored compressed.
pub fn extract(source: &BundleSource, path: &str, out: &mut impl Write) -> Result<()> {
    let data = source
        .lookup_data(path)
        .with_context(|| format!("Failed to extract {}", path))?;
    out.write_all(&data)?;
    out.flush()?;
    Ok(())
}
