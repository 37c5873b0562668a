//! Zip bundles built straight from rendered outputs held in memory.

use crate::report::Artifact;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Writes `files` under `<root>/` into the archive at `dest`.
/// The archive lands under a `.tmp` name first and is renamed into place.
pub fn write_archive(dest: &Path, root: &str, files: &[Artifact]) -> Result<()> {
    let bytes = archive_bytes(root, files)?;
    let tmp = dest.with_extension("zip.tmp");
    fs::write(&tmp, &bytes).with_context(|| format!("failed to write {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("failed to move zip to {}", dest.display()));
    }
    Ok(())
}

pub fn archive_bytes(root: &str, files: &[Artifact]) -> Result<Vec<u8>> {
    // fixed timestamp: identical inputs give identical archives
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for dir in directories(root, files) {
        zip.add_directory(dir, options)?;
    }
    for file in files {
        zip.start_file(format!("{}/{}", root, file.name), options)
            .with_context(|| format!("failed to add {} to zip", file.name))?;
        zip.write_all(&file.body)?;
    }
    Ok(zip.finish()?.into_inner())
}

/// `root/` plus every parent folder named by `files`, parents first.
fn directories(root: &str, files: &[Artifact]) -> BTreeSet<String> {
    let mut dirs = BTreeSet::from([format!("{}/", root)]);
    for file in files {
        let mut rest = file.name.as_str();
        while let Some((parent, _)) = rest.rsplit_once('/') {
            dirs.insert(format!("{}/{}/", root, parent));
            rest = parent;
        }
    }
    dirs
}
