//! Input folder layout:
//!
//! ```text
//! <input>/<group_id>/transcript.txt   reference (stem listed in reference_names)
//! <input>/<group_id>/<variant>.txt    one variant per .txt/.md file
//! ```

use anyhow::Context;
use notegrade_core::model::ReferenceGroup;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

fn sorted_entries(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if !hidden {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn is_document(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt") || e.eq_ignore_ascii_case("md"))
}

fn stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

fn load_group(dir: &Path, reference_names: &[String]) -> anyhow::Result<Option<ReferenceGroup>> {
    let Some(group_id) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
        return Ok(None);
    };

    // (priority in reference_names, text)
    let mut reference: Option<(usize, String)> = None;
    let mut variants: Vec<(String, String)> = Vec::new();

    for path in sorted_entries(dir)? {
        if !is_document(&path) {
            continue;
        }
        let Some(name) = stem(&path) else {
            continue;
        };
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!(group_id = %group_id, file = %path.display(), "skipping non-UTF-8 file");
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        if variants.iter().any(|(existing, _)| *existing == name) {
            warn!(
                group_id = %group_id,
                file = %path.display(),
                variant = %name,
                "variant name already taken by an earlier file; skipping"
            );
            continue;
        }

        match reference_names.iter().position(|r| *r == name) {
            Some(priority) => match &reference {
                Some((current, _)) if *current <= priority => {
                    warn!(
                        group_id = %group_id,
                        file = %path.display(),
                        "ignoring extra reference file"
                    );
                }
                _ => reference = Some((priority, text)),
            },
            None => variants.push((name, text)),
        }
    }

    let mut group = ReferenceGroup::new(group_id, reference.map(|(_, text)| text));
    for (name, text) in variants {
        group = group.with_variant(name, text);
    }
    debug!(
        group_id = %group.group_id,
        variants = group.variants.len(),
        has_reference = group.reference_text.is_some(),
        "loaded group"
    );
    Ok(Some(group))
}

/// One group per sub-directory, both levels in sorted order.
pub fn load_groups(
    input: &Path,
    reference_names: &[String],
) -> anyhow::Result<Vec<ReferenceGroup>> {
    if !input.is_dir() {
        anyhow::bail!("input folder {} does not exist", input.display());
    }
    let mut groups = Vec::new();
    for path in sorted_entries(input)? {
        if !path.is_dir() {
            continue;
        }
        if let Some(group) = load_group(&path, reference_names)? {
            groups.push(group);
        }
    }
    Ok(groups)
}
