//! Asset resolution
//!
//! Finds the project item for a rendered file, importing it only when no
//! item in the project already points at the same path. Hosts do not
//! return a handle from import, so after importing we search the tree
//! with progressively weaker name heuristics.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::diagnostics::{ResolutionMethod, ResolutionReport};
use super::request::file_name;
use crate::error::{PlacementError, Result};
use crate::host::{tree, Host, ProjectItem, ProjectItemHandle};

/// Normalize a media path for comparison
///
/// Backslashes become `/`, repeated separators collapse, `.` segments and
/// trailing separators are dropped. Case is preserved.
pub fn normalize_media_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let absolute = unified.starts_with('/');
    let segments: Vec<&str> = unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Locates or imports project items for rendered assets
#[derive(Debug, Clone)]
pub struct AssetResolver {
    search_attempts: u32,
    poll_interval: Duration,
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_IMPORT_SEARCH_ATTEMPTS, Duration::ZERO)
    }
}

impl AssetResolver {
    pub fn new(search_attempts: u32, poll_interval: Duration) -> Self {
        Self {
            search_attempts: search_attempts.max(1),
            poll_interval,
        }
    }

    /// Existing item whose media path matches `source_path`
    pub fn find_existing(&self, host: &dyn Host, source_path: &str) -> Option<ProjectItemHandle> {
        let wanted = normalize_media_path(source_path);
        host.find_project_items(&|item: &ProjectItem| {
            item.media_path()
                .map(|path| normalize_media_path(path) == wanted)
                .unwrap_or(false)
        })
        .into_iter()
        .next()
    }

    /// Handle for `source_path`, importing at most once
    pub fn resolve(&self, host: &mut dyn Host, source_path: &str) -> Result<ResolutionReport> {
        if let Some(handle) = self.find_existing(host, source_path) {
            debug!(%handle, source_path, "asset already in project");
            return Ok(ResolutionReport {
                handle,
                method: ResolutionMethod::Existing,
                search_passes: 0,
            });
        }

        let before: HashSet<ProjectItemHandle> = tree::media_items(&host.project_root())
            .into_iter()
            .map(|item| item.handle.clone())
            .collect();

        info!(source_path, "importing asset");
        host.import_media(source_path)
            .map_err(|source| PlacementError::ImportFailure {
                path: source_path.to_string(),
                source,
            })?;

        for pass in 1..=self.search_attempts {
            let root = host.project_root();
            let final_pass = pass == self.search_attempts;
            if let Some((handle, method)) = locate_imported(&root, &before, source_path, final_pass) {
                if method == ResolutionMethod::MostRecent {
                    warn!(%handle, source_path, "imported item matched by recency only");
                }
                debug!(%handle, ?method, pass, "imported item located");
                return Ok(ResolutionReport {
                    handle,
                    method,
                    search_passes: pass,
                });
            }
            if pass < self.search_attempts && !self.poll_interval.is_zero() {
                thread::sleep(self.poll_interval);
            }
        }

        Err(PlacementError::ItemNotFound {
            path: source_path.to_string(),
        })
    }
}

/// Best guess for the item an import just created
///
/// Only items that appeared since the import are considered until the
/// final pass, which widens the search to every media item and finally
/// accepts the most recent child of the root.
fn locate_imported(
    root: &ProjectItem,
    before: &HashSet<ProjectItemHandle>,
    source_path: &str,
    final_pass: bool,
) -> Option<(ProjectItemHandle, ResolutionMethod)> {
    let media = tree::media_items(root);
    let fresh: Vec<&ProjectItem> = media
        .iter()
        .copied()
        .filter(|item| !before.contains(&item.handle))
        .collect();
    let pool = match (fresh.is_empty(), final_pass) {
        (false, _) => fresh,
        (true, true) => media,
        (true, false) => return None,
    };

    let wanted_path = normalize_media_path(source_path);
    let name = file_name(source_path);
    let stem = base_name(name);
    let name_lower = name.to_lowercase();
    let stem_lower = stem.to_lowercase();

    let heuristics: [(ResolutionMethod, Box<dyn Fn(&ProjectItem) -> bool + '_>); 5] = [
        (
            ResolutionMethod::MediaPath,
            Box::new(|item: &ProjectItem| {
                item.media_path()
                    .map_or(false, |path| normalize_media_path(path) == wanted_path)
            }),
        ),
        (ResolutionMethod::FileName, Box::new(|item: &ProjectItem| item.name == name)),
        (ResolutionMethod::BaseName, Box::new(|item: &ProjectItem| item.name == stem)),
        (
            ResolutionMethod::CaseInsensitive,
            Box::new(|item: &ProjectItem| {
                let lower = item.name.to_lowercase();
                lower == name_lower || lower == stem_lower
            }),
        ),
        (
            ResolutionMethod::Substring,
            Box::new(|item: &ProjectItem| !stem_lower.is_empty() && item.name.to_lowercase().contains(&stem_lower)),
        ),
    ];

    for (method, predicate) in heuristics.iter() {
        if let Some(item) = pool.iter().find(|item| predicate(**item)) {
            return Some((item.handle.clone(), *method));
        }
    }

    if !final_pass {
        return None;
    }
    root.children()
        .iter()
        .rev()
        .find(|item| !item.is_bin())
        .map(|item| (item.handle.clone(), ResolutionMethod::MostRecent))
}

fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}
