//! Assembles the dashboard payload from the catalog.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::recent::{DASHBOARD_LIMIT, recent};
use crate::store::{Catalog, Store};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BuildEntry {
    pub id: i64,
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub modpack_id: i64,
    pub modpack_name: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReleaseEntry {
    pub id: i64,
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub package_id: i64,
    pub package_name: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Dashboard {
    pub builds: Vec<BuildEntry>,
    pub releases: Vec<ReleaseEntry>,
}

pub fn recent_builds(catalog: &Catalog, limit: usize) -> Vec<BuildEntry> {
    recent(&catalog.builds, limit)
        .into_iter()
        .map(|build| BuildEntry {
            modpack_name: catalog
                .modpack(build.modpack_id)
                .map(|m| m.name.clone())
                .unwrap_or_default(),
            id: build.id,
            version: build.version,
            created_at: build.created_at,
            modpack_id: build.modpack_id,
        })
        .collect()
}

pub fn recent_releases(catalog: &Catalog, limit: usize) -> Vec<ReleaseEntry> {
    recent(&catalog.releases, limit)
        .into_iter()
        .map(|release| ReleaseEntry {
            package_name: catalog
                .package(release.package_id)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            id: release.id,
            version: release.version,
            created_at: release.created_at,
            package_id: release.package_id,
        })
        .collect()
}

impl Dashboard {
    pub fn assemble(store: &Store) -> Self {
        store.read(|c| Self {
            builds: recent_builds(c, DASHBOARD_LIMIT),
            releases: recent_releases(c, DASHBOARD_LIMIT),
        })
    }
}
