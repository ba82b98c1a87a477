use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

use crate::recent::Recent;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Modpack not found: {0}")]
    ModpackNotFound(i64),

    #[error("Package not found: {0}")]
    PackageNotFound(i64),

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Modpack {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Build {
    pub id: i64,
    pub modpack_id: i64,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Package {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Release {
    pub id: i64,
    pub package_id: i64,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Recent for Build {
    fn id(&self) -> i64 {
        self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Recent for Release {
    fn id(&self) -> i64 {
        self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Everything the store holds. This is also the seed file layout.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Catalog {
    pub modpacks: Vec<Modpack>,
    pub builds: Vec<Build>,
    pub packages: Vec<Package>,
    pub releases: Vec<Release>,
    pub users: Vec<User>,
}

impl Catalog {
    pub fn modpack(&self, id: i64) -> Option<&Modpack> {
        self.modpacks.iter().find(|m| m.id == id)
    }

    pub fn package(&self, id: i64) -> Option<&Package> {
        self.packages.iter().find(|p| p.id == id)
    }
}

fn next_id<T>(items: &[T], id: impl Fn(&T) -> i64) -> i64 {
    items.iter().map(id).max().unwrap_or(0) + 1
}

/// Lowercase, ASCII alphanumerics only, everything else collapsed to `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[derive(Default)]
pub struct Store {
    catalog: RwLock<Catalog>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let catalog: Catalog = serde_json::from_str(&raw)?;
        tracing::debug!(
            modpacks = catalog.modpacks.len(),
            builds = catalog.builds.len(),
            packages = catalog.packages.len(),
            releases = catalog.releases.len(),
            users = catalog.users.len(),
            "loaded catalog from {}",
            path.as_ref().display()
        );
        Ok(Self::from_catalog(catalog))
    }

    /// Runs `f` against a consistent view of the catalog.
    pub fn read<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        f(&catalog)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Catalog) -> R) -> R {
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut catalog)
    }

    pub fn create_modpack(&self, name: &str) -> Modpack {
        self.write(|c| {
            let modpack = Modpack {
                id: next_id(&c.modpacks, |m| m.id),
                name: name.to_string(),
                slug: slugify(name),
            };
            c.modpacks.push(modpack.clone());
            modpack
        })
    }

    pub fn create_build(
        &self,
        modpack_id: i64,
        version: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Build> {
        self.write(|c| {
            if c.modpack(modpack_id).is_none() {
                return Err(StoreError::ModpackNotFound(modpack_id));
            }
            let build = Build {
                id: next_id(&c.builds, |b| b.id),
                modpack_id,
                version: version.to_string(),
                created_at,
            };
            c.builds.push(build.clone());
            Ok(build)
        })
    }

    pub fn create_package(&self, name: &str) -> Package {
        self.write(|c| {
            let package = Package {
                id: next_id(&c.packages, |p| p.id),
                name: name.to_string(),
                slug: slugify(name),
            };
            c.packages.push(package.clone());
            package
        })
    }

    pub fn create_release(
        &self,
        package_id: i64,
        version: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Release> {
        self.write(|c| {
            if c.package(package_id).is_none() {
                return Err(StoreError::PackageNotFound(package_id));
            }
            let release = Release {
                id: next_id(&c.releases, |r| r.id),
                package_id,
                version: version.to_string(),
                created_at,
            };
            c.releases.push(release.clone());
            Ok(release)
        })
    }

    /// Stores a user. `password_hash` must already be a PHC string.
    pub fn create_user(&self, username: &str, password_hash: String) -> Result<User> {
        self.write(|c| {
            if c.users.iter().any(|u| u.username == username) {
                return Err(StoreError::DuplicateUsername(username.to_string()));
            }
            let user = User {
                id: next_id(&c.users, |u| u.id),
                username: username.to_string(),
                password_hash,
            };
            c.users.push(user.clone());
            Ok(user)
        })
    }

    pub fn user(&self, id: i64) -> Option<User> {
        self.read(|c| c.users.iter().find(|u| u.id == id).cloned())
    }

    pub fn user_by_username(&self, username: &str) -> Option<User> {
        self.read(|c| c.users.iter().find(|u| u.username == username).cloned())
    }
}
