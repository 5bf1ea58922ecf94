use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, trace};

use crate::error::WheelError;
use crate::wheel::Category;

/// Images available per level, named `0..SLOTS_PER_CATEGORY`
pub const SLOTS_PER_CATEGORY: u32 = 20;

pub const DEFAULT_EXTENSION: &str = "jpg";

/// Identifies one presentation request. Newer requests carry larger tickets.
pub type Ticket = u64;

/// One image of one level's pool
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetReference {
    pub category: Category,
    pub slot: u32,
    pub extension: String,
}

impl AssetReference {
    pub fn new(category: Category, slot: u32, extension: impl Into<String>) -> Self {
        Self {
            category,
            slot,
            extension: extension.into(),
        }
    }

    /// Locator relative to the asset root: `<LEVEL>/<slot>.<ext>`
    pub fn locator(&self) -> PathBuf {
        PathBuf::from(self.category.to_string()).join(format!("{}.{}", self.slot, self.extension))
    }
}

/// A successfully resolved asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub path: PathBuf,
    pub bytes: u64,
}

pub type Resolution = Result<ResolvedAsset, WheelError>;

/// Asynchronous asset lookup. Requests are fire-and-forget; outcomes are
/// collected later with [`AssetStore::drain`].
pub trait AssetStore {
    fn request(&mut self, ticket: Ticket, reference: &AssetReference);

    /// Outcomes that arrived since the last call, in arrival order
    fn drain(&mut self) -> Vec<(Ticket, Resolution)>;
}

/// Looks assets up on disk from a worker thread
pub struct FsAssetStore {
    root: PathBuf,
    requests: Sender<(Ticket, PathBuf)>,
    results: Receiver<(Ticket, Resolution)>,
}

impl FsAssetStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<(Ticket, PathBuf)>();
        let (res_tx, res_rx) = mpsc::channel();

        std::thread::spawn(move || {
            for (ticket, path) in req_rx {
                let outcome = resolve_file(&path);
                if res_tx.send((ticket, outcome)).is_err() {
                    break;
                }
            }
        });

        Self {
            root: root.as_ref().to_path_buf(),
            requests: req_tx,
            results: res_rx,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn resolve_file(path: &Path) -> Resolution {
    let not_found = || WheelError::AssetNotFound {
        path: path.to_path_buf(),
    };
    let meta = fs::File::open(path)
        .and_then(|f| f.metadata())
        .map_err(|_| not_found())?;
    if !meta.is_file() {
        return Err(not_found());
    }
    Ok(ResolvedAsset {
        path: path.to_path_buf(),
        bytes: meta.len(),
    })
}

impl AssetStore for FsAssetStore {
    fn request(&mut self, ticket: Ticket, reference: &AssetReference) {
        let path = self.root.join(reference.locator());
        trace!(ticket, path = %path.display(), "asset requested");
        if self.requests.send((ticket, path)).is_err() {
            debug!("asset worker gone");
        }
    }

    fn drain(&mut self) -> Vec<(Ticket, Resolution)> {
        self.results.try_iter().collect()
    }
}

/// In-memory store: knows a fixed set of locators and answers on the next
/// [`drain`](AssetStore::drain). Useful headless and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    available: HashSet<PathBuf>,
    queued: VecDeque<(Ticket, AssetReference)>,
    requests: usize,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store where every locator resolves
    pub fn with_all(extension: &str) -> Self {
        let mut store = Self::new();
        for category in Category::ALL {
            for slot in 0..SLOTS_PER_CATEGORY {
                store.insert(&AssetReference::new(category, slot, extension));
            }
        }
        store
    }

    pub fn insert(&mut self, reference: &AssetReference) {
        self.available.insert(reference.locator());
    }

    /// How many requests have been submitted so far
    pub fn request_count(&self) -> usize {
        self.requests
    }

    pub fn pending(&self) -> usize {
        self.queued.len()
    }
}

impl AssetStore for MemoryAssetStore {
    fn request(&mut self, ticket: Ticket, reference: &AssetReference) {
        self.requests += 1;
        self.queued.push_back((ticket, reference.clone()));
    }

    fn drain(&mut self) -> Vec<(Ticket, Resolution)> {
        self.queued
            .drain(..)
            .map(|(ticket, reference)| {
                let path = reference.locator();
                let outcome = if self.available.contains(&path) {
                    Ok(ResolvedAsset { path, bytes: 0 })
                } else {
                    Err(WheelError::AssetNotFound { path })
                };
                (ticket, outcome)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    #[test]
    fn locator_uses_level_and_slot() {
        let r = AssetReference::new(Category::Segundo, 7, "jpg");
        assert_eq!(r.locator(), PathBuf::from("SEGUNDO").join("7.jpg"));
    }

    #[test]
    fn memory_store_answers_on_drain() {
        let mut store = MemoryAssetStore::new();
        let present = AssetReference::new(Category::Quinto, 2, "jpg");
        let missing = AssetReference::new(Category::Quinto, 3, "jpg");
        store.insert(&present);

        store.request(1, &present);
        store.request(2, &missing);
        assert_eq!(store.request_count(), 2);
        assert_eq!(store.pending(), 2);

        let out = store.drain();
        assert_eq!(out.len(), 2);
        assert_matches!(&out[0], (1, Ok(asset)) if asset.path == present.locator());
        assert_matches!(&out[1], (2, Err(WheelError::AssetNotFound { .. })));
        assert!(store.drain().is_empty());
    }

    #[test]
    fn memory_store_with_all_resolves_everything() {
        let mut store = MemoryAssetStore::with_all("png");
        store.request(9, &AssetReference::new(Category::Adultos, 19, "png"));
        assert_matches!(store.drain().as_slice(), [(9, Ok(_))]);
    }

    fn drain_until(store: &mut FsAssetStore, n: usize) -> Vec<(Ticket, Resolution)> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut out = Vec::new();
        while out.len() < n && Instant::now() < deadline {
            out.extend(store.drain());
            std::thread::sleep(Duration::from_millis(5));
        }
        out
    }

    #[test]
    fn fs_store_resolves_existing_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("TERCERO")).unwrap();
        fs::write(dir.path().join("TERCERO").join("4.jpg"), b"jpeg").unwrap();

        let mut store = FsAssetStore::new(dir.path());
        store.request(1, &AssetReference::new(Category::Tercero, 4, "jpg"));
        store.request(2, &AssetReference::new(Category::Tercero, 5, "jpg"));

        let out = drain_until(&mut store, 2);
        assert_eq!(out.len(), 2);
        assert_matches!(&out[0], (1, Ok(asset)) if asset.bytes == 4);
        assert_matches!(&out[1], (2, Err(WheelError::AssetNotFound { .. })));
    }

    #[test]
    fn fs_store_rejects_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("SEXTO").join("0.jpg")).unwrap();

        let mut store = FsAssetStore::new(dir.path());
        store.request(1, &AssetReference::new(Category::Sexto, 0, "jpg"));

        let out = drain_until(&mut store, 1);
        assert_matches!(out.as_slice(), [(1, Err(WheelError::AssetNotFound { .. }))]);
    }
}
