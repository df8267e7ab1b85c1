use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::{seq::IndexedRandom, Rng};

use crate::models::UserProfile;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// The fixed pool of placeholder avatars, loaded once at startup.
///
/// Assignment results depend on catalogue order, so ids are kept sorted by file name.
#[derive(Debug, Clone, Default)]
pub struct AvatarCatalogue {
    dir: PathBuf,
    ids: Vec<String>,
}

impl AvatarCatalogue {
    pub fn new(dir: impl Into<PathBuf>, ids: Vec<String>) -> Self {
        AvatarCatalogue {
            dir: dir.into(),
            ids,
        }
    }

    /// Reads the image file names in `dir`. A missing directory yields an empty catalogue.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        if !dir.exists() {
            log::warn!("avatar directory {} does not exist, avatars disabled", dir.display());
            return Ok(Self::new(dir, Vec::new()));
        }

        let mut ids = Vec::new();
        for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if !is_image {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                ids.push(name.to_owned());
            }
        }
        ids.sort();

        log::info!("loaded {} avatars from {}", ids.len(), dir.display());
        Ok(Self::new(dir, ids))
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    /// File backing a catalogue entry. Only catalogue members resolve.
    pub fn path_of(&self, id: &str) -> Option<PathBuf> {
        self.contains(id).then(|| self.dir.join(id))
    }

    /// Stable avatar for `seed`; `None` when the catalogue is empty.
    pub fn assign_deterministic(&self, seed: &str) -> Option<&str> {
        if self.ids.is_empty() {
            return None;
        }
        let index = seed_hash(seed).unsigned_abs() % self.ids.len() as u64;
        self.ids.get(index as usize).map(String::as_str)
    }

    pub fn assign_random(&self) -> Option<&str> {
        self.assign_random_with(&mut rand::rng())
    }

    pub fn assign_random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.ids.choose(rng).map(String::as_str)
    }

    /// The avatar shown for `profile`: its chosen one if still in the catalogue, else the
    /// one derived from its uid.
    pub fn resolve<'a>(&'a self, profile: &'a UserProfile) -> Option<&'a str> {
        match profile.avatar_id.as_deref() {
            Some(id) if self.contains(id) => Some(id),
            _ => self.assign_deterministic(&profile.uid),
        }
    }
}

/// `h = c + (h << 5) - h` over UTF-16 code units, where the shift wraps to 32 bits but the
/// running value does not. Matches the avatars the web client has been handing out.
pub fn seed_hash(seed: &str) -> i64 {
    seed.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = (hash as i32).wrapping_shl(5) as i64;
        i64::from(unit) + shifted - hash
    })
}
