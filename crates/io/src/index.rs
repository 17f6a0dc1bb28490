//! CAS ⇄ PrIMe species id index, built from the warehouse species catalog.
//!
//! The index is cached on disk and never checked for staleness: whoever
//! refreshes the warehouse mirror must rebuild it (`IdentifierIndex::rebuild`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thermocheck_recon::IdentifierLookup;

use crate::cache::CacheStore;
use crate::error::IoError;

/// Cache item holding `cas → [species id]`.
pub const CAS_TO_SPECIES: &str = "cas_to_species";
/// Cache item holding `species id → cas`.
pub const SPECIES_TO_CAS: &str = "species_to_cas";

/// Items persisted for an index.
pub const CACHE_ITEMS: [&str; 2] = [CAS_TO_SPECIES, SPECIES_TO_CAS];

/// `<mirror>/depository/species/catalog`
pub fn catalog_dir(mirror_root: &Path) -> PathBuf {
    mirror_root.join("depository").join("species").join("catalog")
}

/// Pull the CAS number out of a raw catalog file.
pub fn extract_cas(content: &str) -> Option<&str> {
    static CAS_RE: OnceLock<Regex> = OnceLock::new();
    let re = CAS_RE.get_or_init(|| {
        Regex::new(r#"CASRegistryNumber">([0-9/-]+)</name>"#).expect("CAS pattern is valid")
    });
    re.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierIndex {
    cas_to_species: BTreeMap<String, Vec<String>>,
    species_to_cas: BTreeMap<String, String>,
}

impl IdentifierIndex {
    /// Scan every catalog file once. Files without a CAS are skipped.
    pub fn build(mirror_root: &Path) -> Result<Self, IoError> {
        let dir = catalog_dir(mirror_root);
        let mut entries: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(|e| IoError::io(&dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        entries.sort();

        let mut index = Self::default();
        for path in entries {
            let Some(species_id) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            let bytes = fs::read(&path).map_err(|e| IoError::io(&path, e))?;
            let content = String::from_utf8_lossy(&bytes);
            if let Some(cas) = extract_cas(&content) {
                log::debug!("{species_id} {cas}");
                index.insert(&species_id, cas);
            }
        }

        log::info!(
            "indexed {} species under {} CAS numbers",
            index.species_to_cas.len(),
            index.cas_to_species.len()
        );
        Ok(index)
    }

    /// Record one catalog entry. A CAS shared by several species keeps all of
    /// them, in insertion order, and is reported.
    pub fn insert(&mut self, species_id: &str, cas: &str) {
        self.species_to_cas.insert(species_id.to_string(), cas.to_string());
        let ids = self.cas_to_species.entry(cas.to_string()).or_default();
        ids.push(species_id.to_string());
        if ids.len() > 1 {
            log::warn!("species {ids:?} all have the same CAS {cas}");
        }
    }

    pub fn species_for_cas(&self, cas: &str) -> Option<&[String]> {
        self.cas_to_species.get(cas).map(Vec::as_slice)
    }

    pub fn cas_for_species(&self, species_id: &str) -> Option<&str> {
        self.species_to_cas.get(species_id).map(String::as_str)
    }

    /// CAS numbers mapped to more than one species.
    pub fn shared_cas(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.cas_to_species
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(cas, ids)| (cas.as_str(), ids.as_slice()))
    }

    pub fn species_count(&self) -> usize {
        self.species_to_cas.len()
    }

    pub fn cas_count(&self) -> usize {
        self.cas_to_species.len()
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    pub fn save(&self, store: &CacheStore) -> Result<(), IoError> {
        store.save(CAS_TO_SPECIES, &self.cas_to_species)?;
        store.save(SPECIES_TO_CAS, &self.species_to_cas)
    }

    /// All items or nothing: any missing or corrupt item fails the load.
    pub fn load(store: &CacheStore) -> Result<Self, IoError> {
        Ok(Self {
            cas_to_species: store.load(CAS_TO_SPECIES)?,
            species_to_cas: store.load(SPECIES_TO_CAS)?,
        })
    }

    /// Load from cache, or rebuild from the mirror and persist when the cache
    /// cannot be loaded for any reason. A failed save is only a warning.
    pub fn load_or_build(mirror_root: &Path, store: &CacheStore) -> Result<Self, IoError> {
        match Self::load(store) {
            Ok(index) => {
                log::info!("loaded identifier index from {}", store.dir().display());
                Ok(index)
            }
            Err(e) => {
                log::warn!("couldn't load identifier index cache ({e}); rebuilding");
                let index = Self::build(mirror_root)?;
                if let Err(e) = index.save(store) {
                    log::warn!("couldn't save identifier index cache: {e}");
                }
                Ok(index)
            }
        }
    }

    /// Discard the cached index, rebuild it from the mirror, and persist it.
    pub fn rebuild(mirror_root: &Path, store: &CacheStore) -> Result<Self, IoError> {
        store.remove(&CACHE_ITEMS)?;
        let index = Self::build(mirror_root)?;
        index.save(store)?;
        Ok(index)
    }
}

impl IdentifierLookup for IdentifierIndex {
    fn species_ids(&self, cas: &str) -> Option<&[String]> {
        self.species_for_cas(cas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalog_entry(cas: &str) -> String {
        format!(
            "<chemicalSpecies primeID=\"x\"><chemicalIdentifier>\
             <name type=\"formula\">CH2O</name>\
             <name type=\"CASRegistryNumber\">{cas}</name>\
             </chemicalIdentifier></chemicalSpecies>"
        )
    }

    #[test]
    fn extract_cas_from_catalog_entry() {
        assert_eq!(extract_cas(&catalog_entry("50-00-0")), Some("50-00-0"));
        assert_eq!(extract_cas("<name type=\"formula\">H2O</name>"), None);
        assert_eq!(extract_cas(&catalog_entry("n/a")), None);
    }

    #[test]
    fn shared_cas_keeps_every_species() {
        let mut index = IdentifierIndex::default();
        index.insert("s1", "50-00-0");
        index.insert("s2", "50-00-0");
        index.insert("s3", "64-17-5");

        assert_eq!(
            index.species_for_cas("50-00-0").unwrap(),
            &["s1".to_string(), "s2".to_string()]
        );
        assert_eq!(index.cas_for_species("s2"), Some("50-00-0"));
        assert_eq!(index.shared_cas().count(), 1);
        assert_eq!(index.species_count(), 3);
        assert_eq!(index.cas_count(), 2);
        assert!(index.species_ids("7732-18-5").is_none());
    }

    proptest! {
        #[test]
        fn save_load_round_trip(
            entries in prop::collection::vec(("s[0-9]{4}", "[0-9]{2,6}-[0-9]{2}-[0-9]"), 0..20)
        ) {
            let mut index = IdentifierIndex::default();
            for (species, cas) in &entries {
                index.insert(species, cas);
            }
            let dir = tempfile::tempdir().unwrap();
            let store = CacheStore::new(dir.path());
            index.save(&store).unwrap();
            prop_assert_eq!(IdentifierIndex::load(&store).unwrap(), index);
        }
    }
}
