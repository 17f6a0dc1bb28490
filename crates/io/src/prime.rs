//! PrIMe warehouse mirror: one directory of `thp<N>.xml` files per species.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thermocheck_recon::{CoefficientMatrix, ExtractOptions, ExtractionError, ThermoRecord, ThermoWarehouse};

use crate::coefficients::prime_coefficients;
use crate::error::IoError;
use crate::xml::Document;

/// `<mirror>/depository/species/data/<species id>`
pub fn species_data_dir(mirror_root: &Path, species_id: &str) -> PathBuf {
    mirror_root
        .join("depository")
        .join("species")
        .join("data")
        .join(species_id)
}

/// `N` of a `thp<N>.xml` file name, when `N > 0`.
pub fn thermo_file_number(file_name: &str) -> Option<u64> {
    static THP_RE: OnceLock<Regex> = OnceLock::new();
    let re = THP_RE.get_or_init(|| Regex::new(r"^thp(\d+)\.xml$").expect("thp pattern is valid"));
    re.captures(file_name)
        .and_then(|c| c[1].parse::<u64>().ok())
        .filter(|n| *n > 0)
}

#[derive(Debug, Clone)]
pub struct Warehouse {
    root: PathBuf,
}

impl Warehouse {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ThermoWarehouse for Warehouse {
    type Record = PrimeThermo;
    type Records = ThermoRecords;

    fn thermo_records(&self, species_id: &str) -> ThermoRecords {
        ThermoRecords::scan(&species_data_dir(&self.root, species_id))
    }
}

/// Lazy, single-pass enumeration of one species' thermo documents.
///
/// Each file is parsed only when reached; unparsable files are logged and
/// skipped.
#[derive(Debug)]
pub struct ThermoRecords {
    pending: std::vec::IntoIter<PathBuf>,
}

impl ThermoRecords {
    fn scan(dir: &Path) -> Self {
        let paths = candidate_files(dir).unwrap_or_else(|e| {
            log::warn!("cannot list thermo files in {}: {e}", dir.display());
            Vec::new()
        });
        Self {
            pending: paths.into_iter(),
        }
    }
}

/// `thp<N>.xml` files of one species directory, by `N`. A species without a
/// data directory has no thermo polynomials; any other listing failure is an
/// error.
fn candidate_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} has no thermo polynomials", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut candidates: Vec<(u64, PathBuf)> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let n = thermo_file_number(path.file_name()?.to_str()?)?;
            Some((n, path))
        })
        .collect();
    candidates.sort();
    Ok(candidates.into_iter().map(|(_, path)| path).collect())
}

impl Iterator for ThermoRecords {
    type Item = PrimeThermo;

    fn next(&mut self) -> Option<PrimeThermo> {
        for path in self.pending.by_ref() {
            match PrimeThermo::open(&path) {
                Ok(record) => return Some(record),
                Err(e) => log::warn!("skipping thermo file: {e}"),
            }
        }
        None
    }
}

/// One parsed `thp<N>.xml` document. Dropping it releases the document.
#[derive(Debug)]
pub struct PrimeThermo {
    doc: Document,
    prime_id: String,
}

impl PrimeThermo {
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let doc = Document::parse_file(path)?;
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::from_document(doc, fallback))
    }

    /// `fallback_id` labels the record when the root carries no `primeID`.
    pub fn from_document(doc: Document, fallback_id: String) -> Self {
        let prime_id = doc
            .root()
            .attribute("primeID")
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or(fallback_id);
        Self { doc, prime_id }
    }

    /// `primeID`s of every `<bibliographyLink>`.
    pub fn bibliography_links(&self) -> impl Iterator<Item = &str> {
        self.doc
            .root()
            .descendants("bibliographyLink")
            .filter_map(|link| link.attribute("primeID"))
    }
}

impl ThermoRecord for PrimeThermo {
    fn record_id(&self) -> &str {
        &self.prime_id
    }

    fn cites(&self, bibliography_id: &str) -> bool {
        self.bibliography_links().any(|id| id == bibliography_id)
    }

    fn coefficients(&self, options: ExtractOptions) -> Result<CoefficientMatrix, ExtractionError> {
        prime_coefficients(self.doc.root(), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thermo_file_names() {
        assert_eq!(thermo_file_number("thp00001234.xml"), Some(1234));
        assert_eq!(thermo_file_number("thp1.xml"), Some(1));
        assert_eq!(thermo_file_number("thp00000000.xml"), None);
        assert_eq!(thermo_file_number("thp12.xml.bak"), None);
        assert_eq!(thermo_file_number("tr00000001.xml"), None);
        assert_eq!(thermo_file_number("thp.xml"), None);
    }

    #[test]
    fn record_id_falls_back_to_file_stem() {
        let doc = Document::parse_str("<thermo/>").unwrap();
        let record = PrimeThermo::from_document(doc, "thp00000007".into());
        assert_eq!(record.record_id(), "thp00000007");
    }

    #[test]
    fn provenance_check() {
        let doc = Document::parse_str(
            "<thermo primeID=\"thp1\"><bibliographyLink primeID=\"b00000001\"/>\
             <bibliographyLink primeID=\"b00014727\"/></thermo>",
        )
        .unwrap();
        let record = PrimeThermo::from_document(doc, String::new());
        assert_eq!(record.record_id(), "thp1");
        assert!(record.cites("b00014727"));
        assert!(!record.cites("b00099999"));
    }

    #[test]
    fn candidate_files_sorted_by_number() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["thp10.xml", "thp2.xml", "thp0.xml", "notes.txt"] {
            fs::write(dir.path().join(name), "<thermo/>").unwrap();
        }
        let names: Vec<_> = candidate_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["thp2.xml", "thp10.xml"]);
    }

    #[test]
    fn missing_directory_is_empty_but_unlistable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(candidate_files(&dir.path().join("s00000001")).unwrap().is_empty());

        let not_a_dir = dir.path().join("s00000002");
        fs::write(&not_a_dir, "").unwrap();
        let err = candidate_files(&not_a_dir).unwrap_err();
        assert_ne!(err.kind(), io::ErrorKind::NotFound);

        // The record stream itself still ends quietly.
        assert_eq!(ThermoRecords::scan(&not_a_dir).count(), 0);
    }

    #[test]
    fn missing_species_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let warehouse = Warehouse::new(dir.path());
        assert_eq!(warehouse.thermo_records("s00000001").count(), 0);
    }
}
