//! Burcat bulk thermo corpus (BURCAT_THR.xml).
//!
//! The whole document is parsed up front and owned by [`BulkCorpus`];
//! species and phases are borrowed views into it.

use std::path::Path;

use thermocheck_recon::{BulkSpecies, ExtractOptions, ExtractionError, PhaseCoefficients};

use crate::coefficients::burcat_coefficients;
use crate::error::IoError;
use crate::xml::{Document, Element};

pub struct BulkCorpus {
    doc: Document,
}

impl BulkCorpus {
    /// Read and parse the corpus. Any failure here is fatal for a run.
    pub fn open(path: &Path) -> Result<Self, IoError> {
        log::info!("reading {} ...", path.display());
        let doc = Document::parse_file(path)?;
        log::info!("done reading {}", path.display());
        Ok(Self { doc })
    }

    pub fn from_document(doc: Document) -> Self {
        Self { doc }
    }

    /// Every `<specie>` in document order. Can be called again to restart.
    pub fn species(&self) -> impl Iterator<Item = BurcatSpecies<'_>> {
        self.doc
            .root()
            .descendants("specie")
            .map(|element| BurcatSpecies { element })
    }
}

/// One `<specie>` record.
#[derive(Debug, Clone, Copy)]
pub struct BurcatSpecies<'a> {
    element: Element<'a>,
}

impl<'a> BurcatSpecies<'a> {
    pub fn cas(&self) -> Option<&'a str> {
        self.element.attribute("CAS")
    }

    /// Structured phases only.
    ///
    /// Burcat uses `<phase>` twice: as a container for formula and
    /// coefficients, and as a bare `<phase>G</phase>` marker inside it. Only
    /// elements with more than one child node are real phase entries.
    pub fn phases(&self) -> impl Iterator<Item = BurcatPhase<'a>> {
        self.element
            .descendants("phase")
            .filter(|p| p.child_count() > 1)
            .map(|element| BurcatPhase { element })
    }
}

impl BulkSpecies for BurcatSpecies<'_> {
    fn cas(&self) -> Option<&str> {
        BurcatSpecies::cas(self)
    }

    fn phase_coefficients(&self, options: ExtractOptions) -> Vec<PhaseCoefficients> {
        self.phases()
            .enumerate()
            .map(|(i, phase)| match phase.label() {
                Ok(label) => PhaseCoefficients {
                    label,
                    coefficients: phase.coefficients(options),
                },
                // A phase without exactly one formula and marker is not compared.
                Err(e) => PhaseCoefficients {
                    label: format!("phase {}", i + 1),
                    coefficients: Err(e),
                },
            })
            .collect()
    }
}

/// A structured `<phase>` entry: one formula, one phase-of-matter marker,
/// one coefficient set.
#[derive(Debug, Clone, Copy)]
pub struct BurcatPhase<'a> {
    element: Element<'a>,
}

impl<'a> BurcatPhase<'a> {
    pub fn formula(&self) -> Result<String, ExtractionError> {
        self.single_text("formula")
    }

    /// `S`, `L`, `G`, ...
    pub fn phase_of_matter(&self) -> Result<String, ExtractionError> {
        self.single_text("phase")
    }

    /// `CH2O (G)`
    pub fn label(&self) -> Result<String, ExtractionError> {
        Ok(format!("{} ({})", self.formula()?, self.phase_of_matter()?))
    }

    pub fn coefficients(
        &self,
        options: ExtractOptions,
    ) -> Result<thermocheck_recon::CoefficientMatrix, ExtractionError> {
        burcat_coefficients(self.element, options)
    }

    fn single_text(&self, node: &'static str) -> Result<String, ExtractionError> {
        let found: Vec<_> = self.element.descendants(node).collect();
        if found.len() != 1 {
            return Err(ExtractionError::NodeCount {
                node: node.into(),
                expected: 1,
                found: found.len(),
            });
        }
        Ok(found[0].text().trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = r#"<?xml version="1.0"?>
<database>
  <specie CAS="50-00-0">
    <formula_name_structure><formula_name_structure_1>CH2O FORMALDEHYDE</formula_name_structure_1></formula_name_structure>
    <phase>G</phase>
    <phase>
      <formula>CH2O</formula>
      <phase>G</phase>
      <coefficients>
        <range_Tmin_to_1000>
          <coef name="a1">4.79372315E+00</coef><coef name="a2">-9.90833369E-03</coef>
          <coef name="a3">3.73220008E-05</coef><coef name="a4">-3.79285261E-08</coef>
          <coef name="a5">1.31772652E-11</coef><coef name="a6">-1.43089567D+04</coef>
          <coef name="a7">6.02812900E-01</coef>
        </range_Tmin_to_1000>
        <range_1000_to_Tmax>
          <coef name="a1">1.76069008E+00</coef><coef name="a2">9.20000082E-03</coef>
          <coef name="a3">-4.42258813E-06</coef><coef name="a4">1.00641212E-09</coef>
          <coef name="a5">-8.83855640E-14</coef><coef name="a6">-1.39958323E+04</coef>
          <coef name="a7">1.36563230E+01</coef>
        </range_1000_to_Tmax>
      </coefficients>
    </phase>
  </specie>
  <specie>
    <phase>S</phase>
  </specie>
</database>"#;

    fn corpus() -> BulkCorpus {
        BulkCorpus::from_document(Document::parse_str(CORPUS).unwrap())
    }

    #[test]
    fn species_and_cas() {
        let corpus = corpus();
        let cas: Vec<_> = corpus.species().map(|s| s.cas()).collect();
        assert_eq!(cas, vec![Some("50-00-0"), None]);
    }

    #[test]
    fn text_phase_markers_are_excluded() {
        let corpus = corpus();
        let species: Vec<_> = corpus.species().collect();
        assert_eq!(species[0].phases().count(), 1);
        assert_eq!(species[1].phases().count(), 0);
    }

    #[test]
    fn phase_label_and_coefficients() {
        let corpus = corpus();
        let specie = corpus.species().next().unwrap();
        let phase = specie.phases().next().unwrap();
        assert_eq!(phase.label().unwrap(), "CH2O (G)");

        let m = phase.coefficients(ExtractOptions::default()).unwrap();
        assert_eq!(m.low()[5], -1.43089567e4);
        assert_eq!(m.high()[6], 13.656323);
    }

    #[test]
    fn species_iteration_restarts() {
        let corpus = corpus();
        assert_eq!(corpus.species().count(), 2);
        assert_eq!(corpus.species().count(), 2);
    }

    fn phase_with(formula_and_marker: &str) -> String {
        let high = CORPUS
            .split("<range_1000_to_Tmax>")
            .nth(1)
            .and_then(|rest| rest.split("</range_1000_to_Tmax>").next())
            .unwrap();
        let low = CORPUS
            .split("<range_Tmin_to_1000>")
            .nth(1)
            .and_then(|rest| rest.split("</range_Tmin_to_1000>").next())
            .unwrap();
        format!(
            "<database><specie CAS=\"50-00-0\"><phase>\n{formula_and_marker}<coefficients>\
             <range_Tmin_to_1000>{low}</range_Tmin_to_1000>\
             <range_1000_to_Tmax>{high}</range_1000_to_Tmax>\
             </coefficients></phase></specie></database>"
        )
    }

    fn only_phase(xml: &str) -> PhaseCoefficients {
        let corpus = BulkCorpus::from_document(Document::parse_str(xml).unwrap());
        let specie = corpus.species().next().unwrap();
        let mut phases = BulkSpecies::phase_coefficients(&specie, ExtractOptions::default());
        assert_eq!(phases.len(), 1);
        phases.remove(0)
    }

    #[test]
    fn well_formed_phase_extracts() {
        let phase = only_phase(&phase_with("<formula>CH2O</formula><phase>G</phase>"));
        assert_eq!(phase.label, "CH2O (G)");
        assert!(phase.coefficients.is_ok());
    }

    #[test]
    fn duplicate_formula_fails_even_with_good_coefficients() {
        let phase = only_phase(&phase_with(
            "<formula>CH2O</formula><formula>HCHO</formula><phase>G</phase>",
        ));
        assert_eq!(phase.label, "phase 1");
        assert_eq!(
            phase.coefficients.unwrap_err(),
            ExtractionError::NodeCount {
                node: "formula".into(),
                expected: 1,
                found: 2,
            }
        );
    }

    #[test]
    fn duplicate_phase_marker_fails_even_with_good_coefficients() {
        let phase = only_phase(&phase_with(
            "<formula>CH2O</formula><phase>G</phase><phase>L</phase>",
        ));
        assert_eq!(phase.label, "phase 1");
        assert!(matches!(
            phase.coefficients,
            Err(ExtractionError::NodeCount { ref node, found: 2, .. }) if node == "phase"
        ));
    }
}
