//! Coefficient extraction for the two source schemas.
//!
//! Both return a 2×7 [`CoefficientMatrix`] (row 0 = low-T, row 1 = high-T) or
//! an [`ExtractionError`] describing which structural assumption failed.

use thermocheck_recon::model::{ExtractOptions, TERMS};
use thermocheck_recon::{CoefficientMatrix, ExtractionError};

use crate::xml::Element;

// =============================================================================
// Burcat
// =============================================================================

/// Burcat segment tags.
pub const BURCAT_LOW_RANGE: &str = "range_Tmin_to_1000";
pub const BURCAT_HIGH_RANGE: &str = "range_1000_to_Tmax";

/// Extract from a structured Burcat `<phase>` element.
///
/// ```xml
/// <coefficients>
///   <range_Tmin_to_1000><coef name="a1">4.79372315E+00</coef>...</range_Tmin_to_1000>
///   <range_1000_to_Tmax><coef name="a1">1.76069008E+00</coef>...</range_1000_to_Tmax>
/// </coefficients>
/// ```
pub fn burcat_coefficients(
    phase: Element<'_>,
    options: ExtractOptions,
) -> Result<CoefficientMatrix, ExtractionError> {
    let sets: Vec<_> = phase.descendants("coefficients").collect();
    if sets.len() != 1 {
        return Err(ExtractionError::NodeCount {
            node: "coefficients".into(),
            expected: 1,
            found: sets.len(),
        });
    }
    let set = sets[0];

    let low = set
        .first(BURCAT_LOW_RANGE)
        .ok_or_else(|| ExtractionError::MissingNode(BURCAT_LOW_RANGE.into()))?;
    let high = set
        .first(BURCAT_HIGH_RANGE)
        .ok_or_else(|| ExtractionError::MissingNode(BURCAT_HIGH_RANGE.into()))?;

    let low = read_segment(BURCAT_LOW_RANGE, low.descendants("coef"), &["name"], parse_burcat_number, options)?;
    let high = read_segment(BURCAT_HIGH_RANGE, high.descendants("coef"), &["name"], parse_burcat_number, options)?;
    CoefficientMatrix::from_segments(&low, &high)
}

/// Burcat numbers may use `D` as the exponent marker and contain stray spaces
/// (`-1.43089567D+04`, `4.7937 2315E+00`).
pub fn parse_burcat_number(raw: &str) -> Option<f64> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == 'D' || c == 'd' { 'E' } else { c })
        .collect();
    normalized.parse().ok()
}

// =============================================================================
// PrIMe
// =============================================================================

/// Extract from a PrIMe thermo document root.
///
/// Exactly two `<polynomial>` nodes are required, low-T first, which is
/// verified by comparing their lower bounds.
pub fn prime_coefficients(
    thermo: Element<'_>,
    options: ExtractOptions,
) -> Result<CoefficientMatrix, ExtractionError> {
    let polynomials: Vec<_> = thermo.descendants("polynomial").collect();
    if polynomials.len() != 2 {
        return Err(ExtractionError::NodeCount {
            node: "polynomial".into(),
            expected: 2,
            found: polynomials.len(),
        });
    }

    let first = lower_bound(polynomials[0], "polynomial 1")?;
    let second = lower_bound(polynomials[1], "polynomial 2")?;
    // Negated so a NaN bound also fails.
    if !(first < second) {
        return Err(ExtractionError::SegmentOrder { first, second });
    }

    let labels = &["id", "label"];
    let low = read_segment("polynomial 1", polynomials[0].descendants("coefficient"), labels, parse_plain_number, options)?;
    let high = read_segment("polynomial 2", polynomials[1].descendants("coefficient"), labels, parse_plain_number, options)?;
    CoefficientMatrix::from_segments(&low, &high)
}

/// The `kind="lower"` bound, else the first bound in the polynomial.
fn lower_bound(polynomial: Element<'_>, segment: &str) -> Result<f64, ExtractionError> {
    let bound = polynomial
        .descendants("bound")
        .find(|b| b.attribute("kind") == Some("lower"))
        .or_else(|| polynomial.first("bound"))
        .ok_or_else(|| ExtractionError::MissingNode("bound".into()))?;
    let text = bound.text();
    parse_plain_number(&text).ok_or_else(|| ExtractionError::NumberParse {
        segment: segment.into(),
        value: text.trim().to_string(),
    })
}

pub fn parse_plain_number(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

// =============================================================================
// Shared
// =============================================================================

fn read_segment<'a>(
    segment: &str,
    nodes: impl Iterator<Item = Element<'a>>,
    label_attributes: &[&str],
    parse: fn(&str) -> Option<f64>,
    options: ExtractOptions,
) -> Result<Vec<f64>, ExtractionError> {
    let mut values = Vec::with_capacity(TERMS);
    for (i, node) in nodes.enumerate() {
        if options.verify_column_labels {
            for attr in label_attributes {
                if let Some(label) = node.attribute(attr) {
                    check_label(segment, i + 1, label)?;
                }
            }
        }
        let text = node.text();
        let value = parse(&text).ok_or_else(|| ExtractionError::NumberParse {
            segment: segment.into(),
            value: text.trim().to_string(),
        })?;
        values.push(value);
    }

    if values.len() != TERMS {
        return Err(ExtractionError::CoefficientCount {
            segment: segment.into(),
            found: values.len(),
        });
    }
    Ok(values)
}

/// A label's trailing integer (`a3`, `3`) must equal the 1-based position.
/// Labels without one carry no ordering information and pass.
fn check_label(segment: &str, position: usize, label: &str) -> Result<(), ExtractionError> {
    let trimmed = label.trim();
    let prefix = trimmed.trim_end_matches(|c: char| c.is_ascii_digit());
    match trimmed[prefix.len()..].parse::<usize>() {
        Ok(n) if n != position => Err(ExtractionError::ColumnLabel {
            segment: segment.into(),
            position,
            label: trimmed.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;

    const STRICT: ExtractOptions = ExtractOptions {
        verify_column_labels: true,
    };

    fn burcat_phase(low: &str, high: &str) -> String {
        format!(
            "<phase>\n<formula>CH2O</formula>\n<phase>G</phase>\n<coefficients>\
             <range_1000_to_Tmax>{high}</range_1000_to_Tmax>\
             <range_Tmin_to_1000>{low}</range_Tmin_to_1000>\
             </coefficients>\n</phase>"
        )
    }

    fn coefs(tag: &str, label_attr: &str, values: &[&str]) -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("<{tag} {label_attr}=\"a{}\">{v}</{tag}>", i + 1))
            .collect()
    }

    fn prime_poly(lower: &str, upper: &str, values: &[&str]) -> String {
        let coefficients: String = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("<coefficient id=\"{}\" label=\"a{}\">{v}</coefficient>", i + 1, i + 1))
            .collect();
        format!(
            "<polynomial><validRange><bound kind=\"lower\" units=\"K\">{lower}</bound>\
             <bound kind=\"upper\" units=\"K\">{upper}</bound></validRange>{coefficients}</polynomial>"
        )
    }

    const SEVEN: [&str; 7] = ["1", "2", "3", "4", "5", "6", "7"];
    const SEVEN_HIGH: [&str; 7] = ["11", "12", "13", "14", "15", "16", "17"];

    #[test]
    fn burcat_number_normalization() {
        assert_eq!(parse_burcat_number("-1.43089567D+04"), Some(-1.43089567e4));
        assert_eq!(parse_burcat_number(" 4.7937 2315E+00\n"), Some(4.79372315));
        assert_eq!(parse_burcat_number("1.0d-3"), Some(1.0e-3));
        assert_eq!(parse_burcat_number("abc"), None);
    }

    #[test]
    fn burcat_segments_are_placed_by_tag_not_order() {
        let xml = burcat_phase(&coefs("coef", "name", &SEVEN), &coefs("coef", "name", &SEVEN_HIGH));
        let doc = Document::parse_str(&xml).unwrap();
        let m = burcat_coefficients(doc.root(), STRICT).unwrap();
        assert_eq!(m.low(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(m.high()[0], 11.0);
    }

    #[test]
    fn burcat_missing_range_is_an_error() {
        let xml = "<phase><coefficients><range_Tmin_to_1000/></coefficients><x/></phase>";
        let doc = Document::parse_str(xml).unwrap();
        let err = burcat_coefficients(doc.root(), STRICT).unwrap_err();
        assert_eq!(err, ExtractionError::MissingNode("range_1000_to_Tmax".into()));
    }

    #[test]
    fn burcat_six_coefficients_is_an_error() {
        let xml = burcat_phase(&coefs("coef", "name", &SEVEN[..6]), &coefs("coef", "name", &SEVEN_HIGH));
        let doc = Document::parse_str(&xml).unwrap();
        let err = burcat_coefficients(doc.root(), STRICT).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::CoefficientCount {
                segment: BURCAT_LOW_RANGE.into(),
                found: 6
            }
        );
    }

    #[test]
    fn prime_extracts_low_then_high() {
        let xml = format!(
            "<thermo primeID=\"thp1\">{}{}</thermo>",
            prime_poly("200", "1000", &SEVEN),
            prime_poly("1000", "6000", &SEVEN_HIGH)
        );
        let doc = Document::parse_str(&xml).unwrap();
        let m = prime_coefficients(doc.root(), STRICT).unwrap();
        assert_eq!(m.low()[6], 7.0);
        assert_eq!(m.high()[6], 17.0);
    }

    #[test]
    fn prime_three_polynomials_is_an_error() {
        let poly = prime_poly("200", "1000", &SEVEN);
        let xml = format!("<thermo>{poly}{poly}{poly}</thermo>");
        let doc = Document::parse_str(&xml).unwrap();
        let err = prime_coefficients(doc.root(), STRICT).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::NodeCount {
                node: "polynomial".into(),
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn prime_reversed_polynomials_is_an_error() {
        let xml = format!(
            "<thermo>{}{}</thermo>",
            prime_poly("1000", "6000", &SEVEN_HIGH),
            prime_poly("200", "1000", &SEVEN)
        );
        let doc = Document::parse_str(&xml).unwrap();
        let err = prime_coefficients(doc.root(), STRICT).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::SegmentOrder {
                first: 1000.0,
                second: 200.0
            }
        );
    }

    #[test]
    fn prime_untagged_bound_falls_back_to_first() {
        let xml = "<thermo>\
            <polynomial><bound>300</bound><bound>1000</bound>\
            <coefficient>1</coefficient><coefficient>2</coefficient><coefficient>3</coefficient>\
            <coefficient>4</coefficient><coefficient>5</coefficient><coefficient>6</coefficient>\
            <coefficient>7</coefficient></polynomial>\
            <polynomial><bound>1000</bound><bound>5000</bound>\
            <coefficient>1</coefficient><coefficient>2</coefficient><coefficient>3</coefficient>\
            <coefficient>4</coefficient><coefficient>5</coefficient><coefficient>6</coefficient>\
            <coefficient>7</coefficient></polynomial></thermo>";
        let doc = Document::parse_str(xml).unwrap();
        assert!(prime_coefficients(doc.root(), STRICT).is_ok());
    }

    #[test]
    fn swapped_column_labels_are_caught() {
        let swapped = "<coefficient id=\"2\">1</coefficient><coefficient id=\"1\">2</coefficient>\
            <coefficient id=\"3\">3</coefficient><coefficient id=\"4\">4</coefficient>\
            <coefficient id=\"5\">5</coefficient><coefficient id=\"6\">6</coefficient>\
            <coefficient id=\"7\">7</coefficient>";
        let xml = format!(
            "<thermo><polynomial><bound kind=\"lower\">200</bound>{swapped}</polynomial>{}</thermo>",
            prime_poly("1000", "6000", &SEVEN_HIGH)
        );
        let doc = Document::parse_str(&xml).unwrap();
        let err = prime_coefficients(doc.root(), STRICT).unwrap_err();
        assert!(matches!(err, ExtractionError::ColumnLabel { position: 1, .. }));

        let lenient = ExtractOptions {
            verify_column_labels: false,
        };
        assert!(prime_coefficients(doc.root(), lenient).is_ok());
    }

    #[test]
    fn labels_without_digits_pass() {
        assert!(check_label("s", 4, "alpha").is_ok());
        assert!(check_label("s", 4, "a4").is_ok());
        assert!(check_label("s", 4, "a5").is_err());
    }
}
