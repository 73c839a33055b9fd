//! SVG path extraction.
//!
//! Every `<path>` element of a document is read in document order, in one of
//! two modes:
//!
//! - [`ExtractionMode::ColorKeyed`] joins all `d` attributes of a file with a
//!   single space and keys the result by a color code taken from the file
//!   name. This is what frame folders produce.
//! - [`ExtractionMode::Attributes`] keeps one [`PathAttributes`] per element,
//!   with both `d` and `fill`.
//!
//! [`extract_file`] never fails: a file that cannot be read or parsed yields
//! an empty (or `null`) contribution plus the error, so a handful of bad
//! files cannot abort a bulk run.

use std::path::Path;

use roxmltree::{Document, ParsingOptions};

use crate::{
    error::Svg2BasError,
    listing::DirectoryListing,
    record::{ColorPath, PathAttributes},
};

/// How paths are extracted from one SVG file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// One [`ColorPath`] per file with all paths space-joined.
    ColorKeyed,
    /// One [`PathAttributes`] per `<path>` element.
    Attributes,
}

/// Paths extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedPaths {
    Color(ColorPath),
    Attributes(Vec<PathAttributes>),
}

/// Result of [`extract_file`]: the file's contribution and, if it was
/// degraded, why.
#[derive(Debug)]
pub struct Extraction {
    pub paths: ExtractedPaths,
    pub failure: Option<Svg2BasError>,
}

impl Extraction {
    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}

/// Parse an SVG document and return the attributes of every `<path>`
/// element in document order.
///
/// A missing or blank `d` is reported as `None`. The parsed document is
/// dropped before this function returns.
///
/// # Errors
///
/// Returns the XML error if `text` is not well-formed.
pub fn parse_paths(text: &str) -> Result<Vec<PathAttributes>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(text, options)?;

    let paths = document
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "path")
        .map(|node| PathAttributes {
            d: node
                .attribute("d")
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            fill: node.attribute("fill").map(str::to_string),
        })
        .collect();
    Ok(paths)
}

/// Extract the paths of one document in the given mode.
///
/// # Errors
///
/// Returns the XML error if `text` is not well-formed.
pub fn extract(
    mode: ExtractionMode,
    identifier: &str,
    text: &str,
) -> Result<ExtractedPaths, roxmltree::Error> {
    let paths = parse_paths(text)?;
    Ok(match mode {
        ExtractionMode::ColorKeyed => {
            let joined = paths
                .iter()
                .filter_map(|path| path.d.as_deref())
                .collect::<Vec<_>>()
                .join(" ");
            ExtractedPaths::Color(ColorPath {
                color: identifier.to_string(),
                pathdata: Some(joined),
            })
        }
        ExtractionMode::Attributes => ExtractedPaths::Attributes(paths),
    })
}

/// The identifier of an SVG file: its name with the extension stripped.
pub fn identifier_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read and extract one SVG file, recovering from any failure.
///
/// On failure the color-keyed contribution has `pathdata: None` and the
/// attribute contribution is empty; the error is returned alongside.
pub fn extract_file<L>(listing: &L, path: &Path, mode: ExtractionMode) -> Extraction
where
    L: DirectoryListing + ?Sized,
{
    let identifier = identifier_for(path);

    let result = listing
        .read_to_string(path)
        .map_err(|error| error.to_string())
        .and_then(|text| extract(mode, &identifier, &text).map_err(|error| error.to_string()));

    match result {
        Ok(paths) => Extraction {
            paths,
            failure: None,
        },
        Err(reason) => {
            log::warn!("Skipping geometry of {}: {}", path.display(), reason);
            let paths = match mode {
                ExtractionMode::ColorKeyed => ExtractedPaths::Color(ColorPath {
                    color: identifier,
                    pathdata: None,
                }),
                ExtractionMode::Attributes => ExtractedPaths::Attributes(Vec::new()),
            };
            Extraction {
                paths,
                failure: Some(Svg2BasError::Parse {
                    path: path.to_path_buf(),
                    reason,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PATHS: &str = r##"<?xml version="1.0" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 20010904//EN"
 "http://www.w3.org/TR/2001/REC-SVG-20010904/DTD/svg10.dtd">
<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
  <g fill="#ff0000">
    <path d="M0 0 L1 1"/>
    <path d="M2 2 L3 3" fill="#00ff00"/>
  </g>
</svg>"##;

    #[test]
    fn document_order_is_kept() {
        let paths = parse_paths(TWO_PATHS).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].d.as_deref(), Some("M0 0 L1 1"));
        assert_eq!(paths[1].d.as_deref(), Some("M2 2 L3 3"));
        assert_eq!(paths[0].fill, None);
        assert_eq!(paths[1].fill.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn color_keyed_joins_with_single_space() {
        let extracted = extract(ExtractionMode::ColorKeyed, "ff0000", TWO_PATHS).unwrap();
        assert_eq!(
            extracted,
            ExtractedPaths::Color(ColorPath {
                color: "ff0000".to_string(),
                pathdata: Some("M0 0 L1 1 M2 2 L3 3".to_string()),
            })
        );
    }

    #[test]
    fn missing_d_leaves_no_gap_in_join() {
        let svg = r#"<svg><path d="M0 0"/><path fill="red"/><path d=" "/><path d="M1 1"/></svg>"#;
        let extracted = extract(ExtractionMode::ColorKeyed, "ff0000", svg).unwrap();
        assert_eq!(
            extracted,
            ExtractedPaths::Color(ColorPath {
                color: "ff0000".to_string(),
                pathdata: Some("M0 0 M1 1".to_string()),
            })
        );
    }

    #[test]
    fn blank_d_is_none() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="  "/><path/></svg>"#;
        let paths = parse_paths(svg).unwrap();
        assert_eq!(paths, vec![PathAttributes::default(), PathAttributes::default()]);

        let extracted = extract(ExtractionMode::ColorKeyed, "000000", svg).unwrap();
        assert_eq!(
            extracted,
            ExtractedPaths::Color(ColorPath {
                color: "000000".to_string(),
                pathdata: Some(String::new()),
            })
        );
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse_paths("<svg><path d=\"M0 0\"></svg>").is_err());
    }

    #[test]
    fn identifier_strips_extension() {
        assert_eq!(identifier_for(Path::new("frames/1_1/ff00aa.svg")), "ff00aa");
    }
}
