//! Version resolution (spec §4.H): picks the best indexed version for a
//! library given an optional target, which may be absent, `"latest"`, an
//! exact semver, or an X-range (`5`, `5.x`, `5.2.x`).

use docsforge_shared::{parse_semver, Error, Result};
use semver::Version;

/// Resolve the best matching version for `target` against the indexed set.
///
/// `available` is the library's indexed version strings (may include the
/// empty string, filtered out here before semver parsing); `has_unversioned`
/// is whether the unversioned bucket itself has any chunks.
pub fn find_best_version(
    library: &str,
    available: &[String],
    has_unversioned: bool,
    target: Option<&str>,
) -> Result<(Option<String>, bool)> {
    let mut versions: Vec<Version> = available.iter().filter_map(|v| parse_semver(v)).collect();
    versions.sort();

    if versions.is_empty() && !has_unversioned {
        return Err(Error::version_not_found(library, target.map(String::from), Vec::new()));
    }

    let target = target.map(str::trim).filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("latest"));

    let best = match target {
        None => versions.last().cloned(),
        Some(t) => {
            if let Ok(exact) = Version::parse(t) {
                versions
                    .iter()
                    .filter(|v| **v <= exact)
                    .max()
                    .cloned()
                    .or_else(|| versions.last().cloned())
            } else {
                match x_range_bounds(t) {
                    Ok((min, max)) => versions
                        .iter()
                        .filter(|v| **v >= min && **v < max)
                        .max()
                        .cloned()
                        .or_else(|| versions.last().cloned()),
                    // Invalid target format: no fall back to max(V), just the
                    // unversioned-bucket/not-found decision below.
                    Err(_) => {
                        return if has_unversioned {
                            Ok((None, true))
                        } else {
                            let available: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
                            Err(Error::version_not_found(library, target.map(String::from), available))
                        };
                    }
                }
            }
        }
    };

    if best.is_none() && !has_unversioned {
        let available: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        return Err(Error::version_not_found(library, target.map(String::from), available));
    }

    Ok((best.map(|v| v.to_string()), has_unversioned))
}

/// Parse an X-range like `5`, `5.x`, `5.2.x` into a half-open `[min, max)`
/// semver bound.
fn x_range_bounds(spec: &str) -> Result<(Version, Version)> {
    let parts: Vec<&str> = spec.split('.').collect();
    let is_wild = |s: &str| s.eq_ignore_ascii_case("x") || s == "*";

    let major: u64 = parts
        .first()
        .filter(|p| !is_wild(p))
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| Error::validation(format!("invalid version range: {spec}")))?;

    match parts.len() {
        1 => Ok((Version::new(major, 0, 0), Version::new(major + 1, 0, 0))),
        2 | 3 => {
            let minor_part = parts[1];
            if is_wild(minor_part) || minor_part.is_empty() {
                return Ok((Version::new(major, 0, 0), Version::new(major + 1, 0, 0)));
            }
            let minor: u64 = minor_part.parse().map_err(|_| Error::validation(format!("invalid version range: {spec}")))?;
            Ok((Version::new(major, minor, 0), Version::new(major, minor + 1, 0)))
        }
        _ => Err(Error::validation(format!("invalid version range: {spec}"))),
    }
}
