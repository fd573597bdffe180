//! Food names to URL path segments

use crate::error::{GiziError, Result};

/// Turn a food name or search query into a single URL path segment.
///
/// Lower-cases, replaces spaces with hyphens and percent-encodes everything
/// outside the unreserved set, so `/`, `?` and `#` cannot escape the segment.
pub fn slugify(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GiziError::InvalidInput("name must not be empty".into()));
    }

    let hyphenated = trimmed.to_lowercase().replace(' ', "-");
    let slug = urlencoding::encode(&hyphenated).into_owned();

    // Dot segments are unreserved but still rewrite the path
    if slug == "." || slug == ".." {
        return Err(GiziError::InvalidInput(format!(
            "'{}' is not a usable food name",
            trimmed
        )));
    }

    Ok(slug)
}
