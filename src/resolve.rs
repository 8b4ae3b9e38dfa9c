use url::Url;

/// Resolves `relative` against `base` using standard URI reference resolution.
///
/// Resolution never fails: when either side cannot be parsed the relative
/// reference is returned unchanged.
pub fn resolve(base: &str, relative: &str) -> String {
    match Url::parse(base) {
        Ok(base_url) => resolve_against(&base_url, relative),
        Err(e) => {
            ::log::trace!("Unparseable base URL {:?}: {}", base, e);
            relative.to_string()
        }
    }
}

/// Same as [`resolve`] for an already parsed base.
pub fn resolve_against(base: &Url, relative: &str) -> String {
    match base.join(relative) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            ::log::trace!("Leaving {:?} unresolved against {}: {}", relative, base, e);
            relative.to_string()
        }
    }
}

/// Cache identity of a page URL: the URL without its fragment.
/// Strings that do not parse are used as-is.
pub fn normalize_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
