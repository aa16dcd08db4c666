use url::Url;

/// Resolves a hyperlink reference against the URL of the page it was found on
///
/// Resolution follows the standard reference-resolution rules: absolute references
/// replace the base entirely, scheme-relative and path-relative references take the
/// missing parts from the base. Fragments and query strings are kept as written.
///
/// Resolution never fails. If the base URL or the reference cannot be parsed, the
/// reference is returned unchanged, so callers must tolerate output that is not an
/// absolute URL. Such a value fails later at request construction and only stops
/// its own branch of the traversal.
///
/// # Examples
///
/// ```
/// use prowl::url::resolve_url;
///
/// assert_eq!(
///     resolve_url("https://shop.test/category/shoes", "../product/1"),
///     "https://shop.test/product/1"
/// );
/// assert_eq!(resolve_url("not a base", "/product/1"), "/product/1");
/// ```
pub fn resolve_url(base: &str, href: &str) -> String {
    let base_url = match Url::parse(base) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Unparseable base URL {}: {}", base, e);
            return href.to_string();
        }
    };

    match base_url.join(href) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            tracing::trace!("Unparseable reference {} on {}: {}", href, base, e);
            href.to_string()
        }
    }
}
