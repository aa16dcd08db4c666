/// Checks whether a URL looks like a product page
///
/// A URL is a product URL if it contains at least one of the patterns as a
/// contiguous substring. Matching is case-sensitive and unanchored; patterns are
/// plain text, not regular expressions. Checking stops at the first match.
///
/// # Examples
///
/// ```
/// use prowl::url::is_product_url;
///
/// let patterns = vec!["/product/".to_string(), "/p/".to_string()];
///
/// assert!(is_product_url("https://shop.test/product/1", &patterns));
/// assert!(is_product_url("https://shop.test/p/42?color=red", &patterns));
/// assert!(!is_product_url("https://shop.test/category/shoes", &patterns));
/// ```
pub fn is_product_url(url: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| url.contains(pattern.as_str()))
}
