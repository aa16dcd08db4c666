//! URL handling module for Prowl
//!
//! This module provides reference resolution for discovered hyperlinks and the
//! substring classifier that decides whether a URL is a product page.

mod matcher;
mod resolve;

// Re-export main functions
pub use matcher::is_product_url;
pub use resolve::resolve_url;
