//! Per-source extraction rules.
//!
//! Each rule is a snapshot of one site's search results markup. When a site
//! changes its markup only its entry here needs to change.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// CSS selectors describing where article links live on a search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRule {
    /// One match per search result.
    pub container: &'static str,
    /// Element inside the container that holds the headline.
    pub title: &'static str,
    /// Link inside the title element; its text is the headline.
    pub link: &'static str,
    /// Scheme and host used to resolve relative links.
    pub origin: &'static str,
}

static RULES: Lazy<HashMap<&'static str, ExtractionRule>> = Lazy::new(|| {
    HashMap::from([
        (
            "VnExpress",
            ExtractionRule {
                container: "article.item-news",
                title: "h3.title-news",
                link: "a[href]",
                origin: "https://vnexpress.net",
            },
        ),
        (
            "Thanh Niên",
            ExtractionRule {
                container: "article.story",
                title: "h2.story__title",
                link: "a[href]",
                origin: "https://thanhnien.vn",
            },
        ),
        (
            "Tuổi Trẻ",
            ExtractionRule {
                container: "div.name-news",
                title: "h3.title-news",
                link: "a[href]",
                origin: "https://tuoitre.vn",
            },
        ),
        (
            "VietnamNet",
            ExtractionRule {
                container: "div.box-content-search-result",
                title: "h3.title",
                link: "a[href]",
                origin: "https://vietnamnet.vn",
            },
        ),
    ])
});

/// Look up the rule for a source by its configured name.
pub fn rule_for(source_name: &str) -> Option<&'static ExtractionRule> {
    RULES.get(source_name)
}
