//! Extraction of article title/link pairs from source search pages.
//!
//! Every source is described by an [`ExtractionRule`] in [`rules`], and one
//! generic routine interprets it. A rule only ever sees its own source's
//! HTML, so stale markup on one site cannot affect extraction for another.
//!
//! # Supported Sources
//!
//! | Source | Container | Title |
//! |--------|-----------|-------|
//! | VnExpress | `article.item-news` | `h3.title-news` |
//! | Thanh Niên | `article.story` | `h2.story__title` |
//! | Tuổi Trẻ | `div.name-news` | `h3.title-news` |
//! | VietnamNet | `div.box-content-search-result` | `h3.title` |
//!
//! Containers missing a title element, a link, or an `href` are skipped.
//! Links are resolved against the source origin, so the output is always
//! absolute.

pub mod rules;

pub use rules::{ExtractionRule, rule_for};

use crate::models::Candidate;
use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

/// Extract candidates from `html` using the rule registered for `source_name`.
///
/// Unknown sources yield an empty list.
#[instrument(level = "debug", skip(html), fields(bytes = html.len()))]
pub fn extract(source_name: &str, html: &str) -> Vec<Candidate> {
    match rule_for(source_name) {
        Some(rule) => extract_with_rule(rule, html),
        None => {
            warn!("No extraction rule for source");
            Vec::new()
        }
    }
}

/// Apply one [`ExtractionRule`] to a search results page.
pub fn extract_with_rule(rule: &ExtractionRule, html: &str) -> Vec<Candidate> {
    let (Some(container), Some(title), Some(link)) = (
        compile(rule.container),
        compile(rule.title),
        compile(rule.link),
    ) else {
        return Vec::new();
    };
    let origin = match Url::parse(rule.origin) {
        Ok(origin) => origin,
        Err(e) => {
            warn!(origin = rule.origin, error = %e, "Invalid origin in extraction rule");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let candidates: Vec<Candidate> = document
        .select(&container)
        .filter_map(|item| candidate_from(item, &title, &link, &origin))
        .collect();

    debug!(count = candidates.len(), "Extracted candidates");
    candidates
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!(selector, error = ?e, "Invalid selector in extraction rule");
            None
        }
    }
}

fn candidate_from(
    item: ElementRef<'_>,
    title_sel: &Selector,
    link_sel: &Selector,
    origin: &Url,
) -> Option<Candidate> {
    let heading = item.select(title_sel).next()?;
    let anchor = heading.select(link_sel).next()?;
    let href = anchor.value().attr("href")?.trim();

    let mut title = collapse_whitespace(&anchor.text().collect::<String>());
    if title.is_empty() {
        title = collapse_whitespace(anchor.value().attr("title").unwrap_or_default());
    }
    if title.is_empty() {
        return None;
    }

    let url = origin.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    Some(Candidate {
        title,
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VNEXPRESS_HTML: &str = r#"
        <html><body>
          <article class="item-news item-news-common">
            <h3 class="title-news">
              <a href="https://vnexpress.net/bong-da-viet-nam-thang-lon-1.html" title="Bóng đá Việt Nam thắng lớn">
                Bóng đá Việt Nam
                thắng lớn
              </a>
            </h3>
            <p class="description">Mô tả</p>
          </article>
          <article class="item-news">
            <h3 class="title-news"><a href="/the-thao/doi-tuyen-2.html">Đội tuyển tập luyện</a></h3>
          </article>
          <article class="item-news">
            <p class="description">Quảng cáo không có tiêu đề</p>
          </article>
          <article class="item-news">
            <h3 class="title-news"><span>Không có liên kết</span></h3>
          </article>
          <article class="item-news">
            <h3 class="title-news"><a>Thiếu href</a></h3>
          </article>
        </body></html>
    "#;

    const VIETNAMNET_HTML: &str = r#"
        <div class="box-content-search-result">
          <h3 class="title"><a href="/the-thao/bong-da-123.html">Bóng đá Việt Nam</a></h3>
        </div>
        <div class="box-content-search-result">
          <h3 class="title"><a href="javascript:void(0)">Không hợp lệ</a></h3>
        </div>
    "#;

    const THANHNIEN_HTML: &str = r#"
        <article class="story">
          <h2 class="story__title"><a href="https://thanhnien.vn/a.htm" title="Tiêu đề dự phòng"><img src="x.jpg"></a></h2>
        </article>
        <article class="story">
          <h2 class="story__title"><a href="//thanhnien.vn/b.htm">Việt Nam vô địch</a></h2>
        </article>
    "#;

    const TUOITRE_HTML: &str = r#"
        <div class="name-news">
          <h3 class="title-news"><a href="/viet-nam-1.htm">Việt Nam hôm nay</a></h3>
        </div>
    "#;

    #[test]
    fn test_vnexpress_fixture() {
        let got = extract("VnExpress", VNEXPRESS_HTML);
        assert_eq!(
            got,
            vec![
                Candidate {
                    title: "Bóng đá Việt Nam thắng lớn".to_string(),
                    url: "https://vnexpress.net/bong-da-viet-nam-thang-lon-1.html".to_string(),
                },
                Candidate {
                    title: "Đội tuyển tập luyện".to_string(),
                    url: "https://vnexpress.net/the-thao/doi-tuyen-2.html".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_vietnamnet_relative_links_made_absolute() {
        let got = extract("VietnamNet", VIETNAMNET_HTML);
        assert_eq!(
            got,
            vec![Candidate {
                title: "Bóng đá Việt Nam".to_string(),
                url: "https://vietnamnet.vn/the-thao/bong-da-123.html".to_string(),
            }]
        );
    }

    #[test]
    fn test_thanhnien_title_attribute_fallback_and_protocol_relative() {
        let got = extract("Thanh Niên", THANHNIEN_HTML);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].title, "Tiêu đề dự phòng");
        assert_eq!(got[0].url, "https://thanhnien.vn/a.htm");
        assert_eq!(got[1].url, "https://thanhnien.vn/b.htm");
    }

    #[test]
    fn test_tuoitre_fixture() {
        let got = extract("Tuổi Trẻ", TUOITRE_HTML);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].url, "https://tuoitre.vn/viet-nam-1.htm");
    }

    #[test]
    fn test_rules_are_isolated_per_source() {
        // VnExpress markup means nothing to the VietnamNet rule.
        assert!(extract("VietnamNet", VNEXPRESS_HTML).is_empty());
        assert!(extract("VnExpress", VIETNAMNET_HTML).is_empty());
    }

    #[test]
    fn test_unknown_source_yields_nothing() {
        assert!(extract("Unknown Daily", VNEXPRESS_HTML).is_empty());
    }

    #[test]
    fn test_stale_markup_yields_nothing() {
        assert!(extract("VnExpress", "<html><body><div>redesigned</div></body></html>").is_empty());
        assert!(extract("VnExpress", "").is_empty());
    }

    #[test]
    fn test_invalid_rule_selectors_yield_nothing() {
        let broken = ExtractionRule {
            container: "article[[",
            title: "h3",
            link: "a",
            origin: "https://example.com",
        };
        assert!(extract_with_rule(&broken, VNEXPRESS_HTML).is_empty());
    }
}
