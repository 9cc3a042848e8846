//! Source/tag filtering and pagination over the aggregated article list.

use serde::Serialize;

use crate::models::{Article, Source};

/// Source filter: everything, or exactly one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFilter {
    #[default]
    All,
    One(Source),
}

impl std::str::FromStr for SourceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(SourceFilter::All)
        } else {
            s.parse::<Source>().map(SourceFilter::One)
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub source: SourceFilter,
    /// Active tag filters, lowercased.
    pub tags: Vec<String>,
    /// Pagination cutoff (display count).
    pub limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub articles: Vec<Article>,
    pub has_more: bool,
    pub total: usize,
}

/// Fuzzy tag predicate: an empty active set matches everything; otherwise
/// some active tag must be a substring of one of the article's tags (or
/// vice versa), or appear literally in the lowercased title.
pub fn matches_tags(article: &Article, active: &[String]) -> bool {
    if active.is_empty() {
        return true;
    }
    let title = article.title.to_lowercase();
    active.iter().any(|t| {
        article
            .tags
            .iter()
            .any(|at| at.contains(t.as_str()) || t.contains(at.as_str()))
            || title.contains(t.as_str())
    })
}

fn matches_source(article: &Article, filter: SourceFilter) -> bool {
    match filter {
        SourceFilter::All => true,
        SourceFilter::One(source) => article.source == source,
    }
}

/// Apply both filters, then truncate to the query's display count.
pub fn select_page(articles: &[Article], query: &FeedQuery) -> FeedPage {
    let filtered: Vec<&Article> = articles
        .iter()
        .filter(|a| matches_source(a, query.source) && matches_tags(a, &query.tags))
        .collect();

    let total = filtered.len();
    let page: Vec<Article> = filtered
        .into_iter()
        .take(query.limit)
        .cloned()
        .collect();
    let has_more = page.len() < total;

    FeedPage {
        articles: page,
        has_more,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleTime;

    fn article(id: &str, source: Source, title: &str, tags: &[&str]) -> Article {
        Article {
            id: id.to_string(),
            source,
            title: title.to_string(),
            url: format!("https://example.com/{}", id),
            hn_url: None,
            score: 0,
            comments: 0,
            time: ArticleTime::Unix(0),
            by: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: None,
            source_name: None,
            source_badge: None,
        }
    }

    fn sample() -> Vec<Article> {
        vec![
            article("hn_1", Source::Hn, "Rust 2.0 released", &["rust"]),
            article("hn_2", Source::Hn, "Show HN: my thing", &[]),
            article("devto_1", Source::Devto, "React hooks deep dive", &["react", "webdev"]),
            article("devto_2", Source::Devto, "Docker tips", &["docker"]),
            article("devto_3", Source::Devto, "CSS tricks", &["css"]),
        ]
    }

    fn query(source: SourceFilter, tags: &[&str], limit: usize) -> FeedQuery {
        FeedQuery {
            source,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            limit,
        }
    }

    #[test]
    fn test_source_filter() {
        let page = select_page(&sample(), &query(SourceFilter::One(Source::Hn), &[], 15));
        assert_eq!(page.articles.len(), 2);
        assert!(page.articles.iter().all(|a| a.source == Source::Hn));
    }

    #[test]
    fn test_all_passes_everything() {
        let page = select_page(&sample(), &query(SourceFilter::All, &[], 15));
        assert_eq!(page.articles.len(), 5);
        assert!(!page.has_more);
    }

    #[test]
    fn test_tag_matches_article_tag() {
        let page = select_page(&sample(), &query(SourceFilter::All, &["react"], 15));
        assert_eq!(page.articles.len(), 1);
        assert_eq!(page.articles[0].id, "devto_1");
    }

    #[test]
    fn test_tag_matches_title_substring() {
        // No article carries a "rust" source tag match for devto, but the
        // HN title contains "rust" literally.
        let page = select_page(&sample(), &query(SourceFilter::All, &["rust"], 15));
        assert_eq!(page.articles.len(), 1);
        assert_eq!(page.articles[0].id, "hn_1");
    }

    #[test]
    fn test_fuzzy_match_is_bidirectional() {
        // Active tag "web" is a substring of the article tag "webdev".
        let page = select_page(&sample(), &query(SourceFilter::All, &["web"], 15));
        assert!(page.articles.iter().any(|a| a.id == "devto_1"));

        // Article tag "css" is a substring of the active tag "css tricks".
        let page = select_page(&sample(), &query(SourceFilter::All, &["css tricks"], 15));
        assert!(page.articles.iter().any(|a| a.id == "devto_3"));
    }

    #[test]
    fn test_multiple_active_tags_or_semantics() {
        let page = select_page(&sample(), &query(SourceFilter::All, &["react", "docker"], 15));
        assert_eq!(page.articles.len(), 2);
    }

    #[test]
    fn test_empty_tag_set_matches_all() {
        let page = select_page(&sample(), &query(SourceFilter::All, &[], 15));
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_pagination_and_has_more() {
        let page = select_page(&sample(), &query(SourceFilter::All, &[], 2));
        assert_eq!(page.articles.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.total, 5);

        let page = select_page(&sample(), &query(SourceFilter::All, &[], 5));
        assert!(!page.has_more);
    }

    #[test]
    fn test_filters_combine() {
        let page = select_page(
            &sample(),
            &query(SourceFilter::One(Source::Devto), &["docker"], 15),
        );
        assert_eq!(page.articles.len(), 1);
        assert_eq!(page.articles[0].id, "devto_2");
    }

    #[test]
    fn test_source_filter_parse() {
        assert_eq!("all".parse::<SourceFilter>().unwrap(), SourceFilter::All);
        assert_eq!(
            "hn".parse::<SourceFilter>().unwrap(),
            SourceFilter::One(Source::Hn)
        );
        assert!("bogus".parse::<SourceFilter>().is_err());
    }
}
