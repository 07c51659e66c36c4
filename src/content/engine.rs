use chrono::{DateTime, Utc};

use crate::models::{Article, ArticlePage, ArticleQuery, FEATURED_LIMIT};

/// Filters, sorts and pages an in-memory article list.
///
/// Order matters: search, category, featured cut, newest-first sort, page
/// slice. `total` counts matches before slicing.
pub fn apply_query(articles: Vec<Article>, query: &ArticleQuery) -> ArticlePage {
    let mut matched: Vec<Article> = articles;

    if let Some(term) = query.search_term() {
        let needle = term.to_lowercase();
        matched.retain(|a| a.matches_search(&needle));
    }

    if let Some(category) = query.category_filter() {
        matched.retain(|a| a.in_category(category));
    }

    if query.featured {
        matched.truncate(FEATURED_LIMIT);
    }

    // Vec::sort_by is stable, so equal dates keep their input order.
    matched.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));

    let total = matched.len();
    let page = query.page();
    let page_size = query.page_size();
    let start = (page as usize - 1).saturating_mul(page_size as usize);

    let articles = matched
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    ArticlePage::new(articles, total, page, page_size)
}

/// Drops articles dated after `now`.
pub fn published(articles: Vec<Article>, now: DateTime<Utc>) -> Vec<Article> {
    let before = articles.len();
    let kept: Vec<Article> = articles
        .into_iter()
        .filter(|a| a.is_published_at(now))
        .collect();
    if kept.len() < before {
        tracing::debug!("Hid {} unpublished articles", before - kept.len());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback;
    use crate::models::Locale;
    use chrono::{Duration, TimeZone};

    fn article(id: &str, category: &str, date: (i32, u32, u32)) -> Article {
        Article {
            id: id.to_string(),
            category: category.to_string(),
            title: format!("Title {id}"),
            preview: String::new(),
            content: String::new(),
            reading_time: 1,
            publish_date: Utc.with_ymd_and_hms(date.0, date.1, date.2, 0, 0, 0).unwrap(),
            author: None,
            tags: vec![],
            seo: None,
        }
    }

    fn ids(page: &ArticlePage) -> Vec<&str> {
        page.articles.iter().map(|a| a.id.as_str()).collect()
    }

    fn assert_newest_first(page: &ArticlePage) {
        assert!(page
            .articles
            .windows(2)
            .all(|w| w[0].publish_date >= w[1].publish_date));
    }

    #[test]
    fn legal_category_returns_both_legal_articles_newest_first() {
        let page = apply_query(
            fallback::articles(Locale::En),
            &ArticleQuery::default().with_category("legal"),
        );
        assert_eq!(page.total, 2);
        assert_eq!(
            ids(&page),
            vec!["documenting-your-injuries", "understanding-pip-coverage"]
        );
        assert!(page.articles.iter().all(|a| a.in_category("LEGAL")));
        assert!(!page.has_next_page);
    }

    #[test]
    fn six_articles_split_over_two_pages() {
        let first = apply_query(fallback::articles(Locale::En), &ArticleQuery::default());
        assert_eq!(first.articles.len(), 5);
        assert_eq!(first.total, 6);
        assert!(first.has_next_page);
        assert_newest_first(&first);

        let second = apply_query(
            fallback::articles(Locale::En),
            &ArticleQuery::default().with_page(2),
        );
        assert_eq!(second.articles.len(), 1);
        assert_eq!(second.total, 6);
        assert!(!second.has_next_page);
        assert_eq!(ids(&second), vec!["first-steps-after-a-car-accident"]);
    }

    #[test]
    fn page_lengths_follow_the_pagination_law() {
        let all = fallback::articles(Locale::Es);
        for page_size in 1..=7u32 {
            for page in 1..=8u32 {
                let query = ArticleQuery::default().with_page(page).with_page_size(page_size);
                let result = apply_query(all.clone(), &query);
                let expected = (page_size as i64)
                    .min((result.total as i64 - (page as i64 - 1) * page_size as i64).max(0));
                assert_eq!(result.articles.len() as i64, expected, "page {page} size {page_size}");
                assert_eq!(result.has_next_page, ((page * page_size) as usize) < result.total);
            }
        }
    }

    #[test]
    fn search_is_case_insensitive_over_title_content_and_preview() {
        let mut by_preview = article("preview", "Legal", (2024, 1, 1));
        by_preview.preview = "Ask about PIP".to_string();
        let mut by_content = article("content", "Legal", (2024, 1, 2));
        by_content.content = "the pip deadline".to_string();
        let mut by_title = article("title", "Legal", (2024, 1, 3));
        by_title.title = "Pip basics".to_string();
        let mut tag_only = article("tag-only", "Legal", (2024, 1, 4));
        tag_only.tags = vec!["pip".to_string()];

        let page = apply_query(
            vec![by_preview, by_content, by_title, tag_only],
            &ArticleQuery::default().with_search("PiP"),
        );
        assert_eq!(ids(&page), vec!["title", "content", "preview"]);
    }

    #[test]
    fn search_handles_non_ascii_case() {
        let page = apply_query(
            fallback::articles(Locale::Es),
            &ArticleQuery::default().with_search("SUEÑO"),
        );
        assert_eq!(ids(&page), vec!["sueno-y-recuperacion"]);
    }

    #[test]
    fn featured_keeps_first_three_matches_before_sorting() {
        let records = vec![
            article("a", "Treatment", (2024, 1, 1)),
            article("b", "Treatment", (2024, 3, 1)),
            article("c", "Treatment", (2024, 2, 1)),
            article("d", "Treatment", (2024, 12, 1)),
        ];
        let page = apply_query(records, &ArticleQuery::default().featured());
        assert_eq!(page.total, 3);
        assert_eq!(ids(&page), vec!["b", "c", "a"]);
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let records = vec![
            article("first", "Recovery", (2024, 5, 5)),
            article("older", "Recovery", (2023, 5, 5)),
            article("second", "Recovery", (2024, 5, 5)),
        ];
        let page = apply_query(records, &ArticleQuery::default());
        assert_eq!(ids(&page), vec!["first", "second", "older"]);
    }

    #[test]
    fn out_of_range_page_is_empty_not_an_error() {
        let page = apply_query(
            fallback::articles(Locale::En),
            &ArticleQuery::default().with_page(40),
        );
        assert!(page.articles.is_empty());
        assert_eq!(page.total, 6);
        assert!(!page.has_next_page);
    }

    #[test]
    fn unknown_category_matches_nothing() {
        let page = apply_query(
            fallback::articles(Locale::En),
            &ArticleQuery::default().with_category("cardiology"),
        );
        assert_eq!(page.total, 0);
        assert!(page.articles.is_empty());
    }

    #[test]
    fn published_hides_future_dates() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let records = vec![
            article("past", "Legal", (2024, 5, 31)),
            article("future", "Legal", (2024, 6, 2)),
        ];
        let kept = published(records, now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "past");

        let exact = vec![article("now", "Legal", (2024, 6, 1))];
        assert_eq!(published(exact, now).len(), 1);
        assert!(published(vec![], now - Duration::days(1)).is_empty());
    }
}
