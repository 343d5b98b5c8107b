use crate::feed::Article;
use std::collections::HashSet;

/// Drop repeated links (first occurrence wins) and order newest first.
///
/// The sort is stable, so articles sharing a publish date keep their input order.
pub fn aggregate(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::with_capacity(articles.len());
    let mut unique: Vec<Article> = articles
        .into_iter()
        .filter(|article| seen.insert(article.link.clone()))
        .collect();

    unique.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    unique
}
