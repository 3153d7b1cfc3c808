use super::{load, LoadSink, Loadable};
use crate::error::RepositoryError;
use crate::model::Article;
use crate::repository::ArticleRepository;
use crate::state::{path, AppStore, Tab};
use std::sync::Arc;
use tracing::instrument;

/// Magazine tab: CMS articles.
#[derive(Clone)]
pub struct MagazineInteractor {
    articles: Arc<dyn ArticleRepository>,
    state: AppStore,
}

impl MagazineInteractor {
    pub fn new(articles: Arc<dyn ArticleRepository>, state: AppStore) -> Self {
        Self { articles, state }
    }

    #[instrument(skip(self, sink))]
    pub async fn load_articles(&self, sink: &impl LoadSink<Vec<Article>>) -> Loadable<Vec<Article>> {
        load(sink, "articles", self.articles.fetch_all()).await
    }

    /// Fetches an article and routes to it. Routing is unchanged on failure.
    #[instrument(skip(self))]
    pub async fn open_article(&self, slug: &str) -> Result<Article, RepositoryError> {
        let article = self.articles.fetch_by_slug(slug).await?;
        self.state.update(|state| {
            state.selected_tab = Tab::Magazine;
            state.routing.selected_article = Some(article.slug.clone());
        });
        Ok(article)
    }

    pub fn close_article(&self) {
        self.state.set(path::SELECTED_ARTICLE, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::interactor::Discard;
    use crate::repository::StubArticleRepository;

    #[tokio::test]
    async fn test_open_and_close_article() {
        let (articles, _) = StubArticleRepository::spawn(fixtures::articles());
        let state = AppStore::default();
        let interactor = MagazineInteractor::new(Arc::new(articles), state.clone());

        let loaded = interactor.load_articles(&Discard).await;
        assert_eq!(loaded.value().unwrap()[0].slug, "first-week-home");

        interactor.open_article("crate-training").await.unwrap();
        assert_eq!(state.get(path::SELECTED_TAB), Tab::Magazine);
        assert_eq!(state.get(path::SELECTED_ARTICLE).as_deref(), Some("crate-training"));

        assert!(interactor.open_article("missing").await.is_err());
        assert_eq!(state.get(path::SELECTED_ARTICLE).as_deref(), Some("crate-training"));

        interactor.close_article();
        assert_eq!(state.get(path::SELECTED_ARTICLE), None);
    }
}
