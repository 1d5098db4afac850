use super::AppState;
use crate::types::Category;

/// Ordered, editable list of prompt categories
#[derive(Debug, Clone, Default)]
pub struct CategorySet {
    items: Vec<Category>,
}

impl CategorySet {
    pub fn new(items: Vec<Category>) -> Self {
        Self { items }
    }

    /// Append a category. Blank text is ignored.
    pub fn add(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.items.push(text.to_string());
        true
    }

    /// Remove by index. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: i64) -> bool {
        match usize::try_from(index) {
            Ok(i) if i < self.items.len() => {
                self.items.remove(i);
                true
            }
            _ => false,
        }
    }

    pub fn snapshot(&self) -> Vec<Category> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl AppState {
    pub async fn categories(&self) -> Vec<Category> {
        self.session.read().await.categories.snapshot()
    }

    /// Append a category and broadcast the new list
    pub async fn add_category(&self, text: &str) -> bool {
        let mut session = self.session.write().await;
        if !session.categories.add(text) {
            tracing::debug!("Ignoring blank category");
            return false;
        }

        tracing::info!("Category added: {}", text.trim());
        self.broadcast_to_all(session.categories_message());
        true
    }

    /// Remove a category and broadcast the new list
    pub async fn remove_category(&self, index: i64) -> bool {
        let mut session = self.session.write().await;
        if !session.categories.remove(index) {
            tracing::debug!("Ignoring category removal at index {}", index);
            return false;
        }

        tracing::info!("Category removed at index {}", index);
        self.broadcast_to_all(session.categories_message());
        true
    }
}
