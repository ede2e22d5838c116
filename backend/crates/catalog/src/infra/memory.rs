//! In-memory test double
//!
//! One store implementing every catalog repository, mirroring the schema's
//! unique constraints, `ON DELETE` rules and rating recomputation.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use kernel::error::fields::FieldErrors;
use kernel::id::{CommentId, Id, ReviewId, TitleId, UserId};
use platform::pagination::PageRequest;
use platform::search::contains_ignore_case;

use crate::application::manage_terms::slug_taken_message;
use crate::application::manage_titles::does_not_exist;
use crate::domain::entities::{
    Comment, Genre, NewComment, NewReview, NewTerm, NewTitle, Review, Term, TermKind, Title,
    TitleChanges, TitleFilter,
};
use crate::domain::repository::{
    CommentRepository, ReviewRepository, TermRepository, TitleRepository,
};
use crate::domain::services::recompute_rating;
use crate::domain::value_objects::Slug;
use crate::error::{CatalogError, CatalogResult};

#[derive(Clone)]
struct StoredTerm {
    table: &'static str,
    name: String,
    slug: Slug,
}

#[derive(Clone)]
struct StoredTitle {
    name: String,
    year: i32,
    rating: f64,
    description: String,
    category_id: Option<i64>,
    genre_ids: Vec<i64>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    terms: BTreeMap<i64, StoredTerm>,
    titles: BTreeMap<i64, StoredTitle>,
    reviews: BTreeMap<i64, Review>,
    comments: BTreeMap<i64, Comment>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn term<K>(&self, id: i64) -> Option<Term<K>> {
        self.terms.get(&id).map(|t| Term {
            id: Id::new(id),
            name: t.name.clone(),
            slug: t.slug.clone(),
        })
    }

    fn title(&self, id: i64) -> Option<Title> {
        let stored = self.titles.get(&id)?;
        let mut genres: Vec<Genre> = stored
            .genre_ids
            .iter()
            .filter_map(|&genre_id| self.term(genre_id))
            .collect();
        genres.sort_by(|a, b| a.slug.cmp(&b.slug));

        Some(Title {
            id: TitleId::new(id),
            name: stored.name.clone(),
            year: stored.year,
            rating: stored.rating,
            description: stored.description.clone(),
            category: stored.category_id.and_then(|c| self.term(c)),
            genres,
        })
    }

    fn refresh_rating(&mut self, title_id: TitleId) {
        let scores: Vec<i16> = self
            .reviews
            .values()
            .filter(|r| r.title_id == title_id)
            .map(|r| r.score.get())
            .collect();
        if let Some(title) = self.titles.get_mut(&title_id.get()) {
            title.rating = recompute_rating(&scores);
        }
    }

    fn remove_review(&mut self, review_id: ReviewId) -> Option<Review> {
        let review = self.reviews.remove(&review_id.get())?;
        self.comments.retain(|_, c| c.review_id != review_id);
        Some(review)
    }
}

/// Every catalog repository backed by maps
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    state: Arc<Mutex<State>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_count(&self) -> usize {
        self.state.lock().unwrap().titles.len()
    }

    pub fn rating(&self, title_id: TitleId) -> Option<f64> {
        self.state
            .lock()
            .unwrap()
            .titles
            .get(&title_id.get())
            .map(|t| t.rating)
    }
}

impl TermRepository for MemoryCatalog {
    async fn create_term<K: TermKind>(&self, term: &NewTerm) -> CatalogResult<Term<K>> {
        let mut state = self.state.lock().unwrap();
        if state
            .terms
            .values()
            .any(|t| t.table == K::TABLE && t.slug == term.slug)
        {
            return Err(CatalogError::field("slug", slug_taken_message::<K>()));
        }

        let id = state.next_id();
        state.terms.insert(
            id,
            StoredTerm {
                table: K::TABLE,
                name: term.name.as_str().to_string(),
                slug: term.slug.clone(),
            },
        );
        Ok(Term {
            id: Id::new(id),
            name: term.name.as_str().to_string(),
            slug: term.slug.clone(),
        })
    }

    async fn find_terms<K: TermKind>(&self, slugs: &[Slug]) -> CatalogResult<Vec<Term<K>>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .terms
            .iter()
            .filter(|(_, t)| t.table == K::TABLE && slugs.contains(&t.slug))
            .filter_map(|(&id, _)| state.term(id))
            .collect())
    }

    async fn list_terms<K: TermKind>(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Term<K>>, u64)> {
        let state = self.state.lock().unwrap();
        let mut terms: Vec<Term<K>> = state
            .terms
            .iter()
            .filter(|(_, t)| t.table == K::TABLE)
            .filter(|(_, t)| {
                search.is_none_or(|term| {
                    contains_ignore_case(&t.name, term) || contains_ignore_case(t.slug.as_str(), term)
                })
            })
            .filter_map(|(&id, _)| state.term(id))
            .collect();
        terms.sort_by(|a, b| a.slug.cmp(&b.slug));

        let count = terms.len() as u64;
        Ok((page.apply(terms), count))
    }

    async fn delete_term<K: TermKind>(&self, slug: &Slug) -> CatalogResult<Option<Term<K>>> {
        let mut state = self.state.lock().unwrap();
        let Some(id) = state
            .terms
            .iter()
            .find(|(_, t)| t.table == K::TABLE && t.slug == *slug)
            .map(|(&id, _)| id)
        else {
            return Ok(None);
        };

        let term = state.term(id);
        state.terms.remove(&id);
        for title in state.titles.values_mut() {
            if title.category_id == Some(id) {
                title.category_id = None;
            }
            title.genre_ids.retain(|&g| g != id);
        }
        Ok(term)
    }
}

impl TitleRepository for MemoryCatalog {
    async fn create_title(&self, title: &NewTitle) -> CatalogResult<Title> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.titles.insert(
            id,
            StoredTitle {
                name: title.name.as_str().to_string(),
                year: title.year.get(),
                rating: 0.0,
                description: title.description.clone(),
                category_id: Some(title.category.id.get()),
                genre_ids: title.genres.iter().map(|g| g.id.get()).collect(),
            },
        );
        Ok(title.clone().into_title(TitleId::new(id)))
    }

    async fn find_title(&self, title_id: TitleId) -> CatalogResult<Option<Title>> {
        Ok(self.state.lock().unwrap().title(title_id.get()))
    }

    async fn list_titles(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Title>, u64)> {
        let state = self.state.lock().unwrap();
        let titles: Vec<Title> = state
            .titles
            .keys()
            .filter_map(|&id| state.title(id))
            .filter(|t| filter.matches(t))
            .collect();

        let count = titles.len() as u64;
        Ok((page.apply(titles), count))
    }

    async fn update_title(
        &self,
        title_id: TitleId,
        changes: &TitleChanges,
    ) -> CatalogResult<Option<Title>> {
        let mut state = self.state.lock().unwrap();
        if !state.titles.contains_key(&title_id.get()) {
            return Ok(None);
        }

        let mut errors = FieldErrors::new();
        let missing_category = changes
            .category
            .as_ref()
            .filter(|c| !state.terms.contains_key(&c.id.get()));
        if let Some(category) = missing_category {
            errors.add("category", does_not_exist(category.slug.as_str()));
        }
        for genre in changes.genres.iter().flatten() {
            if !state.terms.contains_key(&genre.id.get()) {
                errors.add("genre", does_not_exist(genre.slug.as_str()));
            }
        }
        errors.into_result()?;

        if let Some(stored) = state.titles.get_mut(&title_id.get()) {
            if let Some(name) = &changes.name {
                stored.name = name.as_str().to_string();
            }
            if let Some(year) = changes.year {
                stored.year = year.get();
            }
            if let Some(description) = &changes.description {
                stored.description = description.clone();
            }
            if let Some(category) = &changes.category {
                stored.category_id = Some(category.id.get());
            }
            if let Some(genres) = &changes.genres {
                stored.genre_ids = genres.iter().map(|g| g.id.get()).collect();
            }
        }
        Ok(state.title(title_id.get()))
    }

    async fn delete_title(&self, title_id: TitleId) -> CatalogResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.titles.remove(&title_id.get()).is_none() {
            return Ok(false);
        }
        let review_ids: Vec<ReviewId> = state
            .reviews
            .values()
            .filter(|r| r.title_id == title_id)
            .map(|r| r.id)
            .collect();
        for review_id in review_ids {
            state.remove_review(review_id);
        }
        Ok(true)
    }
}

impl ReviewRepository for MemoryCatalog {
    async fn create_review(&self, review: &NewReview) -> CatalogResult<Review> {
        let mut state = self.state.lock().unwrap();
        if state
            .reviews
            .values()
            .any(|r| r.title_id == review.title_id && r.author_id == review.author_id)
        {
            return Err(CatalogError::DuplicateReview);
        }

        let id = state.next_id();
        let review = review.clone().into_review(ReviewId::new(id), Utc::now());
        state.reviews.insert(id, review.clone());
        state.refresh_rating(review.title_id);
        Ok(review)
    }

    async fn find_review(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> CatalogResult<Option<Review>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .reviews
            .get(&review_id.get())
            .filter(|r| r.title_id == title_id)
            .cloned())
    }

    async fn review_exists(&self, title_id: TitleId, author_id: UserId) -> CatalogResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .reviews
            .values()
            .any(|r| r.title_id == title_id && r.author_id == author_id))
    }

    async fn list_reviews(
        &self,
        title_id: TitleId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Review>, u64)> {
        let state = self.state.lock().unwrap();
        let reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|r| r.title_id == title_id)
            .cloned()
            .collect();

        let count = reviews.len() as u64;
        Ok((page.apply(reviews), count))
    }

    async fn update_review(&self, review: &Review) -> CatalogResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(stored) = state.reviews.get_mut(&review.id.get()) {
            stored.text = review.text.clone();
            stored.score = review.score;
        }
        state.refresh_rating(review.title_id);
        Ok(())
    }

    async fn delete_review(&self, review: &Review) -> CatalogResult<bool> {
        let mut state = self.state.lock().unwrap();
        let deleted = state.remove_review(review.id).is_some();
        state.refresh_rating(review.title_id);
        Ok(deleted)
    }
}

impl CommentRepository for MemoryCatalog {
    async fn create_comment(&self, comment: &NewComment) -> CatalogResult<Comment> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let comment = comment.clone().into_comment(CommentId::new(id), Utc::now());
        state.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn find_comment(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> CatalogResult<Option<Comment>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .comments
            .get(&comment_id.get())
            .filter(|c| c.review_id == review_id)
            .cloned())
    }

    async fn list_comments(
        &self,
        review_id: ReviewId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Comment>, u64)> {
        let state = self.state.lock().unwrap();
        let comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.review_id == review_id)
            .cloned()
            .collect();

        let count = comments.len() as u64;
        Ok((page.apply(comments), count))
    }

    async fn update_comment(&self, comment: &Comment) -> CatalogResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(stored) = state.comments.get_mut(&comment.id.get()) {
            stored.text = comment.text.clone();
        }
        Ok(())
    }

    async fn delete_comment(&self, comment_id: CommentId) -> CatalogResult<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .comments
            .remove(&comment_id.get())
            .is_some())
    }
}
