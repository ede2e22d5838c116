//! API DTOs (Data Transfer Objects)
//!
//! Titles are written with slugs (`TitleWriteRequest`) and read back with
//! nested `{name, slug}` objects (`TitleReadView`).

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, ReviewId, TitleId};
use platform::pagination::PageParams;
use serde::{Deserialize, Serialize};

use crate::application::{CommentInput, ReviewInput, TermInput, TitleInput};
use crate::domain::entities::{Comment, Review, Term, Title, TitleFilter};

// ============================================================================
// Categories / Genres
// ============================================================================

/// Create category or genre request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl From<TermRequest> for TermInput {
    fn from(req: TermRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
        }
    }
}

/// Category or genre representation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermView {
    pub name: String,
    pub slug: String,
}

impl<K> From<Term<K>> for TermView {
    fn from(term: Term<K>) -> Self {
        Self {
            name: term.name,
            slug: term.slug.as_str().to_string(),
        }
    }
}

/// `?search=&limit=&offset=` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SearchQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

// ============================================================================
// Titles
// ============================================================================

/// Create/update title request (every field optional on PATCH)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleWriteRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    /// Category slug
    pub category: Option<String>,
    /// Genre slugs
    pub genre: Option<Vec<String>>,
}

impl From<TitleWriteRequest> for TitleInput {
    fn from(req: TitleWriteRequest) -> Self {
        Self {
            name: req.name,
            year: req.year,
            description: req.description,
            category: req.category,
            genre: req.genre,
        }
    }
}

/// Title representation
#[derive(Debug, Clone, Serialize)]
pub struct TitleReadView {
    pub id: TitleId,
    pub name: String,
    pub year: i32,
    pub rating: f64,
    pub description: String,
    pub genre: Vec<TermView>,
    pub category: Option<TermView>,
}

impl From<Title> for TitleReadView {
    fn from(title: Title) -> Self {
        Self {
            id: title.id,
            name: title.name,
            year: title.year,
            rating: title.rating,
            description: title.description,
            genre: title.genres.into_iter().map(TermView::from).collect(),
            category: title.category.map(TermView::from),
        }
    }
}

/// `GET /titles` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleListQuery {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl TitleListQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            limit: self.limit,
            offset: self.offset,
        }
    }

    pub fn filter(self) -> TitleFilter {
        TitleFilter {
            name: self.name,
            year: self.year,
            category: self.category,
            genre: self.genre,
        }
    }
}

// ============================================================================
// Reviews
// ============================================================================

/// Create/update review request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    pub text: Option<String>,
    pub score: Option<i64>,
}

impl From<ReviewRequest> for ReviewInput {
    fn from(req: ReviewRequest) -> Self {
        Self {
            text: req.text,
            score: req.score,
        }
    }
}

/// Review representation
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: ReviewId,
    pub text: String,
    /// Author's username
    pub author: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

impl From<Review> for ReviewView {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            text: review.text,
            author: review.author.into_inner(),
            score: review.score.get(),
            pub_date: review.pub_date,
        }
    }
}

// ============================================================================
// Comments
// ============================================================================

/// Create/update comment request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

impl From<CommentRequest> for CommentInput {
    fn from(req: CommentRequest) -> Self {
        Self { text: req.text }
    }
}

/// Comment representation
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub text: String,
    /// Author's username
    pub author: String,
    pub pub_date: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author: comment.author.into_inner(),
            pub_date: comment.pub_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Category, Genre};
    use crate::domain::value_objects::Slug;
    use kernel::id::{CategoryId, GenreId};
    use serde_json::json;

    #[test]
    fn test_title_read_view_nests_terms() {
        let title = Title {
            id: TitleId::new(3),
            name: "Dune".to_string(),
            year: 1965,
            rating: 9.0,
            description: String::new(),
            category: Some(Category {
                id: CategoryId::new(1),
                name: "Book".to_string(),
                slug: Slug::from_db("book"),
            }),
            genres: vec![Genre {
                id: GenreId::new(2),
                name: "Sci-Fi".to_string(),
                slug: Slug::from_db("sci-fi"),
            }],
        };

        let value = serde_json::to_value(TitleReadView::from(title)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "name": "Dune",
                "year": 1965,
                "rating": 9.0,
                "description": "",
                "genre": [{"name": "Sci-Fi", "slug": "sci-fi"}],
                "category": {"name": "Book", "slug": "book"}
            })
        );
    }

    #[test]
    fn test_title_write_request_takes_slugs() {
        let req: TitleWriteRequest = serde_json::from_value(json!({
            "name": "Dune",
            "year": 1965,
            "category": "book",
            "genre": ["sci-fi", "drama"]
        }))
        .unwrap();

        let input = TitleInput::from(req);
        assert_eq!(input.category.as_deref(), Some("book"));
        assert_eq!(input.genre.unwrap(), ["sci-fi", "drama"]);
        assert!(input.description.is_none());
    }

    #[test]
    fn test_title_list_query_filter() {
        let query = TitleListQuery {
            genre: Some("drama".into()),
            year: Some(2001),
            limit: Some(5),
            ..Default::default()
        };
        assert_eq!(query.page().limit, Some(5));
        let filter = query.filter();
        assert_eq!(filter.genre.as_deref(), Some("drama"));
        assert_eq!(filter.year, Some(2001));
    }
}
