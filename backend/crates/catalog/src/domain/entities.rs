//! Domain Entities
//!
//! Categories and genres share one shape ([`Term`]), told apart by their
//! [`TermKind`]. Titles reference one category and a set of genres; reviews
//! belong to a title and comments to a review.

use auth::domain::value_object::user_name::UserName;
use chrono::{DateTime, Utc};
use kernel::id::{CommentId, Id, ReviewId, TitleId, UserId, markers};
use platform::search::contains_ignore_case;
use std::fmt;

use crate::domain::value_objects::{Name, Score, Slug, Year};

// ============================================================================
// Terms (categories, genres)
// ============================================================================

/// Table and wording for one kind of classifying term
pub trait TermKind: Send + Sync + 'static {
    /// Backing table
    const TABLE: &'static str;
    /// Singular display name
    const LABEL: &'static str;
}

impl TermKind for markers::Category {
    const TABLE: &'static str = "categories";
    const LABEL: &'static str = "Category";
}

impl TermKind for markers::Genre {
    const TABLE: &'static str = "genres";
    const LABEL: &'static str = "Genre";
}

/// A category or genre
pub struct Term<K> {
    pub id: Id<K>,
    pub name: String,
    pub slug: Slug,
}

pub type Category = Term<markers::Category>;
pub type Genre = Term<markers::Genre>;

// Manual impls so that marker types don't need to implement these traits.
impl<K> Clone for Term<K> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
        }
    }
}

impl<K> PartialEq for Term<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.slug == other.slug
    }
}

impl<K> fmt::Debug for Term<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Term")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("slug", &self.slug)
            .finish()
    }
}

/// Data for a new category or genre
#[derive(Debug, Clone)]
pub struct NewTerm {
    pub name: Name,
    pub slug: Slug,
}

// ============================================================================
// Titles
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub id: TitleId,
    pub name: String,
    pub year: i32,
    /// Mean review score, `0.0` without reviews
    pub rating: f64,
    pub description: String,
    pub category: Option<Category>,
    pub genres: Vec<Genre>,
}

/// Title with its category and genres already resolved
#[derive(Debug, Clone)]
pub struct NewTitle {
    pub name: Name,
    pub year: Year,
    pub description: String,
    pub category: Category,
    pub genres: Vec<Genre>,
}

impl NewTitle {
    pub fn into_title(self, id: TitleId) -> Title {
        Title {
            id,
            name: self.name.into_inner(),
            year: self.year.get(),
            rating: 0.0,
            description: self.description,
            category: Some(self.category),
            genres: self.genres,
        }
    }
}

/// Partial title update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<Name>,
    pub year: Option<Year>,
    pub description: Option<String>,
    pub category: Option<Category>,
    /// Replaces the whole genre set
    pub genres: Option<Vec<Genre>>,
}

/// `GET /titles` filters; all optional and combined with AND
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub year: Option<i32>,
    /// Category slug
    pub category: Option<String>,
    /// Genre slug
    pub genre: Option<String>,
}

impl TitleFilter {
    pub fn matches(&self, title: &Title) -> bool {
        let name = self
            .name
            .as_deref()
            .is_none_or(|term| contains_ignore_case(&title.name, term));
        let year = self.year.is_none_or(|year| title.year == year);
        let category = self.category.as_deref().is_none_or(|slug| {
            title
                .category
                .as_ref()
                .is_some_and(|c| c.slug.as_str() == slug)
        });
        let genre = self
            .genre
            .as_deref()
            .is_none_or(|slug| title.genres.iter().any(|g| g.slug.as_str() == slug));

        name && year && category && genre
    }
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub title_id: TitleId,
    pub author_id: UserId,
    pub author: UserName,
    pub text: String,
    pub score: Score,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub title_id: TitleId,
    pub author_id: UserId,
    pub author: UserName,
    pub text: String,
    pub score: Score,
}

impl NewReview {
    pub fn into_review(self, id: ReviewId, pub_date: DateTime<Utc>) -> Review {
        Review {
            id,
            title_id: self.title_id,
            author_id: self.author_id,
            author: self.author,
            text: self.text,
            score: self.score,
            pub_date,
        }
    }
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub review_id: ReviewId,
    pub author_id: UserId,
    pub author: UserName,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub review_id: ReviewId,
    pub author_id: UserId,
    pub author: UserName,
    pub text: String,
}

impl NewComment {
    pub fn into_comment(self, id: CommentId, pub_date: DateTime<Utc>) -> Comment {
        Comment {
            id,
            review_id: self.review_id,
            author_id: self.author_id,
            author: self.author,
            text: self.text,
            pub_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::{CategoryId, GenreId};

    fn title() -> Title {
        Title {
            id: TitleId::new(1),
            name: "The Matrix".to_string(),
            year: 1999,
            rating: 0.0,
            description: String::new(),
            category: Some(Category {
                id: CategoryId::new(1),
                name: "Movie".to_string(),
                slug: Slug::from_db("movie"),
            }),
            genres: vec![Genre {
                id: GenreId::new(1),
                name: "Sci-Fi".to_string(),
                slug: Slug::from_db("sci-fi"),
            }],
        }
    }

    #[test]
    fn test_filter_matches() {
        let title = title();
        assert!(TitleFilter::default().matches(&title));
        assert!(
            TitleFilter {
                name: Some("matr".into()),
                year: Some(1999),
                category: Some("movie".into()),
                genre: Some("sci-fi".into()),
            }
            .matches(&title)
        );
        assert!(!TitleFilter { year: Some(2000), ..Default::default() }.matches(&title));
        assert!(!TitleFilter { genre: Some("drama".into()), ..Default::default() }.matches(&title));
        assert!(!TitleFilter { category: Some("book".into()), ..Default::default() }.matches(&title));
    }

    #[test]
    fn test_term_labels() {
        assert_eq!(<markers::Category as TermKind>::TABLE, "categories");
        assert_eq!(<markers::Genre as TermKind>::LABEL, "Genre");
    }
}
