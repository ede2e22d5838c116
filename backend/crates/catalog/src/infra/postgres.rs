//! PostgreSQL Repository Implementations
//!
//! Multi-statement writes (title plus genre links, review plus rating) run in
//! one transaction each.

use std::collections::HashMap;

use auth::domain::value_object::user_name::UserName;
use chrono::{DateTime, Utc};
use kernel::error::conversions::unique_violation_constraint;
use kernel::error::fields::FieldErrors;
use kernel::id::{CategoryId, CommentId, GenreId, Id, ReviewId, TitleId, UserId};
use platform::pagination::PageRequest;
use platform::search::contains_pattern;
use sqlx::PgPool;

use crate::application::manage_terms::slug_taken_message;
use crate::application::manage_titles::does_not_exist;
use crate::domain::entities::{
    Category, Comment, Genre, NewComment, NewReview, NewTerm, NewTitle, Review, Term, TermKind,
    Title, TitleChanges, TitleFilter,
};
use crate::domain::repository::{
    CommentRepository, ReviewRepository, TermRepository, TitleRepository,
};
use crate::domain::services::recompute_rating;
use crate::domain::value_objects::{Name, Score, Slug};
use crate::error::{CatalogError, CatalogResult};

const TERM_COLUMNS: &str = "id, name, slug";

const TITLE_SELECT: &str = r#"
    SELECT
        t.id,
        t.name,
        t.year,
        t.rating,
        t.description,
        c.id AS category_id,
        c.name AS category_name,
        c.slug AS category_slug
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

const TITLE_FILTER: &str = r#"
    ($1::TEXT IS NULL OR t.name ILIKE $1)
    AND ($2::INT IS NULL OR t.year = $2)
    AND ($3::TEXT IS NULL OR c.slug = $3)
    AND ($4::TEXT IS NULL OR EXISTS (
        SELECT 1
        FROM title_genres tg
        JOIN genres g ON g.id = tg.genre_id
        WHERE tg.title_id = t.id AND g.slug = $4
    ))
"#;

const REVIEW_SELECT: &str = r#"
    SELECT
        r.id,
        r.title_id,
        r.author_id,
        u.user_name AS author,
        r.text,
        r.score,
        r.pub_date
    FROM reviews r
    JOIN users u ON u.id = r.author_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT
        m.id,
        m.review_id,
        m.author_id,
        u.user_name AS author,
        m.text,
        m.pub_date
    FROM comments m
    JOIN users u ON u.id = m.author_id
"#;

const REVIEW_UNIQUE_CONSTRAINT: &str = "reviews_author_title_key";

/// PostgreSQL-backed catalog repository
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Genres of each title in `title_ids`, ordered by slug
    async fn load_genres(&self, title_ids: &[i64]) -> CatalogResult<HashMap<i64, Vec<Genre>>> {
        let rows = sqlx::query_as::<_, TitleGenreRow>(
            r#"
            SELECT tg.title_id, g.id, g.name, g.slug
            FROM title_genres tg
            JOIN genres g ON g.id = tg.genre_id
            WHERE tg.title_id = ANY($1)
            ORDER BY g.slug
            "#,
        )
        .bind(title_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut genres: HashMap<i64, Vec<Genre>> = HashMap::new();
        for row in rows {
            genres.entry(row.title_id).or_default().push(Genre {
                id: GenreId::new(row.id),
                name: row.name,
                slug: Slug::from_db(row.slug),
            });
        }
        Ok(genres)
    }

    async fn with_genres(&self, rows: Vec<TitleRow>) -> CatalogResult<Vec<Title>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut genres = self.load_genres(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let title_genres = genres.remove(&row.id).unwrap_or_default();
                row.into_title(title_genres)
            })
            .collect())
    }
}

// ============================================================================
// Term Repository Implementation
// ============================================================================

impl TermRepository for PgCatalogRepository {
    async fn create_term<K: TermKind>(&self, term: &NewTerm) -> CatalogResult<Term<K>> {
        let row = sqlx::query_as::<_, TermRow>(&format!(
            "INSERT INTO {table} (name, slug) VALUES ($1, $2) RETURNING {TERM_COLUMNS}",
            table = K::TABLE
        ))
        .bind(term.name.as_str())
        .bind(term.slug.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let slug_key = format!("{}_slug_key", K::TABLE);
            if unique_violation_constraint(&e) == Some(slug_key.as_str()) {
                CatalogError::field("slug", slug_taken_message::<K>())
            } else {
                CatalogError::Database(e)
            }
        })?;

        Ok(row.into_term())
    }

    async fn find_terms<K: TermKind>(&self, slugs: &[Slug]) -> CatalogResult<Vec<Term<K>>> {
        let slugs: Vec<&str> = slugs.iter().map(Slug::as_str).collect();
        let rows = sqlx::query_as::<_, TermRow>(&format!(
            "SELECT {TERM_COLUMNS} FROM {table} WHERE slug = ANY($1)",
            table = K::TABLE
        ))
        .bind(&slugs)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TermRow::into_term).collect())
    }

    async fn list_terms<K: TermKind>(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Term<K>>, u64)> {
        let pattern = search.map(contains_pattern);
        let filter = "$1::TEXT IS NULL OR name ILIKE $1 OR slug ILIKE $1";

        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {table} WHERE {filter}",
            table = K::TABLE
        ))
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, TermRow>(&format!(
            r#"
            SELECT {TERM_COLUMNS}
            FROM {table}
            WHERE {filter}
            ORDER BY slug
            LIMIT $2 OFFSET $3
            "#,
            table = K::TABLE
        ))
        .bind(pattern.as_deref())
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok((
            rows.into_iter().map(TermRow::into_term).collect(),
            count.max(0) as u64,
        ))
    }

    async fn delete_term<K: TermKind>(&self, slug: &Slug) -> CatalogResult<Option<Term<K>>> {
        let row = sqlx::query_as::<_, TermRow>(&format!(
            "DELETE FROM {table} WHERE slug = $1 RETURNING {TERM_COLUMNS}",
            table = K::TABLE
        ))
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TermRow::into_term))
    }
}

// ============================================================================
// Title Repository Implementation
// ============================================================================

impl TitleRepository for PgCatalogRepository {
    async fn create_title(&self, title: &NewTitle) -> CatalogResult<Title> {
        let mut tx = self.pool.begin().await?;

        lock_terms_inner(&mut tx, Some(&title.category), &title.genres).await?;

        let title_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO titles (name, year, description, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(title.name.as_str())
        .bind(title.year.get())
        .bind(&title.description)
        .bind(title.category.id.get())
        .fetch_one(&mut *tx)
        .await?;

        let genre_ids: Vec<i64> = title.genres.iter().map(|g| g.id.get()).collect();
        set_genres_inner(&mut tx, title_id, &genre_ids).await?;

        tx.commit().await?;

        Ok(title.clone().into_title(TitleId::new(title_id)))
    }

    async fn find_title(&self, title_id: TitleId) -> CatalogResult<Option<Title>> {
        let row = sqlx::query_as::<_, TitleRow>(&format!("{TITLE_SELECT} WHERE t.id = $1"))
            .bind(title_id.get())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.with_genres(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_titles(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Title>, u64)> {
        let name = filter.name.as_deref().map(contains_pattern);

        let count = sqlx::query_scalar::<_, i64>(&format!(
            r#"
            SELECT COUNT(*)
            FROM titles t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE {TITLE_FILTER}
            "#
        ))
        .bind(name.as_deref())
        .bind(filter.year)
        .bind(filter.category.as_deref())
        .bind(filter.genre.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, TitleRow>(&format!(
            r#"
            {TITLE_SELECT}
            WHERE {TITLE_FILTER}
            ORDER BY t.id
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(name.as_deref())
        .bind(filter.year)
        .bind(filter.category.as_deref())
        .bind(filter.genre.as_deref())
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok((self.with_genres(rows).await?, count.max(0) as u64))
    }

    async fn update_title(
        &self,
        title_id: TitleId,
        changes: &TitleChanges,
    ) -> CatalogResult<Option<Title>> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM titles WHERE id = $1 FOR UPDATE")
            .bind(title_id.get())
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(None);
        }

        lock_terms_inner(
            &mut tx,
            changes.category.as_ref(),
            changes.genres.as_deref().unwrap_or_default(),
        )
        .await?;

        let updated = sqlx::query(
            r#"
            UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = COALESCE($4, description),
                category_id = COALESCE($5, category_id)
            WHERE id = $1
            "#,
        )
        .bind(title_id.get())
        .bind(changes.name.as_ref().map(Name::as_str))
        .bind(changes.year.map(|y| y.get()))
        .bind(changes.description.as_deref())
        .bind(changes.category.as_ref().map(|c| c.id.get()))
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Ok(None);
        }

        if let Some(genres) = &changes.genres {
            let genre_ids: Vec<i64> = genres.iter().map(|g| g.id.get()).collect();
            set_genres_inner(&mut tx, title_id.get(), &genre_ids).await?;
        }

        tx.commit().await?;

        self.find_title(title_id).await
    }

    async fn delete_title(&self, title_id: TitleId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(title_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

/// Hold shared locks on the referenced terms until commit
///
/// A term deleted after the use case resolved it is reported the same way a
/// slug that never existed is.
async fn lock_terms_inner(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    category: Option<&Category>,
    genres: &[Genre],
) -> CatalogResult<()> {
    let mut errors = FieldErrors::new();

    if let Some(category) = category {
        let found =
            sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE id = $1 FOR SHARE")
                .bind(category.id.get())
                .fetch_optional(&mut **tx)
                .await?;
        if found.is_none() {
            errors.add("category", does_not_exist(category.slug.as_str()));
        }
    }

    if !genres.is_empty() {
        let ids: Vec<i64> = genres.iter().map(|g| g.id.get()).collect();
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM genres WHERE id = ANY($1) ORDER BY id FOR SHARE",
        )
        .bind(ids.as_slice())
        .fetch_all(&mut **tx)
        .await?;
        for genre in genres.iter().filter(|g| !found.contains(&g.id.get())) {
            errors.add("genre", does_not_exist(genre.slug.as_str()));
        }
    }

    errors.into_result()?;
    Ok(())
}

/// Replace the genre links of a title
async fn set_genres_inner(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    title_id: i64,
    genre_ids: &[i64],
) -> CatalogResult<()> {
    sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
        .bind(title_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO title_genres (title_id, genre_id)
        SELECT $1, UNNEST($2::BIGINT[])
        "#,
    )
    .bind(title_id)
    .bind(genre_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// ============================================================================
// Review Repository Implementation
// ============================================================================

impl ReviewRepository for PgCatalogRepository {
    async fn create_review(&self, review: &NewReview) -> CatalogResult<Review> {
        let mut tx = self.pool.begin().await?;

        let (review_id, pub_date) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            r#"
            INSERT INTO reviews (title_id, author_id, text, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id, pub_date
            "#,
        )
        .bind(review.title_id.get())
        .bind(review.author_id.get())
        .bind(&review.text)
        .bind(review.score.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if unique_violation_constraint(&e) == Some(REVIEW_UNIQUE_CONSTRAINT) {
                CatalogError::DuplicateReview
            } else {
                CatalogError::Database(e)
            }
        })?;

        refresh_rating_inner(&mut tx, review.title_id.get()).await?;

        tx.commit().await?;

        Ok(review.clone().into_review(ReviewId::new(review_id), pub_date))
    }

    async fn find_review(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> CatalogResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "{REVIEW_SELECT} WHERE r.id = $1 AND r.title_id = $2"
        ))
        .bind(review_id.get())
        .bind(title_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReviewRow::into_review))
    }

    async fn review_exists(&self, title_id: TitleId, author_id: UserId) -> CatalogResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE title_id = $1 AND author_id = $2)",
        )
        .bind(title_id.get())
        .bind(author_id.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_reviews(
        &self,
        title_id: TitleId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Review>, u64)> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id.get())
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            r#"
            {REVIEW_SELECT}
            WHERE r.title_id = $1
            ORDER BY r.pub_date, r.id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(title_id.get())
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok((
            rows.into_iter().map(ReviewRow::into_review).collect(),
            count.max(0) as u64,
        ))
    }

    async fn update_review(&self, review: &Review) -> CatalogResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE reviews SET text = $2, score = $3 WHERE id = $1")
            .bind(review.id.get())
            .bind(&review.text)
            .bind(review.score.get())
            .execute(&mut *tx)
            .await?;

        refresh_rating_inner(&mut tx, review.title_id.get()).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_review(&self, review: &Review) -> CatalogResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review.id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        refresh_rating_inner(&mut tx, review.title_id.get()).await?;

        tx.commit().await?;
        Ok(deleted > 0)
    }
}

/// Overwrite `titles.rating` with the mean of the current scores
///
/// The title row is locked first so concurrent review writes on the same
/// title serialise their recomputation.
async fn refresh_rating_inner(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    title_id: i64,
) -> CatalogResult<f64> {
    sqlx::query("SELECT 1 FROM titles WHERE id = $1 FOR UPDATE")
        .bind(title_id)
        .execute(&mut **tx)
        .await?;

    let scores = sqlx::query_scalar::<_, i16>("SELECT score FROM reviews WHERE title_id = $1")
        .bind(title_id)
        .fetch_all(&mut **tx)
        .await?;

    let rating = recompute_rating(&scores);

    sqlx::query("UPDATE titles SET rating = $2 WHERE id = $1")
        .bind(title_id)
        .bind(rating)
        .execute(&mut **tx)
        .await?;

    Ok(rating)
}

// ============================================================================
// Comment Repository Implementation
// ============================================================================

impl CommentRepository for PgCatalogRepository {
    async fn create_comment(&self, comment: &NewComment) -> CatalogResult<Comment> {
        let (comment_id, pub_date) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            r#"
            INSERT INTO comments (review_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, pub_date
            "#,
        )
        .bind(comment.review_id.get())
        .bind(comment.author_id.get())
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment
            .clone()
            .into_comment(CommentId::new(comment_id), pub_date))
    }

    async fn find_comment(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> CatalogResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE m.id = $1 AND m.review_id = $2"
        ))
        .bind(comment_id.get())
        .bind(review_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn list_comments(
        &self,
        review_id: ReviewId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Comment>, u64)> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE review_id = $1")
                .bind(review_id.get())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            {COMMENT_SELECT}
            WHERE m.review_id = $1
            ORDER BY m.pub_date, m.id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(review_id.get())
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok((
            rows.into_iter().map(CommentRow::into_comment).collect(),
            count.max(0) as u64,
        ))
    }

    async fn update_comment(&self, comment: &Comment) -> CatalogResult<()> {
        sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
            .bind(comment.id.get())
            .bind(&comment.text)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_comment(&self, comment_id: CommentId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct TermRow {
    id: i64,
    name: String,
    slug: String,
}

impl TermRow {
    fn into_term<K>(self) -> Term<K> {
        Term {
            id: Id::new(self.id),
            name: self.name,
            slug: Slug::from_db(self.slug),
        }
    }
}

#[derive(sqlx::FromRow)]
struct TitleRow {
    id: i64,
    name: String,
    year: i32,
    rating: f64,
    description: String,
    category_id: Option<i64>,
    category_name: Option<String>,
    category_slug: Option<String>,
}

impl TitleRow {
    fn into_title(self, genres: Vec<Genre>) -> Title {
        let category = match (self.category_id, self.category_name, self.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Category {
                id: CategoryId::new(id),
                name,
                slug: Slug::from_db(slug),
            }),
            _ => None,
        };

        Title {
            id: TitleId::new(self.id),
            name: self.name,
            year: self.year,
            rating: self.rating,
            description: self.description,
            category,
            genres,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TitleGenreRow {
    title_id: i64,
    id: i64,
    name: String,
    slug: String,
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    title_id: i64,
    author_id: i64,
    author: String,
    text: String,
    score: i16,
    pub_date: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            id: ReviewId::new(self.id),
            title_id: TitleId::new(self.title_id),
            author_id: UserId::new(self.author_id),
            author: UserName::from_db(self.author),
            text: self.text,
            score: Score::from_db(self.score),
            pub_date: self.pub_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    review_id: i64,
    author_id: i64,
    author: String,
    text: String,
    pub_date: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::new(self.id),
            review_id: ReviewId::new(self.review_id),
            author_id: UserId::new(self.author_id),
            author: UserName::from_db(self.author),
            text: self.text,
            pub_date: self.pub_date,
        }
    }
}
