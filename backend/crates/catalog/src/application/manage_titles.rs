//! Manage Titles Use Case
//!
//! Anyone reads titles; admins create, update and delete them. Category and
//! genre slugs in a write must all resolve, or nothing is written.

use std::sync::Arc;

use auth::{AccessPolicy, Operation, Requester};
use kernel::error::fields::FieldErrors;
use kernel::id::{TitleId, markers};
use platform::pagination::{Page, PageRequest};

use crate::application::input::{optional_field, require_field};
use crate::domain::entities::{Category, Genre, NewTitle, Title, TitleChanges, TitleFilter};
use crate::domain::repository::{TermRepository, TitleRepository};
use crate::domain::services::{dedup_slugs, missing_slugs};
use crate::domain::value_objects::{Name, Slug, Year};
use crate::error::{CatalogError, CatalogResult};

const EMPTY_LIST_MESSAGE: &str = "This list may not be empty.";

/// Title write fields; `None` leaves a field untouched on update
#[derive(Debug, Clone, Default)]
pub struct TitleInput {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    /// Category slug
    pub category: Option<String>,
    /// Genre slugs; replaces the whole set when given
    pub genre: Option<Vec<String>>,
}

/// Manage titles use case
pub struct ManageTitlesUseCase<R>
where
    R: TermRepository + TitleRepository,
{
    repo: Arc<R>,
}

impl<R> ManageTitlesUseCase<R>
where
    R: TermRepository + TitleRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// GET /titles
    pub async fn list(&self, filter: TitleFilter, page: PageRequest) -> CatalogResult<Page<Title>> {
        let filter = TitleFilter {
            name: filter.name.filter(|s| !s.trim().is_empty()),
            category: filter.category.filter(|s| !s.is_empty()),
            genre: filter.genre.filter(|s| !s.is_empty()),
            ..filter
        };
        let (titles, count) = self.repo.list_titles(&filter, page).await?;
        Ok(Page::new(titles, count, page))
    }

    /// GET /titles/{title_id}
    pub async fn get(&self, title_id: TitleId) -> CatalogResult<Title> {
        self.repo
            .find_title(title_id)
            .await?
            .ok_or(CatalogError::NotFound("Title"))
    }

    /// POST /titles
    pub async fn create(&self, requester: &Requester, input: TitleInput) -> CatalogResult<Title> {
        AccessPolicy::ReadOnlyOrAdmin.check(requester, Operation::Write)?;

        let mut errors = FieldErrors::new();
        let name = require_field(&mut errors, "name", input.name, Name::new);
        let year = require_field(&mut errors, "year", input.year, Year::new);
        let category = match errors.require("category", input.category) {
            Some(raw) => self.resolve_category(&mut errors, raw).await?,
            None => None,
        };
        let genres = match errors.require("genre", input.genre) {
            Some(raw) => self.resolve_genres(&mut errors, raw).await?,
            None => None,
        };
        errors.into_result()?;

        let (Some(name), Some(year), Some(category), Some(genres)) = (name, year, category, genres)
        else {
            return Err(CatalogError::Internal("required title fields unresolved".to_string()));
        };

        let title = self
            .repo
            .create_title(&NewTitle {
                name,
                year,
                description: input.description.unwrap_or_default(),
                category,
                genres,
            })
            .await?;

        tracing::info!(title_id = %title.id, "Title created");
        Ok(title)
    }

    /// PATCH /titles/{title_id}
    pub async fn update(
        &self,
        requester: &Requester,
        title_id: TitleId,
        input: TitleInput,
    ) -> CatalogResult<Title> {
        AccessPolicy::ReadOnlyOrAdmin.check(requester, Operation::Write)?;

        self.get(title_id).await?;

        let mut errors = FieldErrors::new();
        let name = optional_field(&mut errors, "name", input.name, Name::new);
        let year = optional_field(&mut errors, "year", input.year, Year::new);
        let category = match input.category {
            Some(raw) => self.resolve_category(&mut errors, raw).await?,
            None => None,
        };
        let genres = match input.genre {
            Some(raw) => self.resolve_genres(&mut errors, raw).await?,
            None => None,
        };
        errors.into_result()?;

        let changes = TitleChanges {
            name,
            year,
            description: input.description,
            category,
            genres,
        };
        let title = self
            .repo
            .update_title(title_id, &changes)
            .await?
            .ok_or(CatalogError::NotFound("Title"))?;

        tracing::info!(title_id = %title.id, "Title updated");
        Ok(title)
    }

    /// DELETE /titles/{title_id}
    pub async fn delete(&self, requester: &Requester, title_id: TitleId) -> CatalogResult<()> {
        AccessPolicy::ReadOnlyOrAdmin.check(requester, Operation::Write)?;

        if !self.repo.delete_title(title_id).await? {
            return Err(CatalogError::NotFound("Title"));
        }

        tracing::info!(title_id = %title_id, "Title deleted");
        Ok(())
    }

    /// Category for `raw`, or a `category` field error
    async fn resolve_category(
        &self,
        errors: &mut FieldErrors,
        raw: String,
    ) -> CatalogResult<Option<Category>> {
        let Ok(slug) = Slug::new(&raw) else {
            errors.add("category", does_not_exist(&raw));
            return Ok(None);
        };

        let category = self
            .repo
            .find_terms::<markers::Category>(std::slice::from_ref(&slug))
            .await?
            .into_iter()
            .next();
        if category.is_none() {
            errors.add("category", does_not_exist(slug.as_str()));
        }
        Ok(category)
    }

    /// Every genre in `raw`, or `genre` field errors naming the missing slugs
    async fn resolve_genres(
        &self,
        errors: &mut FieldErrors,
        raw: Vec<String>,
    ) -> CatalogResult<Option<Vec<Genre>>> {
        if raw.is_empty() {
            errors.add("genre", EMPTY_LIST_MESSAGE);
            return Ok(None);
        }

        let mut slugs = Vec::with_capacity(raw.len());
        let mut malformed = false;
        for value in &raw {
            match Slug::new(value) {
                Ok(slug) => slugs.push(slug),
                Err(_) => {
                    errors.add("genre", does_not_exist(value));
                    malformed = true;
                }
            }
        }
        let slugs = dedup_slugs(slugs);

        let found = self.repo.find_terms::<markers::Genre>(&slugs).await?;
        let missing = missing_slugs(&slugs, &found);
        for slug in &missing {
            errors.add("genre", does_not_exist(slug.as_str()));
        }
        if malformed || !missing.is_empty() {
            return Ok(None);
        }

        let mut genres = found;
        genres.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(Some(genres))
    }
}

/// Field error message for an unresolvable category or genre slug
pub fn does_not_exist(slug: &str) -> String {
    format!("Object with slug={slug} does not exist.")
}
