//! Manage Terms Use Case
//!
//! Categories and genres: anyone lists, admins create and delete.

use std::sync::Arc;

use auth::{AccessPolicy, Operation, Requester};
use kernel::error::fields::FieldErrors;
use platform::pagination::{Page, PageRequest};

use crate::application::input::require_field;
use crate::domain::entities::{NewTerm, Term, TermKind};
use crate::domain::repository::TermRepository;
use crate::domain::value_objects::{Name, Slug};
use crate::error::{CatalogError, CatalogResult};

/// Fields of a new category or genre
#[derive(Debug, Clone, Default)]
pub struct TermInput {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// Manage terms use case
pub struct ManageTermsUseCase<R>
where
    R: TermRepository,
{
    repo: Arc<R>,
}

impl<R> ManageTermsUseCase<R>
where
    R: TermRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// GET /categories, GET /genres
    pub async fn list<K: TermKind>(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> CatalogResult<Page<Term<K>>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let (terms, count) = self.repo.list_terms::<K>(search, page).await?;
        Ok(Page::new(terms, count, page))
    }

    /// POST /categories, POST /genres
    pub async fn create<K: TermKind>(
        &self,
        requester: &Requester,
        input: TermInput,
    ) -> CatalogResult<Term<K>> {
        AccessPolicy::ReadOnlyOrAdmin.check(requester, Operation::Write)?;

        let mut errors = FieldErrors::new();
        let name = require_field(&mut errors, "name", input.name, Name::new);
        let slug = require_field(&mut errors, "slug", input.slug, Slug::new);

        if let Some(slug) = &slug {
            let taken = self.repo.find_terms::<K>(std::slice::from_ref(slug)).await?;
            if !taken.is_empty() {
                errors.add("slug", slug_taken_message::<K>());
            }
        }
        errors.into_result()?;

        let (Some(name), Some(slug)) = (name, slug) else {
            return Err(CatalogError::Internal("required term fields unresolved".to_string()));
        };

        let term = self.repo.create_term::<K>(&NewTerm { name, slug }).await?;

        tracing::info!(kind = K::LABEL, slug = %term.slug, "Term created");
        Ok(term)
    }

    /// DELETE /categories/{slug}, DELETE /genres/{slug}
    pub async fn delete<K: TermKind>(&self, requester: &Requester, slug: &str) -> CatalogResult<()> {
        AccessPolicy::ReadOnlyOrAdmin.check(requester, Operation::Write)?;

        let slug = Slug::new(slug).map_err(|_| CatalogError::NotFound(K::LABEL))?;
        let Some(term) = self.repo.delete_term::<K>(&slug).await? else {
            return Err(CatalogError::NotFound(K::LABEL));
        };

        tracing::info!(kind = K::LABEL, term_id = %term.id, slug = %term.slug, "Term deleted");
        Ok(())
    }
}

/// Field message for a slug that is already in use
pub fn slug_taken_message<K: TermKind>() -> String {
    format!("{} with this slug already exists.", K::LABEL)
}
