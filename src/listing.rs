//! Client-side filtering and pagination for the list views.
//!
//! DESIGN
//! ======
//! The backend returns whole collections; narrowing and paging happen
//! locally. A [`ListState`] owns the active filter and page and resets to the
//! first page whenever the filter changes, so a narrowed list never opens on
//! a page that no longer exists.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::api::{AppUser, Application, AzureCredential};

pub const DEFAULT_PAGE_SIZE: usize = 5;

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    #[must_use]
    pub fn admits(self, is_active: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => is_active,
            Self::Inactive => !is_active,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Inactive => "inactive",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}' (expected all, active or inactive)")]
pub struct ParseStatusError(String);

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(ParseStatusError(s.to_owned())),
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// One page of a (possibly filtered) list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// 1-based index of the first item shown, 0 when the page is empty.
    pub first: usize,
    /// 1-based index of the last item shown, 0 when the page is empty.
    pub last: usize,
}

impl<T> Page<T> {
    /// `"Showing a - b of n"`.
    #[must_use]
    pub fn showing(&self) -> String {
        format!("Showing {} - {} of {}", self.first, self.last, self.total_items)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }
}

/// Slice `items` to page `page` (1-based) of `per_page` items.
///
/// Page and page size of zero are treated as one. Pages past the end are
/// empty but keep the true totals.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_items = items.len();
    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = start.saturating_add(per_page).min(total_items);
    let slice = &items[start..end];
    let (first, last) = if slice.is_empty() { (0, 0) } else { (start + 1, end) };

    Page {
        items: slice.to_vec(),
        page,
        per_page,
        total_items,
        total_pages: total_items.div_ceil(per_page),
        first,
        last,
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// Predicate over one record type.
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;

    fn apply(&self, items: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        items.iter().filter(|item| self.matches(item)).cloned().collect()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Name substring plus status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub name: String,
    pub status: StatusFilter,
}

impl Filter<Application> for ApplicationFilter {
    fn matches(&self, app: &Application) -> bool {
        contains_ci(&app.app_name, self.name.trim()) && self.status.admits(app.is_active)
    }
}

/// Free-text search over name, login and email, plus an exact application
/// name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub search: String,
    pub app_name: Option<String>,
}

impl Filter<AppUser> for UserFilter {
    fn matches(&self, user: &AppUser) -> bool {
        let query = self.search.trim();
        let found = [&user.first_name, &user.last_name, &user.login_id, &user.email_id]
            .iter()
            .any(|field| contains_ci(field, query));
        let in_app = self
            .app_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .is_none_or(|name| user.app_name.eq_ignore_ascii_case(name));
        found && in_app
    }
}

/// Credential-id substring plus status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialFilter {
    pub cred_id: String,
    pub status: StatusFilter,
}

impl Filter<AzureCredential> for CredentialFilter {
    fn matches(&self, cred: &AzureCredential) -> bool {
        contains_ci(&cred.cred_id, self.cred_id.trim()) && self.status.admits(cred.is_active)
    }
}

// =============================================================================
// LIST STATE
// =============================================================================

/// Filter and page selection for one list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState<F> {
    filter: F,
    page: usize,
    per_page: usize,
}

impl<F: Default> Default for ListState<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F> ListState<F> {
    #[must_use]
    pub fn new(filter: F) -> Self {
        Self { filter, page: 1, per_page: DEFAULT_PAGE_SIZE }
    }

    #[must_use]
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    #[must_use]
    pub fn filter(&self) -> &F {
        &self.filter
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Replace the filter; the view returns to page 1.
    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
        self.page = 1;
    }

    /// Edit the filter in place; the view returns to page 1.
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.filter);
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Filter `items` and cut out the current page.
    #[must_use]
    pub fn view<T: Clone>(&self, items: &[T]) -> Page<T>
    where
        F: Filter<T>,
    {
        paginate(&self.filter.apply(items), self.page, self.per_page)
    }
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
