//! Page namespaces and per-page storage.
//!
//! Every folder tree lives on exactly one page. Folders on different pages
//! never reference each other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The namespace tag scoping an independent folder tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    /// Bookmarked links.
    Favorites,
    /// Address book entries.
    Contacts,
    /// Free-form notes.
    Notes,
    /// To-do items.
    Tasks,
}

impl Page {
    /// All pages in display order.
    pub const ALL: [Page; 4] = [Page::Favorites, Page::Contacts, Page::Notes, Page::Tasks];

    /// Return the page as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::Contacts => "contacts",
            Self::Notes => "notes",
            Self::Tasks => "tasks",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Page {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "favorites" => Ok(Self::Favorites),
            "contacts" => Ok(Self::Contacts),
            "notes" => Ok(Self::Notes),
            "tasks" => Ok(Self::Tasks),
            _ => Err(AppError::malformed(format!(
                "Invalid page: '{s}'. Expected one of: favorites, contacts, notes, tasks"
            ))),
        }
    }
}

#[cfg(feature = "sqlx")]
impl sqlx::Type<sqlx::Postgres> for Page {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "sqlx")]
impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Page {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

#[cfg(feature = "sqlx")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Page {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        raw.parse::<Page>().map_err(|e| e.message.into())
    }
}

/// One value per page, addressed by [`Page`] rather than by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMap<T> {
    /// Value for the favorites page.
    pub favorites: T,
    /// Value for the contacts page.
    pub contacts: T,
    /// Value for the notes page.
    pub notes: T,
    /// Value for the tasks page.
    pub tasks: T,
}

impl<T> PageMap<T> {
    /// Borrow the value for `page`.
    pub fn get(&self, page: Page) -> &T {
        match page {
            Page::Favorites => &self.favorites,
            Page::Contacts => &self.contacts,
            Page::Notes => &self.notes,
            Page::Tasks => &self.tasks,
        }
    }

    /// Mutably borrow the value for `page`.
    pub fn get_mut(&mut self, page: Page) -> &mut T {
        match page {
            Page::Favorites => &mut self.favorites,
            Page::Contacts => &mut self.contacts,
            Page::Notes => &mut self.notes,
            Page::Tasks => &mut self.tasks,
        }
    }
}
