//! Paging through the users collection
//!
//! [`UserPages`] walks the collection one page at a time, starting at page 1.
//! It stops once the number of users read reaches the server's
//! `totalAvailable`, or as soon as a page comes back empty, so it always
//! terminates even if the server total is wrong. Pages are requested strictly
//! one after the other; a failed page can be requested again by calling
//! [`UserPages::next_page`] once more.

use tracing::{debug, warn};

use crate::directory::UserDirectory;
use crate::error::TableauResult;
use crate::models::User;

/// Page size used for listing
pub const PAGE_SIZE: u32 = 100;

/// Sequential reader over the pages of the users collection
pub struct UserPages<'a> {
    directory: &'a UserDirectory,
    page_number: u32,
    page_size: u32,
    fetched: usize,
    done: bool,
}

impl<'a> UserPages<'a> {
    pub(crate) fn new(directory: &'a UserDirectory) -> Self {
        Self {
            directory,
            page_number: 1,
            page_size: PAGE_SIZE,
            fetched: 0,
            done: false,
        }
    }

    /// Number of users read so far
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    /// Read the next page, `None` once the collection is exhausted
    pub async fn next_page(&mut self) -> TableauResult<Option<Vec<User>>> {
        if self.done {
            return Ok(None);
        }

        let page = self
            .directory
            .fetch_page(self.page_number, self.page_size)
            .await?;
        let total = page.pagination.map(|p| p.total_available).unwrap_or(0);

        if page.users.is_empty() {
            self.done = true;
            if self.page_number > 1 && self.fetched < total {
                warn!(
                    "Page {} came back empty after {} of {} users",
                    self.page_number, self.fetched, total
                );
            }
            return Ok(None);
        }

        debug!("Server returned {} users.", page.users.len());

        self.fetched += page.users.len();
        self.page_number += 1;
        self.done = self.fetched >= total;

        Ok(Some(page.users))
    }

    /// Drain the remaining pages into one list
    pub async fn collect_all(mut self) -> TableauResult<Vec<User>> {
        let mut users = Vec::new();
        while let Some(page) = self.next_page().await? {
            users.extend(page);
        }
        Ok(users)
    }
}
