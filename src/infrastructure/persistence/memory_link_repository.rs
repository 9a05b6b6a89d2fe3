//! In-memory implementation of the link repository.
//!
//! Backs integration tests and DB-less development. Uniqueness and counter
//! semantics match the PostgreSQL backend: inserts claim a keyword through
//! the map's per-key entry lock, and the allocation counter advances with
//! `fetch_max` so it never moves backwards.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::seq::SliceRandom;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{GlobalCounts, LinkOrder, LinkRepository};
use crate::error::ShortenerError;

/// Thread-safe in-memory link store.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: DashMap<String, Link>,
    next_id: AtomicU64,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, ShortenerError> {
        let link = Link::new(
            new_link.keyword.clone(),
            new_link.long_url,
            new_link.title,
            Utc::now(),
            new_link.creator_ip,
            0,
        );

        match self.links.entry(new_link.keyword) {
            Entry::Occupied(_) => Err(ShortenerError::Conflict),
            Entry::Vacant(vacant) => {
                vacant.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_keyword(&self, keyword: &str) -> Result<Option<Link>, ShortenerError> {
        Ok(self.links.get(keyword).map(|l| l.clone()))
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<Link>, ShortenerError> {
        // Oldest match wins, same as the SQL backend.
        let mut found: Option<Link> = None;
        for entry in self.links.iter() {
            if entry.long_url == long_url
                && found
                    .as_ref()
                    .is_none_or(|f| entry.created_at < f.created_at)
            {
                found = Some(entry.clone());
            }
        }
        Ok(found)
    }

    async fn increment_clicks(&self, keyword: &str, delta: i64) -> Result<bool, ShortenerError> {
        match self.links.get_mut(keyword) {
            Some(mut link) => {
                link.clicks += delta;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn rename(
        &self,
        old_keyword: &str,
        new_keyword: &str,
        long_url: &str,
        title: &str,
    ) -> Result<Link, ShortenerError> {
        if old_keyword == new_keyword {
            return match self.links.get_mut(old_keyword) {
                Some(mut link) => {
                    link.long_url = long_url.to_string();
                    link.title = title.to_string();
                    Ok(link.clone())
                }
                None => Err(ShortenerError::NotFound),
            };
        }

        let Some(existing) = self.links.get(old_keyword).map(|l| l.clone()) else {
            return Err(ShortenerError::NotFound);
        };

        let moved = Link::new(
            new_keyword.to_string(),
            long_url.to_string(),
            title.to_string(),
            existing.created_at,
            existing.creator_ip,
            existing.clicks,
        );

        match self.links.entry(new_keyword.to_string()) {
            Entry::Occupied(_) => return Err(ShortenerError::Conflict),
            Entry::Vacant(vacant) => {
                vacant.insert(moved.clone());
            }
        }
        self.links.remove(old_keyword);

        Ok(moved)
    }

    async fn last_created_by_ip(
        &self,
        ip: &str,
    ) -> Result<Option<DateTime<Utc>>, ShortenerError> {
        Ok(self
            .links
            .iter()
            .filter(|l| l.creator_ip == ip)
            .map(|l| l.created_at)
            .max())
    }

    async fn next_id(&self) -> Result<u64, ShortenerError> {
        Ok(self.next_id.load(Ordering::SeqCst))
    }

    async fn advance_next_id(&self, to: u64) -> Result<(), ShortenerError> {
        self.next_id.fetch_max(to, Ordering::SeqCst);
        Ok(())
    }

    async fn list(
        &self,
        order: LinkOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, ShortenerError> {
        let mut links: Vec<Link> = self.links.iter().map(|l| l.clone()).collect();

        match order {
            LinkOrder::TopClicks => {
                links.sort_by(|a, b| b.clicks.cmp(&a.clicks).then(b.created_at.cmp(&a.created_at)))
            }
            LinkOrder::BottomClicks => {
                links.sort_by(|a, b| a.clicks.cmp(&b.clicks).then(b.created_at.cmp(&a.created_at)))
            }
            LinkOrder::Newest => links.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            LinkOrder::Random => {
                let mut rng = rand::rng();
                links.shuffle(&mut rng);
            }
        }

        Ok(links
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn global_counts(&self) -> Result<GlobalCounts, ShortenerError> {
        let total_links = self.links.len() as i64;
        let total_clicks = self.links.iter().map(|l| l.clicks).sum();

        Ok(GlobalCounts {
            total_links,
            total_clicks,
        })
    }
}
