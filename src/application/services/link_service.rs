//! Link allocation, resolution, and rename.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, warn};
use url::Url;

use crate::application::interceptors::InterceptorRegistry;
use crate::application::services::FloodGuard;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::ShortenerError;
use crate::utils::codec::Alphabet;
use crate::utils::sanitize::sanitize_title;
use crate::utils::url_normalizer::validate_target;

/// A link creation request as received from the transport layer.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub url: String,
    pub keyword: Option<String>,
    pub title: Option<String>,
    pub ip: String,
    /// Authenticated/trusted callers bypass flood control.
    pub trusted: bool,
}

/// Result of a successful creation call.
///
/// A duplicate URL under the unique-URL policy is not an error: the caller
/// gets the already-existing link and can tell the two cases apart.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(Link),
    Existing(Link),
}

impl CreateOutcome {
    pub fn link(&self) -> &Link {
        match self {
            Self::Created(link) | Self::Existing(link) => link,
        }
    }
}

/// Result of resolving a keyword on the redirect path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Redirect(Link),
    /// The keyword collides with a reserved route; the surrounding
    /// application handles it, not the redirector.
    Reserved,
    NotFound,
}

/// Service for allocating keywords and resolving them back to targets.
///
/// Reserved-word and charset checks run client-side because they do not
/// depend on concurrent state; the final insert stays authoritative through
/// the repository's uniqueness constraint.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    flood_guard: FloodGuard,
    interceptors: Arc<InterceptorRegistry>,
    alphabet: Alphabet,
    reserved: HashSet<String>,
    base_url: String,
    base_host: Option<(String, Option<u16>)>,
    unique_urls: bool,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        flood_guard: FloodGuard,
        interceptors: Arc<InterceptorRegistry>,
        alphabet: Alphabet,
        reserved: impl IntoIterator<Item = String>,
        base_url: String,
        unique_urls: bool,
    ) -> Self {
        let base_host = Url::parse(&base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| (h.to_ascii_lowercase(), u.port())));

        Self {
            links,
            flood_guard,
            interceptors,
            alphabet,
            reserved: reserved.into_iter().map(|k| k.to_lowercase()).collect(),
            base_url,
            base_host,
            unique_urls,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The storable form of a raw keyword: out-of-alphabet characters
    /// stripped, truncated to the keyword length cap.
    pub fn canonical_keyword(&self, raw: &str) -> String {
        self.alphabet.sanitize(raw)
    }

    /// Creates a short link from `request`.
    ///
    /// Flow: interceptors → target validation → self-reference check →
    /// flood guard → duplicate-URL check → keyword claim (custom or auto).
    ///
    /// # Errors
    ///
    /// [`ShortenerError::InvalidUrl`], [`ShortenerError::SelfReferential`],
    /// [`ShortenerError::Throttled`], [`ShortenerError::KeywordUnavailable`],
    /// or [`ShortenerError::Storage`].
    pub async fn create(&self, request: CreateRequest) -> Result<CreateOutcome, ShortenerError> {
        if let Some(outcome) = self.interceptors.run_create(&request).await {
            return outcome;
        }

        let long_url = validate_target(&request.url)?;
        self.ensure_not_self_referential(&long_url)?;

        self.flood_guard
            .check(&request.ip, Utc::now(), request.trusted)
            .await?;

        if self.unique_urls
            && let Some(existing) = self.links.find_by_long_url(&long_url).await?
        {
            return Ok(CreateOutcome::Existing(existing));
        }

        let title = request
            .title
            .as_deref()
            .map(sanitize_title)
            .unwrap_or_default();

        let link = match request.keyword {
            Some(raw) => {
                self.create_with_keyword(&raw, long_url, title, request.ip)
                    .await?
            }
            None => self.create_auto(long_url, title, request.ip).await?,
        };

        Ok(CreateOutcome::Created(link))
    }

    /// Resolves a keyword to its redirect target.
    pub async fn resolve(&self, raw_keyword: &str) -> Result<Resolution, ShortenerError> {
        if let Some(resolution) = self.interceptors.run_resolve(raw_keyword).await {
            return Ok(resolution);
        }

        let keyword = self.alphabet.sanitize(raw_keyword);
        if keyword.is_empty() {
            return Ok(Resolution::NotFound);
        }

        if self.is_reserved(&keyword) {
            return Ok(Resolution::Reserved);
        }

        match self.links.find_by_keyword(&keyword).await? {
            Some(link) => Ok(Resolution::Redirect(link)),
            None => Ok(Resolution::NotFound),
        }
    }

    /// Looks up a link without touching click accounting.
    pub async fn get(&self, keyword: &str) -> Result<Link, ShortenerError> {
        self.links
            .find_by_keyword(keyword)
            .await?
            .ok_or(ShortenerError::NotFound)
    }

    /// Moves a link to a new keyword and/or new target/title.
    ///
    /// Re-runs the same sanitize/reserved checks as creation; the keyword
    /// move itself is atomic in the repository. The old keyword becomes
    /// claimable again through the ordinary allocation path.
    pub async fn rename(
        &self,
        old_keyword: &str,
        new_keyword: Option<&str>,
        url: Option<&str>,
        title: Option<&str>,
    ) -> Result<Link, ShortenerError> {
        let current = self.get(old_keyword).await?;

        let target_keyword = match new_keyword {
            Some(raw) => {
                let keyword = self.alphabet.sanitize(raw);
                if keyword.is_empty() || self.is_reserved(&keyword) {
                    return Err(ShortenerError::KeywordUnavailable {
                        keyword: if keyword.is_empty() {
                            raw.to_string()
                        } else {
                            keyword
                        },
                    });
                }
                keyword
            }
            None => current.keyword.clone(),
        };

        let long_url = match url {
            Some(raw) => {
                let normalized = validate_target(raw)?;
                self.ensure_not_self_referential(&normalized)?;
                normalized
            }
            None => current.long_url.clone(),
        };

        let new_title = match title {
            Some(raw) => sanitize_title(raw),
            None => current.title.clone(),
        };

        self.links
            .rename(&current.keyword, &target_keyword, &long_url, &new_title)
            .await
            .map_err(|e| match e {
                ShortenerError::Conflict => ShortenerError::KeywordUnavailable {
                    keyword: target_keyword.clone(),
                },
                other => other,
            })
    }

    fn is_reserved(&self, keyword: &str) -> bool {
        self.reserved.contains(&keyword.to_lowercase())
    }

    fn ensure_not_self_referential(&self, normalized_url: &str) -> Result<(), ShortenerError> {
        let Some((base_host, base_port)) = &self.base_host else {
            return Ok(());
        };

        let Ok(target) = Url::parse(normalized_url) else {
            return Ok(());
        };

        if target.host_str().is_some_and(|h| h.eq_ignore_ascii_case(base_host))
            && target.port() == *base_port
        {
            return Err(ShortenerError::SelfReferential);
        }

        Ok(())
    }

    async fn create_with_keyword(
        &self,
        raw: &str,
        long_url: String,
        title: String,
        ip: String,
    ) -> Result<Link, ShortenerError> {
        let keyword = self.alphabet.sanitize(raw);
        if keyword.is_empty() || self.is_reserved(&keyword) {
            return Err(ShortenerError::KeywordUnavailable {
                keyword: raw.to_string(),
            });
        }

        // Cheap short-circuit; the insert below stays authoritative.
        if self.links.find_by_keyword(&keyword).await?.is_some() {
            return Err(ShortenerError::KeywordUnavailable { keyword });
        }

        match self
            .links
            .insert(NewLink {
                keyword: keyword.clone(),
                long_url,
                title,
                creator_ip: ip,
            })
            .await
        {
            Ok(link) => Ok(link),
            Err(ShortenerError::Conflict) => {
                Err(ShortenerError::KeywordUnavailable { keyword })
            }
            Err(e) => Err(e),
        }
    }

    async fn create_auto(
        &self,
        long_url: String,
        title: String,
        ip: String,
    ) -> Result<Link, ShortenerError> {
        let mut id = self.links.next_id().await?;

        loop {
            let candidate = self.alphabet.encode(id as u128);

            if self.is_reserved(&candidate) {
                id = next_candidate_id(id)?;
                continue;
            }

            match self
                .links
                .insert(NewLink {
                    keyword: candidate,
                    long_url: long_url.clone(),
                    title: title.clone(),
                    creator_ip: ip.clone(),
                })
                .await
            {
                Ok(link) => {
                    // A lost advance is caught up later via conflict skips;
                    // the claimed keyword itself is already durable.
                    if let Err(e) = self.links.advance_next_id(id + 1).await {
                        error!(claimed_id = id, error = %e, "failed to advance next_id");
                    }
                    return Ok(link);
                }
                Err(ShortenerError::Conflict) => {
                    // Claimed by a concurrent allocator; expected, keep going.
                    id = next_candidate_id(id)?;
                }
                Err(ShortenerError::Storage(source)) => {
                    warn!(attempted_id = id, "auto allocation aborted by storage failure");
                    return Err(ShortenerError::Storage(
                        source.context(format!("auto allocation aborted at id {id}")),
                    ));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn next_candidate_id(id: u64) -> Result<u64, ShortenerError> {
    id.checked_add(1)
        .ok_or_else(|| ShortenerError::storage(anyhow::anyhow!("keyword id space exhausted")))
}
