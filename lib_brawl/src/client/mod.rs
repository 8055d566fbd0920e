//! # REST Read Client
//!
//! One-shot typed access to every read endpoint of the API with a single
//! token. Unlike the polling engine this client does not queue or throttle:
//! each method is exactly one GET.
//!
//! Arguments are validated before any I/O; a bad tag or country code comes
//! back as [`ClientError`] and nothing is sent. An HTTP failure is *not* an
//! error: it is reported in the returned [`ApiResponse`] like everywhere else.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::configs::{ClientOptions, ConfigError};
use crate::models::{
    BattleLog, Brawler, Club, ClubMember, ClubRanking, ItemList, Player, PlayerRanking, PowerPlaySeason,
};
use crate::retrieve::{endpoint, ApiClient, ApiResponse, Fetch};
use crate::utils::tags::{Tag, TagError};

/// Leaderboard scope covering every country.
pub const GLOBAL: &str = "global";

/// Argument errors raised before a request is sent.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A player or club tag did not validate.
    #[error(transparent)]
    InvalidTag(#[from] TagError),

    /// Country code is neither `global` nor two letters.
    #[error("incorrect country code: {0:?}")]
    InvalidCountryCode(String),

    /// The resulting URL did not parse.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Paging parameters for leaderboard endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of items.
    pub limit: Option<u32>,
    /// Return items before this paging marker.
    pub before: Option<String>,
    /// Return items after this paging marker.
    pub after: Option<String>,
}

impl SearchOptions {
    fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        if let Some(limit) = self.limit {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(before) = &self.before {
            pairs.append_pair("before", before);
        }
        if let Some(after) = &self.after {
            pairs.append_pair("after", after);
        }
        drop(pairs);
        // query_pairs_mut leaves an empty `?` behind when nothing was appended
        if url.query() == Some("") {
            url.set_query(None);
        }
    }
}

fn country(code: &str) -> Result<&str, ClientError> {
    if code == GLOBAL || (code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())) {
        Ok(code)
    } else {
        Err(ClientError::InvalidCountryCode(code.to_string()))
    }
}

/// Typed client over a [`Fetch`] transport.
#[derive(Debug, Clone)]
pub struct BrawlClient<F: Fetch = ApiClient> {
    fetcher: F,
    token: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl BrawlClient<ApiClient> {
    /// Builds a client on a fresh `reqwest` connection pool.
    pub fn new(options: ClientOptions) -> Result<Self, ConfigError> {
        let fetcher = ApiClient::new()?;
        Self::with_fetcher(options, fetcher)
    }
}

impl<F: Fetch> BrawlClient<F> {
    /// Builds a client on a caller-supplied transport.
    pub fn with_fetcher(options: ClientOptions, fetcher: F) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            timeout: options.timeout(),
            fetcher,
            token: options.token,
            base_url: options.base_url,
        })
    }

    async fn get<T>(&self, url: Url) -> ApiResponse<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.fetcher.fetch(url, &self.token, self.timeout).await.decode()
    }

    fn url(&self, path: &str, search: Option<&SearchOptions>) -> Result<Url, ClientError> {
        let mut url = endpoint(&self.base_url, path)?;
        if let Some(search) = search {
            search.apply(&mut url);
        }
        Ok(url)
    }

    /// `GET /players/{tag}`
    pub async fn player(&self, tag: &str) -> Result<ApiResponse<Player>, ClientError> {
        let tag = Tag::parse(tag)?;
        let url = self.url(&format!("/players/{}", tag.encoded()), None)?;
        Ok(self.get(url).await)
    }

    /// `GET /players/{tag}/battlelog`
    pub async fn player_battles(&self, tag: &str) -> Result<ApiResponse<BattleLog>, ClientError> {
        let tag = Tag::parse(tag)?;
        let url = self.url(&format!("/players/{}/battlelog", tag.encoded()), None)?;
        Ok(self.get(url).await)
    }

    /// `GET /clubs/{tag}`
    pub async fn club(&self, tag: &str) -> Result<ApiResponse<Club>, ClientError> {
        let tag = Tag::parse(tag)?;
        let url = self.url(&format!("/clubs/{}", tag.encoded()), None)?;
        Ok(self.get(url).await)
    }

    /// `GET /clubs/{tag}/members`
    pub async fn club_members(&self, tag: &str) -> Result<ApiResponse<ItemList<ClubMember>>, ClientError> {
        let tag = Tag::parse(tag)?;
        let url = self.url(&format!("/clubs/{}/members", tag.encoded()), None)?;
        Ok(self.get(url).await)
    }

    /// `GET /brawlers`
    pub async fn brawlers(&self) -> Result<ApiResponse<ItemList<Brawler>>, ClientError> {
        let url = self.url("/brawlers", None)?;
        Ok(self.get(url).await)
    }

    /// `GET /brawlers/{id}`
    pub async fn brawler(&self, id: i64) -> Result<ApiResponse<Brawler>, ClientError> {
        let url = self.url(&format!("/brawlers/{}", id), None)?;
        Ok(self.get(url).await)
    }

    /// `GET /rankings/{country}/clubs`
    pub async fn club_rankings(
        &self,
        country_code: &str,
        search: Option<&SearchOptions>,
    ) -> Result<ApiResponse<ItemList<ClubRanking>>, ClientError> {
        let url = self.url(&format!("/rankings/{}/clubs", country(country_code)?), search)?;
        Ok(self.get(url).await)
    }

    /// `GET /rankings/{country}/players`
    pub async fn player_rankings(
        &self,
        country_code: &str,
        search: Option<&SearchOptions>,
    ) -> Result<ApiResponse<ItemList<PlayerRanking>>, ClientError> {
        let url = self.url(&format!("/rankings/{}/players", country(country_code)?), search)?;
        Ok(self.get(url).await)
    }

    /// `GET /rankings/{country}/brawlers/{id}`
    pub async fn brawler_rankings(
        &self,
        brawler_id: i64,
        country_code: &str,
        search: Option<&SearchOptions>,
    ) -> Result<ApiResponse<ItemList<PlayerRanking>>, ClientError> {
        let path = format!("/rankings/{}/brawlers/{}", country(country_code)?, brawler_id);
        let url = self.url(&path, search)?;
        Ok(self.get(url).await)
    }

    /// `GET /rankings/{country}/powerplay/seasons/{season}`
    pub async fn power_play_rankings(
        &self,
        season_id: &str,
        country_code: &str,
        search: Option<&SearchOptions>,
    ) -> Result<ApiResponse<ItemList<PlayerRanking>>, ClientError> {
        let mut url = self.url(&format!("/rankings/{}/powerplay/seasons", country(country_code)?), None)?;
        // the season id is caller input; push it as an escaped segment
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(season_id);
        if let Some(search) = search {
            search.apply(&mut url);
        }
        Ok(self.get(url).await)
    }

    /// `GET /rankings/{country}/powerplay/seasons`
    pub async fn power_play_seasons(
        &self,
        country_code: &str,
        search: Option<&SearchOptions>,
    ) -> Result<ApiResponse<ItemList<PowerPlaySeason>>, ClientError> {
        let url = self.url(&format!("/rankings/{}/powerplay/seasons", country(country_code)?), search)?;
        Ok(self.get(url).await)
    }
}
