//! Member directory lookup
//!
//! Maps participant identifiers to display names. The directory is paginated;
//! `resolve_display_names` walks pages until a short page signals the end of
//! the data. Resolution is best-effort: callers fall back to locally known
//! names or raw identifiers when the mapping is empty or the lookup fails.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// One directory entry for a group member
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRecord {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub identifier: Option<String>,
}

impl MemberRecord {
    /// Best display name available: full name, then username, then
    /// identifier, then the raw user id
    pub fn display_name(&self) -> String {
        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !full_name.is_empty() {
            return full_name;
        }

        self.username
            .as_deref()
            .or(self.identifier.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.user_id)
            .to_string()
    }
}

/// Paginated member listing for one group
#[async_trait::async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn list_members(
        &self,
        group_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<MemberRecord>>;
}

/// Fetch every page of a group's members and build an id → display-name map
pub async fn resolve_display_names(
    directory: &dyn MemberDirectory,
    group_id: &str,
    page_size: usize,
) -> Result<HashMap<String, String>> {
    if page_size == 0 {
        return Err(anyhow!("Directory page size must be non-zero"));
    }

    let mut names = HashMap::new();
    let mut offset = 0;

    loop {
        let page = directory
            .list_members(group_id, offset, page_size)
            .await
            .with_context(|| format!("Failed to list members of group {group_id}"))?;

        let fetched = page.len();

        for member in page {
            let name = member.display_name();
            names.insert(member.user_id, name);
        }

        // A short page means the directory is exhausted
        if fetched < page_size {
            break;
        }

        offset += fetched;
    }

    Ok(names)
}

/// HTTP implementation of the directory service
pub struct HttpMemberDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMemberDirectory {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }
}

#[async_trait::async_trait]
impl MemberDirectory for HttpMemberDirectory {
    async fn list_members(
        &self,
        group_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<MemberRecord>> {
        let url = format!("{}/groups/{}/members", self.base_url, group_id);

        let res = self
            .client
            .get(&url)
            .query(&[("offset", offset), ("limit", limit)])
            .send()
            .await
            .context("Failed to reach member directory")?;

        if !res.status().is_success() {
            return Err(anyhow!("Member listing rejected with HTTP {}", res.status()));
        }

        let members: Vec<MemberRecord> = res
            .json()
            .await
            .context("Malformed member directory response")?;

        Ok(members)
    }
}
