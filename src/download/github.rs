use crate::config::Config;
use crate::download::http;
use crate::errors::StewError;
use crate::models::GitHubRelease;
use anyhow::Result;

/// Releases API URL for a repository, newest release first
pub fn releases_url(api_host: &str, owner: &str, repo: &str) -> String {
    format!("https://{api_host}/repos/{owner}/{repo}/releases?per_page=100")
}

/// A repository together with its published releases
#[derive(Debug, Clone)]
pub struct GithubProject {
    pub owner: String,
    pub repo: String,
    pub releases: Vec<GitHubRelease>,
}

impl GithubProject {
    /// Fetch the releases of `owner/repo`
    pub fn fetch(config: &Config, owner: &str, repo: &str) -> Result<Self> {
        let url = releases_url(config.github_api(), owner, repo);
        let releases: Vec<GitHubRelease> = http::get_json(config, &url)?;
        Ok(Self::new(owner, repo, releases))
    }

    pub fn new(owner: &str, repo: &str, releases: Vec<GitHubRelease>) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            releases,
        }
    }

    /// Tags of every release, newest first
    pub fn release_tags(&self) -> Result<Vec<String>, StewError> {
        if self.releases.is_empty() {
            return Err(StewError::ReleasesNotFound {
                owner: self.owner.clone(),
                repo: self.repo.clone(),
            });
        }
        Ok(self.releases.iter().map(|r| r.tag_name.clone()).collect())
    }

    /// Tag of the newest release
    pub fn latest_tag(&self) -> Result<String, StewError> {
        self.release_tags()
            .map(|tags| tags.into_iter().next().unwrap_or_default())
    }

    /// Asset names of the release tagged `tag`
    pub fn release_assets(&self, tag: &str) -> Result<Vec<String>, StewError> {
        let assets: Vec<String> = self
            .releases
            .iter()
            .filter(|release| release.tag_name == tag)
            .flat_map(|release| release.assets.iter().map(|asset| asset.name.clone()))
            .collect();

        if assets.is_empty() {
            return Err(StewError::AssetsNotFound {
                tag: tag.to_string(),
            });
        }
        Ok(assets)
    }

    /// Browser download URL of `asset` in the release tagged `tag`
    pub fn download_url(&self, tag: &str, asset: &str) -> Option<String> {
        self.releases
            .iter()
            .find(|release| release.tag_name == tag)?
            .assets
            .iter()
            .find(|a| a.name == asset)
            .map(|a| a.browser_download_url.clone())
    }
}
