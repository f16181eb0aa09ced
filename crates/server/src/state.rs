//! Shared application state.

use std::sync::Arc;

use anyhow::{Context, Result};
use curata_engine::{
    HttpTransport, ModeratorsService, PostsService, RepoDirectory, RepoLookup, SponsorsService,
    Transport,
};
use tera::Tera;

use crate::config::Config;

/// Cloneable handle to configuration, engine services, and templates.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    posts: PostsService,
    moderators: ModeratorsService,
    sponsors: SponsorsService,
    repos: Arc<dyn RepoLookup>,
    templates: Arc<Tera>,
}

impl AppState {
    /// Build state with production collaborators.
    pub fn new(config: Config) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(
            HttpTransport::new(config.upstream.clone())
                .context("failed to build upstream transport")?,
        );
        let repos: Arc<dyn RepoLookup> = Arc::new(
            RepoDirectory::new(config.upstream.directory_base.clone(), config.upstream.timeout)
                .context("failed to build repository directory client")?,
        );

        Self::with_collaborators(config, transport, repos)
    }

    /// Build state with caller-supplied collaborators (the test seam).
    pub fn with_collaborators(
        config: Config,
        transport: Arc<dyn Transport>,
        repos: Arc<dyn RepoLookup>,
    ) -> Result<Self> {
        let templates = build_templates().context("failed to build templates")?;

        Ok(Self {
            config: Arc::new(config),
            posts: PostsService::new(Arc::clone(&transport)),
            moderators: ModeratorsService::new(Arc::clone(&transport)),
            sponsors: SponsorsService::new(transport),
            repos,
            templates: Arc::new(templates),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn posts(&self) -> &PostsService {
        &self.posts
    }

    pub fn moderators(&self) -> &ModeratorsService {
        &self.moderators
    }

    pub fn sponsors(&self) -> &SponsorsService {
        &self.sponsors
    }

    pub fn repos(&self) -> &dyn RepoLookup {
        self.repos.as_ref()
    }

    pub fn templates(&self) -> &Tera {
        &self.templates
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("site_url", &self.config.site_url)
            .finish()
    }
}

fn build_templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template(
        "posts_table.html",
        include_str!("../templates/posts_table.html"),
    )?;
    // The template name ends in `.html`, which turns on Tera's HTML
    // autoescaping; that escapes `/` in values like a repository's
    // `owner/name`. The table view renders trusted, already-derived fields,
    // so disable autoescaping to emit them verbatim.
    tera.autoescape_on(vec![]);
    Ok(tera)
}
