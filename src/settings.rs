use crate::cli::Args;
use bracket_api::client::DEFAULT_BASE_URL;
use log::LevelFilter;
use std::path::PathBuf;

/// What one invocation shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Catalogue,
    Profile(String),
    Snapshot(PathBuf),
    Draw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub token: String,
    pub snapshot: Option<PathBuf>,
    pub log_level: Option<LevelFilter>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            token: String::new(),
            snapshot: None,
            log_level: None,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            base_url: var("TENNIS_BRACKET_URL").unwrap_or(defaults.base_url),
            token: var("TENNIS_BRACKET_TOKEN").unwrap_or(defaults.token),
            snapshot: var("TENNIS_BRACKET_JSON").map(PathBuf::from),
            log_level: None,
        }
    }

    /// Command line flags win over the environment.
    pub fn apply_args(mut self, args: &Args) -> Self {
        if let Some(url) = &args.url {
            self.base_url = url.clone();
        }
        match (&args.snapshot, &args.draw) {
            (Some(path), _) => self.snapshot = Some(path.clone()),
            (None, Some(_)) => self.snapshot = None,
            (None, None) => {}
        }
        if args.debug {
            self.log_level = Some(LevelFilter::Debug);
        }
        self
    }

    /// None when neither the command line nor the environment names a draw.
    pub fn target(&self, args: &Args) -> Option<Target> {
        if args.list {
            return Some(Target::Catalogue);
        }
        if let Some(name) = &args.profile {
            return Some(Target::Profile(name.clone()));
        }
        match (&self.snapshot, &args.draw) {
            (Some(path), _) => Some(Target::Snapshot(path.clone())),
            (None, Some(draw)) => Some(Target::Draw(draw.clone())),
            (None, None) => None,
        }
    }
}
