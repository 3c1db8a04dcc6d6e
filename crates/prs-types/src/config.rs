use clap::{Args, Parser};
use std::{fs, io, path::PathBuf};

use crate::settings::{Preferences, ReviewSettings};

#[derive(Debug, Clone, Parser)]
pub struct BackendConfig {
    #[arg(
        long,
        env = "PRS_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db or similar, default is sqlite://[data-dir]/prs.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "PRS_DATA_DIR",
        help = "Data directory (database etc.), default is system default like ~/.local/share/prs",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[command(flatten)]
    pub preferences: PreferenceArgs,
}

#[derive(Debug, Clone, Args)]
pub struct PreferenceArgs {
    #[arg(
        long,
        env = "PRS_INCLUDE_UNAPPROVED_REVIEWS",
        help = "Show unapproved reviews together with approved ones"
    )]
    pub include_unapproved_reviews: bool,

    #[arg(
        long,
        env = "PRS_PREVIEW_SIZE",
        default_value_t = 3,
        value_parser = clap::value_parser!(i64).range(1..),
        help = "Number of reviews in product preview"
    )]
    pub preview_size: i64,

    #[arg(
        long,
        env = "PRS_PAGINATE_SIZE",
        default_value_t = 10,
        value_parser = clap::value_parser!(i64).range(1..),
        help = "Default page size of review listings"
    )]
    pub paginate_size: i64,

    #[arg(long, env = "PRS_TRACK_LOCALE", help = "Store locale of reviews")]
    pub track_locale: bool,

    #[arg(
        long,
        env = "PRS_REQUIRE_LOGIN",
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Require reviewer user id (true/false)"
    )]
    pub require_login: bool,
}

impl From<&PreferenceArgs> for Preferences {
    fn from(args: &PreferenceArgs) -> Self {
        Preferences {
            include_unapproved_reviews: args.include_unapproved_reviews,
            preview_size: args.preview_size,
            paginate_size: args.paginate_size,
            track_locale: args.track_locale,
            require_login: args.require_login,
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("prs"))
        .unwrap_or_else(|| PathBuf::from("prs"))
        .to_string_lossy()
        .to_string()
}

impl BackendConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Creates data directory if missing, fails if path exists and is not a directory.
    pub fn ensure_data_dir(&self) -> io::Result<PathBuf> {
        let dir = self.data_dir();
        if !fs::exists(&dir)? {
            fs::create_dir_all(&dir)?;
        } else if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("Data directory {} is not a directory", dir.display()),
            ));
        }
        Ok(dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/prs.db", self.data_dir))
    }

    pub fn settings(&self) -> ReviewSettings {
        Preferences::from(&self.preferences).into()
    }
}
