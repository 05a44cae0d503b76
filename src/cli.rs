use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(version, about = "Tennis draw predictions: live round, scores, picks and points")]
pub struct Args {
    /// Draw id or slug, e.g. french-open-mens-singles-2024-j5mehm6fvdf9105
    #[arg(value_name = "DRAW")]
    pub draw: Option<String>,

    /// List active and completed draws
    #[arg(long, conflicts_with_all = ["draw", "snapshot", "profile"])]
    pub list: bool,

    /// Show a user's average points and correct predictions
    #[arg(long, value_name = "NAME", conflicts_with_all = ["draw", "snapshot"])]
    pub profile: Option<String>,

    /// Read a saved draw page instead of the record store
    #[arg(long, value_name = "PATH", conflicts_with = "draw")]
    pub snapshot: Option<PathBuf>,

    /// Record store base URL
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Username of the viewer, shown in the main color
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,

    /// Username of another predictor to show, may be repeated
    #[arg(long = "track", value_name = "NAME")]
    pub track: Vec<String>,

    /// Show tie-break points in set scores
    #[arg(long)]
    pub tiebreaks: bool,

    /// Print the draw as JSON
    #[arg(long)]
    pub json: bool,

    /// Whether to log on the debug level
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn draw_with_tracked_users() {
        let args = Args::try_parse_from([
            "tennis-bracket",
            "french-open-mens-singles-2024-j5mehm6fvdf9105",
            "--user",
            "will",
            "--track",
            "john",
            "--track",
            "steve",
            "--tiebreaks",
        ])
        .unwrap();
        assert_eq!(
            args.draw.as_deref(),
            Some("french-open-mens-singles-2024-j5mehm6fvdf9105")
        );
        assert_eq!(args.user.as_deref(), Some("will"));
        assert_eq!(args.track, vec!["john", "steve"]);
        assert!(args.tiebreaks);
        assert!(!args.json);
    }

    #[test]
    fn draw_may_come_from_the_environment() {
        let args = Args::try_parse_from(["tennis-bracket"]).unwrap();
        assert!(args.draw.is_none());
        assert!(Args::try_parse_from(["tennis-bracket", "--list"]).is_ok());
        assert!(Args::try_parse_from(["tennis-bracket", "--snapshot", "page.json"]).is_ok());
    }

    #[test]
    fn modes_exclude_each_other() {
        assert!(Args::try_parse_from(["tennis-bracket", "--list", "abc"]).is_err());
        assert!(Args::try_parse_from(["tennis-bracket", "abc", "--snapshot", "p.json"]).is_err());
        assert!(Args::try_parse_from(["tennis-bracket", "--profile", "will", "abc"]).is_err());
        assert!(Args::try_parse_from(["tennis-bracket", "--list", "--profile", "will"]).is_err());
    }

    #[test]
    fn profile_by_name() {
        let args = Args::try_parse_from(["tennis-bracket", "--profile", "will", "--json"]).unwrap();
        assert_eq!(args.profile.as_deref(), Some("will"));
        assert!(args.json);
    }
}
