use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "hibp-scan")]
#[command(about = "Scan a list of email addresses against Have I Been Pwned and store the breaches")]
pub struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    pub config: String,

    /// Text file with one candidate address per line
    #[arg(short, long, default_value = "data.txt")]
    pub input: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// List the addresses that would be looked up, without calling the API or the store
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["hibp-scan"]);
        assert_eq!(args.config, "config.json");
        assert_eq!(args.input, "data.txt");
        assert!(!args.verbose);
        assert!(!args.json_logs);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::parse_from([
            "hibp-scan",
            "--config",
            "/etc/hibp.json",
            "-i",
            "emails.txt",
            "-v",
            "--dry-run",
        ]);
        assert_eq!(args.config, "/etc/hibp.json");
        assert_eq!(args.input, "emails.txt");
        assert!(args.verbose);
        assert!(args.dry_run);
    }
}
