use clap::Parser;
use hibp_scan::utils::{logger, validation::Validate};
use hibp_scan::{AddressExtractor, CliArgs, HibpClient, MongoStore, ScanConfig, ScanError, ScanLoop};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting hibp-scan");

    if let Err(e) = run(&args).await {
        tracing::error!(
            "❌ Scan aborted: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(args: &CliArgs) -> Result<(), ScanError> {
    tracing::info!("📁 Loading configuration from: {}", args.config);
    let config = ScanConfig::from_file(&args.config)?;
    config.validate()?;
    tracing::debug!("Config: {:?}", config);

    let input = std::fs::read_to_string(&args.input)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No lookups or writes will occur");
        perform_dry_run(&input);
        return Ok(());
    }

    let client = HibpClient::new(&config.endpoint, &config.user_agent, config.request_timeout())?;
    let store = MongoStore::connect(&config.mongo_uri, &config.database, &config.collection).await?;

    let mut scan = ScanLoop::new(client, store, config.scan_settings());
    let report = scan.run(&input).await?;

    println!("✅ Done: {}", report);
    Ok(())
}

fn perform_dry_run(input: &str) {
    let extractor = AddressExtractor::new();
    let mut count = 0;
    for email in extractor.addresses(input) {
        println!("{}", email);
        count += 1;
    }
    println!("🔍 {} address(es) would be looked up", count);
}
