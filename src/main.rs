use clap::Parser;
use icio_deps::adapters::{CsvFlowSource, HttpFlowSource};
use icio_deps::config::toml_config::TomlConfig;
use icio_deps::domain::ports::FlowSource;
use icio_deps::utils::error::ErrorSeverity;
use icio_deps::utils::{logger, validation::Validate};
use icio_deps::{CliConfig, DependencyEngine, EngineSettings, IcioError, QueryCommand};

enum ResolvedSource {
    Http(String),
    Csv { path: String, entry: Option<String> },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("🚀 Starting icio-deps query CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證命令列參數
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    // 載入 TOML 配置 (可選)
    let toml = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => {
                    if let Err(e) = config.validate() {
                        eprintln!("❌ Invalid config file '{}': {}", path, e);
                        eprintln!("💡 {}", e.recovery_suggestion());
                        std::process::exit(1);
                    }
                    Some(config)
                }
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => None,
    };

    let settings = resolve_settings(&cli, toml.as_ref());
    let source = match resolve_source(&cli, toml.as_ref()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let outcome = match source {
        ResolvedSource::Http(endpoint) => {
            tracing::info!("🌐 Using flow API at {}", endpoint);
            let engine = DependencyEngine::with_settings(HttpFlowSource::new(endpoint), settings);
            run(&engine, &cli.command).await
        }
        ResolvedSource::Csv { path, entry } => {
            tracing::info!("📁 Using flow snapshot {}", path);
            let loaded = if path.ends_with(".zip") {
                CsvFlowSource::from_zip_path(&path, entry.as_deref())
            } else {
                CsvFlowSource::from_csv_path(&path)
            };
            match loaded {
                Ok(source) => {
                    let engine = DependencyEngine::with_settings(source, settings);
                    run(&engine, &cli.command).await
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Query failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
            ErrorSeverity::Low | ErrorSeverity::High => 1,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

fn resolve_settings(cli: &CliConfig, toml: Option<&TomlConfig>) -> EngineSettings {
    let mut settings = toml
        .map(|config| EngineSettings::from_config(config))
        .unwrap_or_default();

    // 命令列參數覆蓋 TOML 設定
    if let Some(tolerance) = cli.tolerance {
        settings.tolerance = tolerance;
    }
    if let Some(max_limit) = cli.max_limit {
        settings.max_limit = max_limit;
    }
    if let Some(year_min) = cli.year_min {
        settings.year_min = year_min;
    }
    if let Some(year_max) = cli.year_max {
        settings.year_max = year_max;
    }
    settings
}

fn resolve_source(cli: &CliConfig, toml: Option<&TomlConfig>) -> icio_deps::Result<ResolvedSource> {
    if let Some(endpoint) = &cli.endpoint {
        return Ok(ResolvedSource::Http(endpoint.clone()));
    }
    if let Some(path) = &cli.snapshot {
        return Ok(ResolvedSource::Csv {
            path: path.clone(),
            entry: cli.archive_entry.clone(),
        });
    }
    if let Some(toml) = toml {
        return match toml.source.r#type.as_str() {
            "http" => Ok(ResolvedSource::Http(
                toml.source.endpoint.clone().unwrap_or_default(),
            )),
            _ => Ok(ResolvedSource::Csv {
                path: toml.source.path.clone().unwrap_or_default(),
                entry: toml.source.archive_entry.clone(),
            }),
        };
    }
    Err(IcioError::MissingConfigError {
        field: "endpoint | snapshot | config".to_string(),
    })
}

async fn run<S: FlowSource>(
    engine: &DependencyEngine<S>,
    command: &QueryCommand,
) -> icio_deps::Result<()> {
    match command {
        QueryCommand::TopSuppliers {
            buyer_country,
            buyer_sector,
            year,
            limit,
        } => {
            let result = engine
                .top_suppliers(buyer_country, buyer_sector, *year, *limit)
                .await?;
            println!(
                "✅ Top suppliers of {} / {} in {}:",
                buyer_country, buyer_sector, year
            );
            if result.entries.is_empty() {
                println!("   (no data for scope)");
            }
            for (i, entry) in result.entries.iter().enumerate() {
                println!("{:>4}. {:<24} {:>8}", i + 1, entry.display_key(), entry.formatted);
            }
        }

        QueryCommand::TopSectors {
            supplier_country,
            buyer_country,
            year,
            limit,
        } => {
            let result = engine
                .top_sectors(supplier_country, buyer_country, *year, *limit)
                .await?;
            println!(
                "✅ Sectors of {} most dependent on {} in {}:",
                buyer_country, supplier_country, year
            );
            if result.entries.is_empty() {
                println!("   (no data for scope)");
            }
            for (i, entry) in result.entries.iter().enumerate() {
                println!("{:>4}. {:<24} {:>8}", i + 1, entry.key, entry.formatted);
            }
        }

        QueryCommand::Compare {
            buyer_countries,
            buyer_sector,
            supplier_country,
            year,
        } => {
            let result = engine
                .compare_countries(buyer_countries, buyer_sector, supplier_country, *year)
                .await?;
            println!(
                "✅ Dependency on {} in {} ({}):",
                supplier_country, buyer_sector, year
            );
            for entry in &result.entries {
                let marker = if entry.no_data { "  (no data)" } else { "" };
                println!("   {:<6} {:>8}{}", entry.buyer_country, entry.formatted, marker);
            }
        }

        QueryCommand::Series {
            buyer_country,
            buyer_sector,
            supplier_country,
            year_start,
            year_end,
        } => {
            let result = engine
                .time_series(
                    buyer_country,
                    buyer_sector,
                    supplier_country,
                    *year_start,
                    *year_end,
                )
                .await?;
            println!(
                "✅ Dependency of {} / {} on {}, {}..={}:",
                buyer_country, buyer_sector, supplier_country, year_start, year_end
            );
            for point in &result.entries {
                match &point.formatted {
                    Some(formatted) => println!("   {}  {:>8}", point.year, formatted),
                    None => println!("   {}  {:>8}", point.year, "-"),
                }
            }
        }

        QueryCommand::Health => {
            println!("✅ engine: {}", engine.health());
            match engine.health_source().await {
                Ok(status) => println!("✅ source: {}", status),
                Err(e) => {
                    println!("❌ source: {}", e.user_friendly_message());
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
