use clap::Parser;
use freight_rates::config::cli::{form_from_fields, Command};
use freight_rates::core::form::form_fields;
use freight_rates::core::ConfigProvider;
use freight_rates::domain::ports::{Notification, NotificationLevel, Notifier};
use freight_rates::utils::{logger, validation::Validate};
use freight_rates::{
    CliConfig, NoopPreparer, RateRepository, RatesPage, RestBackend, Tab, TomlConfig,
};

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => println!("✅ {}", notification.message),
            NotificationLevel::Warning => eprintln!("⚠️  {}", notification.message),
            NotificationLevel::Error => eprintln!("❌ {}", notification.message),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let file = match cli.load_file() {
        Ok(file) => file,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(2);
        }
    };

    // 初始化日誌
    let verbose = cli.verbose || file.as_ref().is_some_and(TomlConfig::verbose);
    if cli.json_logs || file.as_ref().is_some_and(TomlConfig::json_logging) {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting freight-rates CLI");

    let settings = cli.settings(file.as_ref());
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(2);
    }
    if verbose {
        tracing::debug!(
            "Backend: {} (table '{}', signed in: {})",
            settings.backend_url(),
            settings.table(),
            settings.access_token().is_some()
        );
    }

    let backend = RestBackend::from_config(&settings)?;
    let repository = RateRepository::with_table(backend, settings.table());
    let mut page = RatesPage::new(repository, ConsoleNotifier, NoopPreparer);

    let succeeded = match cli.command {
        Command::Save { rate_type, fields } => {
            let known = form_fields(rate_type);
            for (name, _) in &fields {
                if !known.contains(&name.as_str()) {
                    tracing::warn!("Field '{}' is not part of the {} form, ignoring", name, rate_type);
                }
            }

            page.switch_tab(Tab::Form(rate_type)).await;
            match page.save(&form_from_fields(&fields)).await {
                Some(stored) => {
                    println!("🆔 {}", stored.id);
                    true
                }
                None => false,
            }
        }
        Command::List { filter } => match page.set_filter(filter).await {
            Some(view) => {
                print!("{}", view.to_text());
                true
            }
            None => false,
        },
        Command::Delete { id } => page.delete(&id).await,
        Command::Export { filter, output } => match page.set_filter(filter).await {
            Some(view) => {
                let written = std::fs::File::create(&output)
                    .map_err(Into::into)
                    .and_then(|file| view.write_csv(file));
                match written {
                    Ok(()) => {
                        println!(
                            "📁 Exported {} rates to {}",
                            view.rows().len(),
                            output.display()
                        );
                        true
                    }
                    Err(e) => {
                        tracing::error!("Export failed: {}", e);
                        eprintln!("❌ {}", e.user_friendly_message());
                        false
                    }
                }
            }
            None => false,
        },
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
