use clap::Parser;
use color_eyre::Result;
use shelfscope::error_display::{user_message_from_dashboard_error, user_message_from_report};
use shelfscope::{
    loader, report, AppConfig, Args, ConfigManager, Dashboard, FilterError, LoadOptions,
    ReportStyle, Selection, ViewSettings, APP_NAME,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_logging(args: &Args, config: &AppConfig) {
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_lowercase()))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config = ConfigManager::new(APP_NAME)?;
        match config.write_default_config(args.force) {
            Ok(path) => {
                println!("Configuration written to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error writing config: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

/// Options requested by `--list-genres` or `--list-authors`, if either was given.
/// The genre is checked the same way a normal run checks it.
fn list_options(dashboard: &Dashboard, args: &Args) -> Result<Option<Vec<String>>, FilterError> {
    if args.list_genres {
        return Ok(Some(dashboard.genre_options()));
    }
    if args.list_authors {
        let filter = dashboard.select(
            Selection::from_label(args.genre.as_deref()),
            Selection::All,
            args.year_min,
            args.year_max,
        )?;
        return Ok(Some(dashboard.author_options(filter.genre())));
    }
    Ok(None)
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let options = LoadOptions::from_args_and_config(args, config);
    let settings = ViewSettings::from_args_and_config(args, config);
    let location = loader::source_location(args, config);
    debug!(?options, ?settings, "starting session");

    let dashboard = match Dashboard::load(location, &options) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("Error: {}", user_message_from_dashboard_error(&e));
            std::process::exit(1);
        }
    };

    if let Some(options) = list_options(&dashboard, args)? {
        for option in options {
            println!("{}", option);
        }
        return Ok(());
    }

    let filter = dashboard.select(
        Selection::from_label(args.genre.as_deref()),
        Selection::from_label(args.author.as_deref()),
        args.year_min,
        args.year_max,
    )?;
    let views = dashboard.views(&filter, &settings);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        print!("{}", report::render_report(&views, ReportStyle::detect()));
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let config = match AppConfig::load(APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&args, &config);

    if let Err(e) = run(&args, &config) {
        eprintln!("Error: {}", user_message_from_report(&e));
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscope::{Dataset, Record};

    #[test]
    fn test_args_to_load_options() {
        let args = Args {
            source: Some("books.csv".to_string()),
            delimiter: Some(b';'),
            top_n: Some(3),
            ..Args::default()
        };
        let mut config = AppConfig::default();
        config.source.delimiter = Some(b'|');
        config.views.preview_rows = 7;

        let opts = LoadOptions::from_args_and_config(&args, &config);
        assert_eq!(opts.delimiter, b';');
        let settings = ViewSettings::from_args_and_config(&args, &config);
        assert_eq!(settings.top_n, 3);
        assert_eq!(settings.preview_rows, 7);
        assert_eq!(loader::source_location(&args, &config), "books.csv");
    }

    fn small_dashboard() -> Dashboard {
        Dashboard::new(Dataset::from_records(vec![
            Record::new("Dune", "Herbert", "Fiction", 2015, 4.5, 1200.0, 9.0),
            Record::new("Quiet", "Cain", "Non Fiction", 2016, 4.6, 900.0, 12.0),
        ]))
    }

    #[test]
    fn test_list_authors_checks_genre() {
        let dashboard = small_dashboard();
        let args = Args {
            list_authors: true,
            genre: Some("Fiction".to_string()),
            ..Args::default()
        };
        assert_eq!(
            list_options(&dashboard, &args).unwrap(),
            Some(vec!["Herbert".to_string()])
        );

        let unknown = Args {
            genre: Some("Poetry".to_string()),
            ..args
        };
        assert!(matches!(
            list_options(&dashboard, &unknown),
            Err(FilterError::UnknownGenre { .. })
        ));
        assert_eq!(list_options(&dashboard, &Args::default()).unwrap(), None);
    }
}
