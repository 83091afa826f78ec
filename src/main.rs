use clap::{Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use serde::Serialize;
use std::io::{self, BufRead, Read};
use std::process;
use sudosoc_tools::analyzers::CharacterSets;
use sudosoc_tools::report;
use sudosoc_tools::{
    Analyzer, AnalyzerError, Config, HeaderRiskAnalyzer, ObfuscationHunter, PasswordGenerator,
    PasswordStrengthEstimator, RedirectAnalyzer,
};

const DEFAULT_CONFIG_PATH: &str = "/etc/sudosoc-tools.yaml";

fn build_cli() -> Command {
    Command::new("sudosoc-tools")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Offline heuristic analyzers for email headers, scripts, passwords and URLs")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the default configuration to FILE")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("email-header")
                .long("email-header")
                .value_name("FILE")
                .help("Score raw email headers read from FILE ('-' for stdin)")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("obfuscation")
                .long("obfuscation")
                .value_name("FILE")
                .help("Hunt for obfuscation in a snippet read from FILE ('-' for stdin)")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .value_name("PASSWORD")
                .help("Estimate password strength ('-' reads one line from stdin)")
                .allow_hyphen_values(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("redirect")
                .long("redirect")
                .value_name("URL")
                .help("Check a URL for open-redirect and phishing patterns")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("generate-password")
                .long("generate-password")
                .value_name("LENGTH")
                .help("Generate a random password (length clamped to 8..=64)")
                .num_args(0..=1)
                .value_parser(clap::value_parser!(usize))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("no-lower")
                .long("no-lower")
                .help("Exclude lowercase letters from generated passwords")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-upper")
                .long("no-upper")
                .help("Exclude uppercase letters from generated passwords")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-digits")
                .long("no-digits")
                .help("Exclude digits from generated passwords")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-symbols")
                .long("no-symbols")
                .help("Exclude symbols from generated passwords")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the result as JSON instead of a text report")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with rule-level detail")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    let mut cli = build_cli();
    let matches = cli.clone().get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        init_logger(&matches, None);
        generate_default_config(generate_path);
        return;
    }

    let config_found = std::path::Path::new(config_path).exists();
    let config = match load_config(config_path, config_found) {
        Ok(config) => config,
        Err(e) => {
            init_logger(&matches, None);
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };
    init_logger(&matches, Some(&config));
    if !config_found {
        log::warn!("Configuration file '{config_path}' not found, using default configuration");
    }

    if matches.get_flag("test-config") {
        println!("Configuration OK");
        println!("  Common passwords: {}", config.password.common_passwords.len());
        println!("  Keyboard patterns: {}", config.password.keyboard_patterns.len());
        println!("  Redirect parameters: {}", config.redirect.suspicious_params.len());
        return;
    }

    match run(&matches, &config) {
        Ok(true) => {}
        Ok(false) => {
            let _ = cli.print_help();
            println!();
        }
        Err(e) => {
            if let Some(AnalyzerError::EmptyInput { prompt }) = e.downcast_ref::<AnalyzerError>() {
                eprintln!("{prompt}");
                process::exit(2);
            }
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

fn init_logger(matches: &ArgMatches, config: Option<&Config>) {
    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        config
            .and_then(|c| c.logging.as_ref())
            .and_then(|l| l.level.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Info)
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();
}

fn load_config(path: &str, exists: bool) -> anyhow::Result<Config> {
    if exists {
        Config::from_file(path)
    } else {
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

/// Read a whole file, or all of stdin for `-`.
fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| anyhow::anyhow!("cannot read '{}': {}", source, e))
    }
}

/// The password verbatim, or one line of stdin (without its line ending)
/// for `-`.
fn read_password(value: &str) -> anyhow::Result<String> {
    if value != "-" {
        return Ok(value.to_string());
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed_len);
    Ok(line)
}

fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render(value));
    }
    Ok(())
}

/// Run every requested analysis. Returns `false` when nothing was asked for.
fn run(matches: &ArgMatches, config: &Config) -> anyhow::Result<bool> {
    let json = matches.get_flag("json");
    let mut ran = false;

    if let Some(source) = matches.get_one::<String>("email-header") {
        let analyzer = HeaderRiskAnalyzer::from_config(&config.email_header);
        log::info!("Running {} on {}", analyzer.name(), source);
        let analysis = analyzer.analyze(&read_input(source)?)?;
        emit(json, &analysis, report::header_report)?;
        ran = true;
    }

    if let Some(source) = matches.get_one::<String>("obfuscation") {
        let hunter = ObfuscationHunter::from_config(&config.obfuscation);
        log::info!("Running {} on {}", hunter.name(), source);
        let result = hunter.analyze(&read_input(source)?)?;
        emit(json, &result, report::obfuscation_report)?;
        ran = true;
    }

    if let Some(value) = matches.get_one::<String>("password") {
        let estimator = PasswordStrengthEstimator::from_config(&config.password);
        log::info!("Running {}", estimator.name());
        let assessment = estimator.analyze(&read_password(value)?)?;
        let guesses = config.password.guesses_per_second;
        emit(json, &assessment, |a| report::password_report(a, guesses))?;
        ran = true;
    }

    if let Some(url) = matches.get_one::<String>("redirect") {
        let analyzer = RedirectAnalyzer::from_config(&config.redirect);
        log::info!("Running {}", analyzer.name());
        let assessment = analyzer.analyze(url)?;
        emit(json, &assessment, report::redirect_report)?;
        ran = true;
    }

    if matches.contains_id("generate-password") {
        let sets = CharacterSets {
            lower: !matches.get_flag("no-lower"),
            upper: !matches.get_flag("no-upper"),
            digits: !matches.get_flag("no-digits"),
            symbols: !matches.get_flag("no-symbols"),
        };
        let generator = PasswordGenerator::from_config(&config.generator);
        let generated = match matches.get_one::<usize>("generate-password") {
            Some(length) => generator.generate(*length, sets)?,
            None => generator.generate_default(sets)?,
        };
        emit(json, &generated, report::generated_password_report)?;
        ran = true;
    }

    Ok(ran)
}
