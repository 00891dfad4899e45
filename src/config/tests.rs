use super::*;

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:8000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.cache.redis_url.is_none());
    assert_eq!(settings.cache.ttl, Duration::from_secs(300));
    assert_eq!(settings.cache.memory_capacity.get(), 1024);
    assert_eq!(settings.reports.directory, PathBuf::from("data_reports"));
    assert_eq!(settings.reports.concurrency.get(), 1);
    assert_eq!(settings.seed.fixture, PathBuf::from("fixtures/menus.json"));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.cache.ttl_seconds = Some(60);

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        cache_ttl_seconds: Some(15),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.ttl, Duration::from_secs(15));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn blank_redis_url_selects_memory_backend() {
    let mut raw = RawSettings::default();
    raw.cache.redis_url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.cache.redis_url.is_none());
}

#[test]
fn zero_values_are_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "cache.ttl_seconds",
            ..
        })
    ));

    let mut raw = RawSettings::default();
    raw.reports.concurrency = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "reports.concurrency",
            ..
        })
    ));

    let mut raw = RawSettings::default();
    raw.server.port = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["menuhub"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "menuhub",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-redis-url",
        "redis://cache:6379/0",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(
                serve.overrides.cache_redis_url.as_deref(),
                Some("redis://cache:6379/0")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_seed_arguments() {
    let args = CliArgs::parse_from([
        "menuhub",
        "seed",
        "--database-url",
        "postgres://example",
        "/tmp/menus.json",
    ]);

    let Some(Command::Seed(seed)) = args.command else {
        panic!("wrong command parsed");
    };
    assert_eq!(
        seed.database.database_url.as_deref(),
        Some("postgres://example")
    );

    let mut raw = RawSettings::default();
    raw.apply_seed_overrides(&seed);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.seed.fixture, PathBuf::from("/tmp/menus.json"));
    assert_eq!(settings.database.url.as_deref(), Some("postgres://example"));
}
