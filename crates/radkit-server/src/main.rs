use clap::Parser;
use radkit_server::{
    AuditEntry, AuditEventType, AuditLogger, Config, Engine, RadiusServer, StaticUserHandler,
};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// radkit - RFC 2865/2866 RADIUS authentication and accounting server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radkitd")]
struct Cli {
    /// Path to configuration file
    #[arg(value_name = "CONFIG", default_value = "config.json")]
    config_path: String,

    /// Validate configuration and exit (doesn't start server)
    #[arg(short, long)]
    validate: bool,

    /// Print version information and exit
    #[arg(short = 'V', long)]
    version: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle --version flag
    if cli.version {
        println!("radkitd v{}", env!("CARGO_PKG_VERSION"));
        println!("RFC 2865/2866 RADIUS authentication and accounting server");
        process::exit(0);
    }

    // Load or create configuration (without logging first)
    let config = match Config::from_file(&cli.config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            // Initialize basic logging to show config creation messages
            tracing_subscriber::registry()
                .with(EnvFilter::new("info"))
                .with(tracing_subscriber::fmt::layer())
                .init();

            // If validation mode, just report error
            if cli.validate {
                eprintln!("❌ Configuration validation failed!");
                eprintln!("   Error: {}", e);
                process::exit(1);
            }

            warn!("Could not load config file from: {}", cli.config_path);
            info!("Creating example configuration at: {}", cli.config_path);

            let example_config = Config::example();
            if let Err(e) = example_config.to_file(&cli.config_path) {
                error!("Error creating example config: {}", e);
                process::exit(1);
            }

            info!("Please edit {} and restart the server", cli.config_path);
            process::exit(0);
        }
    };

    // If validate-only mode, validate and exit
    if cli.validate {
        println!("✓ Configuration validated successfully!");
        println!();
        println!("Configuration summary:");
        println!(
            "  Authentication: {}:{}",
            config.listen_address, config.auth_port
        );
        println!(
            "  Accounting:     {}:{}",
            config.listen_address, config.acct_port
        );
        println!("  Users: {}", config.users.len());
        println!(
            "  Log level: {}",
            config.log_level.as_deref().unwrap_or("info")
        );
        if let Some(ref path) = config.audit_log_path {
            println!("  Audit log: {}", path);
        }

        if config.users.is_empty() {
            println!();
            println!("⚠️  WARNING: No users configured, every Access-Request will be rejected");
        }

        process::exit(0);
    }

    // Initialize tracing with configured log level
    let log_level = config.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("radkitd v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config_path);

    // Create the static authentication handler
    let mut handler = StaticUserHandler::new();
    for user in &config.users {
        handler.add_user(&user.username, &user.password);
        info!("Added user: {}", user.username);
    }
    if config.users.is_empty() {
        warn!("No users configured, every Access-Request will be rejected");
    }

    // Audit logging
    let audit = match AuditLogger::new(config.audit_log_path.clone()) {
        Ok(audit) => audit,
        Err(e) => {
            error!("Failed to open audit log: {}", e);
            process::exit(1);
        }
    };
    if let Some(path) = audit.file_path() {
        info!("Audit logging enabled: {}", path);
    }
    audit.log(AuditEntry::new(AuditEventType::ServerStart));

    let engine = Arc::new(Engine::new(config.secret.as_bytes(), Arc::new(handler)).with_audit(audit));

    // Bind and run
    let server = match RadiusServer::bind(&config, engine).await {
        Ok(srv) => srv,
        Err(e) => {
            error!("Failed to start server: {}", e);
            process::exit(1);
        }
    };

    info!("Server started successfully!");
    info!("Press Ctrl+C to stop");

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }
}
