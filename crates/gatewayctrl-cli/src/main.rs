// crates/gatewayctrl-cli/src/main.rs
// ============================================================================
// Module: GatewayCtrl CLI Entry Point
// Description: Command dispatcher for gateway configs and managed APIs.
// Purpose: Operate the config repository and vendor adapters from a shell.
// Dependencies: clap, gatewayctrl-adapters, gatewayctrl-config, serde_json
// ============================================================================

//! ## Overview
//! `gatewayctrl` manages gateway connection records in the local config
//! repository and drives vendor management APIs through the adapter factory.
//! Gateways are addressed by their unique name.
//!
//! Security posture: CLI inputs are untrusted. File inputs are read with hard
//! size limits and credential values are never printed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use gatewayctrl_adapters::AdapterFactory;
use gatewayctrl_adapters::ProbeOutcome;
use gatewayctrl_adapters::probe_gateways;
use gatewayctrl_cli::present::file_stem_for;
use gatewayctrl_cli::present::masked_config;
use gatewayctrl_cli::present::parse_key_value;
use gatewayctrl_cli::t;
use gatewayctrl_config::GatewayCtrlConfig;
use gatewayctrl_config::config_toml_example;
use gatewayctrl_core::ApiId;
use gatewayctrl_core::ApiSpec;
use gatewayctrl_core::ConfigRepository;
use gatewayctrl_core::ConnectionTestResult;
use gatewayctrl_core::GatewayAdapter;
use gatewayctrl_core::GatewayConfig;
use gatewayctrl_core::GatewayError;
use gatewayctrl_core::GatewayType;
use gatewayctrl_core::NoopAuditSink;
use gatewayctrl_core::RepositoryError;
use gatewayctrl_credentials::EncryptionKey;
use gatewayctrl_store_sqlite::SqliteConfigRepository;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an API spec JSON file.
const MAX_API_SPEC_BYTES: usize = 1024 * 1024;
/// Maximum size of an imported CA certificate.
const MAX_CERTIFICATE_BYTES: usize = 256 * 1024;
/// Default deadline for `gateway probe`.
const DEFAULT_PROBE_DEADLINE_MS: u64 = 10_000;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "gatewayctrl", about = "API gateway control plane", disable_version_flag = true)]
struct Cli {
    /// Print the version and exit.
    #[arg(long = "version", short = 'V', action = ArgAction::SetTrue)]
    show_version: bool,
    /// Host config file (defaults to `GATEWAYCTRL_CONFIG` or `gatewayctrl.toml`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the gateway types the adapter factory can build.
    Types,
    /// Encryption key utilities.
    Key {
        /// Key subcommand.
        #[command(subcommand)]
        command: KeyCommand,
    },
    /// Host config utilities.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Manage stored gateway connections.
    Gateway {
        /// Gateway subcommand.
        #[command(subcommand)]
        command: GatewayCommand,
    },
    /// Manage APIs on a stored gateway.
    Api {
        /// API subcommand.
        #[command(subcommand)]
        command: ApiCommand,
    },
}

/// Key subcommands.
#[derive(Subcommand, Debug)]
enum KeyCommand {
    /// Print a fresh base64 encryption key.
    Generate,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the host config.
    Validate,
    /// Print an example host config.
    Example,
}

/// Gateway subcommands.
#[derive(Subcommand, Debug)]
enum GatewayCommand {
    /// Store a new gateway connection.
    Add(GatewayAddArgs),
    /// Change a stored gateway connection.
    Update(GatewayUpdateArgs),
    /// List stored gateways.
    List,
    /// Show one gateway with credentials masked.
    Show {
        /// Gateway name.
        name: String,
    },
    /// Remove a stored gateway.
    Delete {
        /// Gateway name.
        name: String,
    },
    /// Remove every stored gateway.
    Clear {
        /// Confirm removal.
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Test connectivity to one gateway.
    Test {
        /// Gateway name.
        name: String,
    },
    /// Test every stored gateway concurrently.
    Probe {
        /// Overall deadline in milliseconds.
        #[arg(long, default_value_t = DEFAULT_PROBE_DEADLINE_MS)]
        deadline_ms: u64,
    },
    /// Encrypt credentials stored before a key was configured.
    Reseal,
}

/// Arguments for `gateway add`.
#[derive(Args, Debug)]
struct GatewayAddArgs {
    /// Unique gateway name.
    #[arg(long)]
    name: String,
    /// Vendor type (see `gatewayctrl types`).
    #[arg(long = "type", value_name = "TYPE")]
    gateway_type: String,
    /// Management API base URL.
    #[arg(long, default_value = "")]
    base_url: String,
    /// Credential field, repeatable.
    #[arg(long = "credential", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    credentials: Vec<(String, String)>,
    /// Additional vendor option, repeatable.
    #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    options: Vec<(String, String)>,
    /// Skip server certificate validation.
    #[arg(long, action = ArgAction::SetTrue)]
    no_tls_verify: bool,
    /// CA certificate (PEM) to trust for this gateway.
    #[arg(long, value_name = "PATH")]
    certificate: Option<PathBuf>,
}

/// Arguments for `gateway update`.
#[derive(Args, Debug)]
struct GatewayUpdateArgs {
    /// Current gateway name.
    name: String,
    /// New gateway name.
    #[arg(long)]
    rename: Option<String>,
    /// New management API base URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Credential field to set, repeatable.
    #[arg(long = "credential", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    credentials: Vec<(String, String)>,
    /// Credential field to remove, repeatable.
    #[arg(long = "remove-credential", value_name = "KEY")]
    remove_credentials: Vec<String>,
    /// Additional vendor option to set, repeatable.
    #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    options: Vec<(String, String)>,
    /// Additional vendor option to remove, repeatable.
    #[arg(long = "remove-option", value_name = "KEY")]
    remove_options: Vec<String>,
    /// Enable or disable server certificate validation.
    #[arg(long, value_name = "BOOL")]
    tls_verify: Option<bool>,
    /// Replacement CA certificate (PEM).
    #[arg(long, value_name = "PATH")]
    certificate: Option<PathBuf>,
}

/// API subcommands.
#[derive(Subcommand, Debug)]
enum ApiCommand {
    /// List APIs managed by a gateway.
    List {
        /// Gateway name.
        gateway: String,
    },
    /// Create an API.
    Create {
        /// Gateway name.
        gateway: String,
        /// API definition.
        #[command(flatten)]
        spec: ApiSpecArgs,
    },
    /// Replace an API definition.
    Update {
        /// Gateway name.
        gateway: String,
        /// Vendor API identifier.
        id: String,
        /// API definition.
        #[command(flatten)]
        spec: ApiSpecArgs,
    },
    /// Delete an API.
    Delete {
        /// Gateway name.
        gateway: String,
        /// Vendor API identifier.
        id: String,
    },
    /// Show vendor metrics for an API.
    Metrics {
        /// Gateway name.
        gateway: String,
        /// Vendor API identifier.
        id: String,
    },
}

/// API definition from a JSON file, flags, or both (flags win).
#[derive(Args, Debug, Default)]
struct ApiSpecArgs {
    /// JSON file holding an API spec.
    #[arg(long = "spec", value_name = "PATH")]
    spec_file: Option<PathBuf>,
    /// API name.
    #[arg(long)]
    name: Option<String>,
    /// Public base path.
    #[arg(long)]
    base_path: Option<String>,
    /// HTTP method, repeatable.
    #[arg(long = "method", value_name = "METHOD")]
    methods: Vec<String>,
    /// Upstream backend URL.
    #[arg(long)]
    backend: Option<String>,
    /// API version label.
    #[arg(long = "api-version", value_name = "VERSION")]
    version: Option<String>,
    /// Free-form description.
    #[arg(long)]
    description: Option<String>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Maps a repository failure to a CLI error.
fn repository_error(err: &RepositoryError) -> CliError {
    CliError::new(t!("gateway.repository_failed", kind = err.kind(), error = err))
}

/// Maps a vendor call failure to a CLI error.
fn gateway_error(err: &GatewayError) -> CliError {
    CliError::new(t!("adapter.call_failed", kind = err.kind(), error = err))
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        return show_help();
    };
    let config_path = cli.config.as_deref();

    match command {
        Commands::Types => command_types(config_path),
        Commands::Key {
            command: KeyCommand::Generate,
        } => command_key_generate(config_path),
        Commands::Config {
            command,
        } => command_config(config_path, command),
        Commands::Gateway {
            command,
        } => command_gateway(config_path, command),
        Commands::Api {
            command,
        } => command_api(config_path, command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<ExitCode> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Everything a repository or adapter command needs.
struct Session {
    /// Loaded host config.
    config: GatewayCtrlConfig,
    /// Open config repository.
    repository: SqliteConfigRepository,
    /// Adapter factory sharing the configured audit sink.
    factory: Arc<AdapterFactory>,
}

impl Session {
    /// Loads the host config and opens the repository and factory.
    fn open(config_path: Option<&Path>) -> CliResult<Self> {
        let config = load_config(config_path)?;
        let audit = config
            .audit_sink()
            .map_err(|err| CliError::new(t!("setup.audit_failed", error = err)))?;
        let sealer = config
            .field_sealer(&*audit)
            .map_err(|err| CliError::new(t!("setup.credentials_failed", error = err)))?;
        let repository =
            SqliteConfigRepository::open(config.store.clone(), sealer, Arc::clone(&audit))
                .map_err(|err| CliError::new(t!("setup.store_failed", error = err)))?;
        let factory =
            Arc::new(AdapterFactory::with_builtin_adapters(config.http_settings(), audit));
        Ok(Self {
            config,
            repository,
            factory,
        })
    }

    /// Loads the stored gateway with the given name.
    fn gateway(&self, name: &str) -> CliResult<GatewayConfig> {
        let id = self
            .repository
            .find_by_name(name)
            .map_err(|err| repository_error(&err))?
            .ok_or_else(|| CliError::new(t!("gateway.not_found", name = name)))?;
        self.repository.load(&id).map_err(|err| repository_error(&err))
    }

    /// Builds the adapter for the stored gateway with the given name.
    fn adapter(&self, name: &str) -> CliResult<Box<dyn GatewayAdapter>> {
        let gateway = self.gateway(name)?;
        self.factory.create(&gateway).map_err(|err| {
            CliError::new(t!("adapter.create_failed", name = name, kind = err.kind(), error = err))
        })
    }

    /// Saves a config and reports the outcome.
    fn save(&self, gateway: &GatewayConfig) -> CliResult<ExitCode> {
        let receipt = self.repository.save(gateway).map_err(|err| repository_error(&err))?;
        if !receipt.plaintext_fields.is_empty() {
            write_stderr_line(&t!(
                "gateway.saved.plaintext",
                fields = receipt.plaintext_fields.join(", "),
                env = self.config.credentials.key_env
            ))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
        emit_line(&t!("gateway.saved", name = gateway.name, id = receipt.id))
    }
}

/// Loads and validates the host config.
fn load_config(config_path: Option<&Path>) -> CliResult<GatewayCtrlConfig> {
    GatewayCtrlConfig::load(config_path)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

// ============================================================================
// SECTION: Utility Commands
// ============================================================================

/// Lists registered gateway types.
fn command_types(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let factory =
        AdapterFactory::with_builtin_adapters(config.http_settings(), Arc::new(NoopAuditSink));
    for gateway_type in factory.registered_types() {
        emit_line(&t!("types.row", vendor = gateway_type))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints a fresh encryption key.
fn command_key_generate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    emit_line(&EncryptionKey::generate().to_base64())?;
    write_stderr_line(&t!("key.generated.note", env = config.credentials.key_env))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Dispatches config subcommands.
fn command_config(config_path: Option<&Path>, command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            load_config(config_path)?;
            emit_line(&t!("config.validate.ok"))
        }
        ConfigCommand::Example => {
            write_stdout_bytes(config_toml_example().as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Gateway Commands
// ============================================================================

/// Dispatches gateway subcommands.
fn command_gateway(config_path: Option<&Path>, command: GatewayCommand) -> CliResult<ExitCode> {
    let session = Session::open(config_path)?;
    match command {
        GatewayCommand::Add(args) => command_gateway_add(&session, args),
        GatewayCommand::Update(args) => command_gateway_update(&session, args),
        GatewayCommand::List => command_gateway_list(&session),
        GatewayCommand::Show {
            name,
        } => {
            let gateway = session.gateway(&name)?;
            let sensitive = session.config.sensitive_field_names();
            write_json(&masked_config(&gateway, &sensitive))?;
            Ok(ExitCode::SUCCESS)
        }
        GatewayCommand::Delete {
            name,
        } => command_gateway_delete(&session, &name),
        GatewayCommand::Clear {
            yes,
        } => {
            if !yes {
                return Err(CliError::new(t!("gateway.clear.confirm")));
            }
            let count = session.repository.clear().map_err(|err| repository_error(&err))?;
            emit_line(&t!("gateway.cleared", count = count))
        }
        GatewayCommand::Test {
            name,
        } => {
            let adapter = session.adapter(&name)?;
            let result = adapter.test_connection();
            emit_line(&t!("gateway.test.result", name = name, result = result.as_str()))?;
            Ok(exit_for(result.is_success()))
        }
        GatewayCommand::Probe {
            deadline_ms,
        } => command_gateway_probe(&session, Duration::from_millis(deadline_ms)),
        GatewayCommand::Reseal => {
            let count = session.repository.reseal_all().map_err(|err| repository_error(&err))?;
            emit_line(&t!("gateway.resealed", count = count))
        }
    }
}

/// Stores a new gateway.
fn command_gateway_add(session: &Session, args: GatewayAddArgs) -> CliResult<ExitCode> {
    let gateway_type = GatewayType::new(&args.gateway_type);
    if !session.factory.supports(&gateway_type) {
        return Err(CliError::new(t!("gateway.unknown_type", vendor = gateway_type)));
    }
    let mut gateway = GatewayConfig::new(args.name, gateway_type, args.base_url);
    gateway.tls_verify = !args.no_tls_verify;
    gateway.credentials.extend(args.credentials);
    gateway.additional_config.extend(args.options);
    if let Some(source) = &args.certificate {
        let installed =
            install_certificate(session.repository.certificate_dir(), &gateway.name, source)?;
        gateway.certificate_path = Some(installed);
    }
    save_or_discard_certificate(session, &gateway, args.certificate.is_some(), None)
}

/// Applies changes to a stored gateway.
fn command_gateway_update(session: &Session, args: GatewayUpdateArgs) -> CliResult<ExitCode> {
    let mut gateway = session.gateway(&args.name)?;
    let previous_certificate = gateway.certificate_path.clone();
    if let Some(name) = args.rename {
        gateway.name = name;
    }
    if let Some(base_url) = args.base_url {
        gateway.base_url = base_url;
    }
    if let Some(tls_verify) = args.tls_verify {
        gateway.tls_verify = tls_verify;
    }
    for key in &args.remove_credentials {
        gateway.credentials.remove(key);
    }
    for key in &args.remove_options {
        gateway.additional_config.remove(key);
    }
    gateway.credentials.extend(args.credentials);
    gateway.additional_config.extend(args.options);
    if let Some(source) = &args.certificate {
        let installed =
            install_certificate(session.repository.certificate_dir(), &gateway.name, source)?;
        gateway.certificate_path = Some(installed);
    }
    let replaced = args.certificate.as_ref().and(previous_certificate);
    save_or_discard_certificate(session, &gateway, args.certificate.is_some(), replaced.as_deref())
}

/// Saves a config. On success a replaced managed certificate is removed; on
/// failure a freshly installed one is.
fn save_or_discard_certificate(
    session: &Session,
    gateway: &GatewayConfig,
    installed_now: bool,
    replaced: Option<&Path>,
) -> CliResult<ExitCode> {
    match session.save(gateway) {
        Ok(code) => {
            if let Some(old) = replaced
                && old.starts_with(session.repository.certificate_dir())
            {
                let _ = fs::remove_file(old);
            }
            Ok(code)
        }
        Err(err) => {
            if let Some(installed) = &gateway.certificate_path
                && installed_now
            {
                let _ = fs::remove_file(installed);
            }
            Err(err)
        }
    }
}

/// Lists stored gateways.
fn command_gateway_list(session: &Session) -> CliResult<ExitCode> {
    let summaries = session.repository.list_all().map_err(|err| repository_error(&err))?;
    if summaries.is_empty() {
        return emit_line(&t!("gateway.list.empty"));
    }
    for summary in summaries {
        emit_line(&t!(
            "gateway.list.row",
            name = summary.name,
            vendor = summary.gateway_type,
            url = summary.base_url,
            id = summary.id
        ))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Deletes a gateway by name; deleting an absent name succeeds.
fn command_gateway_delete(session: &Session, name: &str) -> CliResult<ExitCode> {
    let Some(id) = session.repository.find_by_name(name).map_err(|err| repository_error(&err))?
    else {
        return emit_line(&t!("gateway.delete.absent", name = name));
    };
    session.repository.delete(&id).map_err(|err| repository_error(&err))?;
    emit_line(&t!("gateway.deleted", name = name))
}

/// Tests every stored gateway within one deadline.
fn command_gateway_probe(session: &Session, deadline: Duration) -> CliResult<ExitCode> {
    let summaries = session.repository.list_all().map_err(|err| repository_error(&err))?;
    let mut configs = Vec::with_capacity(summaries.len());
    for summary in &summaries {
        configs.push(session.repository.load(&summary.id).map_err(|err| repository_error(&err))?);
    }
    if configs.is_empty() {
        return emit_line(&t!("gateway.list.empty"));
    }

    let reports = probe_gateways(&session.factory, &configs, deadline);
    let mut all_reachable = true;
    for report in &reports {
        all_reachable &=
            matches!(report.outcome, ProbeOutcome::Completed(ConnectionTestResult::Success));
        emit_line(&t!(
            "gateway.probe.row",
            name = report.gateway_name,
            vendor = report.gateway_type,
            outcome = report.outcome.label(),
            elapsed_ms = report.elapsed.as_millis()
        ))?;
    }
    Ok(exit_for(all_reachable))
}

/// Copies a CA certificate into the managed certificate directory.
fn install_certificate(dir: &Path, gateway_name: &str, source: &Path) -> CliResult<PathBuf> {
    let kind = t!("input.kind.certificate");
    let bytes = read_bytes_with_limit(source, MAX_CERTIFICATE_BYTES)
        .map_err(|err| read_limit_error(err, &kind, source))?;
    let target = dir.join(format!("{}-{}.pem", file_stem_for(gateway_name), Uuid::new_v4()));
    fs::create_dir_all(dir)
        .and_then(|()| fs::write(&target, bytes))
        .map_err(|err| {
            CliError::new(t!("gateway.certificate.copy_failed", dir = dir.display(), error = err))
        })?;
    Ok(target)
}

// ============================================================================
// SECTION: API Commands
// ============================================================================

/// Dispatches API subcommands.
fn command_api(config_path: Option<&Path>, command: ApiCommand) -> CliResult<ExitCode> {
    let session = Session::open(config_path)?;
    match command {
        ApiCommand::List {
            gateway,
        } => {
            let adapter = session.adapter(&gateway)?;
            let apis = adapter.list_apis().try_collect().map_err(|err| gateway_error(&err))?;
            write_json(&apis)?;
        }
        ApiCommand::Create {
            gateway,
            spec,
        } => {
            let spec = build_api_spec(spec)?;
            let adapter = session.adapter(&gateway)?;
            let api = adapter.create_api(&spec).map_err(|err| gateway_error(&err))?;
            write_json(&api)?;
        }
        ApiCommand::Update {
            gateway,
            id,
            spec,
        } => {
            let spec = build_api_spec(spec)?;
            let adapter = session.adapter(&gateway)?;
            let api =
                adapter.update_api(&ApiId::new(id), &spec).map_err(|err| gateway_error(&err))?;
            write_json(&api)?;
        }
        ApiCommand::Delete {
            gateway,
            id,
        } => {
            let adapter = session.adapter(&gateway)?;
            adapter.delete_api(&ApiId::new(id.as_str())).map_err(|err| gateway_error(&err))?;
            emit_line(&t!("api.deleted", id = id, name = gateway))?;
        }
        ApiCommand::Metrics {
            gateway,
            id,
        } => {
            let adapter = session.adapter(&gateway)?;
            let metrics = adapter.api_metrics(&ApiId::new(id)).map_err(|err| gateway_error(&err))?;
            write_json(&metrics)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Builds an API spec from an optional JSON file overlaid with flags.
fn build_api_spec(args: ApiSpecArgs) -> CliResult<ApiSpec> {
    let mut spec = match &args.spec_file {
        Some(path) => {
            let kind = t!("input.kind.api_spec");
            let bytes = read_bytes_with_limit(path, MAX_API_SPEC_BYTES)
                .map_err(|err| read_limit_error(err, &kind, path))?;
            serde_json::from_slice::<ApiSpec>(&bytes).map_err(|err| {
                CliError::new(t!(
                    "input.parse_failed",
                    kind = kind,
                    path = path.display(),
                    error = err
                ))
            })?
        }
        None => ApiSpec::default(),
    };
    if let Some(name) = args.name {
        spec.name = name;
    }
    if args.base_path.is_some() {
        spec.base_path = args.base_path;
    }
    if !args.methods.is_empty() {
        spec.methods = args.methods;
    }
    if args.backend.is_some() {
        spec.backend = args.backend;
    }
    if args.version.is_some() {
        spec.version = args.version;
    }
    if args.description.is_some() {
        spec.description = args.description;
    }
    if spec.name.trim().is_empty() {
        return Err(CliError::new(t!("api.spec.missing_name")));
    }
    Ok(spec)
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Formats a bounded read failure.
fn read_limit_error(err: ReadLimitError, kind: &str, path: &Path) -> CliError {
    match err {
        ReadLimitError::Io(err) => CliError::new(t!(
            "input.read_failed",
            kind = kind,
            path = path.display(),
            error = err
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Maps a success flag to an exit code.
fn exit_for(success: bool) -> ExitCode {
    if success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Writes a line to stdout and reports success.
fn emit_line(message: &str) -> CliResult<ExitCode> {
    write_stdout_line(message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Writes pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

#[cfg(test)]
mod main_tests;
