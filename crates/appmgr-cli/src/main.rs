//! appmgr - App Manager command line client.
//!
//! - `appmgr apps` - installed and development apps
//! - `appmgr versions <app>` - version surface and effective version
//! - `appmgr routing` - which app handles each class, service and path
//! - `appmgr updates` / `appmgr upgrade-all` - pending updates

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use appmgr_core::model::ResourceType;
use appmgr_core::permissions::{
    describe_permission, permission_label, Decision, PermissionRequest, RequestOutcome,
};
use appmgr_core::resolve::{
    routing_table, track_warnings, updates_available, HandlerSource, VersionState,
};
use appmgr_core::{upgrade_all, ClientConfig, HttpClient, Scope, Selection, Session};

#[derive(Parser)]
#[command(name = "appmgr")]
#[command(about = "App Manager client", version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "appmgr.yaml")]
    config: PathBuf,

    /// Override the backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed and development apps
    Apps {
        /// Filter by name or id
        #[arg(long)]
        search: Option<String>,
    },

    /// List apps available in the market
    Market {
        #[arg(long)]
        search: Option<String>,
    },

    /// Install an app, by default at its default track's version
    Install {
        id: String,
        #[arg(long)]
        version: Option<String>,
        /// Publisher peer to install from
        #[arg(long)]
        peer: Option<String>,
    },

    /// Show an app's versions, tracks and effective version
    Versions { app: String },

    /// Set a version preference: default, track:<name> or version:<v>
    SetVersion {
        app: String,
        selection: String,
        /// Set the default for all users
        #[arg(long)]
        system: bool,
    },

    /// Show routing for classes, services and paths
    Routing {
        /// Only one resource type
        #[arg(long = "type")]
        kind: Option<ResourceType>,
    },

    /// Choose the app handling a resource ("-" clears)
    SetRouting {
        kind: ResourceType,
        name: String,
        app: String,
        #[arg(long)]
        system: bool,
    },

    /// Show an app's permissions
    Permissions { app: String },

    /// Grant a permission through the consent flow
    Grant { app: String, permission: String },

    /// Revoke a permission
    Revoke { app: String, permission: String },

    /// Enable or disable a permission, including restricted ones
    SetPermission {
        app: String,
        permission: String,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// List pending updates
    Updates,

    /// Upgrade every app with a newer version
    UpgradeAll,

    /// Remove unused app versions
    Cleanup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = ClientConfig::load_or_default(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    tracing::debug!(base_url = %config.base_url, "Using backend");

    let client = HttpClient::new(&config).context("Failed to create client")?;
    let session = Session::new(client);

    match cli.command {
        Commands::Apps { search } => list_apps(&session, search.as_deref()).await,
        Commands::Market { search } => list_market(&session, search.as_deref()).await,
        Commands::Install { id, version, peer } => {
            install(&session, &id, version, peer.as_deref()).await
        }
        Commands::Versions { app } => show_versions(&session, &app).await,
        Commands::SetVersion { app, selection, system } => {
            let scope = scope(system);
            let selection = Selection::decode(&selection);
            session
                .set_version(&app, scope, &selection)
                .await
                .context("Failed to update preference")?;
            println!("Version preference ({}) set to {}", scope, selection);
            Ok(())
        }
        Commands::Routing { kind } => show_routing(&session, kind).await,
        Commands::SetRouting { kind, name, app, system } => {
            let scope = scope(system);
            let app_id = if app == "-" { "" } else { app.as_str() };
            session
                .set_routing(kind, &name, app_id, scope)
                .await
                .context("Failed to update routing preference")?;
            if app_id.is_empty() {
                println!("Cleared {} preference for {}", scope, kind.display_resource(&name));
            } else {
                println!("{} now handled by {} ({})", kind.display_resource(&name), app_id, scope);
            }
            Ok(())
        }
        Commands::Permissions { app } => show_permissions(&session, &app).await,
        Commands::Grant { app, permission } => {
            let request = PermissionRequest::new(app, permission);
            match request.respond(&session, Decision::Allow).await? {
                RequestOutcome::RequiresSettings { app } => {
                    println!(
                        "Restricted permission. Enable it with: appmgr set-permission {} {} true",
                        app, request.permission
                    );
                }
                RequestOutcome::Invalid => println!("App and permission are required"),
                _ => println!("Permission granted"),
            }
            Ok(())
        }
        Commands::Revoke { app, permission } => {
            session
                .revoke_permission(&app, &permission)
                .await
                .context("Failed to revoke permission")?;
            println!("Permission revoked");
            Ok(())
        }
        Commands::SetPermission { app, permission, enabled } => {
            session
                .set_permission(&app, &permission, enabled)
                .await
                .context("Failed to update permission")?;
            println!(
                "{} {}",
                permission_label(&permission),
                if enabled { "enabled" } else { "disabled" }
            );
            Ok(())
        }
        Commands::Updates => show_updates(&session).await,
        Commands::UpgradeAll => {
            let updates = session.updates().await.context("Failed to fetch updates")?;
            let report = upgrade_all(&session, &updates.updates).await;
            println!("{}", report.summary());
            for failure in &report.failed {
                println!("  ! {} ({}): {}", failure.name, failure.id, failure.error);
            }
            Ok(())
        }
        Commands::Cleanup => {
            session.cleanup().await.context("Failed to clean up")?;
            println!("Unused versions removed");
            Ok(())
        }
    }
}

fn scope(system: bool) -> Scope {
    if system {
        Scope::System
    } else {
        Scope::User
    }
}

async fn list_apps(session: &Session<HttpClient>, search: Option<&str>) -> Result<()> {
    let apps = session.installed().await.context("Failed to list apps")?;
    let query = search.unwrap_or_default();

    println!("Installed apps");
    println!("==============");
    let installed: Vec<_> = apps.installed.iter().filter(|a| a.matches(query)).collect();
    if installed.is_empty() {
        println!("  No apps installed");
    }
    for app in installed {
        println!("  {} {} ({})", app.name, app.latest, app.id);
    }

    let development: Vec<_> = apps.development.iter().filter(|a| a.matches(query)).collect();
    if !development.is_empty() {
        println!();
        println!("Development apps");
        println!("================");
        for app in development {
            println!("  {} {} ({})", app.name, app.latest, app.id);
        }
    }

    if !apps.can_install {
        println!();
        println!("You are not allowed to install apps.");
    }
    Ok(())
}

async fn list_market(session: &Session<HttpClient>, search: Option<&str>) -> Result<()> {
    let apps = session.market().await.context("Failed to load market")?;
    let query = search.unwrap_or_default();

    let matching: Vec<_> = apps.iter().filter(|a| a.matches(query)).collect();
    if matching.is_empty() {
        println!("No apps available");
    }
    for app in matching {
        println!("  {} ({}) - {}", app.name, app.id, app.blurb);
    }
    Ok(())
}

async fn install(
    session: &Session<HttpClient>,
    id: &str,
    version: Option<String>,
    peer: Option<&str>,
) -> Result<()> {
    let version = match version {
        Some(v) => v,
        None => {
            let info = session
                .app_information(id)
                .await
                .context("Failed to load app information")?;
            info.default_version()
                .map(str::to_string)
                .with_context(|| format!("{} has no version on its default track", id))?
        }
    };

    let outcome = session
        .install(id, &version, peer)
        .await
        .context("Failed to install app")?;
    if outcome.installed {
        println!("Installed {} {}", outcome.id, outcome.version);
    } else {
        println!("{} was not installed", id);
    }
    Ok(())
}

async fn show_versions(session: &Session<HttpClient>, app: &str) -> Result<()> {
    let detail = session.load_app_detail(app).await;
    let selectable = session
        .multiversion_available()
        .await
        .map(|m| m.available)
        .unwrap_or(false);
    let name = detail.app().map(|a| a.name.clone()).unwrap_or_else(|| app.to_string());

    println!("{}", name);
    println!("{}", "=".repeat(name.len()));

    let (resolution, default_version) = match detail.version_state() {
        VersionState::Loading => {
            println!("Loading...");
            return Ok(());
        }
        VersionState::Unversioned => {
            println!("Not versioned");
            return Ok(());
        }
        VersionState::Resolved { resolution, default_version } => (resolution, default_version),
    };

    if !selectable {
        println!("Version selection is not available on this server");
    } else if let Some(data) = detail.versions.ready() {
        if data.has_tracks() {
            println!("Tracks:");
            for (track, version) in &data.tracks {
                let marker = if *track == data.default_track { " (default)" } else { "" };
                println!("  {}{} -> {}", track, marker, version);
            }
        }
        if data.has_multiple_versions() {
            println!("Versions: {}", data.versions_newest_first().collect::<Vec<_>>().join(", "));
        }
        println!();
        if data.is_admin {
            println!("System default: {}", Selection::from_preference(data.system.as_ref()));
        }
        println!("Your preference: {}", Selection::from_preference(data.user.as_ref()));
        for warning in track_warnings(data) {
            println!("  ! {}", warning);
        }
        if let Some(warning) = data.backend_warning() {
            println!("  ! {}", warning);
        }
    }

    println!();
    match default_version {
        Some(v) => println!("Default for all users: version {}", v),
        None => println!("Default for all users: none"),
    }
    println!("Effective: {} [{}]", resolution.label(), resolution.source);
    Ok(())
}

async fn show_routing(session: &Session<HttpClient>, only: Option<ResourceType>) -> Result<()> {
    let data = session.routing().await.context("Failed to load routing")?;
    if data.is_empty() {
        println!("No apps have declared classes, services, or paths.");
        return Ok(());
    }

    let kinds: Vec<ResourceType> = match only {
        Some(kind) => vec![kind],
        None => ResourceType::ALL.to_vec(),
    };

    for kind in kinds {
        let rows = routing_table(Some(&data), kind).unwrap_or_default();
        println!("{}", kind.plural());
        if rows.is_empty() {
            println!("  No {} configured.", kind.plural());
        }
        for row in rows {
            let conflict = if row.conflict { " !" } else { "" };
            let handler = row.handler_name().unwrap_or("none");
            let source = match row.source {
                HandlerSource::User => "your preference",
                HandlerSource::System => "system default",
                HandlerSource::FirstDeclared => "default",
                HandlerSource::None => "unhandled",
            };
            println!(
                "  {}{} -> {} ({}); declared by {}",
                row.display_resource(),
                conflict,
                handler,
                source,
                row.declared_by()
            );
        }
        println!();
    }

    if data.is_admin {
        println!("Set a system default with --system.");
    }
    Ok(())
}

async fn show_permissions(session: &Session<HttpClient>, app: &str) -> Result<()> {
    let permissions = session
        .app_permissions(app)
        .await
        .context("Failed to load permissions")?;

    if permissions.permissions.is_empty() {
        println!("No permissions requested");
    }
    for p in &permissions.permissions {
        let display = describe_permission(&p.permission);
        let state = if p.granted { "granted" } else { "not granted" };
        let restricted = if p.restricted { " [restricted]" } else { "" };
        println!(
            "  {} - {} {}: {}{}",
            p.permission,
            display.primary,
            display.secondary,
            state,
            restricted
        );
    }
    Ok(())
}

async fn show_updates(session: &Session<HttpClient>) -> Result<()> {
    let updates = session.updates().await.context("Failed to fetch updates")?;
    let available = updates_available(&updates.updates);

    if available.is_empty() {
        println!("All apps are up to date");
    }
    for u in available {
        let current = if u.current.is_empty() { "none" } else { u.current.as_str() };
        println!("  {} {} -> {} ({})", u.name, current, u.available, u.publisher);
    }
    Ok(())
}
