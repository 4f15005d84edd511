use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use roost_core::event::{sync_event_handler, EventResult};
use roost_core::feature::{FeatureId, FeatureRegistry};
use roost_core::instance::{claim, InstanceClaim};
use roost_core::ipc;
use roost_core::kernel::manifest::ComponentManifest;
use roost_core::{Component, SharedEventDispatcher};

/// Roost: run a desktop-agent component from its working directory
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Working directory holding manifest.toml and persisted state
    #[arg(long, default_value = ".")]
    working_dir: PathBuf,

    /// Capabilities to activate at startup (config, hotkeys)
    #[arg(long = "feature", value_name = "NAME", default_values_t = ["config".to_string(), "hotkeys".to_string()])]
    features: Vec<String>,

    /// Drive the loop on a multi-threaded runtime
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    enable_threads: bool,

    /// Override the runtime directory used for instance and broker sockets
    #[arg(long)]
    runtime_dir: Option<PathBuf>,
}

/// Maps a CLI capability name onto its typed identifier.
fn parse_feature(name: &str) -> Option<FeatureId> {
    match name {
        "config" => Some(FeatureId::CONFIG),
        "hotkeys" => Some(FeatureId::HOTKEYS),
        _ => None,
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();

    let runtime = if args.enable_threads {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
    } else {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
    };
    let runtime = match runtime {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to build the runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> ExitCode {
    let manifest = match ComponentManifest::load(&args.working_dir) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!("Failed to read the component manifest: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut features = Vec::new();
    for name in &args.features {
        match parse_feature(name) {
            Some(id) => features.push(id),
            None => {
                // Unknown capability names are packaging defects; fail fast.
                eprintln!("Unknown feature '{name}' (expected one of: config, hotkeys)");
                return ExitCode::FAILURE;
            }
        }
    }

    let runtime_dir = args.runtime_dir.unwrap_or_else(ipc::default_runtime_dir);
    let events = SharedEventDispatcher::new();

    // Claim the singleton identity before anything else gets built.
    let guard = match claim(&manifest.id, &runtime_dir, events.clone()).await {
        Ok(InstanceClaim::Primary(guard)) => guard,
        Ok(InstanceClaim::Secondary(forwarder)) => {
            info!("'{}' is already running, forwarding activation", manifest.id);
            if let Err(e) = forwarder.forward_activation().await {
                error!("could not forward activation: {e}");
                return ExitCode::FAILURE;
            }
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Failed to claim the single-instance identity: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut component = match Component::new(
        manifest,
        args.working_dir.clone(),
        FeatureRegistry::with_builtin_features(),
        events,
    ) {
        Ok(component) => component,
        Err(e) => {
            eprintln!("Failed to build the component: {e}");
            return ExitCode::FAILURE;
        }
    };
    component.attach_instance_guard(guard);

    component
        .events()
        .register_handler(
            "instance.activation-requested",
            sync_event_handler(|_| {
                info!("activation requested by a second process");
                EventResult::Continue
            }),
        )
        .await;
    component
        .events()
        .register_handler(
            "hotkeys.activated",
            sync_event_handler(|event| {
                info!("hotkey event: {event:?}");
                EventResult::Continue
            }),
        )
        .await;

    for id in features {
        if let Err(e) = component.load_feature(id).await {
            // A missing capability usually means a packaging defect, so a
            // failed resolve ends the process instead of degrading silently.
            eprintln!("Failed to activate feature '{id}': {e}");
            component.quit().await;
            return ExitCode::FAILURE;
        }
    }

    match component.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Component error: {e}");
            ExitCode::FAILURE
        }
    }
}
