//! # Global hotkeys
//!
//! Global hotkey state is brokered through a remote manager service rather
//! than grabbed locally. At activation the feature registers with the
//! manager, obtains a dedicated broker session and mirrors every
//! hotkey-kind configuration field to it; the broker pushes
//! `hotkey_activated` notifications back, which surface locally as
//! [`SystemEvent::HotkeyActivated`] events.
//!
//! An unreachable manager is not an error: the feature stays usable in a
//! degraded, broker-less state where binding pushes are no-ops.
//!
//! [`SystemEvent::HotkeyActivated`]: crate::event::SystemEvent::HotkeyActivated

pub mod error;
pub mod protocol;
pub mod proxy;

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::{Configuration, FieldChange, FieldKind};
use crate::feature::error::FeatureSystemError;
use crate::feature::{Feature, FeatureDescriptor, FeatureId};
use crate::hotkeys::proxy::BrokerProxy;
use crate::kernel::component::ComponentContext;

/// Descriptor for the builtin hotkey capability. Depends on the
/// configuration capability, whose fields hold the bindings.
pub fn hotkey_feature_descriptor() -> FeatureDescriptor {
    FeatureDescriptor::new(FeatureId::HOTKEYS, vec![FeatureId::CONFIG], |owner| {
        Box::new(HotkeyFeature::new(owner))
    })
}

/// Connection settings for the broker client.
#[derive(Debug, Clone)]
pub struct HotkeySettings {
    /// Well-known socket of the hotkey manager service.
    pub manager_socket: PathBuf,
}

impl Default for HotkeySettings {
    fn default() -> Self {
        Self {
            manager_socket: protocol::default_manager_socket(),
        }
    }
}

/// Hotkey registration capability.
pub struct HotkeyFeature {
    owner: Weak<ComponentContext>,
    settings: HotkeySettings,
    proxy: Option<Arc<BrokerProxy>>,
    binding_watch: Option<JoinHandle<()>>,
}

impl HotkeyFeature {
    pub fn new(owner: Weak<ComponentContext>) -> Self {
        Self::with_settings(owner, HotkeySettings::default())
    }

    pub fn with_settings(owner: Weak<ComponentContext>, settings: HotkeySettings) -> Self {
        Self {
            owner,
            settings,
            proxy: None,
            binding_watch: None,
        }
    }

    /// Whether the feature runs without a broker session (manager was
    /// unreachable at activation).
    pub fn is_degraded(&self) -> bool {
        self.proxy.is_none()
    }

    /// Pushes one binding by hand, outside the configuration mirror.
    pub async fn set_hotkey(&self, action: &str, binding: &str) {
        match &self.proxy {
            Some(proxy) => proxy.set_hotkey(action, binding).await,
            None => log::debug!("hotkey support degraded, dropping binding for '{action}'"),
        }
    }
}

/// Textual form of a binding value as sent to the broker.
fn binding_repr(value: &serde_json::Value) -> String {
    value
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| value.to_string())
}

/// Re-pushes a hotkey field's binding whenever its value changes.
async fn watch_bindings(
    mut rx: broadcast::Receiver<FieldChange>,
    config: Arc<Configuration>,
    proxy: Arc<BrokerProxy>,
) {
    loop {
        match rx.recv().await {
            Ok(change) => {
                if let Some(FieldKind::Hotkey { action }) = config.kind_of(&change.name) {
                    proxy.set_hotkey(&action, &binding_repr(&change.value)).await;
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                log::warn!("missed {missed} configuration changes, hotkey bindings may lag");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[async_trait]
impl Feature for HotkeyFeature {
    fn id(&self) -> FeatureId {
        FeatureId::HOTKEYS
    }

    async fn activate(&mut self) -> Result<(), FeatureSystemError> {
        let Some(ctx) = self.owner.upgrade() else {
            return Err(FeatureSystemError::ActivationFailed {
                id: FeatureId::HOTKEYS,
                message: "owning component is gone".to_string(),
                source: None,
            });
        };

        let proxy = match BrokerProxy::connect(
            &self.settings.manager_socket,
            ctx.id(),
            ctx.events().clone(),
        )
        .await
        {
            Ok(proxy) => Arc::new(proxy),
            Err(e) => {
                log::warn!(
                    "could not connect to the hotkey manager at '{}': {e}; \
                     hotkey support disabled for '{}'",
                    self.settings.manager_socket.display(),
                    ctx.id()
                );
                return Ok(());
            }
        };

        match ctx.config() {
            Some(config) => {
                for (name, action, value) in config.hotkey_fields() {
                    log::debug!("pushing hotkey binding '{name}' -> action '{action}'");
                    proxy.set_hotkey(&action, &binding_repr(&value)).await;
                }
                self.binding_watch = Some(tokio::spawn(watch_bindings(
                    config.subscribe(),
                    config,
                    proxy.clone(),
                )));
            }
            None => {
                // The config dependency activates first, so this only
                // happens when it was loaded without publishing a store.
                log::warn!(
                    "no configuration store available for '{}', no hotkey bindings pushed",
                    ctx.id()
                );
            }
        }

        self.proxy = Some(proxy);
        Ok(())
    }

    async fn finalize(&mut self) -> Result<(), FeatureSystemError> {
        if let Some(task) = self.binding_watch.take() {
            task.abort();
        }
        if let Some(proxy) = self.proxy.take() {
            match Arc::try_unwrap(proxy) {
                Ok(proxy) => proxy.shutdown().await,
                Err(_) => log::debug!("hotkey broker proxy still shared at finalize"),
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
