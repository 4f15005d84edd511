use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::{Configuration, FieldChange};
use crate::event::{SharedEventDispatcher, SystemEvent};
use crate::feature::error::FeatureSystemError;
use crate::feature::{Feature, FeatureDescriptor, FeatureId};
use crate::kernel::component::ComponentContext;

/// Descriptor for the builtin configuration capability.
pub fn config_feature_descriptor() -> FeatureDescriptor {
    FeatureDescriptor::new(FeatureId::CONFIG, Vec::new(), |owner| {
        Box::new(ConfigFeature::new(owner))
    })
}

/// Configuration persistence capability.
///
/// On activation the store is loaded from the component's working directory
/// and published into the component context, where dependent capabilities
/// find it. With `autosave` on (the default), finalize writes the store
/// back best-effort.
pub struct ConfigFeature {
    owner: Weak<ComponentContext>,
    config: Option<Arc<Configuration>>,
    autosave: bool,
    change_bridge: Option<JoinHandle<()>>,
}

impl ConfigFeature {
    pub fn new(owner: Weak<ComponentContext>) -> Self {
        Self {
            owner,
            config: None,
            autosave: true,
            change_bridge: None,
        }
    }

    pub fn autosave(&self) -> bool {
        self.autosave
    }

    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    pub fn configuration(&self) -> Option<Arc<Configuration>> {
        self.config.clone()
    }
}

/// Mirrors field edits onto the component's event queue as
/// [`SystemEvent::ConfigChange`].
async fn bridge_changes(mut rx: broadcast::Receiver<FieldChange>, events: SharedEventDispatcher) {
    loop {
        match rx.recv().await {
            Ok(change) => {
                events
                    .queue_event(Box::new(SystemEvent::ConfigChange {
                        key: change.name,
                        value: change.value,
                    }))
                    .await;
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                log::warn!("dropped {missed} configuration change events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[async_trait]
impl Feature for ConfigFeature {
    fn id(&self) -> FeatureId {
        FeatureId::CONFIG
    }

    async fn activate(&mut self) -> Result<(), FeatureSystemError> {
        let Some(ctx) = self.owner.upgrade() else {
            return Err(FeatureSystemError::ActivationFailed {
                id: FeatureId::CONFIG,
                message: "owning component is gone".to_string(),
                source: None,
            });
        };

        let config = Configuration::load(ctx.working_dir()).map_err(|e| {
            FeatureSystemError::ActivationFailed {
                id: FeatureId::CONFIG,
                message: format!("could not load the configuration store: {e}"),
                source: Some(Box::new(e)),
            }
        })?;
        let config = Arc::new(config);
        ctx.publish_config(config.clone());

        self.change_bridge = Some(tokio::spawn(bridge_changes(
            config.subscribe(),
            ctx.events().clone(),
        )));
        self.config = Some(config);
        Ok(())
    }

    async fn finalize(&mut self) -> Result<(), FeatureSystemError> {
        if let Some(task) = self.change_bridge.take() {
            task.abort();
        }
        let Some(config) = self.config.take() else {
            return Ok(());
        };
        if !self.autosave {
            return Ok(());
        }

        let snapshot: Vec<(String, serde_json::Value)> = config
            .fields()
            .into_iter()
            .map(|(name, field)| (name, field.value))
            .collect();
        log::debug!("autosaving configuration: {snapshot:?}");

        config
            .save()
            .map_err(|e| FeatureSystemError::FinalizeFailed {
                id: FeatureId::CONFIG,
                message: format!("could not persist the configuration store: {e}"),
                source: Some(Box::new(e)),
            })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
