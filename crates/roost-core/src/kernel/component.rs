use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use crate::config::Configuration;
use crate::event::{SharedEventDispatcher, SystemEvent};
use crate::feature::error::FeatureSystemError;
use crate::feature::{Feature, FeatureId, FeatureRegistry};
use crate::instance::SingleInstanceGuard;
use crate::kernel::error::{Error, Result};
use crate::kernel::main_loop::MainLoop;
use crate::kernel::manifest::ComponentManifest;

/// Loop-owned state that features may reach through their back-reference.
///
/// The [`Component`] holds the only strong `Arc`; features receive a `Weak`
/// at construction so a feature can never keep its owner alive. Upgrading
/// after the component is gone yields `None` and must be handled, not
/// assumed away.
#[derive(Debug)]
pub struct ComponentContext {
    manifest: ComponentManifest,
    working_dir: PathBuf,
    events: SharedEventDispatcher,
    config: OnceLock<Arc<Configuration>>,
}

impl ComponentContext {
    pub fn manifest(&self) -> &ComponentManifest {
        &self.manifest
    }

    /// The stable application identity from the manifest.
    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn events(&self) -> &SharedEventDispatcher {
        &self.events
    }

    /// The configuration store, once the configuration feature has published
    /// it. `None` before that feature activates.
    pub fn config(&self) -> Option<Arc<Configuration>> {
        self.config.get().cloned()
    }

    /// Write-once slot filled by the configuration feature.
    pub(crate) fn publish_config(&self, config: Arc<Configuration>) {
        if self.config.set(config).is_err() {
            log::warn!(
                "component '{}': configuration already published, keeping the existing store",
                self.id()
            );
        }
    }
}

/// One activated capability. `finalized` guards the at-most-once finalize
/// contract across repeated `quit` calls.
struct ActivatedFeature {
    id: FeatureId,
    feature: Box<dyn Feature>,
    finalized: bool,
}

/// A long-running desktop-agent process: stable identity, working directory,
/// and the set of activated capabilities.
///
/// Features are requested on demand via [`load_feature`], which resolves and
/// activates the transitive dependencies first. [`run`] drives the
/// cooperative event loop until [`quit`] (or an interrupt) ends the process.
///
/// [`load_feature`]: Component::load_feature
/// [`run`]: Component::run
/// [`quit`]: Component::quit
pub struct Component {
    context: Arc<ComponentContext>,
    registry: FeatureRegistry,
    activated: Vec<ActivatedFeature>,
    main_loop: MainLoop,
    instance: Option<SingleInstanceGuard>,
}

impl Component {
    /// Builds a component over a validated manifest.
    ///
    /// The registry is taken by value: it must be fully populated before
    /// construction and is read-only afterwards. The dispatcher is passed in
    /// so collaborators created before the component (the single-instance
    /// accept loop) share the same queue.
    pub fn new(
        manifest: ComponentManifest,
        working_dir: PathBuf,
        registry: FeatureRegistry,
        events: SharedEventDispatcher,
    ) -> Result<Self> {
        manifest.validate()?;
        let context = Arc::new(ComponentContext {
            manifest,
            working_dir,
            events,
            config: OnceLock::new(),
        });
        Ok(Self {
            context,
            registry,
            activated: Vec::new(),
            main_loop: MainLoop::new(),
            instance: None,
        })
    }

    pub fn context(&self) -> &Arc<ComponentContext> {
        &self.context
    }

    pub fn events(&self) -> &SharedEventDispatcher {
        self.context.events()
    }

    /// Handle for stopping the loop from outside `run`.
    pub fn main_loop(&self) -> &MainLoop {
        &self.main_loop
    }

    /// Adopts the single-instance claim so `quit` releases it.
    pub fn attach_instance_guard(&mut self, guard: SingleInstanceGuard) {
        self.instance = Some(guard);
    }

    /// Identifiers of the activated features, in activation order.
    pub fn active_features(&self) -> Vec<FeatureId> {
        self.activated.iter().map(|entry| entry.id).collect()
    }

    pub fn is_active(&self, id: FeatureId) -> bool {
        self.activated.iter().any(|entry| entry.id == id)
    }

    pub fn feature(&self, id: FeatureId) -> Option<&dyn Feature> {
        self.activated
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.feature.as_ref())
    }

    /// Activates the capability `id`, together with its not-yet-active
    /// transitive dependencies, depth-first in declaration order.
    ///
    /// Idempotent: requesting an already-active capability returns the
    /// existing instance without touching the activation list. An unknown
    /// identifier fails with [`FeatureSystemError::NoSuchFeature`] and
    /// leaves the activation list unchanged; a dependency loop fails with
    /// [`FeatureSystemError::CyclicDependency`] naming the chain.
    pub async fn load_feature(&mut self, id: FeatureId) -> Result<&dyn Feature> {
        let mut loading = Vec::new();
        self.load_feature_recursive(id, &mut loading).await?;
        self.feature(id)
            .ok_or_else(|| Error::Other(format!("feature '{id}' not present after activation")))
    }

    fn load_feature_recursive<'a>(
        &'a mut self,
        id: FeatureId,
        loading: &'a mut Vec<FeatureId>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if self.is_active(id) {
                return Ok(());
            }

            if loading.contains(&id) {
                let mut chain = loading.clone();
                chain.push(id);
                return Err(FeatureSystemError::CyclicDependency(chain).into());
            }

            // Resolve before descending so an unknown id fails the whole
            // call without having activated anything for it.
            let dependencies = self.registry.resolve(id)?.dependencies().to_vec();

            loading.push(id);
            for dependency in dependencies {
                self.load_feature_recursive(dependency, loading).await?;
            }
            loading.pop();

            let mut feature = {
                let descriptor = self.registry.resolve(id)?;
                descriptor.construct(Arc::downgrade(&self.context))
            };
            feature.activate().await?;
            log::debug!("component '{}': feature '{}' activated", self.context.id(), id);

            self.activated.push(ActivatedFeature {
                id,
                feature,
                finalized: false,
            });
            self.context
                .events()
                .queue_event(Box::new(SystemEvent::FeatureActivated { id }))
                .await;
            Ok(())
        })
    }

    /// Shuts the component down.
    ///
    /// Releases the single-instance identity first, so a successor can claim
    /// it even if the rest of teardown is interrupted; then finalizes every
    /// activated feature exactly once, in activation order, draining the
    /// whole set even when one finalize fails; then stops the main loop.
    ///
    /// Errors are logged, never propagated: `quit` is the cleanup path.
    pub async fn quit(&mut self) {
        if let Some(guard) = self.instance.take() {
            if let Err(e) = guard.release().await {
                log::warn!(
                    "component '{}': could not release single-instance claim: {e}",
                    self.context.id()
                );
            }
        }

        let mut drained = std::mem::take(&mut self.activated);
        for entry in &mut drained {
            if entry.finalized {
                continue;
            }
            entry.finalized = true;
            if let Err(e) = entry.feature.finalize().await {
                log::error!(
                    "component '{}': feature '{}' failed to finalize: {e}",
                    self.context.id(),
                    entry.id
                );
            }
        }

        self.context
            .events()
            .dispatch(&SystemEvent::ComponentShutdown)
            .await;
        self.main_loop.stop();
    }

    /// Drives the cooperative loop: drains queued events as they arrive and
    /// exits on [`stop`](MainLoop::stop), [`quit`](Component::quit) or an
    /// interrupt signal, unwinding through `quit` in every case.
    pub async fn run(&mut self) -> Result<()> {
        let events = self.context.events().clone();
        events.dispatch(&SystemEvent::ComponentStart).await;
        log::info!(
            "component '{}' v{} entering main loop",
            self.context.id(),
            self.context.manifest().version
        );

        loop {
            tokio::select! {
                _ = self.main_loop.wait_stopped() => break,
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => log::info!(
                            "component '{}': interrupt received, shutting down",
                            self.context.id()
                        ),
                        Err(e) => log::warn!(
                            "component '{}': interrupt handler failed ({e}), shutting down",
                            self.context.id()
                        ),
                    }
                    break;
                }
                _ = events.wait_queued() => {
                    events.process_queue().await;
                }
            }
        }

        self.quit().await;
        log::info!("component '{}' stopped", self.context.id());
        Ok(())
    }
}
