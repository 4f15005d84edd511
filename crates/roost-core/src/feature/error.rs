//! Error types for the feature system.

use crate::feature::FeatureId;

#[derive(Debug, thiserror::Error)]
pub enum FeatureSystemError {
    /// The requested capability identifier is not registered.
    #[error("no such feature: '{0}'")]
    NoSuchFeature(FeatureId),

    /// A feature's dependency chain loops back on itself.
    #[error("circular feature dependency: {}", .0.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(" -> "))]
    CyclicDependency(Vec<FeatureId>),

    #[error("feature '{id}' failed to activate: {message}")]
    ActivationFailed {
        id: FeatureId,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("feature '{id}' failed to finalize: {message}")]
    FinalizeFailed {
        id: FeatureId,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}
