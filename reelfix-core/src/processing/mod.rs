//! Core acquisition and normalization logic.
//!
//! This module organizes the pipeline stages into submodules and exposes the
//! orchestrator that runs them in order.

/// URL classification into download strategies
pub mod classify;

/// Transcode decision engine
pub mod decision;

/// Probed media properties
pub mod media_properties;

/// Locating the file a download actually produced
pub mod normalize;

/// The acquisition orchestrator
pub mod pipeline;

/// Output validation
pub mod validation;

pub use classify::{Platform, StrategyAttempt, StrategyPlan, classify};
pub use decision::{PlanKind, TranscodePlan, decide};
pub use media_properties::{AspectRatio, MediaProperties};
pub use normalize::normalize_download_path;
pub use pipeline::{AcquisitionRequest, FallbackState, Pipeline};
pub use validation::{Artifact, validate_artifact};
