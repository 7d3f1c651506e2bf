pub mod artifact;
pub mod report;

pub use artifact::{Artifact, ArtifactSet};
pub use report::{GasReport, GasSummary, ScenarioOutcome, SuiteReport};
