//! Data model of an analysis: request, target, evidence, and report.

mod report;
mod types;

pub use report::{
    AnalysisReport, AnalysisRequest, GeoInfo, Recommendation, ReportMetadata, ReputationEntry,
    ServiceRecord, Target, Vulnerability,
};
pub use types::{
    Category, Priority, Protocol, ReputationStatus, RiskLevel, Severity, TargetType,
};
