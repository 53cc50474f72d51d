pub mod snapshot;

pub use snapshot::{
    list_reports, write_report, ParameterSnapshot, ReportError, ReportMetadata, RunReport,
};
