//! Files derived from the label list

pub mod csv;
pub mod report;
pub mod writer;

pub use csv::CsvExporter;
pub use report::ReportWriter;
pub use writer::OutputWriter;
