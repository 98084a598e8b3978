pub mod classification;
pub mod diagnostic;
pub mod lenient;
pub mod loaders;
pub mod record;
pub mod soup;
pub mod tables;

pub use classification::{
    ClassificationOutcome, ClassificationRequest, ClassifyStatus, ServiceLabel, INSUFFICIENT_DATA,
    UNABLE_TO_CLASSIFY,
};
pub use diagnostic::{Diagnostic, Stage};
pub use loaders::load_document;
pub use record::RawDocument;
pub use soup::{SoupSection, SoupText};
pub use tables::{
    Defaulted, JobChild, JobRow, LaborRow, NodeKind, NodeOutcome, PartRow, RepairOrderRow, Row,
    Tables,
};
