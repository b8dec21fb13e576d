pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while translating a BPMN diagram into PDDL.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("BPMN type {0} missing id")]
    MissingId(String),

    #[error("BPMN root element is not a definitions element, or the file is not valid XML")]
    MalformedInput,

    #[error("{0} {1} references unknown node {2}")]
    UnresolvedReference(&'static str, String, String),

    #[error("could not find node with id {0}")]
    MissingNode(String),

    #[error("diagram has no start event")]
    MissingStartEvent,

    #[error("could not create output directory {0}")]
    OutputDir(String, #[source] std::io::Error),

    #[error("could not write output file {0}")]
    OutputFile(String, #[source] std::io::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

// Recurring diagnostic fragments, following the teacher's convention of
// hoisting repeated requirement messages into named constants.
pub(crate) const UNPAIRED_INCLUSIVE_GATEWAY: &str = "converging inclusive gateway has no matching diverging partner, falling back to generic encoding";
pub(crate) const UNPAIRED_PARALLEL_GATEWAY: &str =
    "converging parallel gateway region rejected, falling back to generic encoding";
