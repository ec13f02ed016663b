use thiserror::Error;

use crate::component::BuildStage;

/// Top-level error type for the combgeom kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Cell(#[from] CellError),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Variable(#[from] VariableError),

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error("component {name}: {source}")]
    Component {
        name: String,
        #[source]
        source: Box<KernelError>,
    },
}

/// Errors related to primitive surfaces and the surface registry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("surface {0} is not registered")]
    SurfaceNotFound(i32),

    #[error("surface handle {handle} already holds a different primitive")]
    HandleConflict { handle: i32 },

    #[error("surface handle {0} must be positive")]
    InvalidHandle(i32),

    #[error("surface handle {handle} lies outside the range {start}..{end} of {owner}")]
    SurfaceOutOfRange {
        owner: String,
        handle: i32,
        start: i32,
        end: i32,
    },
}

/// Errors raised while reading or transforming a rule.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("parse error at {position} in \"{input}\": {message}")]
    Parse {
        input: String,
        position: usize,
        message: String,
    },
}

/// Errors related to the cell table.
#[derive(Debug, Error)]
pub enum CellError {
    #[error("cell {0} already exists")]
    DuplicateCell(i32),

    #[error("cell {0} not found")]
    CellNotFound(i32),
}

/// Errors related to the object-group allocator.
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("object name {0} already registered")]
    DuplicateName(String),

    #[error("object {0} not registered")]
    NameNotFound(String),

    #[error("range {start}..{end} for {name} overlaps {other}")]
    RangeOverlap {
        name: String,
        start: i32,
        end: i32,
        other: String,
    },

    #[error("object {0} has no frame")]
    FrameMissing(String),

    #[error("object {0} has no cell range")]
    NoRange(String),

    #[error("cell {cell} is outside every range of {name}")]
    CellOutOfRange { name: String, cell: i32 },
}

/// Errors related to link points and named cuts.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("{component}: link name {name} not found")]
    NameNotFound { component: String, name: String },

    #[error("{component}: link index {index} out of range (size {size})")]
    IndexOutOfRange {
        component: String,
        index: i64,
        size: usize,
    },

    #[error("{component}: link {index} has no surface")]
    NoSurface { component: String, index: i64 },

    #[error("{component}: link {index} has no point and axis")]
    NotSet { component: String, index: i64 },

    #[error("{component}: line does not cross cut {name}")]
    NoIntercept { component: String, name: String },

    #[error("{component}: cut {name} not set")]
    CutNotFound { component: String, name: String },

    #[error("{component}: cell group {name} not found")]
    CellGroupNotFound { component: String, name: String },

    #[error("{component}: surface group {name} not found")]
    SurfGroupNotFound { component: String, name: String },
}

/// Errors raised by the variable and material databases.
#[derive(Debug, Error)]
pub enum VariableError {
    #[error("variable {0} not found")]
    NotFound(String),

    #[error("variable {key} is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("material {0} not found")]
    UnknownMaterial(String),
}

/// A build-lifecycle step invoked out of order.
#[derive(Debug, Error)]
#[error("{component}: cannot enter {attempted:?} from {current:?}")]
pub struct OrderingError {
    pub component: String,
    pub attempted: BuildStage,
    pub current: BuildStage,
}

/// Convenience type alias for results using [`KernelError`].
pub type Result<T> = std::result::Result<T, KernelError>;

/// Attaches the failing component's name to an error.
pub trait ResultExt<T> {
    /// Wraps the error in [`KernelError::Component`].
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with `name`.
    fn in_component(self, name: &str) -> Result<T>;
}

impl<T, E: Into<KernelError>> ResultExt<T> for std::result::Result<T, E> {
    fn in_component(self, name: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            wrapped @ KernelError::Component { .. } => wrapped,
            other => KernelError::Component {
                name: name.to_string(),
                source: Box::new(other),
            },
        })
    }
}
