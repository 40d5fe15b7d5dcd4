use thiserror::Error;

/// Why an overlay produced no output.
///
/// Points are reported in `f64`, whatever the numeric type of the inputs.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum OverlayError {
    /// Some turn's operations couldn't be classified, usually because an input
    /// ring has a spike (an edge that doubles straight back on itself) at the
    /// turn point.
    #[error("could not classify the turn at ({x}, {y})")]
    Classification { x: f64, y: f64 },

    /// A traversal that started at the given point got stuck before returning
    /// to it.
    #[error("the ring fragment starting at ({x}, {y}) does not close")]
    NonClosingFragment { x: f64, y: f64 },
}

pub type Result<T> = std::result::Result<T, OverlayError>;
