use std::fmt;

/// Error returned by [`insert_checked`](super::insert_checked) when the input
/// violates the sortedness precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderedError {
    /// The element at `index` is greater than the element at `index + 1`.
    Unsorted {
        /// Position of the first out-of-order pair
        index: usize,
    },
}

impl fmt::Display for OrderedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderedError::Unsorted { index } => write!(
                f,
                "invalid argument: sequence is not sorted (element {} is greater than element {})",
                index,
                index + 1
            ),
        }
    }
}

impl std::error::Error for OrderedError {}
