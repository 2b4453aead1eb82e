use std::cmp::Ordering;

use super::OrderedError;

/// Index at which `value` would be inserted into `sequence`.
///
/// Scans from the start while the current element is strictly less than
/// `value`. The returned index is the first position whose element is not less
/// than `value`, or `sequence.len()` if there is none.
#[inline]
#[must_use]
pub fn insertion_index<T: Ord>(sequence: &[T], value: &T) -> usize {
    insertion_index_by(sequence, value, T::cmp)
}

/// Comparator variant of [`insertion_index`].
///
/// The scan advances while `compare(element, value)` is [`Ordering::Less`].
#[must_use]
pub fn insertion_index_by<T, F>(sequence: &[T], value: &T, mut compare: F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    sequence
        .iter()
        .position(|element| compare(element, value) != Ordering::Less)
        .unwrap_or(sequence.len())
}

/// Insert `value` into a sorted `sequence`, returning a new sorted vector.
///
/// The input slice is not modified. The result has `sequence.len() + 1`
/// elements; `value` takes the leftmost position among equal elements.
///
/// # Example
///
/// ```rust
/// use patternkit::ordered::insert;
///
/// assert_eq!(insert(&[], 5), vec![5]);
/// assert_eq!(insert(&[1, 3, 5, 7], 4), vec![1, 3, 4, 5, 7]);
/// ```
#[must_use]
pub fn insert<T: Ord + Clone>(sequence: &[T], value: T) -> Vec<T> {
    insert_by(sequence, value, T::cmp)
}

/// Comparator variant of [`insert`].
#[must_use]
pub fn insert_by<T, F>(sequence: &[T], value: T, compare: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let index = insertion_index_by(sequence, &value, compare);

    let mut result = Vec::with_capacity(sequence.len() + 1);
    result.extend_from_slice(&sequence[..index]);
    result.push(value);
    result.extend_from_slice(&sequence[index..]);
    result
}

/// Insert `value` into a sorted vector in place and return the index used.
///
/// Grows the vector by one and shifts the tail right, so no element after the
/// insertion point is lost.
pub fn insert_in_place<T: Ord>(vec: &mut Vec<T>, value: T) -> usize {
    let index = insertion_index(vec, &value);
    vec.insert(index, value);
    index
}

/// Whether `sequence` is sorted in non-decreasing order.
#[must_use]
pub fn is_sorted<T: Ord>(sequence: &[T]) -> bool {
    first_unsorted(sequence).is_none()
}

fn first_unsorted<T: Ord>(sequence: &[T]) -> Option<usize> {
    sequence.windows(2).position(|pair| pair[0] > pair[1])
}

/// Like [`insert`], but validates the sortedness precondition first.
///
/// # Errors
///
/// Returns [`OrderedError::Unsorted`] with the index of the first out-of-order
/// pair if `sequence` is not sorted.
pub fn insert_checked<T: Ord + Clone>(sequence: &[T], value: T) -> Result<Vec<T>, OrderedError> {
    if let Some(index) = first_unsorted(sequence) {
        return Err(OrderedError::Unsorted { index });
    }
    Ok(insert(sequence, value))
}

/// Sort `items` by inserting them one at a time into a growing sorted vector.
///
/// Quadratic; meant for small inputs. Equal elements come out in reverse arrival
/// order because each insert lands before its equals.
#[must_use]
pub fn insertion_sort<T, I>(items: I) -> Vec<T>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let items = items.into_iter();
    let mut sorted = Vec::with_capacity(items.size_hint().0);
    for item in items {
        insert_in_place(&mut sorted, item);
    }
    sorted
}
