/// Position reached by stepping `offset` from `index` in a circular list of
/// `count` items. `None` for an empty list.
pub fn cycle_index(count: usize, index: usize, offset: isize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let count = count as i64;
    let target = (index as i64 + offset as i64).rem_euclid(count);
    Some(target as usize)
}
