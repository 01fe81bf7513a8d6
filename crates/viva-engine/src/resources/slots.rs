/// Append-only slot storage. Indices stay valid (and are never reused) after a
/// removal, so stale ids resolve to `None` instead of aliasing a newer item.
#[derive(Debug)]
pub(crate) struct Slots<T> {
    items: Vec<Option<T>>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Slots<T> {
    pub fn push(&mut self, item: T) -> usize {
        self.items.push(Some(item));
        self.items.len() - 1
    }

    #[inline]
    pub fn next_index(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.items.get(i).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        self.items.get_mut(i).and_then(Option::as_mut)
    }

    /// Two distinct live slots at once.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut T, &mut T)> {
        if a == b || a >= self.items.len() || b >= self.items.len() {
            return None;
        }
        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.items.split_at_mut(hi);
        let (x, y) = (head[lo].as_mut()?, tail[0].as_mut()?);
        Some(if a < b { (x, y) } else { (y, x) })
    }

    pub fn take(&mut self, i: usize) -> Option<T> {
        self.items.get_mut(i).and_then(Option::take)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (i, v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.items
            .iter_mut()
            .enumerate()
            .filter_map(|(i, v)| v.as_mut().map(|v| (i, v)))
    }

    pub fn live(&self) -> usize {
        self.items.iter().filter(|v| v.is_some()).count()
    }

    /// Removes every live item, in index order. Indices are still not reused.
    pub fn drain(&mut self) -> Vec<(usize, T)> {
        self.items
            .iter_mut()
            .enumerate()
            .filter_map(|(i, v)| v.take().map(|v| (i, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_slots_are_not_reused() {
        let mut s = Slots::default();
        let a = s.push('a');
        s.take(a);
        let b = s.push('b');
        assert_ne!(a, b);
        assert_eq!(s.get(a), None);
        assert_eq!(s.get(b), Some(&'b'));
    }

    #[test]
    fn pair_mut_keeps_argument_order() {
        let mut s = Slots::default();
        s.push(1);
        s.push(2);
        let (x, y) = s.pair_mut(1, 0).unwrap();
        assert_eq!((*x, *y), (2, 1));
        assert!(s.pair_mut(0, 0).is_none());
    }
}
