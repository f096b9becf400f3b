//! Chunked bump allocator for lockset scratch nodes.
//!
//! `fetch_all_references` walks a transitive closure of OIDs whose size
//! isn't known up front; allocating one scratch node per visited OID from
//! the global allocator would dominate the walk's cost. Nodes are instead
//! carved out of fixed-size chunks and never individually freed — the
//! whole arena drops at once when the lockset build finishes.

const CHUNK_LEN: usize = 256;

/// An append-only store of `T`, handed out in chunks to avoid a
/// per-element allocation.
pub struct Arena<T> {
    chunks: Vec<Vec<T>>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    /// Push a value and return its stable index within the arena.
    pub fn push(&mut self, value: T) -> usize {
        if self.chunks.last().map_or(true, |c| c.len() == CHUNK_LEN) {
            self.chunks.push(Vec::with_capacity(CHUNK_LEN));
        }
        let chunk = self.chunks.last_mut().unwrap();
        chunk.push(value);
        (self.chunks.len() - 1) * CHUNK_LEN + chunk.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.chunks
            .get(index / CHUNK_LEN)
            .and_then(|c| c.get(index % CHUNK_LEN))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.chunks
            .get_mut(index / CHUNK_LEN)
            .and_then(|c| c.get_mut(index % CHUNK_LEN))
    }

    pub fn len(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get_roundtrip_across_chunk_boundary() {
        let mut arena = Arena::new();
        let indices: Vec<usize> = (0..1000).map(|i| arena.push(i)).collect();
        for (expected, idx) in indices.iter().enumerate() {
            assert_eq!(arena.get(*idx), Some(&expected));
        }
        assert_eq!(arena.len(), 1000);
    }

    #[test]
    fn get_mut_allows_in_place_update() {
        let mut arena = Arena::new();
        let idx = arena.push(10);
        *arena.get_mut(idx).unwrap() = 20;
        assert_eq!(arena.get(idx), Some(&20));
    }

    #[test]
    fn out_of_range_returns_none() {
        let arena: Arena<i32> = Arena::new();
        assert_eq!(arena.get(0), None);
    }
}
