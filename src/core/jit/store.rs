use std::collections::HashMap;

use crate::core::jit::model::FieldId;

/// Indices of the lists enclosing a value, outermost first. Together with a
/// [`FieldId`] it names exactly one node of the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DataPath(Vec<usize>);

impl DataPath {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.0.push(index);
        self
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

/// Outcome of every field invocation of one execution, filled in
/// concurrently by the executor and read back while synthesizing.
#[derive(Debug)]
pub struct Store<A> {
    data: HashMap<FieldId, HashMap<DataPath, A>>,
}

impl<A> Default for Store<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Store<A> {
    pub fn new() -> Self {
        Store { data: HashMap::new() }
    }

    pub fn set(&mut self, field_id: FieldId, data_path: DataPath, value: A) {
        self.data.entry(field_id).or_default().insert(data_path, value);
    }

    pub fn get(&self, field_id: FieldId, data_path: &DataPath) -> Option<&A> {
        self.data.get(&field_id)?.get(data_path)
    }

    /// Number of recorded field invocations.
    pub fn len(&self) -> usize {
        self.data.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_values_are_keyed_by_list_position() {
        let mut store = Store::new();
        let id = FieldId::new(3);
        store.set(id, DataPath::new().with_index(0), "a");
        store.set(id, DataPath::new().with_index(1), "b");
        store.set(id, DataPath::new().with_index(1).with_index(0), "c");

        assert_eq!(store.len(), 3);
        assert_eq!(store.get(id, &DataPath::new().with_index(1)), Some(&"b"));
        assert_eq!(store.get(id, &DataPath::new()), None);
        assert_eq!(store.get(FieldId::new(4), &DataPath::new()), None);
    }
}
