use indexmap::{IndexMap, IndexSet};

/// One registry entry: label → value pairs in the order they appeared on the card.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    pub fn new(name_label: &str, name: String) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(name_label.to_owned(), name);
        Self { fields }
    }

    /// Later values win; the label keeps the position it was first seen at.
    pub fn insert(&mut self, label: String, value: String) {
        self.fields.insert(label, value);
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Union of the labels of `records`, in first-seen order.
pub fn columns(records: &[Record]) -> IndexSet<&str> {
    records.iter().flat_map(Record::labels).collect()
}
