use folio_model::Document;
use std::collections::HashMap;

/// Documents bucketed by title.
///
/// Titles are kept in the order they were first encountered and documents
/// keep their relative order within a title, so grouping the same input twice
/// always gives the same result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleGroups {
    groups: Vec<(String, Vec<Document>)>,
    index: HashMap<String, usize>,
}

impl TitleGroups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Titles in first-seen order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(title, _)| title.as_str())
    }

    /// Documents sharing `title`, in their original relative order.
    pub fn get(&self, title: &str) -> Option<&[Document]> {
        self.index.get(title).map(|&i| self.groups[i].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Document])> {
        self.groups.iter().map(|(title, documents)| (title.as_str(), documents.as_slice()))
    }

    fn push(&mut self, document: Document) {
        match self.index.get(&document.title) {
            Some(&i) => self.groups[i].1.push(document),
            None => {
                self.index.insert(document.title.clone(), self.groups.len());
                self.groups.push((document.title.clone(), vec![document]));
            },
        }
    }
}
impl FromIterator<Document> for TitleGroups {
    fn from_iter<I: IntoIterator<Item = Document>>(documents: I) -> Self {
        let mut groups = Self::default();
        for document in documents {
            groups.push(document);
        }
        groups
    }
}

/// Group a flat document list by title.
///
/// Pure: no I/O, and the only thing done with the input is moving it into
/// the result. An empty input gives an empty [`TitleGroups`].
pub fn group_by_title(documents: impl IntoIterator<Item = Document>) -> TitleGroups {
    documents.into_iter().collect()
}
