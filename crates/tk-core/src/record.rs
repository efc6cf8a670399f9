/// One measured adjacency between two boundaries of one layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdjacencyRecord {
    pub cell1: String,
    pub index1: usize,
    pub cell2: String,
    pub index2: usize,
    pub adjacency: usize,
}

impl AdjacencyRecord {
    /// Ordering used for reproducible output documents.
    pub fn sort_key(&self) -> (&str, usize, &str, usize) {
        (&self.cell1, self.index1, &self.cell2, self.index2)
    }
}
