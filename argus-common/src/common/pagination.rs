use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

impl Pagination {
    pub fn first_page(limit: u64) -> Self {
        Self { limit, offset: 0 }
    }

    /// Moves the window forward by one full page.
    pub fn advance(&mut self) {
        self.offset += self.limit;
    }
}
