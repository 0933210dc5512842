use serde::{Deserialize, Serialize};

use super::{ChapterSummary, LastReadMarker};

/// Chapter list and last-read marker, fetched together and cached as one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub chapters: Vec<ChapterSummary>,
    pub last_read: LastReadMarker,
}

impl Library {
    /// A cached library can be shown without waiting for the network only when
    /// it carries a last-read text. An empty chapter list still counts.
    pub fn is_displayable(&self) -> bool {
        !self.last_read.text.is_empty()
    }
}
