pub mod error;
mod resolve;
mod scanner;

pub use error::ParseError;

use crate::markup;
use crate::region::Region;
use scanner::ScanState;

/// Region extraction entry point.
pub struct Extractor {
    source: String,
    file_id: usize,
}

impl Extractor {
    /// Carriage returns are dropped up front; every byte range in the
    /// resulting regions refers to [`Extractor::source`].
    pub fn new(source: &str, file_id: usize) -> Self {
        Extractor {
            source: source.replace('\r', ""),
            file_id,
        }
    }

    /// The normalized text the regions index into.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Scan the document and resolve every region, innermost first.
    ///
    /// Regions are returned in the order their closing markers appear.
    pub fn extract(&self) -> Result<Vec<Region>, ParseError> {
        let mut state = ScanState::new(&self.source, self.file_id);
        markup::tokenize(&self.source, &mut state)?;
        Ok(state.finalize())
    }
}
