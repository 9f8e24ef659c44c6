pub mod attributes;
pub mod indent;
pub mod markup;
pub mod parser;
pub mod region;

pub use attributes::{AttributeSet, AttributeValue};
pub use indent::adjust_indent;
pub use parser::{Extractor, ParseError};
pub use region::Region;

/// Extract and resolve every region of `source`, without a file database.
pub fn extract(source: &str) -> Result<Vec<Region>, ParseError> {
    Extractor::new(source, 0).extract()
}
