//! parsers for the two pieces of text this relay has to make sense of, the player's content id
//! and the source site's player page

pub mod content_id_parser;
pub mod stream_link_parser;

pub use content_id_parser::parse_content_id;
pub use stream_link_parser::{ExtractionPolicy, ScriptSelection, extract_stream_link};
