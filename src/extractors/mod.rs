pub mod source;

pub use source::{select_source, SelectedSource, SOURCE_HEADER, SOURCE_QUERY_PARAM};
