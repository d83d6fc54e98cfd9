pub mod key_extractor;
pub mod translation;
pub mod ts_parser;
pub mod ts_writer;

pub use key_extractor::{collect_ts_files, KeyExtractor};
pub use translation::{
    Catalog, Context, Location, Message, TranslationEntry, TranslationStatus, SENTINEL_LINE,
};
pub use ts_parser::TsParser;
pub use ts_writer::TsWriter;
