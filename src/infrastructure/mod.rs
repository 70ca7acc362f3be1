// Infrastructure implementations for xml2md: filesystem, XML, Markdown, caches.

pub mod analysis_loader;
pub mod concurrency;
pub mod discovery;
pub mod markdown;
pub mod purpose_cache;
pub mod xml_reader;

pub use analysis_loader::AnalysisLoader;
pub use markdown::MarkdownExporter;
pub use purpose_cache::PurposeCache;
pub use xml_reader::XmlDocumentParser;
