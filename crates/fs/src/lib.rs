mod crawler;
mod policy;
mod record;

pub use crawler::{CrawlOutput, CrawlStats, TraversalOrder, crawl, normalize_path};
pub use policy::{AcceptAll, ExclusionPolicy, Exclusions, NamePolicy, PolicyKind};
pub use record::{FileRecord, Permissions, Vertex, split_name};
