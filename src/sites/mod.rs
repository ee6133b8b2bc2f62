//! Site adapters
//!
//! Every site the grabber can fetch from is a [`FetchAdapter`] registered in
//! the [`SiteRegistry`] under its identifier (e.g. `dummy.ca`).

pub mod dummy;
pub mod registry;
pub mod traits;
pub mod xmltv;

pub use dummy::{DUMMY_SITE, DummyAdapter};
pub use registry::SiteRegistry;
pub use traits::{BatchSink, FetchAdapter, GrabBatch, RequestConfig, SiteConfig};
pub use xmltv::XmltvSiteAdapter;
