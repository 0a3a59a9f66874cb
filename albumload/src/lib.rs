#![cfg_attr(docsrs, feature(doc_cfg))]
//! Load testing harness for album review services.
//!
//! A [`LoadTest`] drives the target with simulated users. Each user creates an album, likes
//! it twice and dislikes it once, retrying every call up to a fixed number of attempts. Users
//! are launched in waves and every attempt is collected into a [`ResultLog`], from which
//! [`RunStatistics`] are computed once all users are done.
//!
//! ```no_run
//! use albumload::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ConfigError> {
//!     let config = RunConfig::from_target("http://localhost:8080")?
//!         .waves(10)
//!         .workers_per_wave(10);
//!
//!     let summary = LoadTest::connect(config).await?.run().await;
//!     println!("{}", ConsoleReport(&summary.statistics));
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod collector;
pub mod report;
pub mod retry;
pub mod scenario;
pub mod workflow;

pub use collector::ResultLog;
pub use scenario::{LoadTest, RunSummary};

pub mod prelude {
    pub use crate::client::{AlbumApi, CreatedAlbum, HttpAlbumClient};
    pub use crate::collector::ResultLog;
    pub use crate::report::{write_record_file, ConsoleReport};
    pub use crate::retry::RetryPolicy;
    pub use crate::scenario::{LoadTest, RunSummary};
    pub use crate::workflow::Workflow;

    pub use albumload_core::{
        ConfigError, RequestKind, RequestOutcome, RunConfig, RunStatistics, WarmupConfig,
    };
}

#[doc(no_inline)]
pub use albumload_core::{ConfigError, RequestKind, RequestOutcome, RunConfig, RunStatistics};
