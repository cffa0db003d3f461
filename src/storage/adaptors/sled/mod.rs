mod sled_store;

pub use sled_store::*;


use std::path::Path;

use tracing::debug;
use tracing::warn;

use crate::StoreResult;

#[doc(hidden)]
pub fn init_sled_pipeline_db(
    sled_db_root_path: impl AsRef<Path> + std::fmt::Debug
) -> StoreResult<::sled::Db> {
    debug!("init_sled_pipeline_db from path: {:?}", &sled_db_root_path);

    let db_path = sled_db_root_path.as_ref();

    ::sled::Config::default()
        .path(db_path)
        .cache_capacity(64 * 1024 * 1024) //64MB
        .flush_every_ms(Some(10))
        .use_compression(true)
        .compression_factor(1)
        .open()
        .map_err(|e| {
            warn!(
                "Try to open DB at this location: {:?} and failed: {:?}",
                db_path, e
            );
            e.into()
        })
}
