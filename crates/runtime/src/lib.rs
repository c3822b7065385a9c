mod config;
pub mod logging;

pub use config::{
    FETCH_CHUNK_MIN, NORMAL_EXCLUDED_EXTS, NORMAL_EXCLUDED_STEMS, PROGRAM_LOG_FILE,
    PROGRAM_LOG_LEVEL, PROGRAM_NAME, STORE_FILE_NAME, STORE_PATH_ENV, TOOLING_EXCLUDED_EXTS,
    TOOLING_EXCLUDED_STEMS, VERTEX_KEY_WIDTH, default_store_path, default_worker_count,
    dirbase_dir,
};

pub use logging::init;
