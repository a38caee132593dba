pub mod data_file;
pub mod error;
pub mod settings;

pub use data_file::{DATA_FILE_TAG, DEFAULT_DATA_FILE, load_into, save};
pub use error::{Result, StoreError};
pub use settings::Settings;
