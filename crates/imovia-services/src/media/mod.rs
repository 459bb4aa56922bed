pub mod sync;
pub mod uploader;
