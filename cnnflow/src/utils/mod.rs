//! Filesystem, serialization, and timestamp helpers shared by the stages.

pub mod fs;
pub mod image_codec;
pub mod timestamps;

pub use fs::{create_directories, get_size, load_bin, load_json, save_bin, save_json};
pub use image_codec::{decode_image, encode_image_into_base64};
pub use timestamps::{iso_timestamp, Timestamp};
