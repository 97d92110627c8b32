mod format;
mod info;

pub use format::save_atlas_image;
pub use info::{parse_info, read_info, render_info, write_info};
