mod category;
mod quiz;
mod tag;
mod topic;
mod validation;
mod video_asset;

pub use category::*;
pub use quiz::*;
pub use tag::*;
pub use topic::*;
pub use validation::validate_slug;
pub use video_asset::*;
