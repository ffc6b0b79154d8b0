pub mod channel;
pub mod comment;
pub mod user;
pub mod video;

pub use channel::*;
pub use comment::*;
pub use user::*;
pub use video::*;
