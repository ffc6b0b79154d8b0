pub mod channel;
pub mod comment;
pub mod user;
pub mod video;

pub use channel::ChannelRepository;
pub use comment::CommentRepository;
pub use user::UserRepository;
pub use video::VideoRepository;
