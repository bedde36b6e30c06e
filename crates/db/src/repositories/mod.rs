//! Repositories.

mod actor_key;
mod follower;
mod post;
mod profile;

pub use actor_key::ActorKeyRepository;
pub use follower::FollowerRepository;
pub use post::PostRepository;
pub use profile::ProfileRepository;
