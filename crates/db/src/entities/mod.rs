//! Database entities.

pub mod actor_key;
pub mod follower;
pub mod post;
pub mod profile;

pub use actor_key::Entity as ActorKey;
pub use follower::Entity as Follower;
pub use post::Entity as Post;
pub use profile::Entity as Profile;
