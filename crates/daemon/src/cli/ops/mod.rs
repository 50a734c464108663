pub mod cat;
pub mod health;
pub mod init;
pub mod issues;
#[cfg(feature = "fuse")]
pub mod mount;
pub mod projects;
pub mod version;

pub use cat::Cat;
pub use health::Health;
pub use init::Init;
pub use issues::Issues;
#[cfg(feature = "fuse")]
pub use mount::Mount;
pub use projects::Projects;
pub use version::Version;
