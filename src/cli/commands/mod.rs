mod init;
mod migrate;
mod serve;

pub use init::cmd_init;
pub use migrate::cmd_migrate;
pub use serve::cmd_serve;
