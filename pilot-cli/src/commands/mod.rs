pub mod drift;
pub mod init;
pub mod status;
pub mod sync;
