pub mod compare;
pub mod init;
pub mod quiz;
pub mod simulate;
pub mod stats;
pub mod validate;
