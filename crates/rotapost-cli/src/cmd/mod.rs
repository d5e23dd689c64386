pub mod config;
pub mod generate;
pub mod init;
pub mod pause;
pub mod post;
pub mod run;
pub mod status;
