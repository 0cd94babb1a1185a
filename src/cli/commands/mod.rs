//! One module per `keeda` subcommand.

pub mod add;
pub mod delete;
pub mod edit;
pub mod empty_trash;
pub mod group;
pub mod init;
pub mod list;
pub mod passwd;
pub mod show;
pub mod totp;
