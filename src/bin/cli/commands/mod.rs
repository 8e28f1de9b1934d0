pub mod card;
pub mod concepts;
pub mod essay;
pub mod generate;
pub mod history;
pub mod init;
pub mod menu;
pub mod quiz;
pub mod review;
pub mod stats;
pub mod transfer;
pub mod tutor;
