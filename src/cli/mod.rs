pub mod command;
pub mod decode;
pub mod extract;
pub mod info;
pub mod output;
pub mod progress;
