mod config;
mod driver;
mod reliable_sender;
mod support;
mod window;
