pub mod config;
pub mod dispatch;
pub mod log;
pub mod markup;
pub mod memories;
pub mod message;
pub mod widget;
