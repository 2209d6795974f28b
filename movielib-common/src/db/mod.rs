//! Store contract shared by the loader and the browser

pub mod connect;
pub mod fingerprint;
pub mod load_info;
pub mod models;
pub mod tables;

pub use connect::*;
pub use fingerprint::*;
pub use load_info::*;
pub use models::*;
pub use tables::*;
