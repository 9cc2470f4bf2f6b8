#![doc = include_str!("../README.md")]

mod commission;
mod error;
mod model;
mod request;
mod sequence;
mod service;
mod store;
mod validate;

pub use crate::commission::*;
pub use crate::error::*;
pub use crate::model::*;
pub use crate::request::*;
pub use crate::sequence::*;
pub use crate::service::*;
pub use crate::store::*;
pub use crate::validate::*;
