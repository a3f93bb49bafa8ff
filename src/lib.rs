#![doc = include_str!("../README.md")]

pub mod client;
pub mod error;
pub mod protocol;

pub use crate::{
    client::{Client, ClientConfig},
    error::{Error, Result},
};
