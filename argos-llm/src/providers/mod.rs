//! Language-model providers

pub mod ollama;
pub mod trait_impl;

pub use trait_impl::Provider;
