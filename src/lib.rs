pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dto;
pub mod pages;
pub mod service;
pub mod store;
pub mod validation;
