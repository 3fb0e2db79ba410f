pub mod ads;
pub mod advice;
pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod places;
pub mod profile;
