//! CodeWire - a tech news aggregator and Q&A board
//!
//! This crate aggregates Hacker News, Dev.to, RSS feeds, and GitHub trending
//! repositories into one filterable feed, and serves a small Q&A board with
//! optional Japanese-language AI translation and answering.

pub mod ai;
pub mod config;
pub mod db;
pub mod feed;
pub mod fetcher;
pub mod models;
pub mod routes;
pub mod store;
pub mod tags;
