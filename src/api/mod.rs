//! YouTube API client handles.

pub mod client;

pub use client::YouTubeClient;
