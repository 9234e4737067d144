//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_TITLE_PREFIX;

/// Session VOD uploader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "vod-uploader",
    version,
    about = "Crawl a VOD listing page and upload the session videos to YouTube",
    long_about = "Crawls a listing page for session folders, downloads the MP4 files \
                  found inside them, and uploads each one to the authenticated \
                  YouTube channel, deleting the local copy on success."
)]
pub struct Args {
    /// Listing page URL to crawl for session folders.
    pub url: String,

    /// A prefix for the video title on YouTube.
    #[arg(long, default_value = DEFAULT_TITLE_PREFIX)]
    pub title: String,

    /// Directory downloaded files are staged in.
    #[arg(short = 'd', long = "download-directory", default_value = "downloaded")]
    pub download_directory: PathBuf,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_is_required() {
        assert!(Args::try_parse_from(["vod-uploader"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["vod-uploader", "http://vods.example.net/"]).unwrap();
        assert_eq!(args.title, DEFAULT_TITLE_PREFIX);
        assert_eq!(args.download_directory, PathBuf::from("downloaded"));
        assert!(!args.debug);
    }

    #[test]
    fn test_title_override() {
        let args = Args::try_parse_from([
            "vod-uploader",
            "http://vods.example.net/",
            "--title",
            "Nethackathon VII:",
        ])
        .unwrap();
        assert_eq!(args.title, "Nethackathon VII:");
    }
}
