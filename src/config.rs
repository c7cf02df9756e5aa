//! Configuration and CLI argument handling

use clap::Parser;

use crate::state::Thresholds;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "toastmaster-companion")]
#[command(about = "A state-managed HTTP server backing the Toastmasters meeting companion UI")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20553")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Base URL of the host bridge exposing the meeting API.
    /// Without it the roster is filled by manual entry only.
    #[arg(long)]
    pub host_api_url: Option<String>,

    /// Prepared speech yellow mark in seconds (0 disables)
    #[arg(long, default_value = "240")]
    pub speech_yellow: u64,

    /// Prepared speech green mark in seconds (0 disables)
    #[arg(long, default_value = "300")]
    pub speech_green: u64,

    /// Prepared speech red mark in seconds (0 disables)
    #[arg(long, default_value = "360")]
    pub speech_red: u64,

    /// Table topics yellow mark in seconds (0 disables)
    #[arg(long, default_value = "60")]
    pub topics_yellow: u64,

    /// Table topics green mark in seconds (0 disables)
    #[arg(long, default_value = "90")]
    pub topics_green: u64,

    /// Table topics red mark in seconds (0 disables)
    #[arg(long, default_value = "105")]
    pub topics_red: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn prepared_speech_thresholds(&self) -> Thresholds {
        Thresholds::from_secs(self.speech_yellow, self.speech_green, self.speech_red)
    }

    pub fn table_topics_thresholds(&self) -> Thresholds {
        Thresholds::from_secs(self.topics_yellow, self.topics_green, self.topics_red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_meeting_marks() {
        let config = Config::try_parse_from(["toastmaster-companion"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20553");
        assert_eq!(config.log_level(), "info");
        assert!(config.host_api_url.is_none());
        assert_eq!(config.prepared_speech_thresholds(), Thresholds::prepared_speech());
        assert_eq!(config.table_topics_thresholds(), Thresholds::table_topics());
    }

    #[test]
    fn zero_disables_a_mark() {
        let config = Config::try_parse_from([
            "toastmaster-companion",
            "--topics-yellow",
            "0",
            "--host-api-url",
            "http://127.0.0.1:9000",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.table_topics_thresholds().yellow, None);
        assert_eq!(config.host_api_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(config.log_level(), "debug");
    }
}
