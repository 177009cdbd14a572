use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to .env file (e.g., .env.staging)
    #[arg(short, long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: String,
}

pub const DEFAULT_ENV_FILE: &str = ".env";

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// True when the user pointed at a specific file rather than the default
    pub fn env_file_is_explicit(&self) -> bool {
        self.env_file != DEFAULT_ENV_FILE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_env_file() {
        let args = Args::parse_from(["sight-api"]);
        assert_eq!(args.env_file, ".env");
        assert!(!args.env_file_is_explicit());
    }

    #[test]
    fn test_explicit_env_file() {
        let args = Args::parse_from(["sight-api", "--env-file", ".env.staging"]);
        assert_eq!(args.env_file, ".env.staging");
        assert!(args.env_file_is_explicit());
    }
}
