use clap::Parser;

/// Check that an OpenAI API key works by probing the live API.
///
/// The key is read from OPENAI_API_KEY (a .env file in the current directory
/// or a parent is loaded first). If that is unset, the positional argument is
/// used instead.
#[derive(Parser, Debug)]
#[command(name = "keyprobe")]
#[command(author, version, about, long_about)]
pub struct Cli {
    /// API key to use when OPENAI_API_KEY is not set
    #[arg(value_name = "API_KEY")]
    pub api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["keyprobe"]).unwrap();
        assert!(cli.api_key.is_none());
    }

    #[test]
    fn test_positional_key() {
        let cli = Cli::try_parse_from(["keyprobe", "sk-test-1234567890"]).unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("sk-test-1234567890"));
    }

    #[test]
    fn test_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["keyprobe", "sk-one", "sk-two"]).is_err());
        assert!(Cli::try_parse_from(["keyprobe", "--model", "gpt-4"]).is_err());
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
