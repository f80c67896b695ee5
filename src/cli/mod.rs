use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "netstab")]
#[command(about = "Network stability test for a domain environment")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, help = "Domain to test")]
    pub domain: String,

    #[arg(
        short = 'c',
        long = "domain-controllers",
        visible_alias = "dc",
        num_args = 1..,
        value_name = "HOST",
        help = "Domain controllers to test"
    )]
    pub domain_controllers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_domain_only() {
        let cli = Cli::try_parse_from(["netstab", "-d", "corp.test"]).unwrap();
        assert_eq!(cli.domain, "corp.test");
        assert!(cli.domain_controllers.is_empty());
    }

    #[test]
    fn test_multiple_controllers() {
        let cli = Cli::try_parse_from([
            "netstab",
            "--domain",
            "corp.test",
            "--domain-controllers",
            "dc1",
            "dc2",
        ])
        .unwrap();
        assert_eq!(cli.domain_controllers, vec!["dc1", "dc2"]);

        let cli = Cli::try_parse_from(["netstab", "-d", "corp.test", "--dc", "dc3"]).unwrap();
        assert_eq!(cli.domain_controllers, vec!["dc3"]);
    }

    #[test]
    fn test_domain_is_required() {
        assert!(Cli::try_parse_from(["netstab", "-c", "dc1"]).is_err());
    }
}
