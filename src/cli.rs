use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};

use crate::utils::Locale;

#[derive(Parser, Debug)]
#[command(
    name = "portwho",
    about = "Find the processes bound to a port and optionally kill them",
    version,
    author,
    help_template = "{before-help}{name} {version}\n{author-with-newline}{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
pub struct Cli {
    #[arg(value_name = "PORT", help = "Port number(s) to look up")]
    pub ports: Vec<String>,

    #[arg(short, long, help = "Kill the matching processes")]
    pub kill: bool,

    #[arg(short, long, help = "Match the port fuzzily")]
    pub fuzzy: bool,

    #[arg(
        short,
        long,
        help = "Match against the remote port instead of the local port"
    )]
    pub remote: bool,

    #[arg(
        short,
        long,
        requires = "kill",
        conflicts_with = "json",
        help = "Choose which of the matching processes to kill"
    )]
    pub interactive: bool,

    #[arg(short, long, help = "Suppress output")]
    pub quiet: bool,

    #[arg(short, long, help = "Output in JSON format")]
    pub json: bool,

    #[arg(short = 'v', long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        value_enum,
        help = "Message language (detected from LANG when omitted)"
    )]
    pub lang: Option<Locale>,
}

impl Cli {
    /// Parse `std::env::args`, with the `--kill` and `--fuzzy` help text in the
    /// language of `locale`.
    pub fn parse_args(locale: Locale) -> Self {
        let matches = Self::localized_command(locale).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    fn localized_command(locale: Locale) -> clap::Command {
        let messages = locale.messages();
        Self::command()
            .mut_arg("kill", |arg| arg.help(messages.item_kill))
            .mut_arg("fuzzy", |arg| arg.help(messages.item_fuzzy))
    }

    /// The `--lang` value in raw arguments, read before the parser exists so
    /// that the help text can already be localized.
    pub fn lang_from_args<I, S>(args: I) -> Option<Locale>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            if arg == "--" {
                break;
            }
            let value = match arg.strip_prefix("--lang") {
                Some("") => args.next()?.as_ref().to_string(),
                Some(rest) => match rest.strip_prefix('=') {
                    Some(value) => value.to_string(),
                    None => continue,
                },
                None => continue,
            };
            return Locale::from_str(&value, true).ok();
        }
        None
    }

    pub fn locale(&self, detected: Locale) -> Locale {
        self.lang.unwrap_or(detected)
    }
}
