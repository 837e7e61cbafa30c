use std::collections::HashMap;
use std::io;
use std::str::FromStr;

/// Command line split into positional arguments, `--key value` options and
/// bare flags
#[derive(Debug, Default)]
pub struct Args {
    pub positional: Vec<String>,
    options: HashMap<String, String>,
    flags: Vec<String>,
}

/// Options that take no value
const FLAGS: &[&str] = &["-v", "--verbose", "-h", "--help"];

impl Args {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> io::Result<Args> {
        let mut parsed = Args::default();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            if FLAGS.contains(&arg.as_str()) {
                parsed.flags.push(arg);
            } else if let Some(name) = arg.strip_prefix("--") {
                let value = iter.next().ok_or_else(|| invalid(format!("--{} needs a value", name)))?;
                parsed.options.insert(name.to_string(), value);
            } else {
                parsed.positional.push(arg);
            }
        }
        Ok(parsed)
    }

    pub fn flag(&self, short: &str, long: &str) -> bool {
        self.flags.iter().any(|f| f == short || f == long)
    }

    /// Parse `--name` if present, otherwise return `default`
    pub fn option_or<T: FromStr>(&self, name: &str, default: T) -> io::Result<T>
    where
        T::Err: std::fmt::Display,
    {
        match self.options.get(name) {
            Some(value) => value
                .parse()
                .map_err(|e| invalid(format!("invalid --{} '{}': {}", name, value, e))),
            None => Ok(default),
        }
    }

    #[allow(dead_code)]
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }
}

pub fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

pub fn log_level(verbose: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}
