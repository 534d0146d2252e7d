use clap::ArgMatches;
use std::{env, str::FromStr};

use crate::error::{Error, Result};
use crate::form::EntryFields;
use crate::model::parse_entry_id;
use crate::store::is_in_memory;

pub struct ServerConfig {
    pub async_threads: usize,
    pub blocking_threads: usize,
    pub port: u16,
    pub db_conn: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            async_threads: 2,
            blocking_threads: 128,
            port: 5000,
            db_conn: "sqlite::memory:".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_matches(matches: Option<&ArgMatches>) -> Self {
        let mut config = ServerConfig::default();

        if let Some(db_conn) = setting(matches, "CONNECTION", "JRNL_CONNECTION") {
            config.db_conn = db_conn;
        }
        if let Some(port) = setting(matches, "PORT", "JRNL_PORT") {
            config.port = port;
        }
        if let Some(async_threads) = setting(matches, "ASYNC_THREADS", "JRNL_ASYNC_THREADS") {
            config.async_threads = async_threads;
        }
        if let Some(sync_threads) = setting(matches, "SYNC_THREADS", "JRNL_SYNC_THREADS") {
            config.blocking_threads = sync_threads;
        }

        config
    }
}

pub enum AddConfig {
    Entry {
        db_url: String,
        title: String,
        notes: String,
        photo_url: String,
    },
}

impl AddConfig {
    pub fn from_matches(matches: Option<&ArgMatches>) -> Result<Self> {
        let db_url: String = setting(matches, "CONNECTION", "JRNL_CONNECTION")
            .ok_or(Error::MissingArgument("CONNECTION"))?;
        if is_in_memory(&db_url) {
            return Err(Error::InvalidArgument(
                "an in-memory database would discard the entry on exit",
            ));
        }

        Ok(AddConfig::Entry {
            db_url,
            title: required(matches, "TITLE")?,
            notes: required(matches, "NOTES")?,
            photo_url: required(matches, "PHOTO_URL")?,
        })
    }
}

pub struct ClientConfig {
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: "http://localhost:5000".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_matches(matches: Option<&ArgMatches>) -> Self {
        let mut config = ClientConfig::default();

        if let Some(api_url) = setting(matches, "API", "JRNL_API_URL") {
            config.api_url = api_url;
        }

        config
    }
}

#[derive(Debug, PartialEq)]
pub enum ClientAction {
    List,
    Show(i64),
    New(EntryFields),
    Edit {
        entry_id: i64,
        title: Option<String>,
        notes: Option<String>,
        photo_url: Option<String>,
    },
    Delete {
        entry_id: i64,
        confirmed: bool,
    },
}

impl ClientAction {
    pub fn from_matches(name: &str, matches: Option<&ArgMatches>) -> Result<Self> {
        let entry_id = || {
            required(matches, "ID").and_then(|raw| parse_entry_id(&raw))
        };

        match name {
            "list" => Ok(ClientAction::List),
            "show" => Ok(ClientAction::Show(entry_id()?)),
            "new" => Ok(ClientAction::New(EntryFields {
                title: required(matches, "TITLE")?,
                notes: required(matches, "NOTES")?,
                photo_url: required(matches, "PHOTO_URL")?,
            })),
            "edit" => Ok(ClientAction::Edit {
                entry_id: entry_id()?,
                title: value(matches, "TITLE"),
                notes: value(matches, "NOTES"),
                photo_url: value(matches, "PHOTO_URL"),
            }),
            "delete" => Ok(ClientAction::Delete {
                entry_id: entry_id()?,
                confirmed: matches.map(|m| m.is_present("YES")).unwrap_or(false),
            }),
            _ => Err(Error::InvalidCommand),
        }
    }
}

/// Reads a setting from the environment, then lets the command line override it.
fn setting<T: FromStr>(matches: Option<&ArgMatches>, arg: &str, env_key: &str) -> Option<T> {
    let from_env = env::var(env_key)
        .ok()
        .and_then(|s| T::from_str(&s).ok());

    matches
        .and_then(|m| m.value_of(arg))
        .and_then(|s| T::from_str(s).ok())
        .or(from_env)
}

fn value(matches: Option<&ArgMatches>, arg: &str) -> Option<String> {
    matches.and_then(|m| m.value_of(arg)).map(|s| s.to_string())
}

fn required(matches: Option<&ArgMatches>, arg: &'static str) -> Result<String> {
    value(matches, arg).ok_or(Error::MissingArgument(arg))
}

#[cfg(test)]
mod test {
    use super::{setting, AddConfig, ClientAction, ClientConfig, ServerConfig};
    use crate::app;
    use crate::error::Error;
    use std::env;

    #[test]
    fn server_defaults() {
        let matches = app().get_matches_from(vec!["journal", "run"]);
        let config = ServerConfig::from_matches(matches.subcommand_matches("run"));

        assert_eq!(2, config.async_threads);
        assert_eq!(128, config.blocking_threads);
    }

    #[test]
    fn flags_override_environment() {
        env::set_var("JRNL_TEST_FLAG_PORT", "6000");
        let matches = app().get_matches_from(vec!["journal", "run", "-p", "7000"]);

        let port: Option<u16> = setting(
            matches.subcommand_matches("run"),
            "PORT",
            "JRNL_TEST_FLAG_PORT",
        );

        assert_eq!(Some(7000), port);
    }

    #[test]
    fn environment_fills_missing_flags() {
        env::set_var("JRNL_TEST_ENV_PORT", "6000");
        env::set_var("JRNL_TEST_BAD_PORT", "not a port");
        let matches = app().get_matches_from(vec!["journal", "run"]);
        let run = matches.subcommand_matches("run");

        assert_eq!(Some(6000u16), setting(run, "PORT", "JRNL_TEST_ENV_PORT"));
        assert_eq!(None::<u16>, setting(run, "PORT", "JRNL_TEST_BAD_PORT"));
    }

    #[test]
    fn client_url_flag() {
        let matches = app().get_matches_from(vec![
            "journal",
            "list",
            "--api",
            "http://journal.local:8080",
        ]);

        let config = ClientConfig::from_matches(matches.subcommand_matches("list"));

        assert_eq!("http://journal.local:8080", config.api_url);
    }

    #[test]
    fn edit_keeps_unset_fields_empty() {
        let matches = app().get_matches_from(vec!["journal", "edit", "3", "--notes", "Rainy"]);

        let action = ClientAction::from_matches("edit", matches.subcommand_matches("edit")).unwrap();

        assert_eq!(
            ClientAction::Edit {
                entry_id: 3,
                title: None,
                notes: Some("Rainy".to_string()),
                photo_url: None,
            },
            action
        );
    }

    #[test]
    fn delete_rejects_bad_ids() {
        let matches = app().get_matches_from(vec!["journal", "delete", "-y", "0"]);

        let action = ClientAction::from_matches("delete", matches.subcommand_matches("delete"));

        if let Err(Error::InvalidEntryId) = action {
            assert!(true);
        } else {
            assert!(false);
        }
    }

    #[test]
    fn unknown_command() {
        if let Err(Error::InvalidCommand) = ClientAction::from_matches("", None) {
            assert!(true);
        } else {
            assert!(false);
        }
    }

    #[test]
    fn add_refuses_an_in_memory_database() {
        let matches = app().get_matches_from(vec![
            "journal", "add", "--title", "Trip", "--notes", "Fun", "--photo", "p", "-c",
            "sqlite::memory:",
        ]);

        if let Err(Error::InvalidArgument(_)) = AddConfig::from_matches(matches.subcommand_matches("add")) {
            assert!(true);
        } else {
            assert!(false);
        }
    }

    #[test]
    fn add_takes_a_file_database() {
        let matches = app().get_matches_from(vec![
            "journal", "add", "--title", "Trip", "--notes", "Fun", "--photo", "p", "-c",
            "sqlite://journal.db?mode=rwc",
        ]);

        let AddConfig::Entry { db_url, title, .. } =
            AddConfig::from_matches(matches.subcommand_matches("add")).unwrap();

        assert_eq!("sqlite://journal.db?mode=rwc", db_url);
        assert_eq!("Trip", title);
    }
}
