use clap::{clap_app, App};
use dotenv::dotenv;
use log::error;
use shadow_rs::shadow;
use std::process::exit;

use crate::config::{AddConfig, ClientAction, ClientConfig, ServerConfig};

shadow!(build);

mod client;
mod command;
mod config;
mod error;
mod form;
mod model;
mod server;
mod store;

fn app() -> App<'static, 'static> {
    clap_app!(journal =>
        (version: build::PKG_VERSION)
        (author: "Tobias Moldan <contact@tobiasmoldan.com>")
        (about: "A personal journal with a REST API")
        (@setting SubcommandRequiredElseHelp)
        (@subcommand run =>
            (about: "run the api server")
            (@arg PORT: -p --port +takes_value "http port, defaults to 5000")
            (@arg ASYNC_THREADS: --async +takes_value "number of asyncronous worker threads used handling io, defaults to 2")
            (@arg SYNC_THREADS: --sync +takes_value "number of max sync worker, defaults to 128")
            (@arg CONNECTION: -c --connection +takes_value "database connection string, defaults to 'sqlite::memory:'")
        )
        (@subcommand add =>
            (about: "add an entry directly to the database")
            (@arg TITLE: --title +takes_value +required "entry title")
            (@arg NOTES: --notes +takes_value +required "entry notes")
            (@arg PHOTO_URL: --photo +takes_value +required "photo url")
            (@arg CONNECTION: -c --connection +takes_value "database connection string, e.g. 'sqlite://journal.db?mode=rwc'")
        )
        (@subcommand list =>
            (about: "list all entries")
            (@arg API: --api +takes_value "api base url, defaults to 'http://localhost:5000'")
        )
        (@subcommand show =>
            (about: "show a single entry")
            (@arg ID: +required "entry id")
            (@arg API: --api +takes_value "api base url, defaults to 'http://localhost:5000'")
        )
        (@subcommand new =>
            (about: "create an entry")
            (@arg TITLE: --title +takes_value +required "entry title")
            (@arg NOTES: --notes +takes_value +required "entry notes")
            (@arg PHOTO_URL: --photo +takes_value +required "photo url")
            (@arg API: --api +takes_value "api base url, defaults to 'http://localhost:5000'")
        )
        (@subcommand edit =>
            (about: "replace the fields of an entry, unset fields keep their value")
            (@arg ID: +required "entry id")
            (@arg TITLE: --title +takes_value "new title")
            (@arg NOTES: --notes +takes_value "new notes")
            (@arg PHOTO_URL: --photo +takes_value "new photo url")
            (@arg API: --api +takes_value "api base url, defaults to 'http://localhost:5000'")
        )
        (@subcommand delete =>
            (about: "delete an entry after confirmation")
            (@arg ID: +required "entry id")
            (@arg YES: -y --yes "skip the confirmation prompt")
            (@arg API: --api +takes_value "api base url, defaults to 'http://localhost:5000'")
        )
    )
}

fn main() {
    dotenv().ok();

    if shadow_rs::is_debug() {
        pretty_env_logger::init();
    } else {
        env_logger::init();
    }

    let matches = app().get_matches();

    let result = match matches.subcommand() {
        ("run", matches) => command::run(&ServerConfig::from_matches(matches)),
        ("add", matches) => {
            AddConfig::from_matches(matches).and_then(|config| command::add_entry(&config))
        }
        (name, matches) => ClientAction::from_matches(name, matches)
            .and_then(|action| command::client(&ClientConfig::from_matches(matches), &action)),
    };

    if let Err(e) = result {
        error!("{}", e);
        exit(1);
    }
}
