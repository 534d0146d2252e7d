use log::info;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use warp::Filter;

use crate::client::{ApiClient, EntryApi};
use crate::config::{AddConfig, ClientAction, ClientConfig, ServerConfig};
use crate::error::{Error, Result};
use crate::form::{EntryForm, FormState, Navigation};
use crate::model::db::NewEntry;
use crate::model::http::{Entry, EntryRequest};
use crate::server;
use crate::store::Store;

pub fn run(config: &ServerConfig) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(config.async_threads)
        .max_blocking_threads(config.blocking_threads)
        .build()
        .map_err(Error::from)?;

    async fn run(config: &ServerConfig) -> Result<()> {
        let store = Store::connect(&config.db_conn).await?;

        store.migrate().await?;

        let filter = server::filter(store.clone());
        let log = warp::log("journal::api");
        let filter = filter.with(log);

        let (addr, server) = warp::serve(filter).try_bind_with_graceful_shutdown(
            ([0, 0, 0, 0], config.port),
            async {
                tokio::signal::ctrl_c().await.ok();
            },
        )?;

        info!("listening on {}", addr);
        server.await;
        info!("shutting down");

        store.close().await;

        Ok(())
    }

    rt.block_on(run(config))
}

pub fn add_entry(config: &AddConfig) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .map_err(Error::from)?;

    let AddConfig::Entry {
        db_url,
        title,
        notes,
        photo_url,
    } = config;

    let new_entry = EntryRequest {
        title: Some(title.clone()),
        notes: Some(notes.clone()),
        photo_url: Some(photo_url.clone()),
    }
    .validate()?;

    async fn run(db_url: &str, new_entry: NewEntry) -> Result<()> {
        let store = Store::connect(db_url).await?;

        store.migrate().await?;
        let entry = store.insert(&new_entry).await?;
        store.close().await;

        info!("added entry {}", entry.entry_id);
        println!("{}", render(&Entry::from(entry)));

        Ok(())
    }

    rt.block_on(run(db_url, new_entry))
}

pub fn client(config: &ClientConfig, action: &ClientAction) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .map_err(Error::from)?;

    let api = ApiClient::new(&config.api_url)?;

    rt.block_on(run_action(&api, action))
}

async fn run_action<A: EntryApi>(api: &A, action: &ClientAction) -> Result<()> {
    match action {
        ClientAction::List => show_list(api).await,
        ClientAction::Show(entry_id) => {
            println!("{}", render(&api.get(*entry_id).await?));
            Ok(())
        }
        ClientAction::New(fields) => {
            let mut form = EntryForm::new(api);
            *form.fields_mut() = fields.clone();

            let navigation = form.submit().await;
            follow(api, navigation, &form).await
        }
        ClientAction::Edit {
            entry_id,
            title,
            notes,
            photo_url,
        } => {
            let mut form = loaded_form(api, *entry_id).await?;

            let fields = form.fields_mut();
            if let Some(title) = title {
                fields.title = title.clone();
            }
            if let Some(notes) = notes {
                fields.notes = notes.clone();
            }
            if let Some(photo_url) = photo_url {
                fields.photo_url = photo_url.clone();
            }

            let navigation = form.submit().await;
            follow(api, navigation, &form).await
        }
        ClientAction::Delete {
            entry_id,
            confirmed,
        } => {
            let mut form = loaded_form(api, *entry_id).await?;
            println!("{}", render_form(&form));

            form.request_delete();
            if !form.is_confirming_delete() {
                return Err(Error::Form("this entry cannot be deleted".to_string()));
            }
            if !*confirmed && !confirm(&format!("delete entry #{}?", entry_id)).await? {
                form.cancel_delete();
                println!("cancelled");
                return Ok(());
            }

            let navigation = form.confirm_delete().await;
            follow(api, navigation, &form).await
        }
    }
}

async fn loaded_form<A: EntryApi>(api: &A, entry_id: i64) -> Result<EntryForm<'_, A>> {
    let form = EntryForm::open(api, entry_id).await;

    match form.state() {
        FormState::Error(message) => Err(Error::Form(message.clone())),
        _ => Ok(form),
    }
}

async fn follow<A: EntryApi>(
    api: &A,
    navigation: Navigation,
    form: &EntryForm<'_, A>,
) -> Result<()> {
    match navigation {
        Navigation::List => show_list(api).await,
        Navigation::Stay => Err(Error::Form(
            form.save_error()
                .unwrap_or("the entry was not saved")
                .to_string(),
        )),
    }
}

async fn show_list<A: EntryApi>(api: &A) -> Result<()> {
    let entries = api.list().await?;

    if entries.is_empty() {
        println!("no entries yet");
    }
    for entry in entries.iter() {
        println!("{}", render(entry));
    }

    Ok(())
}

async fn confirm(question: &str) -> Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{} [y/N] ", question).as_bytes())
        .await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn render(entry: &Entry) -> String {
    format!(
        "#{} {}\n    {}\n    {}",
        entry.entry_id, entry.title, entry.notes, entry.photo_url
    )
}

fn render_form<A: EntryApi>(form: &EntryForm<'_, A>) -> String {
    let fields = form.fields();
    render(&Entry {
        entry_id: form.entry_id().unwrap_or_default(),
        title: fields.title.clone(),
        notes: fields.notes.clone(),
        photo_url: fields.photo_url.clone(),
    })
}
