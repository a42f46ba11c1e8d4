mod cli;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cli::Cli;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use parking_lot::RwLock;
use std::{io::Write, sync::Arc};
use tracing::info;
use tracksearch::{
    Corpus, LiveSearch, Record, SearchOptions, Track, TrackSearcher,
    load_corpus, tokenize_query,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(cli.log.as_str())
        .with_writer(std::io::stderr)
        .init();

    let options = cli.search_options();
    let corpus = load_corpus(&cli.corpus)?;
    if let Some(query) = &cli.query {
        let mut searcher = TrackSearcher::new(options);
        for (i, (key, track)) in searcher.search(query, &corpus).into_iter().enumerate() {
            println!("[{i}] {}", describe(key, track));
        }
        return Ok(());
    }
    repl(&cli, corpus, options)
}

fn repl(cli: &Cli, corpus: Corpus, options: SearchOptions) -> Result<()> {
    let corpus = Arc::new(RwLock::new(corpus));
    let (finish_tx, finish_rx) = bounded::<()>(1);
    let (search_tx, search_rx) = unbounded::<String>();
    let (search_result_tx, search_result_rx) = unbounded::<Vec<String>>();

    let live = LiveSearch::new(Arc::clone(&corpus), options);
    let worker =
        std::thread::spawn(move || search_worker(live, finish_rx, search_rx, search_result_tx));

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush().context("Failed to flush stdout")?;
        let mut line = String::new();
        if stdin.read_line(&mut line).context("Failed to read stdin")? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        } else if line == "/bye" {
            break;
        } else if line == "/reload" {
            match load_corpus(&cli.corpus) {
                Ok(fresh) => {
                    let count = fresh.len();
                    *corpus.write() = fresh;
                    println!("Reloaded {count} tracks");
                }
                Err(e) => eprintln!("Failed to reload corpus: {e:?}"),
            }
            continue;
        } else if let Some(query) = line.strip_prefix("/tokens") {
            let tokens = tokenize_query(query.trim());
            let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();
            println!("{}", rendered.join(" "));
            println!("{tokens:#?}");
            continue;
        }

        search_tx.send(line.to_string()).context("search_tx is closed")?;
        let search_result = search_result_rx.recv().context("search_result_rx is closed")?;
        for (i, line) in search_result.iter().enumerate() {
            println!("[{i}] {line}");
        }
    }

    finish_tx.send(()).context("finish_tx is closed")?;
    worker.join().map_err(|_| anyhow!("Search worker panicked"))?;
    Ok(())
}

/// Answers one query at a time; a new line is only read once its results are printed.
fn search_worker(
    mut live: LiveSearch<String, Track>,
    finish_rx: Receiver<()>,
    search_rx: Receiver<String>,
    search_result_tx: Sender<Vec<String>>,
) {
    loop {
        crossbeam_channel::select! {
            recv(finish_rx) -> _ => break,
            recv(search_rx) -> request => {
                let Ok(query) = request else {
                    break;
                };
                live.set_query(&query);
                let lines = live.with_results(|matches| {
                    matches
                        .into_iter()
                        .map(|(key, track)| describe(key, track))
                        .collect::<Vec<_>>()
                });
                if search_result_tx.send(lines).is_err() {
                    break;
                }
            }
        }
    }
    info!("Search worker is done");
}

fn describe(key: &str, track: &Track) -> String {
    let artist = track.field("artist").to_display_string();
    let title = track.field("title").to_display_string();
    format!("{key}: {artist} - {title}")
}
