use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{App, Arg, ArgMatches, SubCommand};
use molitvenik::category::Categories;
use molitvenik::config::Config;
use molitvenik::entry::PrayerEntry;
use molitvenik::favorites::{FavoritesStore, FileStorage};
use molitvenik::rewrite::rewrite_slugs;
use molitvenik::select::{entry_of_the_day, pick_unshown, ShownSet};
use molitvenik::store::Store;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = App::new("molitvenik")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Content store, slug, and selection tooling for a prayer website")
        .arg(
            Arg::with_name("project")
                .short("C")
                .long("project")
                .value_name("DIR")
                .help("Project directory (searched upward for molitvenik.yaml)")
                .takes_value(true),
        )
        .subcommand(
            SubCommand::with_name("today")
                .about("Print the entry of the day")
                .arg(
                    Arg::with_name("date")
                        .long("date")
                        .value_name("YYYY-MM-DD")
                        .help("Select for this date instead of today")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("random")
                .about("Draw a random entry")
                .arg(
                    Arg::with_name("seen")
                        .long("seen")
                        .value_name("IDS")
                        .help("Comma-separated entry ids to exclude from the draw")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("show")
                .about("Print one entry by slug")
                .arg(Arg::with_name("slug").required(true)),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("List the index, optionally filtered")
                .arg(
                    Arg::with_name("query")
                        .long("query")
                        .short("q")
                        .takes_value(true),
                )
                .arg(Arg::with_name("category").long("category").takes_value(true))
                .arg(Arg::with_name("tag").long("tag").takes_value(true)),
        )
        .subcommand(
            SubCommand::with_name("rewrite-urls")
                .about("Regenerate every slug from its title and rewrite the store"),
        )
        .subcommand(
            SubCommand::with_name("verify").about("Check index/record consistency invariants"),
        )
        .subcommand(
            SubCommand::with_name("favorites")
                .about("Manage the locally-persisted favorites list")
                .subcommand(SubCommand::with_name("list"))
                .subcommand(
                    SubCommand::with_name("add").arg(Arg::with_name("slug").required(true)),
                )
                .subcommand(
                    SubCommand::with_name("remove").arg(Arg::with_name("id").required(true)),
                )
                .subcommand(
                    SubCommand::with_name("toggle").arg(Arg::with_name("slug").required(true)),
                )
                .subcommand(SubCommand::with_name("clear")),
        )
        .get_matches();

    let project_dir = matches.value_of("project").unwrap_or(".");
    let config = Config::from_directory(Path::new(project_dir))?;
    let store = Store::open(&config.data_directory);

    match matches.subcommand() {
        ("today", Some(sub)) => today(&config, &store, sub),
        ("random", Some(sub)) => random(&config, &store, sub),
        ("show", Some(sub)) => show(&config, &store, sub),
        ("list", Some(sub)) => list(&config, &store, sub),
        ("rewrite-urls", Some(_)) => rewrite_urls(&store),
        ("verify", Some(_)) => {
            store.verify()?;
            println!("store is consistent");
            Ok(())
        }
        ("favorites", Some(sub)) => favorites(&config, &store, sub),
        _ => Err(anyhow!("no subcommand given; try `molitvenik --help`")),
    }
}

fn today(config: &Config, store: &Store, matches: &ArgMatches) -> Result<()> {
    let date = match matches.value_of("date") {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("parsing date `{}`", raw))?,
        None => chrono::Local::today().naive_local(),
    };

    let index = store.load_index()?;
    let pick = entry_of_the_day(&index.prayers, date)?;
    print_entry(config, store, &store.load_entry(&pick.url)?)
}

fn random(config: &Config, store: &Store, matches: &ArgMatches) -> Result<()> {
    let mut shown = ShownSet::new();
    if let Some(raw) = matches.value_of("seen") {
        for part in raw.split(',').filter(|p| !p.is_empty()) {
            shown.record(part.parse().with_context(|| format!("parsing id `{}`", part))?);
        }
    }

    let index = store.load_index()?;
    let pick = pick_unshown(&index.prayers, &mut shown, &mut rand::thread_rng())?;
    print_entry(config, store, &store.load_entry(&pick.url)?)
}

fn show(config: &Config, store: &Store, matches: &ArgMatches) -> Result<()> {
    let slug = matches.value_of("slug").unwrap(); // required by clap
    print_entry(config, store, &store.load_entry(slug)?)
}

fn list(config: &Config, store: &Store, matches: &ArgMatches) -> Result<()> {
    let index = store.load_index()?;

    let mut entries: Vec<_> = match matches.value_of("query") {
        Some(query) => index.search(query),
        None => index.prayers.iter().collect(),
    };
    if let Some(category) = matches.value_of("category") {
        entries.retain(|p| p.category == category);
    }
    if let Some(tag) = matches.value_of("tag") {
        entries.retain(|p| p.tags.iter().any(|t| t == tag));
    }

    for p in entries {
        println!(
            "{}\t{}\t{}",
            p.id,
            p.title,
            p.permalink(&config.site_root, &config.entry_path_prefix)?,
        );
    }
    Ok(())
}

fn rewrite_urls(store: &Store) -> Result<()> {
    let changes = rewrite_slugs(store)?;
    for change in &changes {
        println!("{}: {} -> {}", change.id, change.old, change.new);
    }
    println!("{} slug(s) reassigned", changes.len());
    Ok(())
}

fn favorites(config: &Config, store: &Store, matches: &ArgMatches) -> Result<()> {
    let mut favorites = FavoritesStore::load(FileStorage::new(&config.favorites_path));

    match matches.subcommand() {
        ("add", Some(sub)) => {
            let entry = load_by_slug(store, sub)?;
            favorites.add(&entry);
        }
        ("toggle", Some(sub)) => {
            let entry = load_by_slug(store, sub)?;
            favorites.toggle(&entry);
        }
        ("remove", Some(sub)) => {
            let raw = sub.value_of("id").unwrap(); // required by clap
            favorites.remove(raw.parse().with_context(|| format!("parsing id `{}`", raw))?);
        }
        ("clear", Some(_)) => favorites.clear(),
        _ => {}
    }

    for record in favorites.records() {
        println!("{}\t{}\t{}", record.id, record.title, record.url);
    }
    Ok(())
}

fn load_by_slug(store: &Store, matches: &ArgMatches) -> Result<PrayerEntry> {
    let slug = matches.value_of("slug").unwrap(); // required by clap
    Ok(store.load_entry(slug)?)
}

fn print_entry(config: &Config, store: &Store, entry: &PrayerEntry) -> Result<()> {
    let heading = match Categories::from_file(&config.categories_path) {
        Ok(categories) => categories.heading(entry.id).map(str::to_owned),
        // The category table is optional; fall back to the plain title.
        Err(_) => None,
    };

    println!("{}", heading.unwrap_or_else(|| entry.title.clone()));
    println!(
        "{}",
        store
            .load_index()?
            .by_slug(&entry.url)
            .map(|p| p.permalink(&config.site_root, &config.entry_path_prefix))
            .transpose()?
            .map(|u| u.to_string())
            .unwrap_or_else(|| entry.url.clone()),
    );
    println!();
    println!("{}", entry.content);
    if let Some(modern) = &entry.content_modern {
        println!();
        println!("{}", modern);
    }
    Ok(())
}
